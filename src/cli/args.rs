//! CLI argument definitions using clap
//!
//! Commands:
//! - emberdb init --config <path>
//! - emberdb exec --config <path>
//! - emberdb stats --config <path>
//! - emberdb collections --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// emberdb - an embedded, append-only document store
#[derive(Parser, Debug)]
#[command(name = "emberdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty document log
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./emberdb.json")]
        config: PathBuf,
    },

    /// Execute JSON requests read line by line from stdin
    Exec {
        /// Path to configuration file
        #[arg(long, default_value = "./emberdb.json")]
        config: PathBuf,
    },

    /// Print database statistics
    Stats {
        /// Path to configuration file
        #[arg(long, default_value = "./emberdb.json")]
        config: PathBuf,
    },

    /// Print the names of collections holding live documents
    Collections {
        /// Path to configuration file
        #[arg(long, default_value = "./emberdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["emberdb", "stats"]).unwrap();
        match cli.command {
            Command::Stats { config } => assert_eq!(config, PathBuf::from("./emberdb.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_config_path() {
        let cli = Cli::try_parse_from(["emberdb", "exec", "--config", "/etc/ember.json"]).unwrap();
        assert!(matches!(cli.command, Command::Exec { config } if config == PathBuf::from("/etc/ember.json")));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["emberdb", "serve"]).is_err());
    }
}
