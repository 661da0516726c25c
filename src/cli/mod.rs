//! CLI module for emberdb
//!
//! Provides command-line interface for:
//! - init: Create the data directory and document log
//! - exec: Read JSON requests from stdin, write JSON responses to stdout
//! - stats: One-shot database statistics
//! - collections: One-shot collection listing
//!
//! Logs go to stderr; stdout carries only responses.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{collections, exec, init, run, run_command, stats};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_lines, write_data, write_error, write_response};
