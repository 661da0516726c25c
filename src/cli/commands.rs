//! CLI command implementations
//!
//! Every command loads the configuration first. `init` creates the data
//! directory and the empty document log; the other commands refuse to run
//! until that log exists, so a mistyped `data_dir` is reported instead of
//! silently creating a fresh database.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::json;

use crate::api::RequestHandler;
use crate::database::{Database, DatabaseConfig};
use crate::storage::DATA_FILE_NAME;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_lines, write_data, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cmd {
        Command::Init { config } => init(&config, &mut out),
        Command::Exec { config } => {
            let stdin = io::stdin();
            exec(&config, stdin.lock(), &mut out)
        }
        Command::Stats { config } => stats(&config, &mut out),
        Command::Collections { config } => collections(&config, &mut out),
    }
}

/// Create the data directory and an empty document log
pub fn init<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = DatabaseConfig::load(config_path)?;

    if is_initialized(&config) {
        return Err(CliError::already_initialized());
    }

    let db = Database::open(config)?;
    let log_path = db.config().data_path().join(DATA_FILE_NAME);

    write_data(
        out,
        json!({
            "initialized": true,
            "data_dir": db.config().data_dir,
            "log_file": log_path.display().to_string(),
        }),
    )
}

/// Execute requests from `input`, one JSON object per line.
///
/// A failed request produces an error response and processing continues.
/// Only I/O failures on the streams themselves end the loop.
pub fn exec<R: BufRead, W: Write>(config_path: &Path, input: R, out: &mut W) -> CliResult<()> {
    let db = open_existing(config_path)?;
    let handler = RequestHandler::new(&db);

    for line in read_lines(input) {
        let line = line?;
        let response = handler.handle_line(&line);
        write_response(out, &response)?;
    }

    Ok(())
}

/// Print database statistics
pub fn stats<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let db = open_existing(config_path)?;
    let stats = db.stats()?;
    write_data(out, serde_json::to_value(&stats)?)
}

/// Print collection names
pub fn collections<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let db = open_existing(config_path)?;
    let names = db.collections()?;
    write_data(out, json!(names))
}

fn open_existing(config_path: &Path) -> CliResult<Database> {
    let config = DatabaseConfig::load(config_path)?;

    if !is_initialized(&config) {
        return Err(CliError::not_initialized());
    }

    Ok(Database::open(config)?)
}

fn is_initialized(config: &DatabaseConfig) -> bool {
    config.data_path().join(DATA_FILE_NAME).is_file()
}
