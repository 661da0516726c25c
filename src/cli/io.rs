//! JSON line I/O for the CLI
//!
//! - Input: one JSON request per line
//! - Output: one JSON response per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use crate::api::Response;

use super::errors::{CliError, CliResult};

/// Iterates non-blank input lines
pub fn read_lines<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(text) if text.trim().is_empty()))
}

/// Write one response line and flush
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> CliResult<()> {
    writeln!(out, "{}", response.to_json())?;
    out.flush()?;
    Ok(())
}

/// Write a success response carrying `data`
pub fn write_data<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_response(out, &Response::success(data))
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_response(out, &Response::error(code, message))
}
