//! CLI-specific error types
//!
//! A CLI error ends the command with a non-zero exit. Errors of individual
//! `exec` requests are not CLI errors; they are written as error responses.

use std::fmt;
use std::io;

use crate::database::DatabaseError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing or invalid
    ConfigError,
    /// stdin/stdout failure
    IoError,
    /// `init` on a directory that already holds a document log
    AlreadyInitialized,
    /// Command needs a document log that does not exist
    NotInitialized,
    /// Database could not be opened
    OpenFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "EMBER_CLI_CONFIG_ERROR",
            Self::IoError => "EMBER_CLI_IO_ERROR",
            Self::AlreadyInitialized => "EMBER_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "EMBER_CLI_NOT_INITIALIZED",
            Self::OpenFailed => "EMBER_CLI_OPEN_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'emberdb init' first.",
        )
    }

    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::OpenFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DatabaseError> for CliError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::Config(msg) => Self::config_error(msg),
            other => Self::open_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_mapping() {
        let err = CliError::from(DatabaseError::Config("bad".into()));
        assert_eq!(err.code_str(), "EMBER_CLI_CONFIG_ERROR");
        assert_eq!(err.message(), "bad");

        let err = CliError::from(DatabaseError::LockPoisoned);
        assert_eq!(err.code(), &CliErrorCode::OpenFailed);
    }

    #[test]
    fn test_display() {
        let err = CliError::not_initialized();
        assert!(err.to_string().starts_with("EMBER_CLI_NOT_INITIALIZED: "));
    }
}
