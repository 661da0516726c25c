//! Database facade errors

use thiserror::Error;

use crate::query::QueryError;
use crate::storage::StorageError;

/// Result type for facade operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors surfaced by the database facade and the process handle
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database not initialized")]
    NotInitialized,

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DatabaseError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::Storage(e) => e.code().code(),
            DatabaseError::InvalidQuery(e) => e.code(),
            DatabaseError::InvalidDocument(_) => "EMBER_INVALID_DOCUMENT",
            DatabaseError::InvalidRequest(_) => "EMBER_INVALID_REQUEST",
            DatabaseError::Config(_) => "EMBER_CONFIG_INVALID",
            DatabaseError::NotInitialized => "EMBER_NOT_INITIALIZED",
            DatabaseError::LockPoisoned => "EMBER_LOCK_POISONED",
        }
    }

    /// Returns true if the error means the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::Storage(e) if e.is_not_found())
    }
}
