//! Storage error types
//!
//! Error codes:
//! - EMBER_STORAGE_INIT_FAILED: directory or log file could not be created/opened
//! - EMBER_STORAGE_WRITE_FAILED: append or sync failed
//! - EMBER_STORAGE_READ_FAILED: open/seek/read failed for reasons other than bad bytes
//! - EMBER_DOCUMENT_NOT_FOUND: id absent from the index
//! - EMBER_DATA_CORRUPTION: frame shorter than declared, bad UTF-8, bad JSON, bad terminator
//!
//! None of these are retried by the engine.

use std::fmt;
use std::io;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Directory or data file could not be prepared
    EmberStorageInitFailed,
    /// Frame write or sync failed
    EmberStorageWriteFailed,
    /// Frame read failed at the I/O level
    EmberStorageReadFailed,
    /// Unknown document id
    EmberDocumentNotFound,
    /// Frame bytes are not a valid record
    EmberDataCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::EmberStorageInitFailed => "EMBER_STORAGE_INIT_FAILED",
            StorageErrorCode::EmberStorageWriteFailed => "EMBER_STORAGE_WRITE_FAILED",
            StorageErrorCode::EmberStorageReadFailed => "EMBER_STORAGE_READ_FAILED",
            StorageErrorCode::EmberDocumentNotFound => "EMBER_DOCUMENT_NOT_FOUND",
            StorageErrorCode::EmberDataCorruption => "EMBER_DATA_CORRUPTION",
        }
    }

    /// Returns true for failures of the file system rather than of the data
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            StorageErrorCode::EmberStorageInitFailed
                | StorageErrorCode::EmberStorageWriteFailed
                | StorageErrorCode::EmberStorageReadFailed
        )
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// Directory or file could not be prepared during initialization
    pub fn init_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::EmberStorageInitFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Write or sync failed
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::EmberStorageWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// A document could not be encoded into a frame
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::EmberStorageWriteFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Open, seek or read failed
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::EmberStorageReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Unknown document id
    pub fn not_found(document_id: &str) -> Self {
        Self {
            code: StorageErrorCode::EmberDocumentNotFound,
            message: "Document not found".to_string(),
            details: Some(format!("document_id: {}", document_id)),
            source: None,
        }
    }

    /// Invalid frame at a byte offset
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::EmberDataCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StorageErrorCode::EmberDocumentNotFound
    }

    pub fn is_corruption(&self) -> bool {
        self.code == StorageErrorCode::EmberDataCorruption
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StorageErrorCode::EmberStorageInitFailed.code(),
            "EMBER_STORAGE_INIT_FAILED"
        );
        assert_eq!(
            StorageErrorCode::EmberDocumentNotFound.code(),
            "EMBER_DOCUMENT_NOT_FOUND"
        );
        assert_eq!(
            StorageErrorCode::EmberDataCorruption.code(),
            "EMBER_DATA_CORRUPTION"
        );
    }

    #[test]
    fn test_io_classification() {
        assert!(StorageErrorCode::EmberStorageWriteFailed.is_io());
        assert!(StorageErrorCode::EmberStorageReadFailed.is_io());
        assert!(!StorageErrorCode::EmberDocumentNotFound.is_io());
        assert!(!StorageErrorCode::EmberDataCorruption.is_io());
    }

    #[test]
    fn test_not_found_display() {
        let err = StorageError::not_found("user-7");
        assert!(err.is_not_found());
        let display = err.to_string();
        assert!(display.contains("EMBER_DOCUMENT_NOT_FOUND"));
        assert!(display.contains("user-7"));
    }

    #[test]
    fn test_corruption_display_has_offset() {
        let err = StorageError::corruption_at_offset(1024, "payload is not valid JSON");
        assert!(err.is_corruption());
        let display = format!("{}", err);
        assert!(display.contains("byte_offset: 1024"));
        assert!(display.contains("payload is not valid JSON"));
    }

    #[test]
    fn test_write_failed_keeps_source() {
        use std::error::Error;
        let err = StorageError::write_failed(
            "disk full",
            io::Error::new(io::ErrorKind::Other, "no space"),
        );
        assert!(err.source().is_some());
        assert!(err.code().is_io());
    }
}
