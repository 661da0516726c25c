//! Observable events in emberdb
//!
//! Events are explicit and typed; the string form is the `event` key of a log line.

use std::fmt;

/// Observable lifecycle and data-path events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Storage lifecycle
    /// Data directory and log file opened
    StorageOpened,
    /// Index rebuild scan begins
    IndexRebuildBegin,
    /// Index rebuild scan complete
    IndexRebuildComplete,
    /// A frame could not be decoded and was skipped
    RecordSkipped,
    /// The log ends in a partial frame
    TruncatedTail,

    // Writes
    /// Document frame appended
    DocumentAppended,
    /// Tombstone frame appended
    TombstoneAppended,
    /// Append failed; index untouched
    AppendFailed,

    // Query
    /// Query pipeline finished
    QueryExecuted,

    // Database
    /// Database facade ready
    DatabaseOpened,
    /// Database handle released
    DatabaseClosed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::StorageOpened => "STORAGE_OPENED",
            Event::IndexRebuildBegin => "INDEX_REBUILD_BEGIN",
            Event::IndexRebuildComplete => "INDEX_REBUILD_COMPLETE",
            Event::RecordSkipped => "RECORD_SKIPPED",
            Event::TruncatedTail => "TRUNCATED_TAIL",

            Event::DocumentAppended => "DOCUMENT_APPENDED",
            Event::TombstoneAppended => "TOMBSTONE_APPENDED",
            Event::AppendFailed => "APPEND_FAILED",

            Event::QueryExecuted => "QUERY_COMPLETE",

            Event::DatabaseOpened => "DATABASE_OPENED",
            Event::DatabaseClosed => "DATABASE_CLOSED",
        }
    }

    /// Returns true if the event reports degraded or failed work
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::RecordSkipped | Event::TruncatedTail | Event::AppendFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
