//! Document storage subsystem for emberdb
//!
//! The storage engine holds the canonical persistent state of all documents:
//! one append-only log file of length-prefixed JSON frames, plus an in-memory
//! index from document id to the offset of its newest frame.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates, no truncation)
//! - Latest frame wins for the same document id
//! - Soft deletes are tombstone frames; history is never erased
//! - Index updated only after a write succeeds
//! - Bulk scans step over undecodable frames; point reads report them
//!
//! The engine is not thread-safe by itself: writers need `&mut`, so a shared
//! engine is wrapped in a lock by its owner.

mod engine;
mod errors;
mod reader;
mod record;
mod writer;

pub use engine::{RebuildReport, StorageEngine, StorageStats, DATA_FILE_NAME};
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use reader::{Frame, FrameAt, LogReader};
pub use record::{decode_frame, encode_frame, FrameError, FRAME_OVERHEAD, FRAME_TERMINATOR};
pub use writer::LogWriter;
