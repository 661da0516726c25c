//! emberdb - an embedded, append-only, file-backed document store
//!
//! Documents are JSON-like maps grouped into named collections and persisted
//! as frames in a single log file. Every write appends; deletes are
//! tombstones. An in-memory index maps each id to its newest frame and is
//! rebuilt from the log on open.
//!
//! Layers, bottom up:
//! - `value`, `document`: the data model
//! - `storage`: log format, append, point reads, scans, index rebuild
//! - `query`: predicate filtering, sorting, skip/limit, JSON parsing
//! - `database`: the facade composing storage and query under one lock
//! - `api`: process-wide handle and JSON request handling
//! - `cli`: the `emberdb` binary

pub mod api;
pub mod cli;
pub mod database;
pub mod document;
pub mod observability;
pub mod query;
pub mod storage;
pub mod value;
