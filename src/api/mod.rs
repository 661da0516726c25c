//! Process-wide handle for emberdb
//!
//! Hosts that talk to the store through strings open one database per
//! process with `init_database` and then call the functions below with JSON
//! text. Every call made before `init_database` (or after
//! `close_database`) fails with `DatabaseError::NotInitialized`.
//!
//! The handle itself is a `Mutex<Option<Arc<Database>>>`; the lock is held
//! only long enough to clone the `Arc`, so operations run under the
//! database's own locking.

mod handler;
mod request;
mod response;

use std::sync::{Arc, Mutex};

use crate::database::{Database, DatabaseConfig, DatabaseError, DatabaseResult};
use crate::query::{parse_query, parse_updates};

pub use handler::RequestHandler;
pub use request::{fields_from_json, Request};
pub use response::Response;

static DB_INSTANCE: Mutex<Option<Arc<Database>>> = Mutex::new(None);

/// Opens the database at `path` with default settings, replacing any open one
pub fn init_database(path: &str) -> DatabaseResult<()> {
    init_database_with_config(DatabaseConfig::new(path))
}

/// Opens the database described by `config`, replacing any open one
pub fn init_database_with_config(config: DatabaseConfig) -> DatabaseResult<()> {
    let db = Database::open(config)?;
    let mut instance = DB_INSTANCE.lock().map_err(|_| DatabaseError::LockPoisoned)?;
    *instance = Some(Arc::new(db));
    Ok(())
}

/// Drops the process handle. Returns whether a database was open.
pub fn close_database() -> DatabaseResult<bool> {
    let mut instance = DB_INSTANCE.lock().map_err(|_| DatabaseError::LockPoisoned)?;
    Ok(instance.take().is_some())
}

fn get_db() -> DatabaseResult<Arc<Database>> {
    let instance = DB_INSTANCE.lock().map_err(|_| DatabaseError::LockPoisoned)?;
    instance.as_ref().cloned().ok_or(DatabaseError::NotInitialized)
}

/// Creates a document from a JSON object and returns its id
pub fn create_document(collection: &str, json_data: &str) -> DatabaseResult<String> {
    let db = get_db()?;
    let json: serde_json::Value = serde_json::from_str(json_data)
        .map_err(|e| DatabaseError::InvalidDocument(format!("Invalid JSON: {}", e)))?;
    db.create(collection, fields_from_json(&json)?)
}

/// Returns the matching documents as a JSON array
pub fn find_documents(collection: &str, query_json: &str) -> DatabaseResult<String> {
    let db = get_db()?;
    let query = parse_query(query_json)?;
    let documents = db.find(collection, &query)?;
    Ok(handler::to_json(&documents)?.to_string())
}

/// Returns one document as a JSON object
pub fn find_document_by_id(id: &str) -> DatabaseResult<String> {
    let db = get_db()?;
    let document = db.find_by_id(id)?;
    Ok(handler::to_json(&document)?.to_string())
}

/// Applies the updates object to every match; returns the number updated
pub fn update_documents(
    collection: &str,
    query_json: &str,
    updates_json: &str,
) -> DatabaseResult<usize> {
    let db = get_db()?;
    let query = parse_query(query_json)?;
    let updates = parse_updates(updates_json)?;
    db.update(collection, &query, &updates)
}

pub fn update_document_by_id(id: &str, updates_json: &str) -> DatabaseResult<()> {
    let db = get_db()?;
    let updates = parse_updates(updates_json)?;
    db.update_by_id(id, &updates)
}

/// Soft-deletes every match; returns the number deleted
pub fn delete_documents(collection: &str, query_json: &str) -> DatabaseResult<usize> {
    let db = get_db()?;
    let query = parse_query(query_json)?;
    db.kill(collection, &query)
}

pub fn delete_document_by_id(id: &str) -> DatabaseResult<()> {
    get_db()?.kill_by_id(id)
}

pub fn count_documents(collection: &str) -> DatabaseResult<usize> {
    get_db()?.count(collection)
}

pub fn get_collections() -> DatabaseResult<Vec<String>> {
    get_db()?.collections()
}

/// Returns database statistics as a JSON object
pub fn get_stats() -> DatabaseResult<String> {
    let stats = get_db()?.stats()?;
    Ok(handler::to_json(&stats)?.to_string())
}

/// Executes one JSON request line against the open database
pub fn execute(request_json: &str) -> Response {
    match get_db() {
        Ok(db) => RequestHandler::new(&db).handle_line(request_json),
        Err(e) => Response::from_error(&e),
    }
}
