//! Request handling
//!
//! Maps parsed requests onto database operations and their results onto
//! JSON. Shared by the process handle and the CLI request loop.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::database::{Database, DatabaseError, DatabaseResult};

use super::request::Request;
use super::response::Response;

/// Executes requests against one open database
pub struct RequestHandler<'a> {
    db: &'a Database,
}

impl<'a> RequestHandler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Executes a request and returns the `data` payload
    pub fn handle(&self, request: &Request) -> DatabaseResult<JsonValue> {
        match request {
            Request::Create { collection, data } => {
                let id = self.db.create(collection, data.clone())?;
                Ok(json!({ "id": id }))
            }
            Request::Find { collection, query } => to_json(&self.db.find(collection, query)?),
            Request::FindById { id } => to_json(&self.db.find_by_id(id)?),
            Request::Update {
                collection,
                query,
                updates,
            } => {
                let updated = self.db.update(collection, query, updates)?;
                Ok(json!({ "updated": updated }))
            }
            Request::UpdateById { id, updates } => {
                self.db.update_by_id(id, updates)?;
                Ok(json!({ "id": id }))
            }
            Request::Delete { collection, query } => {
                let deleted = self.db.kill(collection, query)?;
                Ok(json!({ "deleted": deleted }))
            }
            Request::DeleteById { id } => {
                self.db.kill_by_id(id)?;
                Ok(json!({ "id": id }))
            }
            Request::Count { collection } => {
                let count = self.db.count(collection)?;
                Ok(json!({ "count": count }))
            }
            Request::Collections => to_json(&self.db.collections()?),
            Request::Stats => to_json(&self.db.stats()?),
        }
    }

    /// Parses and executes one request line. Never fails; errors become
    /// error responses.
    pub fn handle_line(&self, line: &str) -> Response {
        let result = Request::parse(line).and_then(|request| self.handle(&request));
        Response::from_result(result)
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> DatabaseResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| DatabaseError::InvalidDocument(format!("Serialization failed: {}", e)))
}
