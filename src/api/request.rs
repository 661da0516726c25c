//! Request types
//!
//! One JSON object per request, selected by `op`:
//!
//! - `{"op":"create","collection":"users","data":{...}}`
//! - `{"op":"find","collection":"users","query":{...}}`
//! - `{"op":"find_by_id","id":"..."}`
//! - `{"op":"update","collection":"users","query":{...},"updates":{...}}`
//! - `{"op":"update_by_id","id":"...","updates":{...}}`
//! - `{"op":"delete","collection":"users","query":{...}}`
//! - `{"op":"delete_by_id","id":"..."}`
//! - `{"op":"count","collection":"users"}`
//! - `{"op":"collections"}`, `{"op":"stats"}`
//!
//! A missing `query` means match-all.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::database::{DatabaseError, DatabaseResult};
use crate::document::Fields;
use crate::query::{parse_query_value, parse_updates_value, QuerySpec, UpdateOperation};
use crate::value::Value;

/// A parsed request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Create { collection: String, data: Fields },
    Find { collection: String, query: QuerySpec },
    FindById { id: String },
    Update {
        collection: String,
        query: QuerySpec,
        updates: Vec<UpdateOperation>,
    },
    UpdateById {
        id: String,
        updates: Vec<UpdateOperation>,
    },
    Delete { collection: String, query: QuerySpec },
    DeleteById { id: String },
    Count { collection: String },
    Collections,
    Stats,
}

/// Raw request for parsing
#[derive(Debug, Deserialize)]
struct RawRequest {
    op: String,
    #[serde(default)]
    collection: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    query: Option<JsonValue>,
    #[serde(default)]
    updates: Option<JsonValue>,
}

impl RawRequest {
    fn collection(&mut self) -> DatabaseResult<String> {
        self.collection
            .take()
            .ok_or_else(|| missing("collection"))
    }

    fn id(&mut self) -> DatabaseResult<String> {
        self.id.take().ok_or_else(|| missing("id"))
    }

    fn query(&self) -> DatabaseResult<QuerySpec> {
        match &self.query {
            Some(json) => Ok(parse_query_value(json)?),
            None => Ok(QuerySpec::new()),
        }
    }

    fn updates(&self) -> DatabaseResult<Vec<UpdateOperation>> {
        let json = self.updates.as_ref().ok_or_else(|| missing("updates"))?;
        Ok(parse_updates_value(json)?)
    }
}

impl Request {
    /// Parse a request from a JSON string
    pub fn parse(json: &str) -> DatabaseResult<Self> {
        let raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| DatabaseError::InvalidRequest(format!("Invalid JSON: {}", e)))?;
        Self::from_raw(raw)
    }

    /// Parse a request from a decoded JSON value
    pub fn from_value(json: JsonValue) -> DatabaseResult<Self> {
        let raw: RawRequest = serde_json::from_value(json)
            .map_err(|e| DatabaseError::InvalidRequest(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(mut raw: RawRequest) -> DatabaseResult<Self> {
        match raw.op.as_str() {
            "create" => {
                let collection = raw.collection()?;
                let data = raw.data.as_ref().ok_or_else(|| missing("data"))?;
                Ok(Request::Create {
                    collection,
                    data: fields_from_json(data)?,
                })
            }
            "find" => Ok(Request::Find {
                collection: raw.collection()?,
                query: raw.query()?,
            }),
            "find_by_id" => Ok(Request::FindById { id: raw.id()? }),
            "update" => Ok(Request::Update {
                collection: raw.collection()?,
                query: raw.query()?,
                updates: raw.updates()?,
            }),
            "update_by_id" => Ok(Request::UpdateById {
                id: raw.id()?,
                updates: raw.updates()?,
            }),
            "delete" => Ok(Request::Delete {
                collection: raw.collection()?,
                query: raw.query()?,
            }),
            "delete_by_id" => Ok(Request::DeleteById { id: raw.id()? }),
            "count" => Ok(Request::Count {
                collection: raw.collection()?,
            }),
            "collections" => Ok(Request::Collections),
            "stats" => Ok(Request::Stats),
            other => Err(DatabaseError::InvalidRequest(format!(
                "Unknown operation: {}",
                other
            ))),
        }
    }

    /// Operation name, as spelled in `op`
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::Create { .. } => "create",
            Request::Find { .. } => "find",
            Request::FindById { .. } => "find_by_id",
            Request::Update { .. } => "update",
            Request::UpdateById { .. } => "update_by_id",
            Request::Delete { .. } => "delete",
            Request::DeleteById { .. } => "delete_by_id",
            Request::Count { .. } => "count",
            Request::Collections => "collections",
            Request::Stats => "stats",
        }
    }
}

/// Converts a JSON object into document fields
pub fn fields_from_json(json: &JsonValue) -> DatabaseResult<Fields> {
    match Value::from(json.clone()) {
        Value::Object(fields) => Ok(fields),
        other => Err(DatabaseError::InvalidDocument(format!(
            "document data must be a JSON object, got {}",
            other.type_name()
        ))),
    }
}

fn missing(key: &str) -> DatabaseError {
    DatabaseError::InvalidRequest(format!("Missing {}", key))
}
