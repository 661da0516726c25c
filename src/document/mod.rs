//! Document entity
//!
//! A document is identity + field map + timestamps + soft-delete flag.
//! The serde shape here is the on-disk JSON payload of a log frame:
//!
//! ```text
//! { "id", "collection", "data", "createdAt", "updatedAt", "deleted" }
//! ```
//!
//! Mutations never edit a stored document in place. Callers build a new
//! value and append it as a new frame.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Field map of a document
pub type Fields = BTreeMap<String, Value>;

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Globally unique identifier, never reassigned
    pub id: String,
    /// Owning collection, fixed for the document's lifetime
    pub collection: String,
    /// Field data
    pub data: Fields,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every write, including soft-delete
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    #[serde(default)]
    pub deleted: bool,
}

impl Document {
    /// Creates a live document stamped with the current time
    pub fn new(id: impl Into<String>, collection: impl Into<String>, data: Fields) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            collection: collection.into(),
            data,
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }

    /// Returns the value of a field, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Sets a field and refreshes `updated_at`
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
        self.updated_at = Utc::now();
    }

    /// Returns a tombstone copy of this document
    pub fn tombstone(&self) -> Self {
        Self {
            deleted: true,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}
