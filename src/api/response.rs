//! Response envelope
//!
//! Success: `{"status":"ok","data":...}`
//! Error:   `{"status":"error","code":"...","message":"..."}`

use serde_json::{json, Value as JsonValue};

use crate::database::DatabaseError;

/// One response line
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success { data: JsonValue },
    Error { code: String, message: String },
}

impl Response {
    pub fn success(data: JsonValue) -> Self {
        Response::Success { data }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Error response carrying the error's stable code
    pub fn from_error(err: &DatabaseError) -> Self {
        Self::error(err.code(), err.to_string())
    }

    pub fn from_result(result: Result<JsonValue, DatabaseError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn to_value(&self) -> JsonValue {
        match self {
            Response::Success { data } => json!({"status": "ok", "data": data}),
            Response::Error { code, message } => {
                json!({"status": "error", "code": code, "message": message})
            }
        }
    }

    /// Single-line JSON
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}
