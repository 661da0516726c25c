//! Query parse errors
//!
//! Evaluation never fails; only turning caller JSON into a query can.

use thiserror::Error;

/// Result type for query parsing
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while parsing query or update JSON
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid query JSON: {0}")]
    InvalidJson(String),

    #[error("Query must be a JSON object")]
    NotAnObject,

    #[error("Updates must be a JSON object of field/value pairs")]
    UpdatesNotAnObject,

    #[error("Missing {key} in condition {index}")]
    MissingConditionKey { index: usize, key: &'static str },

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown logical operator: {0}")]
    UnknownLogicalOperator(String),

    #[error("Invalid {key}: expected {expected}")]
    InvalidParameter {
        key: &'static str,
        expected: &'static str,
    },
}

impl QueryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        "EMBER_INVALID_QUERY"
    }
}
