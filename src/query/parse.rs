//! JSON query and update parsing
//!
//! Query shape:
//!
//! ```json
//! {
//!   "conditions": [
//!     {"field": "age", "operator": ">", "value": 25},
//!     {"field": "status", "operator": "==", "value": "active", "logical": "or"}
//!   ],
//!   "order_by": "age", "order_desc": false, "limit": 10, "skip": 0
//! }
//! ```

use serde_json::{Map, Value as JsonValue};

use super::ast::{CompareOp, LogicalOp, QuerySpec, SortSpec, UpdateOperation};
use super::errors::{QueryError, QueryResult};
use crate::value::Value;

/// Parses a query from JSON text.
///
/// An empty (or all-whitespace) string and `{}` both mean match-all.
pub fn parse_query(text: &str) -> QueryResult<QuerySpec> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(QuerySpec::new());
    }

    let json: JsonValue =
        serde_json::from_str(trimmed).map_err(|e| QueryError::InvalidJson(e.to_string()))?;
    parse_query_value(&json)
}

/// Parses a query from an already decoded JSON value. `null` means match-all.
pub fn parse_query_value(json: &JsonValue) -> QueryResult<QuerySpec> {
    let obj = match json {
        JsonValue::Null => return Ok(QuerySpec::new()),
        JsonValue::Object(obj) => obj,
        _ => return Err(QueryError::NotAnObject),
    };

    let mut query = QuerySpec::new();

    match obj.get("conditions") {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::Array(conditions)) => {
            for (index, cond) in conditions.iter().enumerate() {
                parse_condition(&mut query, index, cond)?;
            }
        }
        Some(_) => {
            return Err(QueryError::InvalidParameter {
                key: "conditions",
                expected: "array",
            })
        }
    }

    if let Some(field) = optional_str(obj, "order_by")? {
        let desc = match obj.get("order_desc") {
            None | Some(JsonValue::Null) => false,
            Some(JsonValue::Bool(b)) => *b,
            Some(_) => {
                return Err(QueryError::InvalidParameter {
                    key: "order_desc",
                    expected: "boolean",
                })
            }
        };
        query.sort = Some(if desc {
            SortSpec::desc(field)
        } else {
            SortSpec::asc(field)
        });
    }

    query.limit = optional_count(obj, "limit")?;
    query.skip = optional_count(obj, "skip")?;

    Ok(query)
}

fn parse_condition(query: &mut QuerySpec, index: usize, cond: &JsonValue) -> QueryResult<()> {
    let obj = cond.as_object().ok_or(QueryError::InvalidParameter {
        key: "condition",
        expected: "object",
    })?;

    let field = obj
        .get("field")
        .and_then(|v| v.as_str())
        .ok_or(QueryError::MissingConditionKey { index, key: "field" })?;

    let op = obj
        .get("operator")
        .and_then(|v| v.as_str())
        .ok_or(QueryError::MissingConditionKey {
            index,
            key: "operator",
        })
        .and_then(parse_operator)?;

    let value = obj
        .get("value")
        .ok_or(QueryError::MissingConditionKey { index, key: "value" })?;

    let combinator = if index == 0 {
        None
    } else {
        let spelled = obj.get("logical").and_then(|v| v.as_str()).unwrap_or("and");
        Some(parse_logical_operator(spelled)?)
    };

    query.add_condition(field, op, Value::from(value.clone()), combinator);
    Ok(())
}

/// Parses updates JSON: an object of field/value pairs
pub fn parse_updates(text: &str) -> QueryResult<Vec<UpdateOperation>> {
    let json: JsonValue =
        serde_json::from_str(text).map_err(|e| QueryError::InvalidJson(e.to_string()))?;
    parse_updates_value(&json)
}

/// Parses updates from a decoded JSON value
pub fn parse_updates_value(json: &JsonValue) -> QueryResult<Vec<UpdateOperation>> {
    let obj = json.as_object().ok_or(QueryError::UpdatesNotAnObject)?;
    Ok(obj
        .iter()
        .map(|(field, value)| UpdateOperation::new(field.as_str(), Value::from(value.clone())))
        .collect())
}

/// Parses a comparison operator in symbolic or word form
pub fn parse_operator(op: &str) -> QueryResult<CompareOp> {
    match op {
        "==" | "equals" => Ok(CompareOp::Equals),
        "!=" | "not_equals" => Ok(CompareOp::NotEquals),
        ">" | "greater_than" => Ok(CompareOp::GreaterThan),
        ">=" | "greater_than_or_equal" => Ok(CompareOp::GreaterThanOrEqual),
        "<" | "less_than" => Ok(CompareOp::LessThan),
        "<=" | "less_than_or_equal" => Ok(CompareOp::LessThanOrEqual),
        "contains" => Ok(CompareOp::Contains),
        "starts_with" => Ok(CompareOp::StartsWith),
        "ends_with" => Ok(CompareOp::EndsWith),
        "in" => Ok(CompareOp::In),
        "not_in" => Ok(CompareOp::NotIn),
        other => Err(QueryError::UnknownOperator(other.to_string())),
    }
}

/// Parses a logical combinator, case-insensitive
pub fn parse_logical_operator(op: &str) -> QueryResult<LogicalOp> {
    match op.to_lowercase().as_str() {
        "and" | "&&" => Ok(LogicalOp::And),
        "or" | "||" => Ok(LogicalOp::Or),
        _ => Err(QueryError::UnknownLogicalOperator(op.to_string())),
    }
}

fn optional_str<'a>(
    obj: &'a Map<String, JsonValue>,
    key: &'static str,
) -> QueryResult<Option<&'a str>> {
    match obj.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(QueryError::InvalidParameter {
            key,
            expected: "string",
        }),
    }
}

fn optional_count(obj: &Map<String, JsonValue>, key: &'static str) -> QueryResult<Option<usize>> {
    match obj.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or(QueryError::InvalidParameter {
                key,
                expected: "non-negative integer",
            }),
    }
}
