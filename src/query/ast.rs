//! Query structures
//!
//! A query is an ordered list of conditions folded strictly left to right,
//! plus optional sort, skip and limit. There is no operator precedence:
//! `a OR b AND c` evaluates as `(a OR b) AND c`.

use std::fmt;

use crate::document::Document;
use crate::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
}

impl CompareOp {
    /// Returns the canonical operator spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Equals => "==",
            CompareOp::NotEquals => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterThanOrEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessThanOrEqual => "<=",
            CompareOp::Contains => "contains",
            CompareOp::StartsWith => "starts_with",
            CompareOp::EndsWith => "ends_with",
            CompareOp::In => "in",
            CompareOp::NotIn => "not_in",
        }
    }

    /// Returns true for operators only defined between two numbers
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CompareOp::GreaterThan
                | CompareOp::GreaterThanOrEqual
                | CompareOp::LessThan
                | CompareOp::LessThanOrEqual
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical combinator joining a condition to everything before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }

    /// Folds `next` into the running result
    pub fn apply(&self, acc: bool, next: bool) -> bool {
        match self {
            LogicalOp::And => acc && next,
            LogicalOp::Or => acc || next,
        }
    }
}

/// A single condition: field, operator, operand, and its combinator.
///
/// The combinator of the first condition in a query is ignored. A later
/// condition without one joins with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub combinator: Option<LogicalOp>,
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Condition {
    /// Creates a condition with no combinator
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            combinator: None,
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Sets the combinator
    pub fn joined_by(mut self, combinator: LogicalOp) -> Self {
        self.combinator = Some(combinator);
        self
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A complete query over one collection's documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Conditions in evaluation order
    pub conditions: Vec<Condition>,
    /// Optional sort
    pub sort: Option<SortSpec>,
    /// Maximum number of results, applied after skip
    pub limit: Option<usize>,
    /// Number of leading results to drop, applied before limit
    pub skip: Option<usize>,
}

impl QuerySpec {
    /// Creates a match-all query
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a condition with an explicit combinator
    pub fn add_condition(
        &mut self,
        field: impl Into<String>,
        op: CompareOp,
        value: impl Into<Value>,
        combinator: Option<LogicalOp>,
    ) {
        self.conditions.push(Condition {
            combinator,
            field: field.into(),
            op,
            value: value.into(),
        });
    }

    /// Adds a condition, joined with AND unless it is the first
    pub fn filter(self, field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        self.and(field, op, value)
    }

    /// Adds a condition joined with AND
    pub fn and(mut self, field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        let combinator = self.next_combinator(LogicalOp::And);
        self.add_condition(field, op, value, combinator);
        self
    }

    /// Adds a condition joined with OR
    pub fn or(mut self, field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        let combinator = self.next_combinator(LogicalOp::Or);
        self.add_condition(field, op, value, combinator);
        self
    }

    fn next_combinator(&self, op: LogicalOp) -> Option<LogicalOp> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(op)
        }
    }

    /// Sets the sort specification
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the skip count
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Returns true if the query keeps every document unchanged
    pub fn is_match_all(&self) -> bool {
        self.conditions.is_empty() && self.sort.is_none() && self.limit.is_none() && self.skip.is_none()
    }
}

/// A single field assignment applied by updates
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOperation {
    pub field: String,
    pub value: Value,
}

impl UpdateOperation {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Sets the field on `document`, refreshing its `updated_at`
    pub fn apply(&self, document: &mut Document) {
        document.set(self.field.clone(), self.value.clone());
    }
}
