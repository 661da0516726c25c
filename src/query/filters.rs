//! Predicate filtering
//!
//! Filtering is total: every operator/type pairing yields a boolean and
//! nothing here can fail. Pairings an operator is not defined for are false.

use super::ast::{CompareOp, Condition, LogicalOp};
use crate::document::Document;
use crate::value::Value;

/// Evaluates conditions against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks whether a document satisfies a condition chain.
    ///
    /// An empty chain matches everything. Otherwise each condition's result
    /// is folded into the running result with that condition's combinator,
    /// strictly left to right.
    pub fn matches(document: &Document, conditions: &[Condition]) -> bool {
        let mut iter = conditions.iter();
        let first = match iter.next() {
            Some(c) => c,
            None => return true,
        };

        let mut result = Self::evaluate(document, first);
        for condition in iter {
            let next = Self::evaluate(document, condition);
            let combinator = condition.combinator.unwrap_or(LogicalOp::And);
            result = combinator.apply(result, next);
        }
        result
    }

    /// Evaluates one condition. A missing field is false for every operator.
    pub fn evaluate(document: &Document, condition: &Condition) -> bool {
        match document.get(&condition.field) {
            Some(actual) => Self::compare(actual, &condition.value, condition.op),
            None => false,
        }
    }

    /// Compares a field value against an operand
    pub fn compare(actual: &Value, operand: &Value, op: CompareOp) -> bool {
        match op {
            CompareOp::Equals => actual == operand,
            CompareOp::NotEquals => actual != operand,
            CompareOp::GreaterThan => Self::numeric(actual, operand, |a, b| a > b),
            CompareOp::GreaterThanOrEqual => Self::numeric(actual, operand, |a, b| a >= b),
            CompareOp::LessThan => Self::numeric(actual, operand, |a, b| a < b),
            CompareOp::LessThanOrEqual => Self::numeric(actual, operand, |a, b| a <= b),
            CompareOp::Contains => Self::textual(actual, operand, |s, p| s.contains(p)),
            CompareOp::StartsWith => Self::textual(actual, operand, |s, p| s.starts_with(p)),
            CompareOp::EndsWith => Self::textual(actual, operand, |s, p| s.ends_with(p)),
            CompareOp::In => Self::membership(actual, operand).unwrap_or(false),
            // A non-array operand is a type mismatch, not a non-member
            CompareOp::NotIn => Self::membership(actual, operand)
                .map(|found| !found)
                .unwrap_or(false),
        }
    }

    /// Ordering comparison, numbers only
    fn numeric(actual: &Value, operand: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
        match (actual, operand) {
            (Value::Number(a), Value::Number(b)) => cmp(*a, *b),
            _ => false,
        }
    }

    /// Substring comparison, strings only
    fn textual(actual: &Value, operand: &Value, cmp: impl Fn(&str, &str) -> bool) -> bool {
        match (actual, operand) {
            (Value::String(s), Value::String(p)) => cmp(s, p),
            _ => false,
        }
    }

    /// `None` when the operand is not an array
    fn membership(actual: &Value, operand: &Value) -> Option<bool> {
        operand
            .as_array()
            .map(|items| items.iter().any(|item| item == actual))
    }
}
