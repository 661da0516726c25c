//! Result sorting
//!
//! The field comparison is not a total order: values of unrelated types
//! compare equal to everything. The standard library sorts may panic on
//! such comparators, so this uses a stable merge sort that only relies on
//! "take from the left unless the right is strictly smaller".

use std::cmp::Ordering;

use super::ast::{SortDirection, SortSpec};
use crate::document::Document;
use crate::value::Value;

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Stable sort by one field.
    ///
    /// Documents that compare equal keep their input order.
    pub fn sort(documents: &mut Vec<Document>, sort_spec: &SortSpec) {
        let compare = |a: &Document, b: &Document| {
            let ordering = Self::compare_values(a.get(&sort_spec.field), b.get(&sort_spec.field));
            match sort_spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        };

        let input = std::mem::take(documents);
        *documents = merge_sort(input, &compare);
    }

    /// Compares two field values for sorting.
    ///
    /// Ordering rules:
    /// - null or absent sorts after any present value
    /// - numbers numerically, strings by code point, false before true
    /// - any other pairing is Equal
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let a = a.filter(|v| !v.is_null());
        let b = b.filter(|v| !v.is_null());

        match (a, b) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(Value::Number(x)), Some(Value::Number(y))) => {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            }
            (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
            (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

fn merge_sort<F>(mut items: Vec<Document>, compare: &F) -> Vec<Document>
where
    F: Fn(&Document, &Document) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}
