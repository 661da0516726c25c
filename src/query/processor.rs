//! Query processor for emberdb
//!
//! Execution flow (strict order):
//! 1. Filter documents against the condition chain
//! 2. Apply sort (if specified), stable
//! 3. Apply skip (if specified)
//! 4. Apply limit (if specified)
//!
//! The processor holds no state and never fails.

use crate::document::Document;

use super::ast::QuerySpec;
use super::filters::PredicateFilter;
use super::sorter::ResultSorter;

/// Runs queries over in-memory candidate sets
pub struct QueryProcessor;

impl QueryProcessor {
    /// Filters, sorts and pages `documents`.
    ///
    /// Documents that tie on the sort key keep their input order.
    pub fn filter(documents: Vec<Document>, query: &QuerySpec) -> Vec<Document> {
        let mut results: Vec<Document> = documents
            .into_iter()
            .filter(|doc| PredicateFilter::matches(doc, &query.conditions))
            .collect();

        if let Some(sort) = &query.sort {
            ResultSorter::sort(&mut results, sort);
        }

        if let Some(skip) = query.skip {
            results.drain(..skip.min(results.len()));
        }

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        results
    }
}
