//! Query subsystem for emberdb
//!
//! Evaluates a `QuerySpec` against an in-memory candidate set: predicate
//! filtering with strict left-to-right logical folding, a stable single-field
//! sort, then skip and limit. Parsing turns caller JSON into a `QuerySpec`.

mod ast;
mod errors;
mod filters;
mod parse;
mod processor;
mod sorter;

pub use ast::{
    CompareOp, Condition, LogicalOp, QuerySpec, SortDirection, SortSpec, UpdateOperation,
};
pub use errors::{QueryError, QueryResult};
pub use filters::PredicateFilter;
pub use parse::{
    parse_logical_operator, parse_operator, parse_query, parse_query_value, parse_updates,
    parse_updates_value,
};
pub use processor::QueryProcessor;
pub use sorter::ResultSorter;
