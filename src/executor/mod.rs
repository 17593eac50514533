//! Query executor subsystem for courseql
//!
//! Consumes a parsed `Query` and a loaded record sequence, producing
//! deterministic results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter: order-preserving, each record at most once
//! 2. Sort: stable, ascending, single key (if specified)
//! 3. Project: display fields only, canonical order
//!
//! A record that disagrees with the field table aborts execution with a
//! FATAL schema violation.

mod errors;
mod executor;
mod filters;
mod projector;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::QueryExecutor;
pub use filters::FilterEvaluator;
pub use projector::Projector;
pub use result::ExecutionResult;
pub use sorter::ResultSorter;
