//! Query executor for courseql
//!
//! Runs one parsed query over an in-memory record sequence.
//!
//! Execution flow (strict order):
//! 1. Filter records by the query's expression
//! 2. Apply sort (if specified)
//! 3. Project onto the display fields
//! 4. Return ordered results
//!
//! Input records are never mutated.

use crate::parser::Query;
use crate::schema::Record;

use super::errors::ExecutorResult;
use super::filters::FilterEvaluator;
use super::projector::Projector;
use super::result::ExecutionResult;
use super::sorter::ResultSorter;

/// Query executor over a loaded dataset
pub struct QueryExecutor<'a> {
    records: &'a [Record],
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new executor
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }

    /// Executes a query and returns results.
    ///
    /// Deterministic: same query + same records = same results.
    pub fn execute(&self, query: &Query) -> ExecutorResult<ExecutionResult> {
        let mut selected = FilterEvaluator::select(query.filter(), self.records)?;

        if let Some(spec) = query.sort() {
            ResultSorter::sort(&mut selected, spec)?;
        }

        let records = Projector::project_all(&selected, query.display())?;
        let returned_count = records.len();

        Ok(ExecutionResult {
            records,
            scanned_count: self.records.len(),
            returned_count,
        })
    }
}
