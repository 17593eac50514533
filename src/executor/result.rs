//! Result types for query execution

use crate::schema::Record;

/// Result of query execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Projected records in result order
    pub records: Vec<Record>,
    /// Number of records scanned
    pub scanned_count: usize,
    /// Number of records returned
    pub returned_count: usize,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            scanned_count: 0,
            returned_count: 0,
        }
    }

    /// Returns true if no records matched
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns an iterator over the records
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Consumes the result, returning the records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
