//! Field projection

use std::collections::BTreeSet;

use crate::schema::{Field, Record};

use super::errors::{ExecutorError, ExecutorResult};

/// Restricts records to a field subset
pub struct Projector;

impl Projector {
    /// Builds a new record holding only `fields`, in canonical order.
    pub fn project(record: &Record, fields: &BTreeSet<Field>, position: usize) -> ExecutorResult<Record> {
        let mut projected = Record::new();
        for &field in fields {
            let value = record
                .get(field)
                .ok_or_else(|| ExecutorError::missing_field(position, field))?;
            projected.insert(field, value.clone());
        }
        Ok(projected)
    }

    /// Projects every record, preserving row order.
    pub fn project_all(records: &[&Record], fields: &BTreeSet<Field>) -> ExecutorResult<Vec<Record>> {
        records
            .iter()
            .enumerate()
            .map(|(position, record)| Self::project(record, fields, position))
            .collect()
    }
}
