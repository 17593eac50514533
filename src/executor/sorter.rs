//! Result sorting for query execution
//!
//! Single key, ascending, stable.

use std::cmp::Ordering;

use crate::parser::SortSpec;
use crate::schema::{Record, Value};

use super::errors::{ExecutorError, ExecutorResult};

/// Sorts selected records
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts records ascending by the sort field.
    ///
    /// Every record must carry the field with its declared kind. Ties keep
    /// their input order.
    pub fn sort(records: &mut [&Record], spec: &SortSpec) -> ExecutorResult<()> {
        for (position, record) in records.iter().enumerate() {
            match record.get(spec.field) {
                None => return Err(ExecutorError::missing_field(position, spec.field)),
                Some(value) if value.kind() != spec.field.kind() => {
                    return Err(ExecutorError::kind_mismatch(position, spec.field, value.kind()))
                }
                Some(_) => {}
            }
        }

        records.sort_by(|a, b| Self::compare_values(a.get(spec.field), b.get(spec.field)));
        Ok(())
    }

    /// Numbers compare as doubles, text lexicographically.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (Some(Value::Number(x)), Some(Value::Number(y))) => {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            }
            (Some(Value::Text(x)), Some(Value::Text(y))) => x.as_str().cmp(y.as_str()),
            _ => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn row(title: &str, avg: f64) -> Record {
        Record::new()
            .with(Field::Title, title)
            .with(Field::Average, avg)
    }

    #[test]
    fn test_numeric_ascending() {
        let records = vec![row("a", 92.0), row("b", 85.0), row("c", 97.0)];
        let mut refs: Vec<&Record> = records.iter().collect();
        ResultSorter::sort(&mut refs, &SortSpec::asc(Field::Average)).unwrap();
        assert_eq!(refs, vec![&records[1], &records[0], &records[2]]);
    }

    #[test]
    fn test_text_lexicographic() {
        let records = vec![row("b", 1.0), row("B", 1.0), row("a", 1.0)];
        let mut refs: Vec<&Record> = records.iter().collect();
        ResultSorter::sort(&mut refs, &SortSpec::asc(Field::Title)).unwrap();
        assert_eq!(refs, vec![&records[1], &records[2], &records[0]]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![row("x", 70.0), row("y", 60.0), row("z", 70.0), row("w", 60.0)];
        let mut refs: Vec<&Record> = records.iter().collect();
        ResultSorter::sort(&mut refs, &SortSpec::asc(Field::Average)).unwrap();

        let titles: Vec<_> = refs
            .iter()
            .map(|r| r.get(Field::Title).and_then(Value::as_str).unwrap_or(""))
            .collect();
        assert_eq!(titles, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let records = vec![Record::new().with(Field::Average, "ninety")];
        let mut refs: Vec<&Record> = records.iter().collect();
        let err = ResultSorter::sort(&mut refs, &SortSpec::asc(Field::Average)).unwrap_err();
        assert!(err.is_fatal());
    }
}
