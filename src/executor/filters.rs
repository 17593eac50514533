//! Filter evaluation
//!
//! Matches records against a `FilterExpr` by structural recursion.
//! No type coercion: a value of the wrong kind is a schema violation, not
//! a non-match.

use crate::parser::{Condition, FilterExpr, Predicate};
use crate::schema::{Record, Value};

use super::errors::{ExecutorError, ExecutorResult};

/// Evaluates filter expressions against records
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Returns the records matching `expr`, in input order.
    ///
    /// Single pass over positions, so each record appears at most once
    /// regardless of how many OR branches it satisfies.
    pub fn select<'r>(expr: &FilterExpr, records: &'r [Record]) -> ExecutorResult<Vec<&'r Record>> {
        if expr.is_all() {
            return Ok(records.iter().collect());
        }

        let mut positions = Vec::new();
        for (position, record) in records.iter().enumerate() {
            if Self::matches(expr, record, position)? {
                positions.push(position);
            }
        }

        Ok(positions.into_iter().map(|p| &records[p]).collect())
    }

    /// Checks if the record at `position` satisfies `expr`
    pub fn matches(expr: &FilterExpr, record: &Record, position: usize) -> ExecutorResult<bool> {
        match expr {
            FilterExpr::All => Ok(true),
            FilterExpr::Atom(predicate) => Self::matches_predicate(predicate, record, position),
            FilterExpr::And(a, b) => {
                Ok(Self::matches(a, record, position)? && Self::matches(b, record, position)?)
            }
            FilterExpr::Or(a, b) => {
                Ok(Self::matches(a, record, position)? || Self::matches(b, record, position)?)
            }
        }
    }

    fn matches_predicate(
        predicate: &Predicate,
        record: &Record,
        position: usize,
    ) -> ExecutorResult<bool> {
        let value = record
            .get(predicate.field)
            .ok_or_else(|| ExecutorError::missing_field(position, predicate.field))?;

        match (&predicate.condition, value) {
            (Condition::Numeric(op, bound), Value::Number(actual)) => Ok(op.apply(*actual, *bound)),
            (Condition::Text(op, literal), Value::Text(actual)) => Ok(op.apply(actual, literal)),
            (_, value) => Err(ExecutorError::kind_mismatch(
                position,
                predicate.field,
                value.kind(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{NumericOp, TextOp};
    use crate::schema::Field;

    fn row(dept: &str, avg: f64) -> Record {
        Record::new()
            .with(Field::Department, dept)
            .with(Field::Average, avg)
    }

    fn atom_text(field: Field, op: TextOp, v: &str) -> FilterExpr {
        FilterExpr::Atom(Predicate::text(field, op, v))
    }

    fn atom_num(field: Field, op: NumericOp, v: f64) -> FilterExpr {
        FilterExpr::Atom(Predicate::numeric(field, op, v))
    }

    #[test]
    fn test_all_returns_everything_in_order() {
        let records = vec![row("a", 1.0), row("b", 2.0), row("c", 3.0)];
        let selected = FilterEvaluator::select(&FilterExpr::All, &records).unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[2], &records[2]);
    }

    #[test]
    fn test_or_is_deduplicated_union_in_order() {
        let records = vec![row("cpsc", 50.0), row("math", 60.0), row("cpsc", 70.0)];
        let expr = atom_text(Field::Department, TextOp::Is, "cpsc")
            .or(atom_num(Field::Average, NumericOp::Gt, 40.0));

        let selected = FilterEvaluator::select(&expr, &records).unwrap();
        assert_eq!(selected, vec![&records[0], &records[1], &records[2]]);
    }

    #[test]
    fn test_and_requires_both() {
        let records = vec![row("cpsc", 50.0), row("math", 95.0), row("cpsc", 95.0)];
        let expr = atom_text(Field::Department, TextOp::Is, "cpsc")
            .and(atom_num(Field::Average, NumericOp::Eq, 95.0));

        let selected = FilterEvaluator::select(&expr, &records).unwrap();
        assert_eq!(selected, vec![&records[2]]);
    }

    #[test]
    fn test_and_short_circuits_before_missing_field() {
        let records = vec![Record::new().with(Field::Department, "math")];
        let expr = atom_text(Field::Department, TextOp::Is, "cpsc")
            .and(atom_text(Field::Title, TextOp::Is, "x"));

        let selected = FilterEvaluator::select(&expr, &records).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_kind_mismatch_is_fatal() {
        let records = vec![Record::new().with(Field::Average, "high")];
        let expr = atom_num(Field::Average, NumericOp::Gt, 1.0);

        let err = FilterEvaluator::select(&expr, &records).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let records = vec![row("cpsc", 1.0)];
        let expr = atom_text(Field::Title, TextOp::Includes, "x");
        assert!(FilterEvaluator::select(&expr, &records).unwrap_err().is_fatal());
    }
}
