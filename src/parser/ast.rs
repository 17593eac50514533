//! Query AST structures
//!
//! Defines the parsed query representation consumed by the executor.

use std::collections::BTreeSet;
use std::fmt;

use crate::schema::{Field, FieldKind};

use super::errors::{Clause, ParseError, ParseResult};

/// Comparison operators for numeric fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    /// `is equal to`
    Eq,
    /// `is not equal to`
    NotEq,
    /// `is greater than`
    Gt,
    /// `is not greater than`
    NotGt,
    /// `is less than`
    Lt,
    /// `is not less than`
    NotLt,
}

impl NumericOp {
    /// Returns the query phrase for this operator
    pub fn phrase(&self) -> &'static str {
        match self {
            NumericOp::Eq => "is equal to",
            NumericOp::NotEq => "is not equal to",
            NumericOp::Gt => "is greater than",
            NumericOp::NotGt => "is not greater than",
            NumericOp::Lt => "is less than",
            NumericOp::NotLt => "is not less than",
        }
    }

    /// Applies the comparison `actual <op> bound`
    pub fn apply(&self, actual: f64, bound: f64) -> bool {
        match self {
            NumericOp::Eq => actual == bound,
            NumericOp::NotEq => actual != bound,
            NumericOp::Gt => actual > bound,
            NumericOp::NotGt => actual <= bound,
            NumericOp::Lt => actual < bound,
            NumericOp::NotLt => actual >= bound,
        }
    }
}

/// Matching operators for textual fields. Case-sensitive, no wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Is,
    IsNot,
    Includes,
    NotIncludes,
    BeginsWith,
    NotBeginsWith,
    EndsWith,
    NotEndsWith,
}

impl TextOp {
    /// Returns the query phrase for this operator
    pub fn phrase(&self) -> &'static str {
        match self {
            TextOp::Is => "is",
            TextOp::IsNot => "is not",
            TextOp::Includes => "includes",
            TextOp::NotIncludes => "does not include",
            TextOp::BeginsWith => "begins with",
            TextOp::NotBeginsWith => "does not begin with",
            TextOp::EndsWith => "ends with",
            TextOp::NotEndsWith => "does not end with",
        }
    }

    /// Applies the match `actual <op> literal`
    pub fn apply(&self, actual: &str, literal: &str) -> bool {
        match self {
            TextOp::Is => actual == literal,
            TextOp::IsNot => actual != literal,
            TextOp::Includes => actual.contains(literal),
            TextOp::NotIncludes => !actual.contains(literal),
            TextOp::BeginsWith => actual.starts_with(literal),
            TextOp::NotBeginsWith => !actual.starts_with(literal),
            TextOp::EndsWith => actual.ends_with(literal),
            TextOp::NotEndsWith => !actual.ends_with(literal),
        }
    }
}

/// Operator plus literal. The variant fixes the field kind it applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Numeric(NumericOp, f64),
    Text(TextOp, String),
}

impl Condition {
    pub fn kind(&self) -> FieldKind {
        match self {
            Condition::Numeric(..) => FieldKind::Numeric,
            Condition::Text(..) => FieldKind::Textual,
        }
    }
}

/// A single predicate (field + condition)
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field name
    pub field: Field,
    /// Operator and literal
    pub condition: Condition,
}

impl Predicate {
    /// Create a numeric predicate
    pub fn numeric(field: Field, op: NumericOp, value: f64) -> Self {
        Self {
            field,
            condition: Condition::Numeric(op, value),
        }
    }

    /// Create a textual predicate
    pub fn text(field: Field, op: TextOp, value: impl Into<String>) -> Self {
        Self {
            field,
            condition: Condition::Text(op, value.into()),
        }
    }

    /// Returns true if the condition kind matches the field kind
    pub fn is_well_typed(&self) -> bool {
        self.condition.kind() == self.field.kind()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Condition::Numeric(op, value) => write!(f, "{} {} {}", self.field, op.phrase(), value),
            Condition::Text(op, value) => {
                write!(f, "{} {} \"{}\"", self.field, op.phrase(), value)
            }
        }
    }
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Matches every record
    All,
    Atom(Predicate),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

impl FilterExpr {
    pub fn and(self, other: FilterExpr) -> FilterExpr {
        FilterExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: FilterExpr) -> FilterExpr {
        FilterExpr::Or(Box::new(self), Box::new(other))
    }

    /// Folds an OR of AND-groups into an expression. No groups means `All`.
    pub fn from_groups(groups: Vec<Vec<Predicate>>) -> FilterExpr {
        groups
            .into_iter()
            .filter_map(|group| {
                group
                    .into_iter()
                    .map(FilterExpr::Atom)
                    .reduce(FilterExpr::and)
            })
            .reduce(FilterExpr::or)
            .unwrap_or(FilterExpr::All)
    }

    /// Disjunctive normal form: a list of AND-groups. `All` is a single
    /// empty group.
    pub fn to_groups(&self) -> Vec<Vec<&Predicate>> {
        match self {
            FilterExpr::All => vec![Vec::new()],
            FilterExpr::Atom(p) => vec![vec![p]],
            FilterExpr::Or(a, b) => {
                let mut groups = a.to_groups();
                groups.extend(b.to_groups());
                groups
            }
            FilterExpr::And(a, b) => {
                let left = a.to_groups();
                let right = b.to_groups();
                let mut groups = Vec::with_capacity(left.len() * right.len());
                for l in &left {
                    for r in &right {
                        let mut group = l.clone();
                        group.extend(r.iter().copied());
                        groups.push(group);
                    }
                }
                groups
            }
        }
    }

    /// Returns true if this expression matches every record
    pub fn is_all(&self) -> bool {
        matches!(self, FilterExpr::All)
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::All => write!(f, "all entries"),
            FilterExpr::Atom(p) => write!(f, "{}", p),
            FilterExpr::And(a, b) => write!(f, "{} and {}", a, b),
            FilterExpr::Or(a, b) => write!(f, "{} or {}", a, b),
        }
    }
}

/// Sort specification. Single key, ascending only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: Field,
}

impl SortSpec {
    pub fn asc(field: Field) -> Self {
        Self { field }
    }
}

/// Parsed query. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    dataset_id: String,
    filter: FilterExpr,
    display: BTreeSet<Field>,
    sort: Option<SortSpec>,
}

impl Query {
    /// Builds a query, checking that the display set is non-empty and that
    /// the sort field is displayed.
    pub fn new(
        dataset_id: impl Into<String>,
        filter: FilterExpr,
        display: impl IntoIterator<Item = Field>,
        sort: Option<SortSpec>,
    ) -> ParseResult<Self> {
        let display: BTreeSet<Field> = display.into_iter().collect();

        if display.is_empty() {
            return Err(ParseError::malformed(
                Clause::Display,
                "At least one display field is required",
            ));
        }

        if let Some(spec) = &sort {
            if !display.contains(&spec.field) {
                return Err(ParseError::malformed(
                    Clause::Order,
                    format!("Sort field '{}' is not a display field", spec.field),
                )
                .with_token(spec.field.name()));
            }
        }

        Ok(Self {
            dataset_id: dataset_id.into(),
            filter,
            display,
            sort,
        })
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn filter(&self) -> &FilterExpr {
        &self.filter
    }

    /// Display fields in canonical order
    pub fn display(&self) -> &BTreeSet<Field> {
        &self.display
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }
}
