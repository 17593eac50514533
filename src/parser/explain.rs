//! Explain output
//!
//! Deterministic description of how a query parsed, or why it was rejected.
//! Produced without touching any dataset.

use std::fmt;

use serde::Serialize;

use super::ast::Query;
use super::errors::ParseError;

/// Explain output for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainQuery {
    /// Whether parsing succeeded
    pub accepted: bool,
    /// Target dataset (if accepted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// OR-of-AND predicate groups, each predicate rendered as text.
    /// A single empty group means every entry matches.
    pub groups: Vec<Vec<String>>,
    /// Display field names in canonical order
    pub display: Vec<String>,
    /// Sort field (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Clause that failed (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_clause: Option<String>,
    /// Rejection error code (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    /// Rejection reason (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ExplainQuery {
    /// Creates explain output from a parsed query
    pub fn from_query(query: &Query) -> Self {
        let groups = query
            .filter()
            .to_groups()
            .into_iter()
            .map(|group| group.into_iter().map(|p| p.to_string()).collect())
            .collect();

        Self {
            accepted: true,
            dataset: Some(query.dataset_id().to_string()),
            groups,
            display: query.display().iter().map(|f| f.name().to_string()).collect(),
            sort: query.sort().map(|s| format!("{} ascending", s.field)),
            rejection_clause: None,
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Creates explain output from a parse error
    pub fn from_error(err: &ParseError) -> Self {
        Self {
            accepted: false,
            dataset: None,
            groups: Vec::new(),
            display: Vec::new(),
            sort: None,
            rejection_clause: Some(err.clause().as_str().to_string()),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }
}

impl fmt::Display for ExplainQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN QUERY ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(dataset) = &self.dataset {
                writeln!(f, "Dataset: {}", dataset)?;
            }
            writeln!(f, "Filter:")?;
            for (i, group) in self.groups.iter().enumerate() {
                if group.is_empty() {
                    writeln!(f, "  all entries")?;
                } else {
                    let prefix = if i == 0 { "  " } else { "  or " };
                    writeln!(f, "{}{}", prefix, group.join(" and "))?;
                }
            }
            writeln!(f, "Display: {}", self.display.join(", "))?;
            if let Some(sort) = &self.sort {
                writeln!(f, "Sort: {}", sort)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(clause) = &self.rejection_clause {
                writeln!(f, "Clause: {}", clause)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
