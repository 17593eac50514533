//! Parser error types
//!
//! Error codes:
//! - CQ_MALFORMED_QUERY (REJECT)
//! - CQ_INVALID_FILTER (REJECT)
//! - CQ_UNKNOWN_FIELD (REJECT)
//!
//! Callers outside the parser see all three as a malformed query; the code
//! records which check failed.

use std::fmt;

/// Severity levels for parser errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Structural segment of the query grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    /// `In courses dataset <id>,`
    Dataset,
    /// `find all entries;` or `find entries whose ...;`
    Filter,
    /// `show <field>, and <field>`
    Display,
    /// `sort in ascending order by <field>`
    Order,
    /// Final `.` and end of input
    Terminator,
}

impl Clause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Clause::Dataset => "dataset",
            Clause::Filter => "filter",
            Clause::Display => "display",
            Clause::Order => "order",
            Clause::Terminator => "terminator",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parser error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    /// Grammar or punctuation violation
    MalformedQuery,
    /// Filter expression could not be built
    InvalidFilterExpression,
    /// Display or sort key is not a known field
    UnknownField,
}

impl ParseErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorCode::MalformedQuery => "CQ_MALFORMED_QUERY",
            ParseErrorCode::InvalidFilterExpression => "CQ_INVALID_FILTER",
            ParseErrorCode::UnknownField => "CQ_UNKNOWN_FIELD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Parser error with the clause that failed
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    code: ParseErrorCode,
    clause: Clause,
    message: String,
    /// Offending token text, if any
    token: Option<String>,
}

impl ParseError {
    /// Create a malformed query error
    pub fn malformed(clause: Clause, reason: impl Into<String>) -> Self {
        Self {
            code: ParseErrorCode::MalformedQuery,
            clause,
            message: reason.into(),
            token: None,
        }
    }

    /// Create a malformed query error naming the offending token
    pub fn unexpected(clause: Clause, expected: &str, found: Option<&str>) -> Self {
        match found {
            Some(tok) => Self {
                code: ParseErrorCode::MalformedQuery,
                clause,
                message: format!("Expected {}, found '{}'", expected, tok),
                token: Some(tok.to_string()),
            },
            None => Self {
                code: ParseErrorCode::MalformedQuery,
                clause,
                message: format!("Expected {}, found end of query", expected),
                token: None,
            },
        }
    }

    /// Create an invalid filter expression error
    pub fn invalid_filter(reason: impl Into<String>) -> Self {
        Self {
            code: ParseErrorCode::InvalidFilterExpression,
            clause: Clause::Filter,
            message: reason.into(),
            token: None,
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(clause: Clause, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: ParseErrorCode::UnknownField,
            clause,
            message: format!("'{}' is not a known field", name),
            token: Some(name),
        }
    }

    /// Attaches the offending token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> ParseErrorCode {
        self.code
    }

    /// Returns the clause that failed
    pub fn clause(&self) -> Clause {
        self.clause
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending token if known
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (in {} clause)",
            self.code.severity(),
            self.code.code(),
            self.message,
            self.clause
        )
    }
}

impl std::error::Error for ParseError {}

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ParseErrorCode::MalformedQuery.code(), "CQ_MALFORMED_QUERY");
        assert_eq!(
            ParseErrorCode::InvalidFilterExpression.code(),
            "CQ_INVALID_FILTER"
        );
        assert_eq!(ParseErrorCode::UnknownField.code(), "CQ_UNKNOWN_FIELD");
    }

    #[test]
    fn test_unknown_field_carries_token() {
        let err = ParseError::unknown_field(Clause::Display, "Year");
        assert_eq!(err.code(), ParseErrorCode::UnknownField);
        assert_eq!(err.clause(), Clause::Display);
        assert_eq!(err.token(), Some("Year"));
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::unexpected(Clause::Dataset, "'courses'", Some("rooms"));
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("CQ_MALFORMED_QUERY"));
        assert!(display.contains("rooms"));
        assert!(display.contains("dataset clause"));
    }
}
