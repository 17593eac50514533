//! Executor error types
//!
//! Error codes:
//! - CQ_SCHEMA_VIOLATION (FATAL)
//! - CQ_EXECUTION_FAILED (ERROR)
//!
//! Stored records are validated on load, so an executor error means the
//! store and the field table disagree. It is never a user error.

use std::fmt;

use crate::schema::{Field, FieldKind};

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but system is healthy
    Error,
    /// Internal consistency broken
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Executor error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Record value kind or presence disagrees with the field table
    SchemaViolation,
    /// Query could not be applied to the record set
    ExecutionFailed,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::SchemaViolation => "CQ_SCHEMA_VIOLATION",
            ExecutorErrorCode::ExecutionFailed => "CQ_EXECUTION_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::SchemaViolation => Severity::Fatal,
            ExecutorErrorCode::ExecutionFailed => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    /// Position of the offending record in the input sequence
    position: Option<usize>,
}

impl ExecutorError {
    /// Record at `position` has no value for `field`
    pub fn missing_field(position: usize, field: Field) -> Self {
        Self {
            code: ExecutorErrorCode::SchemaViolation,
            message: format!("Record {} has no value for '{}'", position, field.key()),
            position: Some(position),
        }
    }

    /// Record at `position` holds a value of the wrong kind for `field`
    pub fn kind_mismatch(position: usize, field: Field, found: FieldKind) -> Self {
        Self {
            code: ExecutorErrorCode::SchemaViolation,
            message: format!(
                "Record {} field '{}': expected {}, found {}",
                position,
                field.key(),
                field.kind().type_name(),
                found.type_name()
            ),
            position: Some(position),
        }
    }

    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::ExecutionFailed,
            message: reason.into(),
            position: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the record position if applicable
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ExecutorErrorCode::SchemaViolation.code(),
            "CQ_SCHEMA_VIOLATION"
        );
        assert_eq!(
            ExecutorErrorCode::ExecutionFailed.code(),
            "CQ_EXECUTION_FAILED"
        );
    }

    #[test]
    fn test_schema_violation_is_fatal() {
        let err = ExecutorError::kind_mismatch(3, Field::Average, FieldKind::Textual);
        assert!(err.is_fatal());
        assert_eq!(err.position(), Some(3));
        assert!(err.message().contains("courses_avg"));
    }

    #[test]
    fn test_error_display() {
        let err = ExecutorError::missing_field(0, Field::Title);
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("CQ_SCHEMA_VIOLATION"));
        assert!(!ExecutorError::execution_failed("x").is_fatal());
    }
}
