//! API error types
//!
//! Caller-facing error kinds. Each wraps the subsystem error that caused it
//! and keeps that error's code as the cause.
//!
//! | Code              | Status | Raised for                                  |
//! |-------------------|--------|---------------------------------------------|
//! | MALFORMED_QUERY   | 400    | grammar, filter, or unknown field           |
//! | DATASET_NOT_FOUND | 404    | no dataset under the id                     |
//! | IMPORT_ERROR      | 400    | bad archive, bad id, id taken, bad kind     |
//! | INVALID_REQUEST   | 400    | unparseable request envelope                |
//! | STORAGE_ERROR     | 500    | I/O or corrupt stored dataset               |
//! | INTERNAL_ERROR    | 500    | record/schema disagreement during execution |

use std::fmt;

use crate::executor::ExecutorError;
use crate::parser::ParseError;
use crate::storage::StoreError;

/// API error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Recoverable error
    Error,
    /// Internal consistency broken
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    MalformedQuery,
    DatasetNotFound,
    ImportError,
    InvalidRequest,
    StorageError,
    InternalError,
}

impl ApiErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::MalformedQuery => "MALFORMED_QUERY",
            ApiErrorCode::DatasetNotFound => "DATASET_NOT_FOUND",
            ApiErrorCode::ImportError => "IMPORT_ERROR",
            ApiErrorCode::InvalidRequest => "INVALID_REQUEST",
            ApiErrorCode::StorageError => "STORAGE_ERROR",
            ApiErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Returns the transport status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiErrorCode::MalformedQuery
            | ApiErrorCode::ImportError
            | ApiErrorCode::InvalidRequest => 400,
            ApiErrorCode::DatasetNotFound => 404,
            ApiErrorCode::StorageError | ApiErrorCode::InternalError => 500,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            ApiErrorCode::StorageError => Severity::Error,
            ApiErrorCode::InternalError => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error with the originating subsystem code
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
    /// Subsystem error code, e.g. `CQ_UNKNOWN_FIELD`
    cause: Option<&'static str>,
}

impl ApiError {
    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::InvalidRequest,
            message: reason.into(),
            cause: None,
        }
    }

    /// Create an import error
    pub fn import_error(reason: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::ImportError,
            message: reason.into(),
            cause: None,
        }
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::InternalError,
            message: reason.into(),
            cause: None,
        }
    }

    /// Every parser failure is a malformed query to the caller
    pub fn from_parse_error(err: ParseError) -> Self {
        Self {
            code: ApiErrorCode::MalformedQuery,
            message: format!("{} (in {} clause)", err.message(), err.clause()),
            cause: Some(err.code().code()),
        }
    }

    pub fn from_store_error(err: StoreError) -> Self {
        let code = match &err {
            StoreError::DatasetNotFound(_) => ApiErrorCode::DatasetNotFound,
            e if e.is_client_error() => ApiErrorCode::ImportError,
            _ => ApiErrorCode::StorageError,
        };
        Self {
            code,
            message: err.to_string(),
            cause: Some(err.code()),
        }
    }

    pub fn from_executor_error(err: ExecutorError) -> Self {
        Self {
            code: ApiErrorCode::InternalError,
            message: err.message().to_string(),
            cause: Some(err.code().code()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    /// Returns the transport status code
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the subsystem code this error came from
    pub fn cause(&self) -> Option<&'static str> {
        self.cause
    }
}

impl fmt::Display for ApiError {
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

impl std::error::Error for ApiError {}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        Self::from_parse_error(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store_error(err)
    }
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        Self::from_executor_error(err)
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
