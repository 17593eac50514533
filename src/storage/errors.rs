//! # Store Errors
//!
//! Error types for the dataset store.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Dataset store errors
#[derive(Debug, Error)]
pub enum StoreError {
    // ==================
    // Lookup Errors
    // ==================

    /// No dataset is stored under this id
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// A dataset is already stored under this id
    #[error("Dataset already exists: {0}")]
    DatasetExists(String),

    /// Id fails the dataset id rules
    #[error("Invalid dataset id '{id}': {reason}")]
    InvalidDatasetId { id: String, reason: String },

    // ==================
    // Import Errors
    // ==================

    /// Archive did not yield a usable record set
    #[error("Import failed: {0}")]
    ImportFailed(String),

    // ==================
    // Persistence Errors
    // ==================

    /// Stored dataset failed checksum or schema validation
    #[error("Dataset '{id}' is corrupt: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DatasetNotFound(_) => "CQ_DATASET_NOT_FOUND",
            StoreError::DatasetExists(_) => "CQ_DATASET_EXISTS",
            StoreError::InvalidDatasetId { .. } => "CQ_INVALID_DATASET_ID",
            StoreError::ImportFailed(_) => "CQ_IMPORT_FAILED",
            StoreError::Corrupt { .. } => "CQ_DATASET_CORRUPT",
            StoreError::Io(_) => "CQ_STORE_IO",
            StoreError::Json(_) => "CQ_STORE_JSON",
        }
    }

    /// Returns true if the caller's request caused the error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::DatasetNotFound(_)
                | StoreError::DatasetExists(_)
                | StoreError::InvalidDatasetId { .. }
                | StoreError::ImportFailed(_)
        )
    }
}
