//! Dataset store contract
//!
//! A store persists named record sets produced by the importer. Stores
//! hand back records exactly as imported, in import order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Record;

use super::errors::{StoreError, StoreResult};

/// Kind of dataset an archive holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Courses,
    /// Recognised but not importable
    Rooms,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Courses => "courses",
            DatasetKind::Rooms => "rooms",
        }
    }

    /// Parses a kind name. Unknown names are an import failure.
    pub fn parse(name: &str) -> StoreResult<DatasetKind> {
        match name {
            "courses" => Ok(DatasetKind::Courses),
            "rooms" => Ok(DatasetKind::Rooms),
            other => Err(StoreError::ImportFailed(format!(
                "unknown dataset kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of a stored dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub kind: DatasetKind,
    pub num_rows: usize,
}

/// Persistence of named record sets
pub trait RecordStore {
    /// Returns the records stored under `id`, in import order.
    fn load_records(&self, id: &str) -> StoreResult<Vec<Record>>;

    /// Imports an archive and stores its records under `id`.
    ///
    /// Fails with `DatasetExists` if `id` is taken and `ImportFailed` if
    /// the archive yields no records.
    fn import_records(
        &mut self,
        id: &str,
        archive: &[u8],
        kind: DatasetKind,
    ) -> StoreResult<DatasetInfo>;

    /// Removes the dataset stored under `id`.
    fn delete_records(&mut self, id: &str) -> StoreResult<()>;

    /// All stored datasets, ordered by id.
    fn list_datasets(&self) -> StoreResult<Vec<DatasetInfo>>;
}

/// Applies the dataset id rules, mapping a violation to `InvalidDatasetId`.
pub fn check_dataset_id(id: &str) -> StoreResult<()> {
    crate::parser::validate_dataset_id(id).map_err(|reason| StoreError::InvalidDatasetId {
        id: id.to_string(),
        reason,
    })
}
