//! In-memory dataset store

use std::collections::BTreeMap;

use crate::schema::Record;

use super::errors::{StoreError, StoreResult};
use super::importer::import_archive;
use super::store::{check_dataset_id, DatasetInfo, DatasetKind, RecordStore};

/// Dataset store held entirely in memory. Contents do not survive the
/// process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: BTreeMap<String, (DatasetInfo, Vec<Record>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores already-parsed records under `id`.
    pub fn insert_records(
        &mut self,
        id: &str,
        kind: DatasetKind,
        records: Vec<Record>,
    ) -> StoreResult<DatasetInfo> {
        check_dataset_id(id)?;
        if self.datasets.contains_key(id) {
            return Err(StoreError::DatasetExists(id.to_string()));
        }

        let info = DatasetInfo {
            id: id.to_string(),
            kind,
            num_rows: records.len(),
        };
        self.datasets.insert(id.to_string(), (info.clone(), records));
        Ok(info)
    }
}

impl RecordStore for MemoryStore {
    fn load_records(&self, id: &str) -> StoreResult<Vec<Record>> {
        self.datasets
            .get(id)
            .map(|(_, records)| records.clone())
            .ok_or_else(|| StoreError::DatasetNotFound(id.to_string()))
    }

    fn import_records(
        &mut self,
        id: &str,
        archive: &[u8],
        kind: DatasetKind,
    ) -> StoreResult<DatasetInfo> {
        check_dataset_id(id)?;
        if self.datasets.contains_key(id) {
            return Err(StoreError::DatasetExists(id.to_string()));
        }

        let records = import_archive(archive, kind)?;
        self.insert_records(id, kind, records)
    }

    fn delete_records(&mut self, id: &str) -> StoreResult<()> {
        self.datasets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::DatasetNotFound(id.to_string()))
    }

    fn list_datasets(&self) -> StoreResult<Vec<DatasetInfo>> {
        Ok(self.datasets.values().map(|(info, _)| info.clone()).collect())
    }
}
