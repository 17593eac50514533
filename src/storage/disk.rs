//! Disk-backed dataset store
//!
//! Layout:
//!
//! ```text
//! <data_dir>/datasets/<id>.records.json   JSON array of records
//! <data_dir>/datasets/<id>.manifest.json  DatasetManifest
//! ```
//!
//! Every load verifies the records checksum and the record schema.
//! Removal never parses either file, so a damaged dataset can always be
//! dropped and re-imported. Listing skips manifests it cannot read.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};
use crate::schema::Record;

use super::errors::{StoreError, StoreResult};
use super::importer::import_archive;
use super::manifest::{compute_checksum, DatasetManifest};
use super::store::{check_dataset_id, DatasetInfo, DatasetKind, RecordStore};

const DATASETS_DIR: &str = "datasets";
const RECORDS_SUFFIX: &str = ".records.json";
const MANIFEST_SUFFIX: &str = ".manifest.json";

/// Dataset store persisting to a data directory
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Opens the store under `data_dir`, creating the datasets directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let root = data_dir.join(DATASETS_DIR);
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding dataset files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn records_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, RECORDS_SUFFIX))
    }

    fn manifest_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, MANIFEST_SUFFIX))
    }

    /// Ids that would escape the datasets directory name no stored dataset.
    fn is_path_safe(id: &str) -> bool {
        !id.is_empty() && !id.starts_with('.') && !id.contains(['/', '\\'])
    }

    /// Path of the manifest for a stored dataset, or `DatasetNotFound`
    fn existing_manifest_path(&self, id: &str) -> StoreResult<PathBuf> {
        let path = self.manifest_path(id);
        if !Self::is_path_safe(id) || !path.is_file() {
            return Err(StoreError::DatasetNotFound(id.to_string()));
        }
        Ok(path)
    }

    fn manifest_for(&self, id: &str) -> StoreResult<DatasetManifest> {
        let path = self.existing_manifest_path(id)?;
        DatasetManifest::read_from_file(&path).map_err(|e| match e {
            StoreError::Json(e) => StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("unreadable manifest: {}", e),
            },
            other => other,
        })
    }

    fn write_synced(path: &Path, data: &[u8]) -> StoreResult<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    }
}

impl RecordStore for DiskStore {
    fn load_records(&self, id: &str) -> StoreResult<Vec<Record>> {
        let manifest = self.manifest_for(id)?;
        let data = fs::read(self.records_path(id))?;

        let corrupt = |reason: String| StoreError::Corrupt {
            id: id.to_string(),
            reason,
        };

        if !manifest.verify(&data) {
            return Err(corrupt("records checksum mismatch".to_string()));
        }

        let records: Vec<Record> =
            serde_json::from_slice(&data).map_err(|e| corrupt(e.to_string()))?;

        if records.len() != manifest.num_rows {
            return Err(corrupt(format!(
                "manifest lists {} rows, found {}",
                manifest.num_rows,
                records.len()
            )));
        }

        for (position, record) in records.iter().enumerate() {
            record
                .validate_schema()
                .map_err(|reason| corrupt(format!("record {}: {}", position, reason)))?;
        }

        Ok(records)
    }

    fn import_records(
        &mut self,
        id: &str,
        archive: &[u8],
        kind: DatasetKind,
    ) -> StoreResult<DatasetInfo> {
        check_dataset_id(id)?;
        if !Self::is_path_safe(id) {
            return Err(StoreError::InvalidDatasetId {
                id: id.to_string(),
                reason: "must not contain path separators or start with '.'".to_string(),
            });
        }
        if self.manifest_path(id).exists() {
            return Err(StoreError::DatasetExists(id.to_string()));
        }

        let records = import_archive(archive, kind)?;
        let data = serde_json::to_vec(&records)?;

        Self::write_synced(&self.records_path(id), &data)?;

        let manifest = DatasetManifest::new(id, kind, records.len(), compute_checksum(&data));
        manifest.write_to_file(&self.manifest_path(id))?;

        Ok(manifest.info())
    }

    fn delete_records(&mut self, id: &str) -> StoreResult<()> {
        let manifest_path = self.existing_manifest_path(id)?;

        fs::remove_file(manifest_path)?;
        let records_path = self.records_path(id);
        if records_path.exists() {
            fs::remove_file(records_path)?;
        }
        Ok(())
    }

    fn list_datasets(&self) -> StoreResult<Vec<DatasetInfo>> {
        let mut infos = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.ends_with(MANIFEST_SUFFIX) {
                continue;
            }
            match DatasetManifest::read_from_file(&entry.path()) {
                Ok(manifest) => infos.push(manifest.info()),
                Err(e) => {
                    let reason = e.to_string();
                    log_event_with_fields(
                        Event::DatasetUnreadable,
                        &[("file", &*name), ("reason", reason.as_str())],
                    );
                }
            }
        }

        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::importer::fixtures::{archive, section};
    use tempfile::TempDir;

    const ROW_A: &str = "intro comp sci|1001|smith, jane|0|2015|110|120|8|78.5|cpsc";
    const ROW_B: &str = "linear algebra|1002|lee, kim|2|2016|221|80|20|71.25|math";

    fn courses_archive() -> Vec<u8> {
        archive(&[("courses/SECTIONS", section(&[ROW_A, ROW_B]).as_str())])
    }

    #[test]
    fn test_import_persists_across_reopen() {
        let temp = TempDir::new().unwrap();

        {
            let mut store = DiskStore::open(temp.path()).unwrap();
            let info = store
                .import_records("abc", &courses_archive(), DatasetKind::Courses)
                .unwrap();
            assert_eq!(info.num_rows, 2);
        }

        let store = DiskStore::open(temp.path()).unwrap();
        let records = store.load_records("abc").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            store.list_datasets().unwrap(),
            vec![DatasetInfo {
                id: "abc".into(),
                kind: DatasetKind::Courses,
                num_rows: 2
            }]
        );
    }

    #[test]
    fn test_duplicate_import_rejected() {
        let temp = TempDir::new().unwrap();
        let mut store = DiskStore::open(temp.path()).unwrap();
        store
            .import_records("abc", &courses_archive(), DatasetKind::Courses)
            .unwrap();

        assert!(matches!(
            store.import_records("abc", &courses_archive(), DatasetKind::Courses),
            Err(StoreError::DatasetExists(_))
        ));
    }

    #[test]
    fn test_tampered_records_detected() {
        let temp = TempDir::new().unwrap();
        let mut store = DiskStore::open(temp.path()).unwrap();
        store
            .import_records("abc", &courses_archive(), DatasetKind::Courses)
            .unwrap();

        let path = store.records_path("abc");
        let tampered = fs::read_to_string(&path).unwrap().replace("78.5", "98.5");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            store.load_records("abc"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_delete_removes_files() {
        let temp = TempDir::new().unwrap();
        let mut store = DiskStore::open(temp.path()).unwrap();
        store
            .import_records("abc", &courses_archive(), DatasetKind::Courses)
            .unwrap();

        store.delete_records("abc").unwrap();
        assert!(!store.records_path("abc").exists());
        assert!(store.list_datasets().unwrap().is_empty());
        assert!(matches!(
            store.delete_records("abc"),
            Err(StoreError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn test_unreadable_manifest_can_be_removed() {
        let temp = TempDir::new().unwrap();
        let mut store = DiskStore::open(temp.path()).unwrap();
        store
            .import_records("abc", &courses_archive(), DatasetKind::Courses)
            .unwrap();
        store
            .import_records("xyz", &courses_archive(), DatasetKind::Courses)
            .unwrap();
        fs::write(store.manifest_path("abc"), b"{not json").unwrap();

        let listed = store.list_datasets().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "xyz");
        assert!(matches!(
            store.load_records("abc"),
            Err(StoreError::Corrupt { .. })
        ));

        store.delete_records("abc").unwrap();
        assert!(!store.manifest_path("abc").exists());
        assert!(!store.records_path("abc").exists());
        store
            .import_records("abc", &courses_archive(), DatasetKind::Courses)
            .unwrap();
        assert_eq!(store.load_records("abc").unwrap().len(), 2);
    }

    #[test]
    fn test_path_escaping_ids() {
        let temp = TempDir::new().unwrap();
        let mut store = DiskStore::open(temp.path()).unwrap();

        assert!(matches!(
            store.load_records("../abc"),
            Err(StoreError::DatasetNotFound(_))
        ));
        assert!(matches!(
            store.import_records("../abc", &courses_archive(), DatasetKind::Courses),
            Err(StoreError::InvalidDatasetId { .. })
        ));
    }

    #[test]
    fn test_failed_import_leaves_nothing() {
        let temp = TempDir::new().unwrap();
        let mut store = DiskStore::open(temp.path()).unwrap();
        let empty = archive(&[("courses/EMPTY", "title|uuid")]);

        assert!(matches!(
            store.import_records("abc", &empty, DatasetKind::Courses),
            Err(StoreError::ImportFailed(_))
        ));
        assert!(store.list_datasets().unwrap().is_empty());
    }
}
