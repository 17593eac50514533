//! Dataset manifest handling
//!
//! Each stored dataset has a manifest next to its records file:
//! - id: dataset id
//! - kind: dataset kind
//! - num_rows: record count
//! - created_at: RFC3339 timestamp
//! - checksum: CRC32 of the records file bytes
//! - format_version: always 1
//!
//! The manifest is written after the records file, so a dataset exists
//! exactly when its manifest does.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::errors::StoreResult;
use super::store::{DatasetInfo, DatasetKind};

/// Current manifest format
pub const FORMAT_VERSION: u8 = 1;

/// CRC32 (IEEE) over `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Dataset manifest data structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetManifest {
    pub id: String,
    pub kind: DatasetKind,
    pub num_rows: usize,
    /// Creation time (RFC3339)
    pub created_at: String,
    /// CRC32 of the records file
    pub checksum: u32,
    pub format_version: u8,
}

impl DatasetManifest {
    /// Creates a manifest stamped with the current time
    pub fn new(id: &str, kind: DatasetKind, num_rows: usize, checksum: u32) -> Self {
        let created_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        Self {
            id: id.to_string(),
            kind,
            num_rows,
            created_at,
            checksum,
            format_version: FORMAT_VERSION,
        }
    }

    /// Summary exposed to callers
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            id: self.id.clone(),
            kind: self.kind,
            num_rows: self.num_rows,
        }
    }

    /// True if `data` matches the recorded checksum
    pub fn verify(&self, data: &[u8]) -> bool {
        compute_checksum(data) == self.checksum
    }

    /// Writes the manifest to a file with fsync
    pub fn write_to_file(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }

    /// Reads a manifest from a file
    pub fn read_from_file(path: &Path) -> StoreResult<Self> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
