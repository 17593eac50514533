//! Dataset storage subsystem for courseql
//!
//! Imports course archives into record sets and keeps them by id.
//!
//! # Stores
//!
//! - `DiskStore`: JSON records plus a checksummed manifest per dataset
//! - `MemoryStore`: same contract, process lifetime only
//!
//! # Guarantees
//!
//! - Stored records always carry all nine fields with their declared kinds
//! - A dataset id is imported at most once; re-import needs a delete first
//! - Loads fail loudly on checksum or schema mismatch

mod disk;
mod errors;
mod importer;
mod manifest;
mod memory;
mod store;

pub use disk::DiskStore;
pub use errors::{StoreError, StoreResult};
pub use importer::{import_archive, parse_row, COURSES_DIR, MIN_SECTION_LEN};
#[cfg(test)]
pub(crate) use importer::fixtures;
pub use manifest::{compute_checksum, DatasetManifest, FORMAT_VERSION};
pub use memory::MemoryStore;
pub use store::{check_dataset_id, DatasetInfo, DatasetKind, RecordStore};
