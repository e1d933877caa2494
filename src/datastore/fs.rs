//! Filesystem-backed index store reader
//!
//! Reads the decoded form of unit and record files (JSON documents matching
//! `UnitFile` / `RawRecord`) from a store laid out like the compiler's:
//! units under `units/`, records bucketed under `records/<XX>/` where `XX`
//! are the last two characters of the record name.

use super::model::{RawRecord, UnitDependency, UnitFile};
use super::units::UnitStore;
use super::IndexStoreReader;
use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Index store reader over a directory tree
pub struct FsIndexStore {
    store: UnitStore,
}

impl FsIndexStore {
    /// Open the store rooted at `root` (fails with `StoreNotFound`)
    pub fn open(root: &Path) -> Result<Self> {
        Ok(Self {
            store: UnitStore::open(root)?,
        })
    }

    pub fn unit_store(&self) -> &UnitStore {
        &self.store
    }

    /// Read and parse one unit file
    pub fn read_unit(&self, unit: &str) -> Result<UnitFile> {
        let path = self.store.units_dir().join(unit);
        let contents = std::fs::read(&path).map_err(|e| Error::UnitRead {
            unit: unit.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        serde_json::from_slice(&contents).map_err(|e| Error::UnitRead {
            unit: unit.to_string(),
            reason: format!("malformed unit file: {}", e),
        })
    }

    /// Where a record lives on disk, if anywhere
    fn record_path(&self, record: &str) -> Option<PathBuf> {
        let records_dir = self.store.records_dir();
        let chars: Vec<char> = record.chars().collect();

        let mut candidates = Vec::with_capacity(2);
        if chars.len() >= 2 {
            let bucket: String = chars[chars.len() - 2..].iter().collect();
            candidates.push(records_dir.join(bucket).join(record));
        }
        candidates.push(records_dir.join(record));

        candidates.into_iter().find(|p| p.is_file())
    }
}

/// Record names come from unit files and must stay inside `records/`
fn is_record_name(record: &str) -> bool {
    if record.contains('/') || record.contains('\\') {
        return false;
    }
    let mut components = Path::new(record).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl IndexStoreReader for FsIndexStore {
    fn list_units(&self) -> Result<Vec<String>> {
        self.store.list_units()
    }

    fn unit_dependencies(&self, unit: &str) -> Result<Vec<UnitDependency>> {
        Ok(self.read_unit(unit)?.dependencies)
    }

    fn read_record(&self, record: &str) -> Result<RawRecord> {
        if !is_record_name(record) {
            return Err(Error::RecordDecode {
                record: record.to_string(),
                reason: "record name is not a plain file name".to_string(),
            });
        }
        let path = self.record_path(record).ok_or_else(|| Error::RecordDecode {
            record: record.to_string(),
            reason: "record file not found".to_string(),
        })?;
        let contents = std::fs::read(&path).map_err(|e| Error::RecordDecode {
            record: record.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        serde_json::from_slice(&contents).map_err(|e| Error::RecordDecode {
            record: record.to_string(),
            reason: format!("malformed record file: {}", e),
        })
    }
}
