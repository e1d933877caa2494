//! Dependency graph walking
//!
//! Enumerates one unit's dependency list. The walker neither filters nor
//! deduplicates; the exporter owns the visited-record set.

use crate::datastore::{DependencyKind, IndexStoreReader, UnitDependency};
use crate::{Error, Result};

/// A dependency of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
    /// Another unit
    Unit { name: String },
    /// A shared record describing `file_path`
    Record {
        name: String,
        file_path: String,
        is_system: bool,
    },
    /// A file with no record of its own
    File { file_path: String, is_system: bool },
}

impl DependencyRef {
    pub fn is_record(&self) -> bool {
        matches!(self, DependencyRef::Record { .. })
    }
}

impl From<UnitDependency> for DependencyRef {
    fn from(dep: UnitDependency) -> Self {
        match dep.kind {
            DependencyKind::Unit => DependencyRef::Unit { name: dep.name },
            DependencyKind::Record => DependencyRef::Record {
                name: dep.name,
                file_path: dep.file_path,
                is_system: dep.is_system,
            },
            DependencyKind::File => DependencyRef::File {
                file_path: dep.file_path,
                is_system: dep.is_system,
            },
        }
    }
}

pub struct DependencyWalker<'r> {
    reader: &'r dyn IndexStoreReader,
}

impl<'r> DependencyWalker<'r> {
    pub fn new(reader: &'r dyn IndexStoreReader) -> Self {
        Self { reader }
    }

    /// Dependencies of `unit` in unit order (fails with `UnitRead`)
    pub fn dependencies(&self, unit: &str) -> Result<Vec<DependencyRef>> {
        let deps = self.reader.unit_dependencies(unit).map_err(|e| match e {
            Error::UnitRead { .. } => e,
            other => Error::UnitRead {
                unit: unit.to_string(),
                reason: other.to_string(),
            },
        })?;

        let mut refs = Vec::with_capacity(deps.len());
        for dep in deps {
            if dep.kind == DependencyKind::Record && (dep.name.is_empty() || dep.file_path.is_empty()) {
                return Err(Error::UnitRead {
                    unit: unit.to_string(),
                    reason: format!("record dependency '{}' has no name or file path", dep.name),
                });
            }
            refs.push(DependencyRef::from(dep));
        }
        Ok(refs)
    }
}
