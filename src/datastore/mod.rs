//! Index store readers
//!
//! An index store is a directory of per-translation-unit "unit" files and
//! shared "record" files. Decoding their on-disk encoding is the job of an
//! external reader; this crate only consumes the enumeration interface below.
//!
//! Layout of a store root:
//! - `v<N>/units/<output-file>-<HASH>`: one file per compiled translation unit
//! - `v<N>/records/<XX>/<source-file>-<HASH>`: shared declaration/occurrence records

pub mod model;
pub mod units;
pub mod fs;
pub mod memory;

pub use model::{
    DependencyKind, RawDeclaration, RawOccurrence, RawRecord, RawRelation, UnitDependency, UnitFile,
};
pub use units::{is_unit_filename, UnitStore};
pub use fs::FsIndexStore;
pub use memory::MemoryIndexStore;

use crate::Result;

/// Trait for index store readers
///
/// Implementations are responsible for:
/// 1. Listing the unit files available in the store
/// 2. Enumerating one unit's dependency list
/// 3. Reading one record's declarations and occurrences
pub trait IndexStoreReader {
    /// Unit names in enumeration order
    fn list_units(&self) -> Result<Vec<String>>;

    /// Dependencies (units, records, files) of one unit
    fn unit_dependencies(&self, unit: &str) -> Result<Vec<UnitDependency>>;

    /// Raw contents of one record
    fn read_record(&self, record: &str) -> Result<RawRecord>;
}
