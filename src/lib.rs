//! # indexdump - Index store to SQLite exporter
//!
//! Exports a compiler-generated symbol index (per-translation-unit "unit"
//! files referencing shared "record" files) into three relational tables:
//! - `symbol(usr, name, kind, subkind, language)`
//! - `occurrence(id, symbol_usr, role, path, is_system, line, column)`
//! - `relation(occurrence_id, symbol_usr, role)`
//!
//! Pipeline: unit enumeration → dependency walk → record decode →
//! vocabulary mapping / path normalization → one transaction per unit.

pub mod symbol;
pub mod role;
pub mod path;
pub mod datastore;
pub mod decoder;
pub mod walker;
pub mod storage;
pub mod exporter;
pub mod context;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use symbol::{SymbolInfo, SymbolKind, SymbolLanguage, SymbolSubKind};
pub use role::{SymbolRole, SymbolRoleSet};
pub use path::{CaseSensitivity, PathDecision, PathFilter};
pub use datastore::{FsIndexStore, IndexStoreReader, MemoryIndexStore};
pub use decoder::RecordDecoder;
pub use walker::{DependencyRef, DependencyWalker};
pub use storage::SqliteStore;
pub use exporter::{ExportSummary, Exporter};
pub use context::{CancellationToken, RunContext};

use std::path::PathBuf;

/// Result type alias for indexdump operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for indexdump operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Index data store not found: {}", path.display())]
    StoreNotFound { path: PathBuf },

    #[error("Failed to read unit {unit}: {reason}")]
    UnitRead { unit: String, reason: String },

    #[error("Failed to decode record {record}: {reason}")]
    RecordDecode { record: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Destination database {} is not writable: {source}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown token: {0}")]
    InvalidToken(String),

    #[error("Invalid project root: {0}")]
    InvalidProjectRoot(String),
}

impl Error {
    /// Whether this error must abort the whole export run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::StoreNotFound { .. } | Error::DestinationUnwritable { .. } | Error::InvalidProjectRoot(_)
        )
    }
}
