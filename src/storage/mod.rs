//! Storage Layer - SQLite-backed export destination
//!
//! The destination database holds three tables:
//! - symbol(usr, name, kind, subkind, language)
//! - occurrence(id, symbol_usr, role, path, is_system, line, column)
//! - relation(occurrence_id, symbol_usr, role)

pub mod schema;
pub mod sqlite;

pub use sqlite::{is_unwritable, DbStats, OccurrenceRow, OccurrenceSite, RelationRow, SqliteStore, SymbolRow, UnitWriter};
