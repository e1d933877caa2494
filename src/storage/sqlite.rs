//! SQLite storage implementation

use super::schema;
use crate::role::SymbolRole;
use crate::symbol::SymbolInfo;
use crate::{Error, Result};
use rusqlite::{params, Connection, ErrorCode, Transaction};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// SQLite-backed export destination
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create a fresh destination database, replacing any existing file
    pub fn create(path: &Path) -> Result<Self> {
        remove_existing(path)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|source| Error::DestinationUnwritable {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize_schema().map_err(|e| store.escalate(e))?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Destination path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Turn a storage error into `DestinationUnwritable` when the database
    /// itself can no longer be written
    pub fn escalate(&self, err: Error) -> Error {
        match err {
            Error::Storage(source) if is_unwritable(&source) => Error::DestinationUnwritable {
                path: self.path.clone().unwrap_or_else(|| PathBuf::from(":memory:")),
                source,
            },
            other => other,
        }
    }

    // ========== Unit Transactions ==========

    /// Begin the transaction for one unit
    pub fn begin_unit(&mut self) -> Result<UnitWriter<'_>> {
        let tx = self.conn.transaction()?;
        Ok(UnitWriter { tx })
    }

    // ========== Read Back ==========

    /// Count all symbols
    pub fn count_symbols(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM symbol", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count physical occurrences (distinct ids)
    pub fn count_occurrences(&self) -> Result<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(DISTINCT id) FROM occurrence", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count occurrence rows (one per role)
    pub fn count_occurrence_rows(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM occurrence", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count relation rows
    pub fn count_relations(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM relation", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            symbols: self.count_symbols()?,
            occurrences: self.count_occurrences()?,
            occurrence_rows: self.count_occurrence_rows()?,
            relations: self.count_relations()?,
        })
    }

    /// All symbol rows ordered by usr
    pub fn symbol_rows(&self) -> Result<Vec<SymbolRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT usr, name, kind, subkind, language FROM symbol ORDER BY usr")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SymbolRow {
                    usr: row.get(0)?,
                    name: row.get(1)?,
                    kind: row.get(2)?,
                    subkind: row.get(3)?,
                    language: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All occurrence rows in insertion order
    pub fn occurrence_rows(&self) -> Result<Vec<OccurrenceRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, symbol_usr, role, path, is_system, line, column FROM occurrence ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(OccurrenceRow {
                    id: row.get(0)?,
                    symbol_usr: row.get(1)?,
                    role: row.get(2)?,
                    path: row.get(3)?,
                    is_system: row.get(4)?,
                    line: row.get(5)?,
                    column: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All relation rows in insertion order
    pub fn relation_rows(&self) -> Result<Vec<RelationRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT occurrence_id, symbol_usr, role FROM relation ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RelationRow {
                    occurrence_id: row.get(0)?,
                    symbol_usr: row.get(1)?,
                    role: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Whether a SQLite failure means the destination cannot be written at all
pub fn is_unwritable(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::ReadOnly
                | ErrorCode::DiskFull
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
        ),
        _ => false,
    }
}

/// Remove a previous destination and its journal files
fn remove_existing(path: &Path) -> Result<()> {
    let mut targets = vec![path.to_path_buf()];
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut sibling = path.as_os_str().to_owned();
        sibling.push(suffix);
        targets.push(PathBuf::from(sibling));
    }

    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => tracing::debug!("Removed existing {}", target.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Where one occurrence sits in the source
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceSite<'a> {
    pub path: &'a str,
    pub is_system: bool,
    pub line: u32,
    pub column: u32,
}

/// Writes the rows of one unit inside a single transaction.
///
/// Dropping the writer without calling `commit` rolls every row back.
pub struct UnitWriter<'a> {
    tx: Transaction<'a>,
}

impl UnitWriter<'_> {
    /// Insert a symbol; returns false when the usr was already present
    pub fn insert_symbol(&self, usr: &str, name: &str, info: &SymbolInfo) -> Result<bool> {
        let changed = self.tx.prepare_cached(schema::INSERT_SYMBOL)?.execute(params![
            usr,
            name,
            info.kind_name(),
            info.subkind_name(),
            info.language_name(),
        ])?;
        Ok(changed > 0)
    }

    /// Insert one role row of an occurrence
    pub fn insert_occurrence(&self, id: i64, symbol_usr: &str, role: SymbolRole, site: &OccurrenceSite<'_>) -> Result<()> {
        self.tx.prepare_cached(schema::INSERT_OCCURRENCE)?.execute(params![
            id,
            symbol_usr,
            role.as_str(),
            site.path,
            site.is_system,
            site.line,
            site.column,
        ])?;
        Ok(())
    }

    /// Insert one role row of a relation
    pub fn insert_relation(&self, occurrence_id: i64, symbol_usr: &str, role: SymbolRole) -> Result<()> {
        self.tx
            .prepare_cached(schema::INSERT_RELATION)?
            .execute(params![occurrence_id, symbol_usr, role.as_str()])?;
        Ok(())
    }

    /// Commit every row written for this unit
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

/// A stored symbol row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolRow {
    pub usr: String,
    pub name: String,
    pub kind: String,
    pub subkind: String,
    pub language: String,
}

/// A stored occurrence row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OccurrenceRow {
    pub id: i64,
    pub symbol_usr: String,
    pub role: String,
    pub path: String,
    pub is_system: bool,
    pub line: u32,
    pub column: u32,
}

/// A stored relation row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RelationRow {
    pub occurrence_id: i64,
    pub symbol_usr: String,
    pub role: String,
}

/// Database statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct DbStats {
    pub symbols: usize,
    pub occurrences: usize,
    pub occurrence_rows: usize,
    pub relations: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Symbols: {}", self.symbols)?;
        writeln!(f, "  Occurrences: {} ({} rows)", self.occurrences, self.occurrence_rows)?;
        writeln!(f, "  Relations: {}", self.relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{SymbolKind, SymbolLanguage, SymbolSubKind};
    use tempfile::tempdir;

    fn function() -> SymbolInfo {
        SymbolInfo::new(SymbolKind::Function, SymbolSubKind::None, SymbolLanguage::C)
    }

    fn columns(store: &SqliteStore, table: &str) -> Vec<String> {
        let mut stmt = store.conn.prepare(&format!("PRAGMA table_info({})", table)).unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_schema_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(columns(&store, "symbol"), vec!["usr", "name", "kind", "subkind", "language"]);
        assert_eq!(
            columns(&store, "occurrence"),
            vec!["id", "symbol_usr", "role", "path", "is_system", "line", "column"]
        );
        assert_eq!(columns(&store, "relation"), vec!["occurrence_id", "symbol_usr", "role"]);
    }

    #[test]
    fn test_duplicate_symbol_is_ignored() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let writer = store.begin_unit().unwrap();
        assert!(writer.insert_symbol("c:@F@foo", "foo", &function()).unwrap());
        assert!(!writer.insert_symbol("c:@F@foo", "foo_again", &function()).unwrap());
        writer.commit().unwrap();

        let rows = store.symbol_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "foo");
        assert_eq!(rows[0].kind, "Function");
        assert_eq!(rows[0].subkind, "None");
        assert_eq!(rows[0].language, "c");
    }

    #[test]
    fn test_dropped_writer_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        {
            let writer = store.begin_unit().unwrap();
            writer.insert_symbol("c:@F@gone", "gone", &function()).unwrap();
            writer.insert_relation(0, "c:@F@gone", SymbolRole::CalledBy).unwrap();
        }
        assert_eq!(store.count_symbols().unwrap(), 0);
        assert_eq!(store.count_relations().unwrap(), 0);
    }

    #[test]
    fn test_special_characters_survive() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let usr = r#"c:@F@operator"",'; DROP TABLE symbol;--"#;
        let writer = store.begin_unit().unwrap();
        writer.insert_symbol(usr, "operator\"\"", &function()).unwrap();
        let site = OccurrenceSite { path: "src/it's \"quoted\".c", is_system: false, line: 1, column: 2 };
        writer.insert_occurrence(0, usr, SymbolRole::Definition, &site).unwrap();
        writer.commit().unwrap();

        assert_eq!(store.symbol_rows().unwrap()[0].usr, usr);
        let occ = &store.occurrence_rows().unwrap()[0];
        assert_eq!(occ.path, "src/it's \"quoted\".c");
        assert_eq!(occ.role, "Definition");
    }

    #[test]
    fn test_create_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/index.sqlite3");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not a database").unwrap();

        let store = SqliteStore::create(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.stats().unwrap().symbols, 0);
    }

    #[test]
    fn test_stats_counts_distinct_occurrences() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let writer = store.begin_unit().unwrap();
        let site = OccurrenceSite { path: "a.c", is_system: false, line: 10, column: 3 };
        writer.insert_occurrence(0, "u", SymbolRole::Declaration, &site).unwrap();
        writer.insert_occurrence(0, "u", SymbolRole::Definition, &site).unwrap();
        writer.insert_occurrence(1, "u", SymbolRole::Reference, &site).unwrap();
        writer.commit().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.occurrences, 2);
        assert_eq!(stats.occurrence_rows, 3);
    }

    mod export_failures {
        use super::*;
        use crate::context::RunContext;
        use crate::datastore::{MemoryIndexStore, RawOccurrence, RawRecord, UnitDependency};
        use crate::exporter::{Exporter, IssueKind};
        use crate::path::{CaseSensitivity, PathFilter};

        fn record(usr: &str, name: &str) -> RawRecord {
            let mut record = RawRecord::new();
            let decl = record.declare(usr, name, function());
            record.add_occurrence(RawOccurrence::new(decl, &[SymbolRole::Definition], 1, 1));
            record
        }

        /// `a.o-1` needs the shared `s-1` and `bad-2`; `b.o-2` needs `s-1` only
        fn reader() -> MemoryIndexStore {
            let shared = UnitDependency::record("s-1", "/proj/s.c", false);
            let mut reader = MemoryIndexStore::new();
            reader
                .add_record("s-1", record("c:@F@s", "s"))
                .add_record("bad-2", record("c:@F@bad", "bad"))
                .add_unit(
                    "a.o-1",
                    vec![shared.clone(), UnitDependency::record("bad-2", "/proj/bad.c", false)],
                )
                .add_unit("b.o-2", vec![shared]);
            reader
        }

        fn filter() -> PathFilter {
            PathFilter::new("/proj", CaseSensitivity::Sensitive).unwrap()
        }

        #[test]
        fn test_failed_insert_rolls_back_only_that_unit() {
            let reader = reader();
            let mut store = SqliteStore::open_in_memory().unwrap();
            store
                .conn
                .execute_batch(
                    "CREATE TRIGGER reject_bad BEFORE INSERT ON occurrence
                     WHEN NEW.path = 'bad.c'
                     BEGIN SELECT RAISE(ABORT, 'boom'); END;",
                )
                .unwrap();

            let summary = Exporter::new(&reader, &mut store, filter())
                .run(&RunContext::default())
                .unwrap();

            assert_eq!(summary.units_processed, 1);
            assert_eq!(summary.units_failed, 1);
            assert_eq!(summary.issues.len(), 1);
            assert_eq!(summary.issues[0].kind, IssueKind::Storage);
            assert_eq!(summary.issues[0].subject, "a.o-1");
            assert!(summary.issues[0].message.contains("boom"));

            // The shared record was not marked visited by the rolled-back unit
            assert_eq!(reader.record_reads("s-1"), 2);

            let usrs: Vec<_> = store.symbol_rows().unwrap().into_iter().map(|r| r.usr).collect();
            assert_eq!(usrs, vec!["c:@F@s"]);
            let occurrences = store.occurrence_rows().unwrap();
            assert_eq!(occurrences.len(), 1);
            // Id 0 went to the rolled-back unit and is not reused
            assert_eq!(occurrences[0].id, 1);
            assert_eq!(occurrences[0].path, "s.c");
        }

        #[test]
        fn test_unwritable_destination_aborts_run() {
            let reader = reader();
            let mut store = SqliteStore::open_in_memory().unwrap();
            store.conn.execute_batch("PRAGMA query_only = ON;").unwrap();

            let err = Exporter::new(&reader, &mut store, filter())
                .run(&RunContext::default())
                .unwrap_err();

            assert!(matches!(err, Error::DestinationUnwritable { .. }), "{:?}", err);
            assert!(err.is_fatal());
            // `b.o-2` never ran, so the shared record was read at most once
            assert!(reader.record_reads("s-1") <= 1);
            assert_eq!(reader.record_reads("bad-2"), 0);
        }
    }

    #[test]
    fn test_unwritable_codes() {
        let readonly = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(8), None);
        assert!(is_unwritable(&readonly));
        let constraint = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(19), None);
        assert!(!is_unwritable(&constraint));
    }
}
