//! Database schema definitions

/// SQL to create the symbol table
pub const CREATE_SYMBOL_TABLE: &str = r#"
CREATE TABLE symbol (
    usr TEXT PRIMARY KEY,
    name TEXT,
    kind TEXT,
    subkind TEXT,
    language TEXT
)
"#;

/// SQL to create the occurrence table
/// One row per role; all rows of one physical occurrence share `id`
pub const CREATE_OCCURRENCE_TABLE: &str = r#"
CREATE TABLE occurrence (
    id INTEGER,
    symbol_usr TEXT,
    role TEXT,
    path TEXT,
    is_system BOOLEAN,
    line INTEGER,
    column INTEGER
)
"#;

/// SQL to create the relation table
pub const CREATE_RELATION_TABLE: &str = r#"
CREATE TABLE relation (
    occurrence_id INTEGER,
    symbol_usr TEXT,
    role TEXT
)
"#;

/// SQL to create lookup indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_occurrence_symbol ON occurrence(symbol_usr)",
    "CREATE INDEX IF NOT EXISTS idx_occurrence_path ON occurrence(path)",
    "CREATE INDEX IF NOT EXISTS idx_relation_occurrence ON relation(occurrence_id)",
    "CREATE INDEX IF NOT EXISTS idx_relation_symbol ON relation(symbol_usr)",
];

/// First writer wins; a second insert of the same usr is a no-op
pub const INSERT_SYMBOL: &str =
    "INSERT OR IGNORE INTO symbol (usr, name, kind, subkind, language) VALUES (?1, ?2, ?3, ?4, ?5)";

pub const INSERT_OCCURRENCE: &str = "INSERT INTO occurrence (id, symbol_usr, role, path, is_system, line, column) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

pub const INSERT_RELATION: &str =
    "INSERT INTO relation (occurrence_id, symbol_usr, role) VALUES (?1, ?2, ?3)";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_SYMBOL_TABLE, CREATE_OCCURRENCE_TABLE, CREATE_RELATION_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
