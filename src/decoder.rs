//! Record decoding
//!
//! Turns one raw record into declarations and occurrences whose declaration
//! references are resolved. All references are validated up front, so a
//! malformed record fails as a whole before any of it is emitted.

use crate::datastore::{IndexStoreReader, RawDeclaration, RawOccurrence};
use crate::role::SymbolRoleSet;
use crate::symbol::SymbolInfo;
use crate::{Error, Result};

/// A named program entity declared in a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Cross translation unit identity
    pub usr: String,
    pub name: String,
    pub info: SymbolInfo,
}

impl From<RawDeclaration> for Declaration {
    fn from(raw: RawDeclaration) -> Self {
        Self {
            usr: raw.usr,
            name: raw.name,
            info: raw.info,
        }
    }
}

/// Edge from an occurrence to a related declaration
#[derive(Debug, Clone, Copy)]
pub struct Relation<'a> {
    pub declaration: &'a Declaration,
    pub roles: SymbolRoleSet,
}

/// One appearance of a declaration at a source position
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    pub declaration: &'a Declaration,
    pub roles: SymbolRoleSet,
    /// 1-based
    pub line: u32,
    /// 1-based
    pub column: u32,
    pub relations: Vec<Relation<'a>>,
}

/// A validated record
#[derive(Debug)]
pub struct DecodedRecord {
    name: String,
    declarations: Vec<Declaration>,
    occurrences: Vec<RawOccurrence>,
}

impl DecodedRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    /// Occurrences in record order, resolved lazily
    pub fn occurrences(&self) -> impl Iterator<Item = Occurrence<'_>> + '_ {
        self.occurrences.iter().map(move |occ| Occurrence {
            declaration: &self.declarations[occ.decl],
            roles: occ.roles,
            line: occ.line,
            column: occ.column,
            relations: occ
                .relations
                .iter()
                .map(|rel| Relation {
                    declaration: &self.declarations[rel.decl],
                    roles: rel.roles,
                })
                .collect(),
        })
    }
}

/// Stateless record decoder over an index store reader
pub struct RecordDecoder<'r> {
    reader: &'r dyn IndexStoreReader,
}

impl<'r> RecordDecoder<'r> {
    pub fn new(reader: &'r dyn IndexStoreReader) -> Self {
        Self { reader }
    }

    /// Read and validate one record (fails with `RecordDecode`)
    pub fn decode(&self, record: &str) -> Result<DecodedRecord> {
        let raw = self.reader.read_record(record).map_err(|e| match e {
            Error::RecordDecode { .. } => e,
            other => Error::RecordDecode {
                record: record.to_string(),
                reason: other.to_string(),
            },
        })?;

        let malformed = |reason: String| Error::RecordDecode {
            record: record.to_string(),
            reason,
        };

        let decl_count = raw.declarations.len();
        for (idx, occ) in raw.occurrences.iter().enumerate() {
            if occ.decl >= decl_count {
                return Err(malformed(format!(
                    "occurrence {} refers to missing declaration {}",
                    idx, occ.decl
                )));
            }
            if occ.line == 0 || occ.column == 0 {
                return Err(malformed(format!(
                    "occurrence {} has invalid position {}:{}",
                    idx, occ.line, occ.column
                )));
            }
            if let Some(rel) = occ.relations.iter().find(|rel| rel.decl >= decl_count) {
                return Err(malformed(format!(
                    "relation of occurrence {} refers to missing declaration {}",
                    idx, rel.decl
                )));
            }
        }

        Ok(DecodedRecord {
            name: record.to_string(),
            declarations: raw.declarations.into_iter().map(Declaration::from).collect(),
            occurrences: raw.occurrences,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{MemoryIndexStore, RawRecord};
    use crate::role::SymbolRole;
    use crate::symbol::{SymbolKind, SymbolLanguage, SymbolSubKind};

    fn function() -> SymbolInfo {
        SymbolInfo::new(SymbolKind::Function, SymbolSubKind::None, SymbolLanguage::C)
    }

    #[test]
    fn test_decode_resolves_references() {
        let mut record = RawRecord::new();
        let foo = record.declare("c:@F@foo", "foo", function());
        let main = record.declare("c:@F@main", "main", function());
        record.add_occurrence(
            RawOccurrence::new(foo, &[SymbolRole::Reference, SymbolRole::Call], 3, 5)
                .with_relation(main, &[SymbolRole::CalledBy, SymbolRole::ContainedBy]),
        );

        let mut store = MemoryIndexStore::new();
        store.add_record("main.c-1A", record);

        let decoded = RecordDecoder::new(&store).decode("main.c-1A").unwrap();
        assert_eq!(decoded.name(), "main.c-1A");
        assert_eq!(decoded.declarations().len(), 2);

        let occurrences: Vec<_> = decoded.occurrences().collect();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].declaration.usr, "c:@F@foo");
        assert_eq!(occurrences[0].relations[0].declaration.usr, "c:@F@main");
        assert_eq!(occurrences[0].relations[0].roles.role_names(), vec!["CalledBy", "ContainedBy"]);
    }

    #[test]
    fn test_dangling_reference_is_decode_error() {
        let mut record = RawRecord::new();
        record.declare("c:@F@foo", "foo", function());
        record.add_occurrence(RawOccurrence::new(0, &[SymbolRole::Reference], 1, 1).with_relation(7, &[]));

        let mut store = MemoryIndexStore::new();
        store.add_record("bad-1", record);

        match RecordDecoder::new(&store).decode("bad-1") {
            Err(Error::RecordDecode { record, reason }) => {
                assert_eq!(record, "bad-1");
                assert!(reason.contains("missing declaration 7"));
            }
            other => panic!("expected RecordDecode, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_position_is_decode_error() {
        let mut record = RawRecord::new();
        record.declare("c:@F@foo", "foo", function());
        record.add_occurrence(RawOccurrence::new(0, &[SymbolRole::Reference], 0, 4));

        let mut store = MemoryIndexStore::new();
        store.add_record("zero-1", record);

        assert!(matches!(
            RecordDecoder::new(&store).decode("zero-1"),
            Err(Error::RecordDecode { .. })
        ));
    }

    #[test]
    fn test_unreadable_record() {
        let store = MemoryIndexStore::new();
        assert!(matches!(
            RecordDecoder::new(&store).decode("nowhere-00"),
            Err(Error::RecordDecode { .. })
        ));
    }
}
