//! Raw index store model - units, dependencies and records as the reader yields them

use crate::role::{SymbolRole, SymbolRoleSet};
use crate::symbol::SymbolInfo;
use serde::{Deserialize, Serialize};

/// What a unit dependency points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Another unit (e.g. an imported module)
    Unit,
    /// A shared record holding declarations and occurrences
    Record,
    /// A plain file dependency with no record
    File,
}

/// One entry of a unit's dependency list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDependency {
    pub kind: DependencyKind,
    /// Unit or record name; empty for `File` dependencies
    #[serde(default)]
    pub name: String,
    /// Absolute path of the source file this dependency describes
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub module_name: Option<String>,
}

impl UnitDependency {
    pub fn record(name: impl Into<String>, file_path: impl Into<String>, is_system: bool) -> Self {
        Self {
            kind: DependencyKind::Record,
            name: name.into(),
            file_path: file_path.into(),
            is_system,
            module_name: None,
        }
    }

    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            kind: DependencyKind::Unit,
            name: name.into(),
            file_path: String::new(),
            is_system: false,
            module_name: None,
        }
    }

    pub fn file(file_path: impl Into<String>, is_system: bool) -> Self {
        Self {
            kind: DependencyKind::File,
            name: String::new(),
            file_path: file_path.into(),
            is_system,
            module_name: None,
        }
    }
}

/// Contents of a unit file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitFile {
    #[serde(default)]
    pub main_file: Option<String>,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<UnitDependency>,
}

/// A declaration as stored in a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub usr: String,
    pub name: String,
    #[serde(flatten)]
    pub info: SymbolInfo,
}

/// Edge from an occurrence to another declaration of the same record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRelation {
    /// Index into the record's declarations
    pub decl: usize,
    pub roles: SymbolRoleSet,
}

/// An occurrence as stored in a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOccurrence {
    /// Index into the record's declarations
    pub decl: usize,
    pub roles: SymbolRoleSet,
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub relations: Vec<RawRelation>,
}

impl RawOccurrence {
    pub fn new(decl: usize, roles: &[SymbolRole], line: u32, column: u32) -> Self {
        Self {
            decl,
            roles: roles.iter().copied().collect(),
            line,
            column,
            relations: Vec::new(),
        }
    }

    pub fn with_relation(mut self, decl: usize, roles: &[SymbolRole]) -> Self {
        self.relations.push(RawRelation {
            decl,
            roles: roles.iter().copied().collect(),
        });
        self
    }
}

/// Contents of a record file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub declarations: Vec<RawDeclaration>,
    #[serde(default)]
    pub occurrences: Vec<RawOccurrence>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration, returning its index for occurrences to refer to
    pub fn declare(&mut self, usr: impl Into<String>, name: impl Into<String>, info: SymbolInfo) -> usize {
        self.declarations.push(RawDeclaration {
            usr: usr.into(),
            name: name.into(),
            info,
        });
        self.declarations.len() - 1
    }

    pub fn add_occurrence(&mut self, occurrence: RawOccurrence) {
        self.occurrences.push(occurrence);
    }
}
