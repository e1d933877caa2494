//! Role vocabulary - decomposition of occurrence and relation role bitsets
//!
//! Occurrence roles describe what an occurrence does with its symbol
//! (`Declaration`, `Call`, `Write`, ...). Relation roles describe how an
//! occurrence relates to another symbol (`ChildOf`, `CalledBy`, ...).
//! Both share one bitset; decomposition always yields tokens in the
//! declared order below so exports are deterministic.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single role bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolRole {
    Declaration,
    Definition,
    Reference,
    Read,
    Write,
    Call,
    Dynamic,
    AddressOf,
    Implicit,
    /// Macro `#undef`
    Undefinition,

    // Relation roles
    ChildOf,
    BaseOf,
    OverrideOf,
    ReceivedBy,
    CalledBy,
    ExtendedBy,
    AccessorOf,
    ContainedBy,
    IBTypeOf,
    SpecializationOf,
}

impl SymbolRole {
    /// Get the stored token for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolRole::Declaration => "Declaration",
            SymbolRole::Definition => "Definition",
            SymbolRole::Reference => "Reference",
            SymbolRole::Read => "Read",
            SymbolRole::Write => "Write",
            SymbolRole::Call => "Call",
            SymbolRole::Dynamic => "Dynamic",
            SymbolRole::AddressOf => "AddressOf",
            SymbolRole::Implicit => "Implicit",
            SymbolRole::Undefinition => "Undefinition",
            SymbolRole::ChildOf => "ChildOf",
            SymbolRole::BaseOf => "BaseOf",
            SymbolRole::OverrideOf => "OverrideOf",
            SymbolRole::ReceivedBy => "ReceivedBy",
            SymbolRole::CalledBy => "CalledBy",
            SymbolRole::ExtendedBy => "ExtendedBy",
            SymbolRole::AccessorOf => "AccessorOf",
            SymbolRole::ContainedBy => "ContainedBy",
            SymbolRole::IBTypeOf => "IBTypeOf",
            SymbolRole::SpecializationOf => "SpecializationOf",
        }
    }

    /// The bit this role occupies in a `SymbolRoleSet`
    pub fn bit(&self) -> u64 {
        let shift = match self {
            SymbolRole::Declaration => 0,
            SymbolRole::Definition => 1,
            SymbolRole::Reference => 2,
            SymbolRole::Read => 3,
            SymbolRole::Write => 4,
            SymbolRole::Call => 5,
            SymbolRole::Dynamic => 6,
            SymbolRole::AddressOf => 7,
            SymbolRole::Implicit => 8,
            SymbolRole::Undefinition => 9,
            SymbolRole::ChildOf => 10,
            SymbolRole::BaseOf => 11,
            SymbolRole::OverrideOf => 12,
            SymbolRole::ReceivedBy => 13,
            SymbolRole::CalledBy => 14,
            SymbolRole::ExtendedBy => 15,
            SymbolRole::AccessorOf => 16,
            SymbolRole::ContainedBy => 17,
            SymbolRole::IBTypeOf => 18,
            SymbolRole::SpecializationOf => 19,
        };
        1 << shift
    }

    /// All roles in canonical order
    pub fn all() -> &'static [SymbolRole] {
        &[
            SymbolRole::Declaration,
            SymbolRole::Definition,
            SymbolRole::Reference,
            SymbolRole::Read,
            SymbolRole::Write,
            SymbolRole::Call,
            SymbolRole::Dynamic,
            SymbolRole::AddressOf,
            SymbolRole::Implicit,
            SymbolRole::Undefinition,
            SymbolRole::ChildOf,
            SymbolRole::BaseOf,
            SymbolRole::OverrideOf,
            SymbolRole::ReceivedBy,
            SymbolRole::CalledBy,
            SymbolRole::ExtendedBy,
            SymbolRole::AccessorOf,
            SymbolRole::ContainedBy,
            SymbolRole::IBTypeOf,
            SymbolRole::SpecializationOf,
        ]
    }

    /// Check if this is a relation role (as opposed to an occurrence role)
    pub fn is_relation(&self) -> bool {
        self.bit() >= SymbolRole::ChildOf.bit()
    }
}

impl FromStr for SymbolRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SymbolRole::all()
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidToken(format!("Unknown symbol role: {}", s)))
    }
}

impl fmt::Display for SymbolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw role bitset as stored in a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolRoleSet(pub u64);

impl SymbolRoleSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, role: SymbolRole) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn with(mut self, role: SymbolRole) -> Self {
        self.0 |= role.bit();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Roles whose bit is set, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = SymbolRole> + '_ {
        SymbolRole::all().iter().copied().filter(|r| self.contains(*r))
    }

    /// Tokens of the roles whose bit is set, in canonical order
    pub fn role_names(&self) -> Vec<&'static str> {
        self.iter().map(|r| r.as_str()).collect()
    }

    /// Bits that have no token in the role vocabulary
    pub fn unknown_bits(&self) -> u64 {
        let known = SymbolRole::all().iter().fold(0u64, |acc, r| acc | r.bit());
        self.0 & !known
    }
}

impl FromIterator<SymbolRole> for SymbolRoleSet {
    fn from_iter<I: IntoIterator<Item = SymbolRole>>(iter: I) -> Self {
        iter.into_iter().fold(SymbolRoleSet::empty(), |set, r| set.with(r))
    }
}

impl fmt::Display for SymbolRoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.role_names().join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in SymbolRole::all() {
            let parsed: SymbolRole = role.as_str().parse().unwrap();
            assert_eq!(*role, parsed);
        }
    }

    #[test]
    fn test_bits_are_distinct() {
        let combined = SymbolRole::all().iter().fold(0u64, |acc, r| {
            assert_eq!(acc & r.bit(), 0, "{} overlaps", r);
            acc | r.bit()
        });
        assert_eq!(combined, (1 << 20) - 1);
    }

    #[test]
    fn test_canonical_order() {
        // Insertion order must not leak into the output
        let roles: SymbolRoleSet = [SymbolRole::Call, SymbolRole::Definition, SymbolRole::Declaration]
            .into_iter()
            .collect();
        assert_eq!(roles.role_names(), vec!["Declaration", "Definition", "Call"]);
    }

    #[test]
    fn test_relation_roles() {
        let roles = SymbolRoleSet(SymbolRole::CalledBy.bit() | SymbolRole::ContainedBy.bit());
        assert_eq!(roles.role_names(), vec!["CalledBy", "ContainedBy"]);
        assert!(SymbolRole::CalledBy.is_relation());
        assert!(!SymbolRole::Undefinition.is_relation());
    }

    #[test]
    fn test_empty_and_unknown_bits() {
        assert!(SymbolRoleSet::empty().role_names().is_empty());

        let roles = SymbolRoleSet(SymbolRole::Reference.bit() | (1 << 20) | (1 << 40));
        assert_eq!(roles.role_names(), vec!["Reference"]);
        assert_eq!(roles.unknown_bits(), (1 << 20) | (1 << 40));
    }

    #[test]
    fn test_display() {
        let roles = SymbolRoleSet(0b11);
        assert_eq!(roles.to_string(), "Declaration|Definition");
    }
}
