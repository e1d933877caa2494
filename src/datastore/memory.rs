//! In-memory index store
//!
//! Useful for embedding the exporter behind another reader and for tests.
//! Units keep insertion order; record reads are counted.

use super::model::{RawRecord, UnitDependency};
use super::IndexStoreReader;
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryIndexStore {
    units: Vec<(String, Vec<UnitDependency>)>,
    records: HashMap<String, RawRecord>,
    broken_units: HashMap<String, String>,
    broken_records: HashMap<String, String>,
    record_reads: RefCell<HashMap<String, usize>>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit with its dependency list
    pub fn add_unit(&mut self, name: impl Into<String>, dependencies: Vec<UnitDependency>) -> &mut Self {
        self.units.push((name.into(), dependencies));
        self
    }

    /// Add a unit whose dependency list cannot be read
    pub fn add_broken_unit(&mut self, name: impl Into<String>, reason: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.units.push((name.clone(), Vec::new()));
        self.broken_units.insert(name, reason.into());
        self
    }

    pub fn add_record(&mut self, name: impl Into<String>, record: RawRecord) -> &mut Self {
        self.records.insert(name.into(), record);
        self
    }

    /// Add a record that fails to decode
    pub fn add_broken_record(&mut self, name: impl Into<String>, reason: impl Into<String>) -> &mut Self {
        self.broken_records.insert(name.into(), reason.into());
        self
    }

    /// How many times `record` has been read
    pub fn record_reads(&self, record: &str) -> usize {
        self.record_reads.borrow().get(record).copied().unwrap_or(0)
    }
}

impl IndexStoreReader for MemoryIndexStore {
    fn list_units(&self) -> Result<Vec<String>> {
        Ok(self.units.iter().map(|(name, _)| name.clone()).collect())
    }

    fn unit_dependencies(&self, unit: &str) -> Result<Vec<UnitDependency>> {
        if let Some(reason) = self.broken_units.get(unit) {
            return Err(Error::UnitRead {
                unit: unit.to_string(),
                reason: reason.clone(),
            });
        }
        self.units
            .iter()
            .find(|(name, _)| name == unit)
            .map(|(_, deps)| deps.clone())
            .ok_or_else(|| Error::UnitRead {
                unit: unit.to_string(),
                reason: "unit not found".to_string(),
            })
    }

    fn read_record(&self, record: &str) -> Result<RawRecord> {
        *self.record_reads.borrow_mut().entry(record.to_string()).or_insert(0) += 1;

        if let Some(reason) = self.broken_records.get(record) {
            return Err(Error::RecordDecode {
                record: record.to_string(),
                reason: reason.clone(),
            });
        }
        self.records.get(record).cloned().ok_or_else(|| Error::RecordDecode {
            record: record.to_string(),
            reason: "record not found".to_string(),
        })
    }
}
