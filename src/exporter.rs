//! Relational exporter
//!
//! Drives a run: enumerate units, walk each unit's dependencies, decode every
//! in-project record once, and write its rows inside that unit's transaction.
//!
//! All run state (visited records, failed records, the occurrence counter)
//! lives on the `Exporter` instance, so independent runs never share it.
//! Occurrence ids follow unit discovery order and dependency order; they are
//! only stable across runs when both orders are.

use crate::context::{Interruption, RunContext};
use crate::datastore::IndexStoreReader;
use crate::decoder::{DecodedRecord, RecordDecoder};
use crate::path::{ExclusionReason, PathDecision, PathFilter};
use crate::storage::{OccurrenceSite, SqliteStore, UnitWriter};
use crate::ui::{ProgressMessage, ProgressPhase};
use crate::walker::{DependencyRef, DependencyWalker};
use crate::{Error, Result};
use crossbeam::channel::Sender;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, error, info, warn};

/// What went wrong with one unit or record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnitRead,
    RecordDecode,
    Storage,
    Other,
}

/// A contained failure reported in the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportIssue {
    pub kind: IssueKind,
    /// Unit or record name
    pub subject: String,
    pub message: String,
}

impl ExportIssue {
    fn from_error(subject: &str, err: &Error) -> Self {
        let (kind, message) = match err {
            Error::UnitRead { reason, .. } => (IssueKind::UnitRead, reason.clone()),
            Error::RecordDecode { reason, .. } => (IssueKind::RecordDecode, reason.clone()),
            Error::Storage(e) => (IssueKind::Storage, e.to_string()),
            other => (IssueKind::Other, other.to_string()),
        };
        Self {
            kind,
            subject: subject.to_string(),
            message,
        }
    }
}

/// Rows and records produced by one committed unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitReport {
    pub unit: String,
    pub records_decoded: usize,
    pub records_skipped_visited: usize,
    pub records_skipped_out_of_project: usize,
    pub records_skipped_system: usize,
    pub symbols_inserted: usize,
    pub occurrences: usize,
    pub occurrence_rows: usize,
    pub relation_rows: usize,
}

/// Counts for a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    pub units_discovered: usize,
    pub units_processed: usize,
    pub units_failed: usize,
    pub records_decoded: usize,
    pub records_skipped_visited: usize,
    pub records_skipped_out_of_project: usize,
    pub records_skipped_system: usize,
    pub records_failed: usize,
    pub symbols_inserted: usize,
    pub occurrences: usize,
    pub occurrence_rows: usize,
    pub relation_rows: usize,
    pub issues: Vec<ExportIssue>,
    pub interrupted: Option<Interruption>,
}

impl ExportSummary {
    fn absorb(&mut self, report: &UnitReport) {
        self.units_processed += 1;
        self.records_decoded += report.records_decoded;
        self.records_skipped_visited += report.records_skipped_visited;
        self.records_skipped_out_of_project += report.records_skipped_out_of_project;
        self.records_skipped_system += report.records_skipped_system;
        self.symbols_inserted += report.symbols_inserted;
        self.occurrences += report.occurrences;
        self.occurrence_rows += report.occurrence_rows;
        self.relation_rows += report.relation_rows;
    }

    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Export Summary:")?;
        writeln!(
            f,
            "  Units: {} processed, {} failed, {} discovered",
            self.units_processed, self.units_failed, self.units_discovered
        )?;
        writeln!(
            f,
            "  Records: {} decoded, {} already visited, {} out of project, {} system, {} failed",
            self.records_decoded,
            self.records_skipped_visited,
            self.records_skipped_out_of_project,
            self.records_skipped_system,
            self.records_failed
        )?;
        writeln!(f, "  Symbols: {}", self.symbols_inserted)?;
        writeln!(f, "  Occurrences: {} ({} rows)", self.occurrences, self.occurrence_rows)?;
        writeln!(f, "  Relations: {}", self.relation_rows)?;
        if let Some(reason) = self.interrupted {
            writeln!(f, "  Interrupted: {}", reason)?;
        }
        Ok(())
    }
}

pub struct Exporter<'a> {
    reader: &'a dyn IndexStoreReader,
    store: &'a mut SqliteStore,
    filter: PathFilter,
    visited: HashSet<String>,
    failed_records: HashSet<String>,
    record_issues: Vec<ExportIssue>,
    next_occurrence_id: i64,
    progress: Option<Sender<ProgressMessage>>,
}

impl<'a> Exporter<'a> {
    pub fn new(reader: &'a dyn IndexStoreReader, store: &'a mut SqliteStore, filter: PathFilter) -> Self {
        Self {
            reader,
            store,
            filter,
            visited: HashSet::new(),
            failed_records: HashSet::new(),
            record_issues: Vec::new(),
            next_occurrence_id: 0,
            progress: None,
        }
    }

    /// Report unit progress over `tx`
    pub fn with_progress(mut self, tx: Sender<ProgressMessage>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Records decoded and committed so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// The id the next emitted occurrence will get
    pub fn next_occurrence_id(&self) -> i64 {
        self.next_occurrence_id
    }

    fn send(&self, msg: ProgressMessage) {
        if let Some(tx) = &self.progress {
            // A closed receiver only means nobody is rendering
            let _ = tx.send(msg);
        }
    }

    /// Export every unit of the store.
    ///
    /// Only store-not-found and destination-unwritable conditions fail the
    /// run. Unit and record failures are logged and collected in the summary.
    pub fn run(&mut self, ctx: &RunContext) -> Result<ExportSummary> {
        info!("Discovering units");
        self.send(ProgressMessage::Started {
            phase: ProgressPhase::Discovering,
            total: 0,
        });
        let units = self.reader.list_units()?;
        self.send(ProgressMessage::Finished {
            phase: ProgressPhase::Discovering,
        });
        info!("Found {} units", units.len());

        let mut summary = ExportSummary {
            units_discovered: units.len(),
            ..Default::default()
        };

        self.send(ProgressMessage::Started {
            phase: ProgressPhase::Exporting,
            total: units.len(),
        });

        for (idx, unit) in units.iter().enumerate() {
            if let Some(reason) = ctx.check() {
                warn!("Stopping before unit {} of {}: {}", idx + 1, units.len(), reason);
                summary.interrupted = Some(reason);
                break;
            }

            match self.dump_unit(unit) {
                Ok(report) => {
                    debug!(
                        "Unit {}: {} records, {} occurrences",
                        unit, report.records_decoded, report.occurrences
                    );
                    summary.absorb(&report);
                }
                Err(e) if e.is_fatal() => {
                    error!("Aborting export at unit {}: {}", unit, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Skipping unit {}: {}", unit, e);
                    summary.units_failed += 1;
                    summary.issues.push(ExportIssue::from_error(unit, &e));
                    self.send(ProgressMessage::UnitFailed(unit.clone()));
                }
            }

            summary.records_failed += self.record_issues.len();
            summary.issues.append(&mut self.record_issues);

            self.send(ProgressMessage::Progress {
                phase: ProgressPhase::Exporting,
                current: idx + 1,
                unit: Some(unit.clone()),
            });
        }

        self.send(ProgressMessage::Finished {
            phase: ProgressPhase::Exporting,
        });
        info!(
            "Exported {} of {} units ({} failed)",
            summary.units_processed, summary.units_discovered, summary.units_failed
        );
        Ok(summary)
    }

    /// Export one unit inside its own transaction.
    ///
    /// On error nothing of the unit is committed and the visited set is left
    /// as it was. Record decode failures do not fail the unit.
    pub fn dump_unit(&mut self, unit: &str) -> Result<UnitReport> {
        let deps = DependencyWalker::new(self.reader).dependencies(unit)?;
        let result = self.write_unit(unit, &deps);
        result.map_err(|e| self.store.escalate(e))
    }

    fn write_unit(&mut self, unit: &str, deps: &[DependencyRef]) -> Result<UnitReport> {
        let decoder = RecordDecoder::new(self.reader);
        let mut report = UnitReport {
            unit: unit.to_string(),
            ..Default::default()
        };
        let mut decoded_here: Vec<String> = Vec::new();

        let writer = self.store.begin_unit()?;

        for dep in deps {
            let DependencyRef::Record {
                name,
                file_path,
                is_system,
            } = dep
            else {
                continue;
            };

            let path = match self.filter.classify(file_path, *is_system) {
                PathDecision::InProject { path, .. } => path,
                PathDecision::Excluded(ExclusionReason::SystemHeader) => {
                    debug!("Skipping system record {} ({})", name, file_path);
                    report.records_skipped_system += 1;
                    continue;
                }
                PathDecision::Excluded(ExclusionReason::OutsideProject) => {
                    debug!("Skipping out-of-project record {} ({})", name, file_path);
                    report.records_skipped_out_of_project += 1;
                    continue;
                }
            };

            if self.visited.contains(name) || decoded_here.contains(name) {
                report.records_skipped_visited += 1;
                continue;
            }
            if self.failed_records.contains(name) {
                debug!("Skipping record {} that failed earlier", name);
                continue;
            }

            let record = match decoder.decode(name) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping record {}: {}", name, e);
                    self.failed_records.insert(name.clone());
                    self.record_issues.push(ExportIssue::from_error(name, &e));
                    continue;
                }
            };

            let site = OccurrenceSite {
                path: &path,
                is_system: *is_system,
                line: 0,
                column: 0,
            };
            emit_record(&writer, &record, site, &mut self.next_occurrence_id, &mut report)?;
            report.records_decoded += 1;
            decoded_here.push(name.clone());
        }

        writer.commit()?;
        self.visited.extend(decoded_here);
        Ok(report)
    }
}

/// Write the symbol, occurrence, and relation rows of one decoded record
fn emit_record(
    writer: &UnitWriter<'_>,
    record: &DecodedRecord,
    file: OccurrenceSite<'_>,
    next_id: &mut i64,
    report: &mut UnitReport,
) -> Result<()> {
    for decl in record.declarations() {
        if writer.insert_symbol(&decl.usr, &decl.name, &decl.info)? {
            report.symbols_inserted += 1;
        }
    }

    for occurrence in record.occurrences() {
        let id = *next_id;
        let usr = &occurrence.declaration.usr;
        let site = OccurrenceSite {
            line: occurrence.line,
            column: occurrence.column,
            ..file
        };

        if occurrence.roles.unknown_bits() != 0 {
            debug!(
                "Occurrence {} of {} has unknown role bits {:#x}",
                id,
                usr,
                occurrence.roles.unknown_bits()
            );
        }

        for role in occurrence.roles.iter() {
            writer.insert_occurrence(id, usr, role, &site)?;
            report.occurrence_rows += 1;
        }
        for relation in &occurrence.relations {
            for role in relation.roles.iter() {
                writer.insert_relation(id, &relation.declaration.usr, role)?;
                report.relation_rows += 1;
            }
        }

        // One id per occurrence, however many role rows it produced
        *next_id += 1;
        report.occurrences += 1;
    }
    Ok(())
}
