use crate::exporter::{ExportIssue, ExportSummary, IssueKind};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct IssueRow {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Unit / Record")]
    pub subject: String,
    #[tabled(rename = "Reason")]
    pub message: String,
}

impl From<&ExportIssue> for IssueRow {
    fn from(issue: &ExportIssue) -> Self {
        let kind = match issue.kind {
            IssueKind::UnitRead => "unit",
            IssueKind::RecordDecode => "record",
            IssueKind::Storage => "storage",
            IssueKind::Other => "other",
        };
        Self {
            kind: kind.to_string(),
            subject: issue.subject.clone(),
            message: issue.message.clone(),
        }
    }
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn summary_table(summary: &ExportSummary) -> String {
    stats_table(&[
        ("Units processed", format!("{} / {}", summary.units_processed, summary.units_discovered)),
        ("Units failed", summary.units_failed.to_string()),
        ("Records decoded", summary.records_decoded.to_string()),
        ("Records already visited", summary.records_skipped_visited.to_string()),
        ("Records out of project", summary.records_skipped_out_of_project.to_string()),
        ("System records skipped", summary.records_skipped_system.to_string()),
        ("Records failed", summary.records_failed.to_string()),
        ("Symbols", summary.symbols_inserted.to_string()),
        (
            "Occurrences",
            format!("{} ({} rows)", summary.occurrences, summary.occurrence_rows),
        ),
        ("Relations", summary.relation_rows.to_string()),
    ])
}

pub fn issues_table(issues: &[ExportIssue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let rows: Vec<IssueRow> = issues.iter().map(IssueRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}
