//! indexdump CLI - export a clang index store into SQLite

use anyhow::Context;
use clap::Parser;
use indexdump::config::{load_config, DumpConfig, DumpSettings};
use indexdump::output::is_quiet;
use indexdump::ui::{self, ProgressManager};
use indexdump::{CancellationToken, Exporter, FsIndexStore, PathFilter, RunContext, SqliteStore};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "indexdump")]
#[command(version = "0.1.0")]
#[command(about = "Export a clang index store into a SQLite database")]
#[command(long_about = r#"
Reads the unit and record files of an index store and writes three tables:
  symbol(usr, name, kind, subkind, language)
  occurrence(id, symbol_usr, role, path, is_system, line, column)
  relation(occurrence_id, symbol_usr, role)

Only records for files under --project-path are exported; their paths are
stored relative to it. The destination database is replaced on every run.

Example usage:
  indexdump --output-db index.sqlite3 \
            --index-datastore-path build/index-store \
            --project-path $PWD
"#)]
struct Cli {
    /// Destination SQLite database (overwritten if present)
    #[arg(long)]
    output_db: Option<PathBuf>,

    /// Root directory of the index store
    #[arg(long)]
    index_datastore_path: Option<PathBuf>,

    /// Project root; records outside it are not exported
    #[arg(long)]
    project_path: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = "indexdump.toml")]
    config: PathBuf,

    /// Compare paths against the project root ignoring case
    #[arg(long)]
    case_insensitive_paths: bool,

    /// Skip records flagged as system headers, even inside the project
    #[arg(long)]
    exclude_system: bool,

    /// Stop after this many seconds (between units)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> DumpConfig {
        DumpConfig {
            output_db: self.output_db.clone(),
            index_datastore_path: self.index_datastore_path.clone(),
            project_path: self.project_path.clone(),
            case_insensitive_paths: self.case_insensitive_paths.then_some(true),
            exclude_system: self.exclude_system.then_some(true),
            timeout_secs: self.timeout,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = load_config(Some(cli.config.as_path()))
        .with_context(|| format!("Failed to read config {}", cli.config.display()))?
        .unwrap_or_default();
    let settings = file_config.merge(cli.overrides()).resolve()?;

    let cancel = CancellationToken::new();
    #[cfg(unix)]
    {
        use signal_hook::consts::signal;
        for sig in [signal::SIGINT, signal::SIGTERM] {
            signal_hook::flag::register(sig, cancel.flag()).context("Failed to install signal handler")?;
        }
    }

    let mut ctx = RunContext::new(cancel);
    if let Some(timeout) = settings.timeout {
        ctx = ctx.with_timeout(timeout);
    }

    let decorate = !cli.json && !is_quiet();
    match run(&settings, &ctx, decorate) {
        Ok(summary) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if decorate {
                ui::section("Summary");
                println!("{}", ui::summary_table(&summary));
                if !summary.issues.is_empty() {
                    ui::section("Skipped");
                    println!("{}", ui::issues_table(&summary.issues));
                }
            } else {
                print!("{}", summary);
            }

            if let Some(reason) = summary.interrupted {
                anyhow::bail!("export {} after {} of {} units", reason, summary.units_processed, summary.units_discovered);
            }
            Ok(())
        }
        Err(e) if decorate => {
            ui::error(&format!("{:#}", e));
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

fn run(settings: &DumpSettings, ctx: &RunContext, decorate: bool) -> anyhow::Result<indexdump::ExportSummary> {
    let started = Instant::now();

    if decorate {
        ui::header("Exporting index store");
        ui::info("Data store", &settings.index_datastore_path.display().to_string());
        ui::info("Project", &settings.project_path.display().to_string());
        ui::info("Database", &settings.output_db.display().to_string());
    }

    let reader = FsIndexStore::open(&settings.index_datastore_path)
        .with_context(|| format!("Cannot open index store {}", settings.index_datastore_path.display()))?;
    let filter = PathFilter::new(&settings.project_path, settings.case)?.with_exclude_system(settings.exclude_system);
    let mut store = SqliteStore::create(&settings.output_db)
        .with_context(|| format!("Cannot create database {}", settings.output_db.display()))?;

    let (mut progress, tx) = ProgressManager::new();
    let result = {
        let mut exporter = Exporter::new(&reader, &mut store, filter);
        if decorate {
            exporter = exporter.with_progress(tx);
        } else {
            drop(tx);
        }
        exporter.run(ctx)
    };
    progress.join();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            progress.clear();
            return Err(e.into());
        }
    };

    if decorate {
        progress.finish_with_summary(started.elapsed(), summary.units_processed, summary.symbols_inserted, summary.occurrences);
        if summary.units_failed > 0 || summary.records_failed > 0 {
            ui::warn(&format!(
                "{} units and {} records were skipped",
                summary.units_failed, summary.records_failed
            ));
        } else {
            ui::success("All units exported");
        }
        ui::timing(&format!("{:.2?}", started.elapsed()));
    } else {
        progress.clear();
    }

    tracing::debug!("{}", store.stats()?);
    Ok(summary)
}
