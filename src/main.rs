use clap::Parser;
use coffee_workflow::application::engine::WorkflowEngine;
use coffee_workflow::config::WorkflowConfig;
use coffee_workflow::domain::money::Currency;
use coffee_workflow::domain::ports::Stores;
use coffee_workflow::interfaces::csv::journal_reader::JournalReader;
use coffee_workflow::interfaces::csv::roster_reader::read_roster;
use coffee_workflow::interfaces::report::{Format, Report, ReportWriter};
use coffee_workflow::telemetry::init_tracing;
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Journal of workflow commands (CSV)
    journal: PathBuf,

    /// Users allowed to act on the workflow (CSV: user,name,department,role)
    #[arg(long, env = "COFFEE_WORKFLOW_ROSTER")]
    roster: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "COFFEE_WORKFLOW_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Currency requests and cash floats are kept in
    #[arg(long, env = "COFFEE_WORKFLOW_CURRENCY", default_value = "UGX")]
    currency: Currency,

    /// Requests below this amount need a single admin approval
    #[arg(long, env = "COFFEE_WORKFLOW_DUAL_ADMIN_THRESHOLD")]
    dual_admin_threshold: Option<Decimal>,

    /// Final state to print
    #[arg(long, value_enum, default_value_t = Report::Requests)]
    report: Report,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "COFFEE_WORKFLOW_LOG", default_value = "info")]
    log_level: String,
}

fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use coffee_workflow::infrastructure::rocksdb::RocksDBStore;
            let store = RocksDBStore::open(&path).into_diagnostic()?;
            info!(path = %path.display(), "using persistent storage");
            Ok(Stores::rocksdb(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "persistent storage requested but the 'storage-rocksdb' feature is not enabled, falling back to in-memory storage"
            );
            Ok(Stores::in_memory())
        }
        None => Ok(Stores::in_memory()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let roster = read_roster(File::open(&cli.roster).into_diagnostic()?).into_diagnostic()?;
    if roster.is_empty() {
        return Err(miette!("no users listed in roster {}", cli.roster.display()));
    }
    info!(users = roster.len(), "roster loaded");
    let config = WorkflowConfig::new(cli.currency).with_dual_admin_threshold(cli.dual_admin_threshold);
    let engine = WorkflowEngine::new(open_stores(cli.db_path)?, config);

    // Replay the journal; bad rows are logged and skipped
    let file = File::open(&cli.journal).into_diagnostic()?;
    let reader = JournalReader::new(file);
    let (mut applied, mut skipped) = (0usize, 0usize);
    for (line, entry) in reader.entries().enumerate() {
        // Header is line 1
        let line = line + 2;
        match entry {
            Ok(entry) => {
                let command = entry.command;
                match engine.apply(&roster, entry).await {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        skipped += 1;
                        warn!(line, %command, "Error processing command: {e}");
                    }
                }
            }
            Err(e) => {
                skipped += 1;
                warn!(line, "Error reading journal entry: {e}");
            }
        }
    }
    info!(applied, skipped, "journal replayed");

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock(), cli.format);
    writer
        .write_report(&engine, cli.report)
        .await
        .into_diagnostic()?;

    Ok(())
}
