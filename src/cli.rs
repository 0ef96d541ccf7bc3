//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_quote_source::CsvQuoteSource;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_store::MemoryStore;
use crate::adapters::stdout_notifier::StdoutNotifier;
use crate::domain::config::{ScreenerConfig, parse_end_date};
use crate::domain::error::TrendwatchError;
use crate::domain::screener::{RunSummary, Screener};
use crate::domain::trend::CurrentTrend;
use crate::logging::{self, LogSettings};
use crate::ports::config_port::ConfigPort;
use crate::ports::notification_port::NotificationSink;
use crate::ports::store_port::TrendStateStore;

#[derive(Parser, Debug)]
#[command(name = "trendwatch", about = "Daily moving-average trend screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen every configured symbol and print trend notifications
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Screen only this symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Last trading day of the window (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Keep trend state in memory; the database is not touched
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the trend tables if they do not exist
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Drop and recreate the trend tables
    ResetDb {
        #[arg(short, long)]
        config: PathBuf,
        /// Required; all trend state and history is lost
        #[arg(long)]
        yes: bool,
    },
    /// Show the stored trend for a symbol
    State {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// List recorded trend events for a symbol, oldest first
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            symbol,
            end_date,
            dry_run,
        } => run_screen(&config, symbol.as_deref(), end_date.as_deref(), dry_run),
        Command::InitDb { config } => run_init_db(&config),
        Command::ResetDb { config, yes } => run_reset_db(&config, yes),
        Command::State { config, symbol } => run_state(&config, &symbol),
        Command::History { config, symbol } => run_history(&config, &symbol),
    }
}

fn fail(err: TrendwatchError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(fail)?;
    let settings = LogSettings::from_config(&adapter).map_err(fail)?;
    logging::init(&settings).map_err(fail)?;
    Ok(adapter)
}

/// Apply command-line overrides on top of the file settings.
pub fn build_screener_config(
    adapter: &dyn ConfigPort,
    today: NaiveDate,
    symbol: Option<&str>,
    end_date: Option<&str>,
) -> Result<ScreenerConfig, TrendwatchError> {
    let mut config = ScreenerConfig::from_config(adapter, today)?;
    if let Some(end) = end_date {
        config.end_date = parse_end_date(end)?;
    }
    if let Some(symbol) = symbol.map(str::trim).filter(|s| !s.is_empty()) {
        config = config.with_symbol(symbol);
    }
    Ok(config)
}

fn quote_dir(adapter: &dyn ConfigPort) -> Result<PathBuf, TrendwatchError> {
    adapter
        .get_string("quotes", "csv_dir")
        .map(PathBuf::from)
        .ok_or_else(|| TrendwatchError::ConfigMissing {
            section: "quotes".into(),
            key: "csv_dir".into(),
        })
}

#[cfg(feature = "sqlite")]
fn open_store(adapter: &dyn ConfigPort) -> Result<crate::adapters::sqlite_store::SqliteStore, TrendwatchError> {
    let store = crate::adapters::sqlite_store::SqliteStore::from_config(adapter)?;
    store.initialize_schema()?;
    Ok(store)
}

#[cfg(feature = "sqlite")]
fn persistent_store(adapter: &dyn ConfigPort) -> Result<Box<dyn TrendStateStore>, TrendwatchError> {
    Ok(Box::new(open_store(adapter)?))
}

#[cfg(not(feature = "sqlite"))]
fn persistent_store(_adapter: &dyn ConfigPort) -> Result<Box<dyn TrendStateStore>, TrendwatchError> {
    Err(TrendwatchError::store(
        "built without the sqlite feature; use --dry-run",
    ))
}

/// Non-zero only when no symbol got through and failures explain why.
pub fn summary_exit_code(summary: &RunSummary) -> ExitCode {
    if summary.processed > 0 {
        return ExitCode::SUCCESS;
    }
    if summary.store_failures > 0 {
        ExitCode::from(3)
    } else if summary.total_fetch_failures() > 0 {
        ExitCode::from(4)
    } else if summary.skipped_insufficient > 0 {
        ExitCode::from(5)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\nScreened {} symbol(s)", summary.processed);
    if summary.skipped_insufficient > 0 {
        eprintln!("  skipped (short history): {}", summary.skipped_insufficient);
    }
    for (kind, count) in &summary.fetch_failures {
        eprintln!("  {} fetch failures: {}", kind, count);
    }
    if summary.store_failures > 0 {
        eprintln!("  store failures: {}", summary.store_failures);
    }
    if summary.dropped_records > 0 {
        eprintln!("  dropped records: {}", summary.dropped_records);
    }
    if summary.history_collisions > 0 {
        eprintln!("  same-day history collisions: {}", summary.history_collisions);
    }
    eprintln!("  notifications: {}", summary.notifications.len());
}

fn run_screen(
    config_path: &PathBuf,
    symbol: Option<&str>,
    end_date: Option<&str>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let today = Local::now().date_naive();
    let screener_config = match build_screener_config(&adapter, today, symbol, end_date) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let quotes = match quote_dir(&adapter) {
        Ok(dir) => CsvQuoteSource::new(dir),
        Err(e) => return fail(e),
    };

    let store: Box<dyn TrendStateStore> = if dry_run {
        eprintln!("Dry run: trend state kept in memory");
        Box::new(MemoryStore::new())
    } else {
        match persistent_store(&adapter) {
            Ok(s) => s,
            Err(e) => return fail(e),
        }
    };

    eprintln!(
        "Screening {} symbol(s) from {} to {}",
        screener_config.symbols.len(),
        screener_config.start_date(),
        screener_config.end_date
    );
    let summary = Screener::new(&quotes, store.as_ref(), &screener_config).run();

    if let Err(e) = StdoutNotifier::new().publish(&summary.notifications) {
        return fail(e);
    }
    print_summary(&summary);
    summary_exit_code(&summary)
}

#[cfg(feature = "sqlite")]
fn run_init_db(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match open_store(&adapter) {
        Ok(_) => {
            eprintln!("Trend tables ready");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

#[cfg(feature = "sqlite")]
fn run_reset_db(config_path: &PathBuf, yes: bool) -> ExitCode {
    if !yes {
        eprintln!("error: reset-db drops all trend state; pass --yes to confirm");
        return ExitCode::from(2);
    }
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match open_store(&adapter).and_then(|s| s.reset()) {
        Ok(()) => {
            eprintln!("Trend tables reset");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

#[cfg(not(feature = "sqlite"))]
fn run_init_db(_config_path: &PathBuf) -> ExitCode {
    eprintln!("error: sqlite feature is required for init-db");
    ExitCode::from(1)
}

#[cfg(not(feature = "sqlite"))]
fn run_reset_db(_config_path: &PathBuf, _yes: bool) -> ExitCode {
    eprintln!("error: sqlite feature is required for reset-db");
    ExitCode::from(1)
}

fn run_state(config_path: &PathBuf, symbol: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let store = match persistent_store(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let symbol = symbol.trim().to_uppercase();
    match store.get_state(&symbol) {
        Ok(state) => {
            match (CurrentTrend::of(state.as_ref()), &state) {
                (_, None) => println!("{symbol}: no record"),
                (trend, Some(s)) => println!(
                    "{symbol}: {:?} since {} (heavy volume reversal: {})",
                    trend, s.trend_start_date, s.heavy_volume_reversal
                ),
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_history(config_path: &PathBuf, symbol: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let store = match persistent_store(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let symbol = symbol.trim().to_uppercase();
    match store.list_history(&symbol) {
        Ok(events) => {
            if events.is_empty() {
                println!("{symbol}: no history");
            }
            for event in events {
                println!("{}  {}  {}", event.symbol, event.occurrence_date, event.trend_type);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
