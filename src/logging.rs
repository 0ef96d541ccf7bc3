//! Tracing subscriber setup.

use crate::domain::error::TrendwatchError;
use crate::ports::config_port::ConfigPort;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Append log lines here instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            file: None,
        }
    }
}

impl LogSettings {
    /// Reads `[logging] level` and `[logging] file`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrendwatchError> {
        let level_str = config
            .get_string("logging", "level")
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let level = level_str
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| TrendwatchError::ConfigInvalid {
                section: "logging".into(),
                key: "level".into(),
                reason: format!("unknown log level '{level_str}'"),
            })?;

        let file = config
            .get_string("logging", "file")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self { level, file })
    }
}

fn filter_for(level: LevelFilter) -> EnvFilter {
    // RUST_LOG wins over the configured level.
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(settings: &LogSettings) -> Result<(), TrendwatchError> {
    let file = match &settings.file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    INIT.call_once(|| {
        let filter = filter_for(settings.level);
        // try_init: a test harness may already own the global subscriber.
        let _ = match file {
            Some(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init(),
            None => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };

        tracing::debug!(level = %settings.level, file = ?settings.file, "logging initialised");
    });

    Ok(())
}
