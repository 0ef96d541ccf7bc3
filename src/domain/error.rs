//! Domain error types.

use std::fmt;

/// Category of an upstream quote fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FetchErrorKind {
    /// The source answered with something of the wrong shape (or nothing).
    Type,
    /// The source could not be reached.
    Connection,
    /// The source answered but the expected entries were missing.
    Index,
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Type => write!(f, "type"),
            FetchErrorKind::Connection => write!(f, "connection"),
            FetchErrorKind::Index => write!(f, "index"),
            FetchErrorKind::Other => write!(f, "other"),
        }
    }
}

/// A failed quote fetch for one symbol.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error fetching {symbol}: {reason}")]
pub struct FetchError {
    pub symbol: String,
    pub kind: FetchErrorKind,
    pub reason: String,
}

impl FetchError {
    pub fn new(symbol: &str, kind: FetchErrorKind, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Top-level error type for trendwatch.
#[derive(Debug, thiserror::Error)]
pub enum TrendwatchError {
    #[error("store unavailable: {reason}")]
    Store { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed record for {symbol}: {field} {reason}")]
    MalformedRecord {
        symbol: String,
        field: String,
        reason: String,
    },

    #[error("insufficient history for {symbol}: have {days} days, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        days: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendwatchError {
    pub fn store(reason: impl fmt::Display) -> Self {
        TrendwatchError::Store {
            reason: reason.to_string(),
        }
    }
}

impl From<&TrendwatchError> for std::process::ExitCode {
    fn from(err: &TrendwatchError) -> Self {
        let code: u8 = match err {
            TrendwatchError::Io(_) => 1,
            TrendwatchError::ConfigParse { .. }
            | TrendwatchError::ConfigMissing { .. }
            | TrendwatchError::ConfigInvalid { .. } => 2,
            TrendwatchError::Store { .. } => 3,
            TrendwatchError::Fetch(_) => 4,
            TrendwatchError::MalformedRecord { .. }
            | TrendwatchError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
