//! Persisted trend state and history event types.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Current-trend row for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendState {
    pub symbol: String,
    pub up_trend: bool,
    pub down_trend: bool,
    pub heavy_volume_reversal: bool,
    pub trend_start_date: NaiveDate,
}

/// Trend derived from an optional stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentTrend {
    NoRecord,
    Up,
    Down,
}

impl CurrentTrend {
    /// A row with neither flag set has never held a trend and reads as
    /// `NoRecord`. A row with both flags set was not written by this crate;
    /// up is read first.
    pub fn of(state: Option<&TrendState>) -> Self {
        match state {
            Some(s) if s.up_trend => CurrentTrend::Up,
            Some(s) if s.down_trend => CurrentTrend::Down,
            _ => CurrentTrend::NoRecord,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Up,
    Down,
    HeavyVolumeReversal,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Up => "up",
            HistoryKind::Down => "down",
            HistoryKind::HeavyVolumeReversal => "heavy volume reversal",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trend type: {0}")]
pub struct UnknownTrendType(pub String);

impl FromStr for HistoryKind {
    type Err = UnknownTrendType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(HistoryKind::Up),
            "down" => Ok(HistoryKind::Down),
            "heavy volume reversal" => Ok(HistoryKind::HeavyVolumeReversal),
            other => Err(UnknownTrendType(other.to_string())),
        }
    }
}

/// Append-only history entry, keyed by (symbol, occurrence_date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendHistoryEvent {
    pub symbol: String,
    pub occurrence_date: NaiveDate,
    pub trend_type: HistoryKind,
}
