//! Trend signal classification and the heavy-volume-reversal event.

use crate::domain::indicator::IndicatorSet;
use crate::domain::trading_day::TradingDay;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Up,
    Down,
    Neutral,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Up => write!(f, "up"),
            Classification::Down => write!(f, "down"),
            Classification::Neutral => write!(f, "neutral"),
        }
    }
}

/// Today's classification plus the independent reversal flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub classification: Classification,
    pub heavy_volume_reversal: bool,
}

/// Limits for the heavy-volume-reversal check.
#[derive(Debug, Clone, PartialEq)]
pub struct ReversalThresholds {
    pub min_volume: u64,
    pub min_close: f64,
    pub max_close: f64,
    /// yesterday close / today close must stay below this.
    pub max_prior_close_ratio: f64,
    /// yesterday volume / today volume must exceed this.
    pub min_prior_volume_ratio: f64,
}

impl Default for ReversalThresholds {
    fn default() -> Self {
        Self {
            min_volume: 250_000,
            min_close: 5.0,
            max_close: 10.0,
            max_prior_close_ratio: 0.5,
            min_prior_volume_ratio: 0.25,
        }
    }
}

pub fn up_signal(ind: &IndicatorSet) -> bool {
    ind.sma10 > ind.ema20 || ind.sma10 > ind.ema30
}

pub fn down_signal(ind: &IndicatorSet) -> bool {
    ind.sma10 < ind.ema20 || ind.sma10 < ind.ema30
}

/// Up wins whenever it fires; Down is only considered when Up does not.
pub fn classify_trend(ind: &IndicatorSet) -> Classification {
    if up_signal(ind) {
        Classification::Up
    } else if down_signal(ind) {
        Classification::Down
    } else {
        Classification::Neutral
    }
}

pub fn is_heavy_volume_reversal(
    today: &TradingDay,
    yesterday: &TradingDay,
    limits: &ReversalThresholds,
) -> bool {
    if today.volume == 0 || yesterday.volume == 0 {
        return false;
    }

    let volume = today.volume as f64;
    let prior_volume = yesterday.volume as f64;

    today.volume >= limits.min_volume
        && today.close >= limits.min_close
        && today.close <= limits.max_close
        && yesterday.close / today.close < limits.max_prior_close_ratio
        && prior_volume / volume > limits.min_prior_volume_ratio
        && today.close > yesterday.close
        && today.volume > yesterday.volume
}

/// Classify a symbol from its indicators and its two most recent days.
/// Without a previous day the reversal check cannot run and stays false.
pub fn classify(
    ind: &IndicatorSet,
    latest: &TradingDay,
    previous: Option<&TradingDay>,
    limits: &ReversalThresholds,
) -> Signal {
    Signal {
        classification: classify_trend(ind),
        heavy_volume_reversal: previous
            .map(|prev| is_heavy_volume_reversal(latest, prev, limits))
            .unwrap_or(false),
    }
}
