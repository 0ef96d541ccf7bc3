//! Validated, chronologically ordered price series for one symbol.

use crate::domain::error::TrendwatchError;
use crate::domain::trading_day::{RawQuote, TradingDay};
use tracing::{debug, warn};

pub const DEFAULT_MIN_HISTORY_DAYS: usize = 50;

#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    days: Vec<TradingDay>,
}

/// Result of building a series: the series plus the number of raw entries
/// that were dropped along the way.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub series: Series,
    pub dropped: usize,
}

impl Series {
    /// Build a series from raw quote mappings, dropping (and logging) every
    /// entry that fails to parse, belongs to another symbol, or repeats a
    /// date already seen. The first entry for a date wins.
    pub fn build(symbol: &str, raw: &[RawQuote]) -> BuildOutcome {
        let mut days = Vec::with_capacity(raw.len());
        let mut dropped = 0;

        for entry in raw {
            match TradingDay::from_raw(entry) {
                Ok(day) if day.symbol.eq_ignore_ascii_case(symbol) => days.push(day),
                Ok(day) => {
                    warn!(symbol, other = %day.symbol, date = %day.date, "dropping record for another symbol");
                    dropped += 1;
                }
                Err(e) => {
                    warn!(symbol, error = %e, "dropping malformed record");
                    dropped += 1;
                }
            }
        }

        // Stable sort keeps arrival order among equal dates.
        days.sort_by_key(|d| d.date);
        let before = days.len();
        days.dedup_by_key(|d| d.date);
        let duplicates = before - days.len();
        if duplicates > 0 {
            warn!(symbol, duplicates, "dropping records with repeated dates");
            dropped += duplicates;
        }

        debug!(symbol, days = days.len(), dropped, "built series");

        BuildOutcome {
            series: Series {
                symbol: symbol.to_string(),
                days,
            },
            dropped,
        }
    }

    /// Wrap already-validated days, sorting and de-duplicating by date.
    pub fn from_days(symbol: &str, mut days: Vec<TradingDay>) -> Self {
        days.sort_by_key(|d| d.date);
        days.dedup_by_key(|d| d.date);
        Self {
            symbol: symbol.to_string(),
            days,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn days(&self) -> &[TradingDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The most recent day.
    pub fn latest(&self) -> Option<&TradingDay> {
        self.days.last()
    }

    /// The day immediately before the most recent one.
    pub fn previous(&self) -> Option<&TradingDay> {
        self.days.len().checked_sub(2).map(|i| &self.days[i])
    }

    pub fn ensure_min_history(&self, minimum: usize) -> Result<(), TrendwatchError> {
        if self.days.len() < minimum {
            return Err(TrendwatchError::InsufficientHistory {
                symbol: self.symbol.clone(),
                days: self.days.len(),
                minimum,
            });
        }
        Ok(())
    }
}
