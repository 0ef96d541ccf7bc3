//! Per-run notification collection, keyed by symbol.

use crate::domain::indicator::IndicatorSet;
use crate::domain::trading_day::TradingDay;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotificationKind {
    Up,
    Down,
    ExistingUp,
    ExistingDown,
    HeavyVolumeReversal,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Up => "up",
            NotificationKind::Down => "down",
            NotificationKind::ExistingUp => "existing-up",
            NotificationKind::ExistingDown => "existing-down",
            NotificationKind::HeavyVolumeReversal => "heavy volume reversal",
        };
        f.write_str(s)
    }
}

/// Latest indicator readings attached to a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    pub sma10: f64,
    pub ema20: f64,
    pub ema30: f64,
    pub cmf15: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn new(latest: &TradingDay, ind: &IndicatorSet) -> Self {
        Self {
            date: latest.date,
            close: latest.close,
            volume: latest.volume,
            sma10: ind.sma10,
            ema20: ind.ema20,
            ema30: ind.ema30,
            cmf15: ind.cmf15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNotification {
    pub symbol: String,
    pub kinds: Vec<NotificationKind>,
    pub snapshot: IndicatorSnapshot,
}

/// All notifications raised in one run. One entry per symbol; a symbol
/// that raises several kinds keeps all of them in order.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: BTreeMap<String, SymbolNotification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, symbol: &str, kinds: &[NotificationKind], snapshot: IndicatorSnapshot) {
        if kinds.is_empty() {
            return;
        }
        let entry = self
            .entries
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolNotification {
                symbol: symbol.to_string(),
                kinds: Vec::new(),
                snapshot: snapshot.clone(),
            });
        for kind in kinds {
            if !entry.kinds.contains(kind) {
                entry.kinds.push(*kind);
            }
        }
        entry.snapshot = snapshot;
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolNotification> {
        self.entries.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolNotification> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
