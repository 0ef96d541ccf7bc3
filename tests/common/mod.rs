#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use trendwatch::adapters::memory_store::MemoryStore;
use trendwatch::domain::config::ScreenerConfig;
use trendwatch::domain::error::{FetchError, FetchErrorKind, TrendwatchError};
use trendwatch::domain::signal::ReversalThresholds;
pub use trendwatch::domain::trading_day::*;
use trendwatch::domain::trend::{TrendHistoryEvent, TrendState};
use trendwatch::ports::quote_port::QuoteSource;
use trendwatch::ports::store_port::TrendStateStore;

pub struct MockQuoteSource {
    pub data: HashMap<String, Vec<RawQuote>>,
    pub errors: HashMap<String, FetchErrorKind>,
    pub calls: RefCell<Vec<String>>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_quotes(mut self, symbol: &str, quotes: Vec<RawQuote>) -> Self {
        self.data.insert(symbol.to_string(), quotes);
        self
    }

    pub fn with_error(mut self, symbol: &str, kind: FetchErrorKind) -> Self {
        self.errors.insert(symbol.to_string(), kind);
        self
    }
}

impl QuoteSource for MockQuoteSource {
    fn fetch_daily_quotes(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<RawQuote>, FetchError> {
        self.calls.borrow_mut().push(symbol.to_string());
        if let Some(kind) = self.errors.get(symbol) {
            return Err(FetchError::new(symbol, *kind, "mock failure"));
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::new(symbol, FetchErrorKind::Index, "no such symbol"))
    }
}

/// Memory store that fails every call for the listed symbols. With
/// `append_only` set, `put_state` still succeeds and only history writes
/// fail.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub failing: HashSet<String>,
    pub append_only: bool,
}

impl FailingStore {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: symbols.iter().map(|s| s.to_string()).collect(),
            append_only: false,
        }
    }

    pub fn append_only(mut self) -> Self {
        self.append_only = true;
        self
    }

    fn check(&self, symbol: &str) -> Result<(), TrendwatchError> {
        if self.failing.contains(symbol) {
            return Err(TrendwatchError::store(format!("store down for {symbol}")));
        }
        Ok(())
    }
}

impl TrendStateStore for FailingStore {
    fn get_state(&self, symbol: &str) -> Result<Option<TrendState>, TrendwatchError> {
        if !self.append_only {
            self.check(symbol)?;
        }
        self.inner.get_state(symbol)
    }

    fn put_state(&self, state: &TrendState) -> Result<(), TrendwatchError> {
        if !self.append_only {
            self.check(&state.symbol)?;
        }
        self.inner.put_state(state)
    }

    fn append_history(&self, event: &TrendHistoryEvent) -> Result<(), TrendwatchError> {
        self.check(&event.symbol)?;
        self.inner.append_history(event)
    }

    fn list_history(&self, symbol: &str) -> Result<Vec<TrendHistoryEvent>, TrendwatchError> {
        self.inner.list_history(symbol)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn raw_quote(symbol: &str, day: NaiveDate, close: f64, volume: u64) -> RawQuote {
    HashMap::from([
        (KEY_SYMBOL.to_string(), symbol.to_string()),
        (KEY_DATE.to_string(), day.format("%Y-%m-%d").to_string()),
        (KEY_OPEN.to_string(), close.to_string()),
        (KEY_HIGH.to_string(), (close * 1.05).to_string()),
        (KEY_LOW.to_string(), (close * 0.95).to_string()),
        (KEY_CLOSE.to_string(), close.to_string()),
        (KEY_ADJ_CLOSE.to_string(), close.to_string()),
        (KEY_VOLUME.to_string(), volume.to_string()),
    ])
}

/// One quote per calendar day, the last one dated `end`.
pub fn quote_series(symbol: &str, end: NaiveDate, days: &[(f64, u64)]) -> Vec<RawQuote> {
    let first = end - Duration::days(days.len() as i64 - 1);
    days.iter()
        .enumerate()
        .map(|(i, (close, volume))| raw_quote(symbol, first + Duration::days(i as i64), *close, *volume))
        .collect()
}

pub fn closes(symbol: &str, end: NaiveDate, closes: &[f64]) -> Vec<RawQuote> {
    let days: Vec<(f64, u64)> = closes.iter().map(|c| (*c, 10_000)).collect();
    quote_series(symbol, end, &days)
}

pub fn rising(n: usize) -> Vec<f64> {
    (1..=n).map(|i| i as f64).collect()
}

pub fn falling(n: usize) -> Vec<f64> {
    (1..=n).rev().map(|i| i as f64).collect()
}

/// Flat at 3.00 on light volume, then a jump to 7.00 on heavy volume.
pub fn reversal_days(n: usize) -> Vec<(f64, u64)> {
    let mut days = vec![(3.0, 200_000); n - 1];
    days.push((7.0, 400_000));
    days
}

pub fn screener_config(end: NaiveDate, symbols: &[&str], watchlist: &[&str]) -> ScreenerConfig {
    ScreenerConfig {
        end_date: end,
        lookback_days: 300,
        min_history_days: 50,
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        watchlist: watchlist.iter().map(|s| s.to_string()).collect(),
        request_delay_ms: 0,
        reversal: ReversalThresholds::default(),
    }
}
