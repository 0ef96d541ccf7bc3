//! Screener settings read and validated from the configuration port.

use crate::domain::error::TrendwatchError;
use crate::domain::series::DEFAULT_MIN_HISTORY_DAYS;
use crate::domain::signal::ReversalThresholds;
use crate::ports::config_port::ConfigPort;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 300;
/// Quotes settle a couple of days after the close.
pub const DEFAULT_END_DATE_LAG_DAYS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Split a comma separated symbol list, uppercasing each entry.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub end_date: NaiveDate,
    pub lookback_days: i64,
    pub min_history_days: usize,
    /// Every symbol screened this run, watch-list symbols included.
    pub symbols: Vec<String>,
    pub watchlist: HashSet<String>,
    pub request_delay_ms: u64,
    pub reversal: ReversalThresholds,
}

impl ScreenerConfig {
    /// `today` anchors the default end date.
    pub fn from_config(config: &dyn ConfigPort, today: NaiveDate) -> Result<Self, TrendwatchError> {
        let end_date = match config.get_string("screener", "end_date") {
            Some(s) => parse_end_date(&s)?,
            None => today - Duration::days(DEFAULT_END_DATE_LAG_DAYS),
        };

        let lookback_days = config.get_int("screener", "lookback_days", DEFAULT_LOOKBACK_DAYS);
        if lookback_days <= 0 {
            return Err(invalid("screener", "lookback_days", "lookback_days must be positive"));
        }

        let min_history = config.get_int(
            "screener",
            "min_history_days",
            DEFAULT_MIN_HISTORY_DAYS as i64,
        );
        if min_history < 2 {
            return Err(invalid(
                "screener",
                "min_history_days",
                "min_history_days must be at least 2",
            ));
        }

        let request_delay_ms = config.get_int("screener", "request_delay_ms", 0);
        if request_delay_ms < 0 {
            return Err(invalid(
                "screener",
                "request_delay_ms",
                "request_delay_ms must be non-negative",
            ));
        }

        let watchlist = read_symbol_list(config, "watchlist")?;
        let mut symbols = read_symbol_list(config, "symbols")?;
        for symbol in &watchlist {
            if !symbols.contains(symbol) {
                symbols.push(symbol.clone());
            }
        }
        if symbols.is_empty() {
            return Err(TrendwatchError::ConfigMissing {
                section: "screener".into(),
                key: "symbols".into(),
            });
        }

        Ok(Self {
            end_date,
            lookback_days,
            min_history_days: min_history as usize,
            symbols,
            watchlist: watchlist.into_iter().collect(),
            request_delay_ms: request_delay_ms as u64,
            reversal: reversal_thresholds(config)?,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.end_date - Duration::days(self.lookback_days)
    }

    /// Restrict the run to one symbol, keeping watch-list membership.
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbols = vec![symbol.trim().to_uppercase()];
        self
    }
}

pub fn parse_end_date(value: &str) -> Result<NaiveDate, TrendwatchError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid("screener", "end_date", "invalid end_date format, expected YYYY-MM-DD"))
}

fn read_symbol_list(config: &dyn ConfigPort, key: &str) -> Result<Vec<String>, TrendwatchError> {
    match config.get_string("screener", key) {
        Some(s) if !s.trim().is_empty() => {
            parse_symbols(&s).map_err(|e| invalid("screener", key, &e.to_string()))
        }
        _ => Ok(Vec::new()),
    }
}

fn reversal_thresholds(config: &dyn ConfigPort) -> Result<ReversalThresholds, TrendwatchError> {
    let defaults = ReversalThresholds::default();

    let min_volume = config.get_int("reversal", "min_volume", defaults.min_volume as i64);
    if min_volume < 0 {
        return Err(invalid("reversal", "min_volume", "min_volume must be non-negative"));
    }

    let min_close = config.get_double("reversal", "min_close", defaults.min_close);
    let max_close = config.get_double("reversal", "max_close", defaults.max_close);
    if min_close > max_close {
        return Err(invalid(
            "reversal",
            "min_close",
            "min_close must not exceed max_close",
        ));
    }

    Ok(ReversalThresholds {
        min_volume: min_volume as u64,
        min_close,
        max_close,
        max_prior_close_ratio: config.get_double(
            "reversal",
            "max_prior_close_ratio",
            defaults.max_prior_close_ratio,
        ),
        min_prior_volume_ratio: config.get_double(
            "reversal",
            "min_prior_volume_ratio",
            defaults.min_prior_volume_ratio,
        ),
    })
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendwatchError {
    TrendwatchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig {
        values: HashMap<(String, String), String>,
    }

    impl MapConfig {
        fn new(pairs: &[(&str, &str, &str)]) -> Self {
            Self {
                values: pairs
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            }
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }
        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 7, 8).unwrap()
    }

    fn assert_invalid(result: Result<ScreenerConfig, TrendwatchError>, expected_key: &str) {
        match result {
            Err(TrendwatchError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            Err(other) => panic!("expected ConfigInvalid for {expected_key}, got: {other}"),
            Ok(_) => panic!("expected error for {expected_key}, got Ok"),
        }
    }

    #[test]
    fn parse_symbols_uppercases_and_trims() {
        assert_eq!(parse_symbols(" amd, Hstm ").unwrap(), vec!["AMD", "HSTM"]);
    }

    #[test]
    fn parse_symbols_rejects_empty_and_duplicate() {
        assert_eq!(parse_symbols("AMD,,SPY"), Err(SymbolListError::EmptyToken));
        assert_eq!(
            parse_symbols("AMD,amd"),
            Err(SymbolListError::DuplicateSymbol("AMD".into()))
        );
    }

    #[test]
    fn defaults_apply() {
        let config = MapConfig::new(&[("screener", "symbols", "AMD")]);
        let sc = ScreenerConfig::from_config(&config, today()).unwrap();
        assert_eq!(sc.end_date, NaiveDate::from_ymd_opt(2016, 7, 6).unwrap());
        assert_eq!(sc.lookback_days, 300);
        assert_eq!(sc.min_history_days, 50);
        assert_eq!(sc.request_delay_ms, 0);
        assert_eq!(sc.reversal, ReversalThresholds::default());
        assert!(sc.watchlist.is_empty());
        assert_eq!(sc.start_date(), sc.end_date - Duration::days(300));
    }

    #[test]
    fn watchlist_symbols_are_screened() {
        let config = MapConfig::new(&[
            ("screener", "symbols", "AMD,SPY"),
            ("screener", "watchlist", "spy,qqq"),
        ]);
        let sc = ScreenerConfig::from_config(&config, today()).unwrap();
        assert_eq!(sc.symbols, vec!["AMD", "SPY", "QQQ"]);
        assert!(sc.watchlist.contains("QQQ"));
        assert!(!sc.watchlist.contains("AMD"));
    }

    #[test]
    fn explicit_end_date() {
        let config = MapConfig::new(&[
            ("screener", "symbols", "AMD"),
            ("screener", "end_date", "2024-06-28"),
        ]);
        let sc = ScreenerConfig::from_config(&config, today()).unwrap();
        assert_eq!(sc.end_date, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    }

    #[test]
    fn rejects_bad_values() {
        let base = ("screener", "symbols", "AMD");
        assert_invalid(
            ScreenerConfig::from_config(
                &MapConfig::new(&[base, ("screener", "end_date", "28/06/2024")]),
                today(),
            ),
            "end_date",
        );
        assert_invalid(
            ScreenerConfig::from_config(
                &MapConfig::new(&[base, ("screener", "lookback_days", "0")]),
                today(),
            ),
            "lookback_days",
        );
        assert_invalid(
            ScreenerConfig::from_config(
                &MapConfig::new(&[base, ("screener", "min_history_days", "1")]),
                today(),
            ),
            "min_history_days",
        );
        assert_invalid(
            ScreenerConfig::from_config(
                &MapConfig::new(&[base, ("reversal", "min_close", "12")]),
                today(),
            ),
            "min_close",
        );
        assert_invalid(
            ScreenerConfig::from_config(
                &MapConfig::new(&[("screener", "symbols", "AMD,,SPY")]),
                today(),
            ),
            "symbols",
        );
    }

    #[test]
    fn empty_symbol_list_is_missing() {
        let config = MapConfig::new(&[("screener", "symbols", "  ")]);
        assert!(matches!(
            ScreenerConfig::from_config(&config, today()),
            Err(TrendwatchError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn reversal_overrides() {
        let config = MapConfig::new(&[
            ("screener", "symbols", "AMD"),
            ("reversal", "min_volume", "1000"),
            ("reversal", "max_close", "20"),
        ]);
        let sc = ScreenerConfig::from_config(&config, today()).unwrap();
        assert_eq!(sc.reversal.min_volume, 1000);
        assert_eq!(sc.reversal.max_close, 20.0);
        assert_eq!(sc.reversal.min_close, 5.0);
    }

    #[test]
    fn with_symbol_narrows_run() {
        let config = MapConfig::new(&[
            ("screener", "symbols", "AMD,NVDA"),
            ("screener", "watchlist", "SPY"),
        ]);
        let sc = ScreenerConfig::from_config(&config, today())
            .unwrap()
            .with_symbol("spy");
        assert_eq!(sc.symbols, vec!["SPY"]);
        assert!(sc.watchlist.contains("SPY"));
    }
}
