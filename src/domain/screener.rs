//! Batch driver: fetch, build, classify and reconcile every configured
//! symbol in turn.
//!
//! Failures are isolated per symbol. A fetch failure, a short series or a
//! store failure is counted in the [`RunSummary`] and the run moves on.

use crate::domain::config::ScreenerConfig;
use crate::domain::error::{FetchErrorKind, TrendwatchError};
use crate::domain::indicator::IndicatorEngine;
use crate::domain::notification::{IndicatorSnapshot, NotificationLog};
use crate::domain::reconciler::{ReconcileOutcome, TrendReconciler};
use crate::domain::series::Series;
use crate::domain::signal::{Signal, classify};
use crate::ports::quote_port::QuoteSource;
use crate::ports::store_port::TrendStateStore;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolStatus {
    Reconciled {
        signal: Signal,
        outcome: ReconcileOutcome,
    },
    FetchFailed(FetchErrorKind),
    InsufficientHistory { days: usize },
    StoreFailed,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped_insufficient: usize,
    pub dropped_records: usize,
    pub fetch_failures: BTreeMap<FetchErrorKind, usize>,
    pub store_failures: usize,
    pub history_collisions: usize,
    pub notifications: NotificationLog,
}

impl RunSummary {
    pub fn total_fetch_failures(&self) -> usize {
        self.fetch_failures.values().sum()
    }

    /// Symbols that did not make it through reconciliation.
    pub fn failed(&self) -> usize {
        self.skipped_insufficient + self.total_fetch_failures() + self.store_failures
    }
}

pub struct Screener<'a> {
    quotes: &'a dyn QuoteSource,
    store: &'a dyn TrendStateStore,
    config: &'a ScreenerConfig,
}

impl<'a> Screener<'a> {
    pub fn new(
        quotes: &'a dyn QuoteSource,
        store: &'a dyn TrendStateStore,
        config: &'a ScreenerConfig,
    ) -> Self {
        Self {
            quotes,
            store,
            config,
        }
    }

    pub fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        let reconciler = TrendReconciler::new(self.store, &self.config.watchlist);

        info!(
            symbols = self.config.symbols.len(),
            start = %self.config.start_date(),
            end = %self.config.end_date,
            "screening"
        );

        for (i, symbol) in self.config.symbols.iter().enumerate() {
            if i > 0 && self.config.request_delay_ms > 0 {
                thread::sleep(Duration::from_millis(self.config.request_delay_ms));
            }

            info!(symbol = %symbol, "begin");
            let status = self.screen_symbol(symbol, &reconciler, &mut summary);
            match &status {
                SymbolStatus::Reconciled { .. } => summary.processed += 1,
                SymbolStatus::FetchFailed(kind) => {
                    *summary.fetch_failures.entry(*kind).or_insert(0) += 1
                }
                SymbolStatus::InsufficientHistory { .. } => summary.skipped_insufficient += 1,
                SymbolStatus::StoreFailed => summary.store_failures += 1,
            }
            info!(symbol = %symbol, status = ?status, "end");
        }

        info!(
            processed = summary.processed,
            failed = summary.failed(),
            notifications = summary.notifications.len(),
            "screening complete"
        );
        summary
    }

    /// Screen one symbol, recording its notifications into `summary`.
    pub fn screen_symbol(
        &self,
        symbol: &str,
        reconciler: &TrendReconciler<'_>,
        summary: &mut RunSummary,
    ) -> SymbolStatus {
        let raw = match self.quotes.fetch_daily_quotes(
            symbol,
            self.config.start_date(),
            self.config.end_date,
        ) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(symbol, kind = %e.kind, error = %e, "quote fetch failed");
                return SymbolStatus::FetchFailed(e.kind);
            }
        };

        let built = Series::build(symbol, &raw);
        summary.dropped_records += built.dropped;
        let series = built.series;

        if let Err(e) = series.ensure_min_history(self.config.min_history_days) {
            warn!(symbol, error = %e, "skipping");
            return SymbolStatus::InsufficientHistory { days: series.len() };
        }

        let (Some(ind), Some(latest)) = (IndicatorEngine::new(&series).indicator_set(), series.latest())
        else {
            let e = TrendwatchError::InsufficientHistory {
                symbol: symbol.to_string(),
                days: series.len(),
                minimum: crate::domain::indicator::EMA_LONG_PERIOD,
            };
            warn!(symbol, error = %e, "skipping");
            return SymbolStatus::InsufficientHistory { days: series.len() };
        };

        let signal = classify(&ind, latest, series.previous(), &self.config.reversal);

        let outcome = match reconciler.reconcile(symbol, signal, self.config.end_date) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(symbol, error = %e, "store failure, notifications suppressed");
                return SymbolStatus::StoreFailed;
            }
        };

        if outcome.history_collision {
            summary.history_collisions += 1;
        }
        summary.notifications.record(
            symbol,
            &outcome.notifications,
            IndicatorSnapshot::new(latest, &ind),
        );

        SymbolStatus::Reconciled { signal, outcome }
    }
}
