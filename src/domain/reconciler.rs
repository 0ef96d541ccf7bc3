//! Trend state machine: today's signal against the stored trend row.
//!
//! | current  | today   | action                                         |
//! |----------|---------|------------------------------------------------|
//! | NoRecord | Up/Down | write trend, append history, notify            |
//! | Up       | Up      | nothing; watch-list symbols notify existing-up |
//! | Down     | Down    | nothing; watch-list symbols notify existing-down |
//! | Up       | Down    | flip to down, append history, notify           |
//! | Down     | Up      | flip to up, append history, notify             |
//! | any      | Neutral | nothing                                        |
//!
//! A heavy volume reversal is layered on top of any row of the table: the
//! flag and start date are written, a history event is appended and a
//! notification raised, every time it occurs.

use crate::domain::error::TrendwatchError;
use crate::domain::notification::NotificationKind;
use crate::domain::signal::{Classification, Signal};
use crate::domain::trend::{CurrentTrend, HistoryKind, TrendHistoryEvent, TrendState};
use crate::ports::store_port::TrendStateStore;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Store mutations and notifications decided for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub previous: CurrentTrend,
    pub new_state: Option<TrendState>,
    pub history: Vec<TrendHistoryEvent>,
    pub notifications: Vec<NotificationKind>,
}

impl TransitionPlan {
    pub fn is_noop(&self) -> bool {
        self.new_state.is_none() && self.history.is_empty()
    }

    /// True when two planned history events share (symbol, date) and the
    /// store will keep only the last one.
    pub fn has_history_collision(&self) -> bool {
        self.history
            .iter()
            .enumerate()
            .any(|(i, a)| self.history[i + 1..].iter().any(|b| a.occurrence_date == b.occurrence_date))
    }
}

fn trend_row(symbol: &str, up: bool, today: NaiveDate) -> TrendState {
    TrendState {
        symbol: symbol.to_string(),
        up_trend: up,
        down_trend: !up,
        heavy_volume_reversal: false,
        trend_start_date: today,
    }
}

/// Decide what to write and whom to notify. Pure; touches no store.
///
/// Trend writes replace the whole row, so a flip clears an earlier
/// reversal flag unless today's signal sets it again.
pub fn plan_transition(
    symbol: &str,
    current: Option<&TrendState>,
    signal: Signal,
    watchlisted: bool,
    today: NaiveDate,
) -> TransitionPlan {
    let previous = CurrentTrend::of(current);
    let mut new_state = None;
    let mut history = Vec::new();
    let mut notifications = Vec::new();

    let event = |kind| TrendHistoryEvent {
        symbol: symbol.to_string(),
        occurrence_date: today,
        trend_type: kind,
    };

    match (previous, signal.classification) {
        (CurrentTrend::NoRecord | CurrentTrend::Down, Classification::Up) => {
            new_state = Some(trend_row(symbol, true, today));
            history.push(event(HistoryKind::Up));
            notifications.push(NotificationKind::Up);
        }
        (CurrentTrend::NoRecord | CurrentTrend::Up, Classification::Down) => {
            new_state = Some(trend_row(symbol, false, today));
            history.push(event(HistoryKind::Down));
            notifications.push(NotificationKind::Down);
        }
        (CurrentTrend::Up, Classification::Up) => {
            if watchlisted {
                notifications.push(NotificationKind::ExistingUp);
            }
        }
        (CurrentTrend::Down, Classification::Down) => {
            if watchlisted {
                notifications.push(NotificationKind::ExistingDown);
            }
        }
        (_, Classification::Neutral) => {}
    }

    if signal.heavy_volume_reversal {
        let base = new_state
            .take()
            .or_else(|| current.cloned())
            .unwrap_or_else(|| TrendState {
                symbol: symbol.to_string(),
                up_trend: false,
                down_trend: false,
                heavy_volume_reversal: false,
                trend_start_date: today,
            });
        new_state = Some(TrendState {
            heavy_volume_reversal: true,
            trend_start_date: today,
            ..base
        });
        history.push(event(HistoryKind::HeavyVolumeReversal));
        notifications.push(NotificationKind::HeavyVolumeReversal);
    }

    TransitionPlan {
        previous,
        new_state,
        history,
        notifications,
    }
}

/// What reconciliation did for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub previous: CurrentTrend,
    pub state_written: bool,
    pub history_appended: usize,
    pub history_collision: bool,
    pub notifications: Vec<NotificationKind>,
}

/// Applies `plan_transition` against an injected store.
pub struct TrendReconciler<'a> {
    store: &'a dyn TrendStateStore,
    watchlist: &'a HashSet<String>,
}

impl<'a> TrendReconciler<'a> {
    pub fn new(store: &'a dyn TrendStateStore, watchlist: &'a HashSet<String>) -> Self {
        Self { store, watchlist }
    }

    /// Read, decide, write. Any store failure aborts this symbol and is
    /// returned; the caller must not notify for it. There is no atomicity
    /// between the read and the writes.
    pub fn reconcile(
        &self,
        symbol: &str,
        signal: Signal,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome, TrendwatchError> {
        let current = self.store.get_state(symbol).inspect_err(|e| {
            error!(symbol, error = %e, "failed to read trend state");
        })?;

        let plan = plan_transition(
            symbol,
            current.as_ref(),
            signal,
            self.watchlist.contains(symbol),
            today,
        );

        debug!(
            symbol,
            previous = ?plan.previous,
            classification = %signal.classification,
            heavy_volume_reversal = signal.heavy_volume_reversal,
            "planned transition"
        );

        if plan.is_noop() {
            if plan.notifications.is_empty() {
                info!(symbol, previous = ?plan.previous, "trend unchanged");
            }
            return Ok(ReconcileOutcome {
                previous: plan.previous,
                state_written: false,
                history_appended: 0,
                history_collision: false,
                notifications: plan.notifications,
            });
        }

        let collision = plan.has_history_collision();
        if collision {
            let kinds: Vec<&str> = plan.history.iter().map(|e| e.trend_type.as_str()).collect();
            warn!(
                symbol,
                date = %today,
                ?kinds,
                "history events share a date; the store keeps only the last"
            );
        }

        let mut state_written = false;
        if let Some(state) = &plan.new_state {
            self.store.put_state(state).inspect_err(|e| {
                error!(symbol, error = %e, "failed to write trend state");
            })?;
            state_written = true;
        }

        let mut history_appended = 0;
        for event in &plan.history {
            if let Err(e) = self.store.append_history(event) {
                if state_written {
                    warn!(
                        symbol,
                        trend_type = %event.trend_type,
                        "trend state written but history append failed; state and history are out of sync"
                    );
                }
                error!(symbol, error = %e, "failed to append trend history");
                return Err(e);
            }
            history_appended += 1;
        }

        info!(
            symbol,
            notifications = ?plan.notifications,
            "trend state updated"
        );

        Ok(ReconcileOutcome {
            previous: plan.previous,
            state_written,
            history_appended,
            history_collision: collision,
            notifications: plan.notifications,
        })
    }
}
