//! Trend state store port trait.

use crate::domain::error::TrendwatchError;
use crate::domain::trend::{TrendHistoryEvent, TrendState};

/// Durable per-symbol current state plus an append-only history log.
pub trait TrendStateStore {
    fn get_state(&self, symbol: &str) -> Result<Option<TrendState>, TrendwatchError>;

    /// Full replace of the row for `state.symbol`.
    fn put_state(&self, state: &TrendState) -> Result<(), TrendwatchError>;

    /// Overwrites any event already stored under (symbol, occurrence_date).
    fn append_history(&self, event: &TrendHistoryEvent) -> Result<(), TrendwatchError>;

    /// History for one symbol, oldest first.
    fn list_history(&self, symbol: &str) -> Result<Vec<TrendHistoryEvent>, TrendwatchError>;
}
