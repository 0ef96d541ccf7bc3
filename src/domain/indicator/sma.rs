//! Simple Moving Average over closing prices.

use crate::domain::trading_day::TradingDay;

/// Mean close of the first `period` days. Seeds the EMA.
pub fn earliest_sma(days: &[TradingDay], period: usize) -> Option<f64> {
    if period == 0 || days.len() < period {
        return None;
    }
    Some(mean_close(&days[..period]))
}

/// Mean close of the last `period` days, ending at the most recent date.
pub fn trailing_sma(days: &[TradingDay], period: usize) -> Option<f64> {
    if period == 0 || days.len() < period {
        return None;
    }
    Some(mean_close(&days[days.len() - period..]))
}

fn mean_close(window: &[TradingDay]) -> f64 {
    window.iter().map(|d| d.close).sum::<f64>() / window.len() as f64
}
