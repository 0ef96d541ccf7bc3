//! Chaikin Money Flow over the last n days.
//!
//! MFM = ((C - L) - (H - C)) / (H - L), 0 when H == L
//! CMF = sum(MFM * V) / sum(V)

use crate::domain::trading_day::TradingDay;

/// Money flow multiplier for one day, 0 for a day with no range.
pub fn money_flow_multiplier(day: &TradingDay) -> f64 {
    let range = day.high - day.low;
    if range == 0.0 {
        return 0.0;
    }
    ((day.close - day.low) - (day.high - day.close)) / range
}

/// `None` when the period is 0 or longer than the series; `Some(None)`
/// when the window traded no volume.
pub fn calculate_cmf(days: &[TradingDay], period: usize) -> Option<Option<f64>> {
    if period == 0 || days.len() < period {
        return None;
    }

    let window = &days[days.len() - period..];
    let (flow, volume) = window.iter().fold((0.0, 0.0), |(flow, volume), day| {
        let v = day.volume as f64;
        (flow + money_flow_multiplier(day) * v, volume + v)
    });

    if volume == 0.0 {
        return Some(None);
    }
    Some(Some(flow / volume))
}
