//! Exponential Moving Average indicator.
//!
//! m = 2/(n+1). The point at index n-1 is the SMA of the first n closes;
//! from index n onward EMA[i] = (C[i] - EMA[i-1]) * m + EMA[i-1].
//! Warmup: first (n-1) days are invalid.

use crate::domain::indicator::sma::earliest_sma;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::trading_day::TradingDay;

pub fn calculate_ema(days: &[TradingDay], period: usize) -> IndicatorSeries {
    let Some(seed) = earliest_sma(days, period) else {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    };

    let mut values = Vec::with_capacity(days.len());
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = seed;

    for (i, day) in days.iter().enumerate() {
        if i < period - 1 {
            values.push(IndicatorPoint {
                date: day.date,
                valid: false,
                value: 0.0,
            });
            continue;
        }
        if i >= period {
            ema = (day.close - ema) * multiplier + ema;
        }
        values.push(IndicatorPoint {
            date: day.date,
            valid: true,
            value: ema,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
