//! Technical indicators over a price series.
//!
//! - `IndicatorPoint` / `IndicatorSeries`: a per-day indicator time series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSet`: the fixed set of values the classifier consumes
//! - `IndicatorEngine`: point-in-time values for one series

pub mod cmf;
pub mod ema;
pub mod sma;

use crate::domain::series::Series;
use crate::domain::trading_day::TradingDay;
use chrono::NaiveDate;
use std::fmt;

pub const SMA_SHORT_PERIOD: usize = 10;
pub const EMA_MID_PERIOD: usize = 20;
pub const EMA_LONG_PERIOD: usize = 30;
pub const CMF_PERIOD: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Cmf(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at the final index, if that point is past warmup.
    pub fn last_valid(&self) -> Option<f64> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Cmf(period) => write!(f, "CMF({})", period),
        }
    }
}

/// Indicator values computed once from a series.
///
/// `cmf15` is `None` when the CMF window carried no volume at all, which
/// keeps "no data" apart from a genuine zero reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSet {
    pub sma10: f64,
    pub ema20: f64,
    pub ema30: f64,
    pub cmf15: Option<f64>,
}

/// Point-in-time indicator values for one series, using unadjusted closes.
pub struct IndicatorEngine<'a> {
    days: &'a [TradingDay],
}

impl<'a> IndicatorEngine<'a> {
    pub fn new(series: &'a Series) -> Self {
        Self {
            days: series.days(),
        }
    }

    pub fn from_days(days: &'a [TradingDay]) -> Self {
        Self { days }
    }

    pub fn earliest_sma(&self, period: usize) -> Option<f64> {
        sma::earliest_sma(self.days, period)
    }

    pub fn sma(&self, period: usize) -> Option<f64> {
        sma::trailing_sma(self.days, period)
    }

    pub fn ema(&self, period: usize) -> Option<f64> {
        ema::calculate_ema(self.days, period).last_valid()
    }

    /// CMF with the zero-volume window reported as 0.
    pub fn cmf(&self, period: usize) -> Option<f64> {
        cmf::calculate_cmf(self.days, period).map(|r| r.unwrap_or(0.0))
    }

    /// CMF with the zero-volume window reported as `None` inside the
    /// outer `Some`. The outer `None` means the period itself is unusable.
    pub fn cmf_checked(&self, period: usize) -> Option<Option<f64>> {
        cmf::calculate_cmf(self.days, period)
    }

    /// SMA(10), EMA(20), EMA(30), CMF(15). `None` when the series is too
    /// short for the longest period.
    pub fn indicator_set(&self) -> Option<IndicatorSet> {
        Some(IndicatorSet {
            sma10: self.sma(SMA_SHORT_PERIOD)?,
            ema20: self.ema(EMA_MID_PERIOD)?,
            ema30: self.ema(EMA_LONG_PERIOD)?,
            cmf15: self.cmf_checked(CMF_PERIOD)?,
        })
    }
}
