//! Daily price record and its construction from raw quote mappings.

use crate::domain::error::TrendwatchError;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One day of raw quote data as delivered by a quote source, keyed by
/// `Symbol`, `Date`, `Open`, `High`, `Low`, `Close`, `Adj_Close`, `Volume`.
pub type RawQuote = HashMap<String, String>;

pub const KEY_SYMBOL: &str = "Symbol";
pub const KEY_DATE: &str = "Date";
pub const KEY_OPEN: &str = "Open";
pub const KEY_HIGH: &str = "High";
pub const KEY_LOW: &str = "Low";
pub const KEY_CLOSE: &str = "Close";
pub const KEY_ADJ_CLOSE: &str = "Adj_Close";
pub const KEY_VOLUME: &str = "Volume";

#[derive(Debug, Clone, PartialEq)]
pub struct TradingDay {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: u64,
}

impl TradingDay {
    /// Build a validated day from a raw mapping.
    ///
    /// Fails with `MalformedRecord` on a missing key, an unparseable or
    /// non-finite number, a negative volume, a bad date, or `high < low`.
    pub fn from_raw(raw: &RawQuote) -> Result<Self, TrendwatchError> {
        let symbol = raw
            .get(KEY_SYMBOL)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("?", KEY_SYMBOL, "is missing"))?;

        let date_str = field(raw, &symbol, KEY_DATE)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| malformed(&symbol, KEY_DATE, &format!("'{date_str}' ({e})")))?;

        let day = TradingDay {
            open: price(raw, &symbol, KEY_OPEN)?,
            high: price(raw, &symbol, KEY_HIGH)?,
            low: price(raw, &symbol, KEY_LOW)?,
            close: price(raw, &symbol, KEY_CLOSE)?,
            adjusted_close: price(raw, &symbol, KEY_ADJ_CLOSE)?,
            volume: volume(raw, &symbol)?,
            symbol,
            date,
        };

        if day.high < day.low {
            return Err(malformed(
                &day.symbol,
                KEY_HIGH,
                &format!("{} is below low {} on {}", day.high, day.low, day.date),
            ));
        }

        Ok(day)
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

fn malformed(symbol: &str, field: &str, reason: &str) -> TrendwatchError {
    TrendwatchError::MalformedRecord {
        symbol: symbol.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn field<'a>(raw: &'a RawQuote, symbol: &str, key: &str) -> Result<&'a str, TrendwatchError> {
    raw.get(key)
        .map(|s| s.trim())
        .ok_or_else(|| malformed(symbol, key, "is missing"))
}

fn price(raw: &RawQuote, symbol: &str, key: &str) -> Result<f64, TrendwatchError> {
    let s = field(raw, symbol, key)?;
    let value: f64 = s
        .parse()
        .map_err(|_| malformed(symbol, key, &format!("'{s}' is not a number")))?;
    if !value.is_finite() {
        return Err(malformed(symbol, key, &format!("'{s}' is not finite")));
    }
    Ok(value)
}

fn volume(raw: &RawQuote, symbol: &str) -> Result<u64, TrendwatchError> {
    let s = field(raw, symbol, KEY_VOLUME)?;
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    // Some feeds send volume as "1200.0".
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as u64),
        Ok(v) if v < 0.0 => Err(malformed(symbol, KEY_VOLUME, &format!("{s} is negative"))),
        _ => Err(malformed(
            symbol,
            KEY_VOLUME,
            &format!("'{s}' is not a whole number"),
        )),
    }
}
