//! CSV file quote source.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with a header row naming the
//! quote fields (`Date,Open,High,Low,Close,Adj_Close,Volume`). Values are
//! passed through as strings; parsing happens when the series is built.

use crate::domain::error::{FetchError, FetchErrorKind};
use crate::domain::trading_day::{KEY_DATE, KEY_SYMBOL, RawQuote};
use crate::ports::quote_port::QuoteSource;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvQuoteSource {
    base_path: PathBuf,
}

impl CsvQuoteSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Rows whose date does not parse are kept so the series builder can
/// count them as dropped.
fn in_range(row: &RawQuote, start: NaiveDate, end: NaiveDate) -> bool {
    match row
        .get(KEY_DATE)
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    {
        Some(date) => date >= start && date <= end,
        None => true,
    }
}

impl QuoteSource for CsvQuoteSource {
    fn fetch_daily_quotes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawQuote>, FetchError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            FetchError::new(
                symbol,
                FetchErrorKind::Connection,
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| FetchError::new(symbol, FetchErrorKind::Type, format!("CSV header error: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                FetchError::new(symbol, FetchErrorKind::Type, format!("CSV parse error: {}", e))
            })?;

            let mut row: RawQuote = headers
                .iter()
                .zip(record.iter())
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .collect::<HashMap<_, _>>();
            row.entry(KEY_SYMBOL.to_string())
                .or_insert_with(|| symbol.to_string());

            if in_range(&row, start, end) {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(FetchError::new(
                symbol,
                FetchErrorKind::Index,
                format!("no quotes between {} and {}", start, end),
            ));
        }

        debug!(symbol, rows = rows.len(), path = %path.display(), "read quotes");
        Ok(rows)
    }
}
