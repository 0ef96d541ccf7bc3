//! Daily quote source port trait.

use crate::domain::error::FetchError;
use crate::domain::trading_day::RawQuote;
use chrono::NaiveDate;

pub trait QuoteSource {
    /// Raw daily quotes for `symbol` between `start` and `end` inclusive.
    /// Failures come back typed by `FetchErrorKind`.
    fn fetch_daily_quotes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawQuote>, FetchError>;
}
