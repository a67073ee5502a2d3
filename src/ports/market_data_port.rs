//! Market-data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::MarketDataError;
use chrono::NaiveDate;

/// Daily candles for a symbol over an inclusive date range.
///
/// Implementations may return candles in any order. An empty result should be
/// reported as [`MarketDataError::Empty`], though callers also tolerate an
/// empty `Ok`. The port is shared across worker threads.
pub trait MarketDataPort: Send + Sync {
    fn fetch_candles(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, MarketDataError>;
}
