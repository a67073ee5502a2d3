//! Daily price candle.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// A single trading day for one symbol. High, low and volume are not needed
/// to price a holding and are dropped on the way in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candle {
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self { date, open, close }
    }
}

/// Sort candles ascending by date. Stable, so same-day duplicates keep their
/// relative order.
pub fn sort_by_date(candles: &mut [Candle]) {
    candles.sort_by_key(|c| c.date);
}

/// Opening price of the earliest candle and the last candle itself, assuming
/// `candles` is already sorted. `None` when empty.
pub fn boundaries(candles: &[Candle]) -> Option<(f64, &Candle)> {
    let first = candles.first()?;
    let last = candles.last()?;
    Some((first.open, last))
}

/// Accepts both plain dates (`2020-01-02`) and timestamps
/// (`2020-01-02T00:00:00.000Z`); only the calendar day is kept.
fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).map_err(serde::de::Error::custom)
}

/// Parse `YYYY-MM-DD`, optionally followed by a `T...` time part.
pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    let day = match (raw.get(..10), raw.get(10..)) {
        (Some(day), Some(rest)) if rest.is_empty() || rest.starts_with('T') => day,
        _ => return Err(format!("invalid date {raw:?}")),
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {raw:?}: {e}"))
}
