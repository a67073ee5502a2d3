//! Portfolio trade.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One purchase in the portfolio. Fields other than symbol and purchase date
/// (quantity, trade type) are ignored when loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub purchase_date: NaiveDate,
}

impl Trade {
    pub fn new(symbol: impl Into<String>, purchase_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            purchase_date,
        }
    }

    /// True when the holding period ending at `end_date` is non-empty.
    pub fn is_held_before(&self, end_date: NaiveDate) -> bool {
        self.purchase_date < end_date
    }
}

/// Symbols in portfolio order.
pub fn symbols(trades: &[Trade]) -> Vec<String> {
    trades.iter().map(|t| t.symbol.clone()).collect()
}
