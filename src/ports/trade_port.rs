//! Trade source port trait.

use crate::domain::error::QmoneyError;
use crate::domain::trade::Trade;

pub trait TradePort {
    /// Load trades from `source` in the order they appear there.
    fn load_trades(&self, source: &str) -> Result<Vec<Trade>, QmoneyError>;
}
