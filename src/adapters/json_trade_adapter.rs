//! JSON trade file adapter.
//!
//! The file holds an array of trades:
//! `[{"symbol": "AAPL", "quantity": 100, "purchaseDate": "2019-01-02"}, ...]`.

use crate::domain::error::QmoneyError;
use crate::domain::trade::Trade;
use crate::ports::trade_port::TradePort;
use std::fs;
use tracing::debug;

#[derive(Debug, Default)]
pub struct JsonTradeAdapter;

impl JsonTradeAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Parse trades from JSON text. `source_name` only labels errors.
pub fn parse_trades(content: &str, source_name: &str) -> Result<Vec<Trade>, QmoneyError> {
    serde_json::from_str(content).map_err(|e| QmoneyError::TradeSource {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

impl TradePort for JsonTradeAdapter {
    fn load_trades(&self, source: &str) -> Result<Vec<Trade>, QmoneyError> {
        let content = fs::read_to_string(source).map_err(|e| QmoneyError::TradeSource {
            source_name: source.to_string(),
            reason: e.to_string(),
        })?;
        let trades = parse_trades(&content, source)?;
        debug!(source, trades = trades.len(), "loaded trades");
        Ok(trades)
    }
}
