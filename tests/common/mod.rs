#![allow(dead_code)]

use chrono::NaiveDate;
pub use qmoney::domain::candle::Candle;
use qmoney::domain::error::MarketDataError;
pub use qmoney::domain::trade::Trade;
use qmoney::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

pub struct MockMarketData {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, MarketDataError>,
    pub delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, err: MarketDataError) -> Self {
        self.errors.insert(symbol.to_string(), err);
        self
    }

    /// Make fetches for `symbol` block for `delay`, to shuffle completion order.
    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_candles(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), from, to));
        if let Some(delay) = self.delays.get(symbol) {
            thread::sleep(*delay);
        }
        if let Some(err) = self.errors.get(symbol) {
            return Err(err.clone());
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn candle(day: &str, open: f64, close: f64) -> Candle {
    Candle::new(
        NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
        open,
        close,
    )
}

pub fn trade(symbol: &str, purchased: &str) -> Trade {
    Trade::new(
        symbol,
        NaiveDate::parse_from_str(purchased, "%Y-%m-%d").unwrap(),
    )
}

/// Two candles spanning `from`..`to` that produce the given total return.
pub fn candles_with_return(from: &str, to: &str, total_return: f64) -> Vec<Candle> {
    vec![
        candle(from, 100.0, 100.0),
        candle(to, 100.0, 100.0 * (1.0 + total_return)),
    ]
}
