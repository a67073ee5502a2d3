//! CSV file market-data adapter.
//!
//! Reads `{base_path}/{SYMBOL}.csv`. The header row must name `date`, `open`
//! and `close` columns; any other columns are ignored.

use crate::domain::candle::{Candle, parse_day};
use crate::domain::error::MarketDataError;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, MarketDataError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| MarketDataError::Malformed(format!("missing {} column", name)))
}

fn price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, MarketDataError> {
    record
        .get(idx)
        .ok_or_else(|| MarketDataError::Malformed(format!("missing {} value", name)))?
        .trim()
        .parse()
        .map_err(|e| MarketDataError::Malformed(format!("invalid {} value: {}", name, e)))
}

impl MarketDataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no candle file");
                return Err(MarketDataError::Empty);
            }
            Err(e) => {
                return Err(MarketDataError::Transport(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| MarketDataError::Malformed(format!("CSV header error: {}", e)))?
            .clone();
        let date_idx = column(&headers, "date")?;
        let open_idx = column(&headers, "open")?;
        let close_idx = column(&headers, "close")?;

        let mut candles = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| MarketDataError::Malformed(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_idx)
                .ok_or_else(|| MarketDataError::Malformed("missing date value".into()))?;
            let date = parse_day(date_str.trim()).map_err(MarketDataError::Malformed)?;

            if date < from || date > to {
                continue;
            }

            candles.push(Candle {
                date,
                open: price(&record, open_idx, "open")?,
                close: price(&record, close_idx, "close")?,
            });
        }

        if candles.is_empty() {
            return Err(MarketDataError::Empty);
        }
        Ok(candles)
    }
}
