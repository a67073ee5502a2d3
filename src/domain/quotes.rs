//! Closing-price queries over a portfolio.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::candle;
use super::error::QmoneyError;
use super::trade::Trade;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosingPrice {
    pub symbol: String,
    pub close: f64,
}

/// Last close on or before `end_date` for each trade, ascending by price.
///
/// Trades without any candles are left out. Purchases on or after `end_date`
/// and market-data failures are errors.
pub fn closing_prices(
    market_data: &dyn MarketDataPort,
    trades: &[Trade],
    end_date: NaiveDate,
) -> Result<Vec<ClosingPrice>, QmoneyError> {
    let mut prices = Vec::with_capacity(trades.len());

    for trade in trades {
        if !trade.is_held_before(end_date) {
            return Err(QmoneyError::InvalidDateRange {
                symbol: trade.symbol.clone(),
                purchase_date: trade.purchase_date,
                end_date,
            });
        }

        let fetched = market_data.fetch_candles(&trade.symbol, trade.purchase_date, end_date);
        let mut candles = match fetched {
            Ok(c) => c,
            Err(e) => match QmoneyError::from_market_data(
                &trade.symbol,
                trade.purchase_date,
                end_date,
                e,
            ) {
                QmoneyError::NoData { .. } => Vec::new(),
                err => return Err(err),
            },
        };

        candle::sort_by_date(&mut candles);
        match candles.last() {
            Some(last) => prices.push(ClosingPrice {
                symbol: trade.symbol.clone(),
                close: last.close,
            }),
            None => warn!(symbol = %trade.symbol, "no candles, skipping"),
        }
    }

    prices.sort_by(|a, b| a.close.total_cmp(&b.close));
    Ok(prices)
}
