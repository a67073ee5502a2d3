//! Portfolio evaluation: prices every trade and ranks them by annualized return.
//!
//! Two entry points share the same fetch and pricing steps but differ in how
//! they treat a trade with no market data:
//!
//! - [`PortfolioEvaluator::evaluate`] runs trades one after another and records
//!   a trade without candles as an unavailable (NaN) result. It prices against
//!   the requested end date.
//! - [`PortfolioEvaluator::evaluate_parallel`] fans trades out over a fixed-size
//!   worker pool and fails the whole run if any trade fails. It prices against
//!   the date of the last candle actually returned.
//!
//! Both reject a trade purchased on or after the end date, and both treat any
//! market-data failure other than "no data" as fatal.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::candle::{self, Candle};
use super::error::QmoneyError;
use super::returns::{self, AnnualizedReturn};
use super::trade::Trade;
use crate::ports::market_data_port::MarketDataPort;

pub struct PortfolioEvaluator<'a> {
    market_data: &'a dyn MarketDataPort,
}

impl<'a> PortfolioEvaluator<'a> {
    pub fn new(market_data: &'a dyn MarketDataPort) -> Self {
        Self { market_data }
    }

    pub fn evaluate(
        &self,
        trades: &[Trade],
        end_date: NaiveDate,
    ) -> Result<Vec<AnnualizedReturn>, QmoneyError> {
        info!(trades = trades.len(), %end_date, "evaluating portfolio");

        let mut results = Vec::with_capacity(trades.len());
        for trade in trades {
            check_range(trade, end_date)?;

            let candles = match self.fetch_sorted(trade, end_date) {
                Ok(candles) => candles,
                Err(QmoneyError::NoData { .. }) => {
                    warn!(symbol = %trade.symbol, "no candles, recording as unavailable");
                    results.push(AnnualizedReturn::unavailable(trade.symbol.clone()));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let (buy, last) = boundary_prices(trade, end_date, &candles)?;
            results.push(returns::calculate_for_trade(
                trade, end_date, buy, last.close,
            )?);
        }

        returns::sort_descending(&mut results);
        Ok(results)
    }

    /// Evaluate on a pool of `workers` threads built for this call and shut
    /// down before it returns.
    ///
    /// Every trade is submitted before any result is read, and results are
    /// gathered in portfolio order, so the output does not depend on which
    /// worker finishes first. All trades run to completion; the error returned
    /// counts the failures and carries the first one in portfolio order.
    pub fn evaluate_parallel(
        &self,
        trades: &[Trade],
        end_date: NaiveDate,
        workers: usize,
    ) -> Result<Vec<AnnualizedReturn>, QmoneyError> {
        if workers == 0 {
            return Err(QmoneyError::InvalidWorkerCount);
        }
        info!(trades = trades.len(), %end_date, workers, "evaluating portfolio in parallel");

        // Scoped pool: every worker thread is joined before this returns.
        let outcomes: Vec<Result<AnnualizedReturn, QmoneyError>> =
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("qmoney-worker-{i}"))
                .build_scoped(
                    |thread| thread.run(),
                    |pool| {
                        pool.install(|| {
                            trades
                                .par_iter()
                                .map(|trade| self.evaluate_to_last_candle(trade, end_date))
                                .collect()
                        })
                    },
                )
                .map_err(|e| QmoneyError::WorkerPool {
                    reason: e.to_string(),
                })?;

        let total = outcomes.len();
        let mut failed = 0;
        let mut first_failure = None;
        let mut results = Vec::with_capacity(total);
        for outcome in outcomes {
            match outcome {
                Ok(r) => results.push(r),
                Err(e) => {
                    failed += 1;
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                }
            }
        }

        if let Some(source) = first_failure {
            warn!(failed, total, error = %source, "parallel evaluation failed");
            return Err(QmoneyError::Evaluation {
                failed,
                total,
                source: Box::new(source),
            });
        }

        returns::sort_descending(&mut results);
        Ok(results)
    }

    /// One unit of parallel work. The holding period ends on the last trading
    /// day returned, which may be earlier than `end_date` when that falls on a
    /// weekend or holiday.
    fn evaluate_to_last_candle(
        &self,
        trade: &Trade,
        end_date: NaiveDate,
    ) -> Result<AnnualizedReturn, QmoneyError> {
        check_range(trade, end_date)?;
        let candles = self.fetch_sorted(trade, end_date)?;
        let (buy, last) = boundary_prices(trade, end_date, &candles)?;
        returns::calculate_for_trade(trade, last.date, buy, last.close)
    }

    fn fetch_sorted(&self, trade: &Trade, end_date: NaiveDate) -> Result<Vec<Candle>, QmoneyError> {
        debug!(symbol = %trade.symbol, from = %trade.purchase_date, to = %end_date, "fetching candles");
        let mut candles = self
            .market_data
            .fetch_candles(&trade.symbol, trade.purchase_date, end_date)
            .map_err(|e| {
                QmoneyError::from_market_data(&trade.symbol, trade.purchase_date, end_date, e)
            })?;
        if candles.is_empty() {
            return Err(no_data(trade, end_date));
        }
        candle::sort_by_date(&mut candles);
        debug!(symbol = %trade.symbol, candles = candles.len(), "fetched candles");
        Ok(candles)
    }
}

fn check_range(trade: &Trade, end_date: NaiveDate) -> Result<(), QmoneyError> {
    if trade.is_held_before(end_date) {
        Ok(())
    } else {
        Err(QmoneyError::InvalidDateRange {
            symbol: trade.symbol.clone(),
            purchase_date: trade.purchase_date,
            end_date,
        })
    }
}

fn boundary_prices<'c>(
    trade: &Trade,
    end_date: NaiveDate,
    candles: &'c [Candle],
) -> Result<(f64, &'c Candle), QmoneyError> {
    candle::boundaries(candles).ok_or_else(|| no_data(trade, end_date))
}

fn no_data(trade: &Trade, end_date: NaiveDate) -> QmoneyError {
    QmoneyError::NoData {
        symbol: trade.symbol.clone(),
        from: trade.purchase_date,
        to: end_date,
    }
}
