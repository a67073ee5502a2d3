//! Total and annualized return calculation.
//!
//! `total = (sell - buy) / buy` and `annualized = (1 + total)^(1 / years) - 1`,
//! where `years` is the calendar-day holding period over the Gregorian mean
//! year.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use super::error::QmoneyError;
use super::trade::Trade;

/// Mean length of a Gregorian year in days.
pub const DAYS_PER_YEAR: f64 = 365.2425;

/// Result for a single trade. Both fields are NaN when the trade could not be
/// priced in best-effort mode; NaN serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualizedReturn {
    pub symbol: String,
    pub annualized_return: f64,
    pub total_return: f64,
}

impl AnnualizedReturn {
    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            annualized_return: f64::NAN,
            total_return: f64::NAN,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.annualized_return.is_nan()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Returns {
    pub annualized: f64,
    pub total: f64,
}

/// Holding period in fractional years.
pub fn years_between(purchase_date: NaiveDate, end_date: NaiveDate) -> f64 {
    (end_date - purchase_date).num_days() as f64 / DAYS_PER_YEAR
}

/// An end date before the purchase date is `InvalidDateRange` with an empty
/// symbol. Degenerate prices or holding periods are `Computation` errors.
pub fn calculate(
    purchase_date: NaiveDate,
    end_date: NaiveDate,
    buy_price: f64,
    sell_price: f64,
) -> Result<Returns, QmoneyError> {
    if end_date < purchase_date {
        return Err(QmoneyError::InvalidDateRange {
            symbol: String::new(),
            purchase_date,
            end_date,
        });
    }

    if !buy_price.is_finite() || !sell_price.is_finite() {
        return Err(QmoneyError::Computation {
            reason: format!("non-finite price (buy {buy_price}, sell {sell_price})"),
        });
    }
    if buy_price == 0.0 {
        return Err(QmoneyError::Computation {
            reason: "buy price is zero".into(),
        });
    }

    let years = years_between(purchase_date, end_date);
    if years == 0.0 {
        return Err(QmoneyError::Computation {
            reason: format!("zero-length holding period on {purchase_date}"),
        });
    }

    let total = (sell_price - buy_price) / buy_price;
    let annualized = (1.0 + total).powf(1.0 / years) - 1.0;
    if !annualized.is_finite() {
        return Err(QmoneyError::Computation {
            reason: format!(
                "annualized return is not finite (total {total}, years {years:.4})"
            ),
        });
    }

    Ok(Returns { annualized, total })
}

/// Price one trade. An end date before the purchase date is reported as an
/// invalid range for the trade's symbol.
pub fn calculate_for_trade(
    trade: &Trade,
    end_date: NaiveDate,
    buy_price: f64,
    sell_price: f64,
) -> Result<AnnualizedReturn, QmoneyError> {
    let r = calculate(trade.purchase_date, end_date, buy_price, sell_price).map_err(|e| match e {
        QmoneyError::InvalidDateRange {
            purchase_date,
            end_date,
            ..
        } => QmoneyError::InvalidDateRange {
            symbol: trade.symbol.clone(),
            purchase_date,
            end_date,
        },
        other => other,
    })?;
    Ok(AnnualizedReturn {
        symbol: trade.symbol.clone(),
        annualized_return: r.annualized,
        total_return: r.total,
    })
}

/// Descending by annualized return; NaN sorts after every number.
pub fn compare_descending(a: &AnnualizedReturn, b: &AnnualizedReturn) -> Ordering {
    match (a.annualized_return.is_nan(), b.annualized_return.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.annualized_return.total_cmp(&a.annualized_return),
    }
}

/// Stable sort, so equal returns keep portfolio order.
pub fn sort_descending(results: &mut [AnnualizedReturn]) {
    results.sort_by(compare_descending);
}
