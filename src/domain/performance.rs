//! Investment performance metrics for an aggregated position.

use super::error::StockfolioError;
use super::money::{checked_add, checked_mul, checked_sum, mean, round_money};
use super::observation::HistoricalObservation;
use super::position::Position;
use rust_decimal::Decimal;
use serde::Serialize;

/// Reported metrics, all monetary fields rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceReport {
    pub ticker_symbol: String,
    pub currency: String,
    pub current_price: Decimal,
    pub dividends_paid: Decimal,
    pub price_variation: Decimal,
    pub profitability_stock: Decimal,
    pub profitability_total: Decimal,
    pub best_price_to_sell: Decimal,
    pub best_price_to_buy: Decimal,
    pub average_price_since_buy: Decimal,
    pub average_price_paid: Decimal,
}

/// High/low/mean-close summary of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSummary {
    pub highest_high: Decimal,
    pub lowest_low: Decimal,
    pub average_close: Decimal,
}

impl SeriesSummary {
    pub fn from_series(
        ticker: &str,
        start: chrono::NaiveDate,
        series: &[HistoricalObservation],
    ) -> Result<Self, StockfolioError> {
        let empty = || StockfolioError::EmptySeries {
            ticker: ticker.to_string(),
            start_date: start.format("%Y-%m-%d").to_string(),
        };

        let highest_high = series.iter().map(|o| o.high).max().ok_or_else(empty)?;
        let lowest_low = series.iter().map(|o| o.low).min().ok_or_else(empty)?;
        let closes: Vec<Decimal> = series.iter().map(|o| o.close).collect();
        let average_close = mean(&closes).ok_or_else(empty)?;

        Ok(SeriesSummary {
            highest_high,
            lowest_low,
            average_close,
        })
    }
}

/// Dividends received by `quantity` shares over every observation given.
///
/// The series is summed as-is; callers window it from the first purchase date.
pub fn dividends_paid(
    series: &[HistoricalObservation],
    quantity: i64,
) -> Result<Decimal, StockfolioError> {
    let shares = Decimal::from(quantity);
    let per_share = checked_sum(series.iter().map(|o| o.dividend_per_share), "dividends paid")?;
    checked_mul(per_share, shares, "dividends paid")
}

/// Derive the performance report of `position` against `series`.
pub fn calculate(
    position: &Position,
    series: &[HistoricalObservation],
    current_price: Decimal,
    currency: &str,
) -> Result<PerformanceReport, StockfolioError> {
    let summary = SeriesSummary::from_series(
        &position.ticker_symbol,
        position.earliest_transaction_date,
        series,
    )?;

    let dividends = dividends_paid(series, position.total_quantity)?;
    let price_variation = current_price
        .checked_sub(position.average_price_paid)
        .ok_or_else(|| StockfolioError::Arithmetic {
            operation: "price variation".into(),
        })?;
    let profitability_stock = checked_mul(
        price_variation,
        Decimal::from(position.total_quantity),
        "stock profitability",
    )?;

    let dividends_paid = round_money(dividends);
    let profitability_stock = round_money(profitability_stock);
    // Summed after rounding so the reported total is exactly the sum of its parts.
    let profitability_total = checked_add(dividends_paid, profitability_stock, "total profitability")?;

    Ok(PerformanceReport {
        ticker_symbol: position.ticker_symbol.clone(),
        currency: currency.to_string(),
        current_price: round_money(current_price),
        dividends_paid,
        price_variation: round_money(price_variation),
        profitability_stock,
        profitability_total,
        best_price_to_sell: round_money(summary.highest_high),
        best_price_to_buy: round_money(summary.lowest_low),
        average_price_since_buy: round_money(summary.average_close),
        average_price_paid: round_money(position.average_price_paid),
    })
}
