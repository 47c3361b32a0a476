//! Fixed-point money helpers shared by the aggregator and the calculator.

use super::error::StockfolioError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Fractional digits carried by stored prices and reported amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round to cents using banker's rounding.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Parse a non-negative price with at most two fractional digits.
pub fn parse_money(text: &str) -> Result<Decimal, StockfolioError> {
    let trimmed = text.trim();
    let mut value = Decimal::from_str(trimmed)
        .map_err(|e| StockfolioError::validation(format!("invalid amount '{trimmed}': {e}")))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(StockfolioError::validation(format!(
            "amount '{trimmed}' must not be negative"
        )));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(StockfolioError::validation(format!(
            "amount '{trimmed}' has more than {MONEY_SCALE} fractional digits"
        )));
    }
    value.rescale(MONEY_SCALE);
    Ok(value)
}

pub fn checked_add(a: Decimal, b: Decimal, operation: &str) -> Result<Decimal, StockfolioError> {
    a.checked_add(b).ok_or_else(|| overflow(operation))
}

pub fn checked_mul(a: Decimal, b: Decimal, operation: &str) -> Result<Decimal, StockfolioError> {
    a.checked_mul(b).ok_or_else(|| overflow(operation))
}

pub fn checked_sum<I>(values: I, operation: &str) -> Result<Decimal, StockfolioError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, v, operation))
}

/// Exact arithmetic mean, `None` for an empty input.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total = checked_sum(values.iter().copied(), "mean").ok()?;
    total.checked_div(Decimal::from(values.len()))
}

fn overflow(operation: &str) -> StockfolioError {
    StockfolioError::Arithmetic {
        operation: operation.to_string(),
    }
}
