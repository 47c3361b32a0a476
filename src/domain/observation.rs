//! Historical price/dividend observations and the current-price snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One row of a ticker's daily history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalObservation {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub dividend_per_share: Decimal,
}

/// Last traded price and the currency it is quoted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    pub currency: String,
}
