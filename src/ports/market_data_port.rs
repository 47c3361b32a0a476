//! Historical market data port.

use crate::domain::error::StockfolioError;
use crate::domain::observation::{HistoricalObservation, Quote};
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Date-ordered observations for `ticker` on or after `start_date`.
    fn fetch_series(
        &self,
        ticker: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<HistoricalObservation>, StockfolioError>;

    fn current_price_and_currency(&self, ticker: &str) -> Result<Quote, StockfolioError>;
}
