//! Investment detail resolution: picks the transactions, fetches market data
//! and runs the aggregator and calculator.

use super::error::StockfolioError;
use super::performance::{self, PerformanceReport};
use super::position::{self, Position};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::transaction_port::TransactionStore;
use tracing::{debug, info};

pub struct InvestmentDetailService<'a> {
    store: &'a dyn TransactionStore,
    market: &'a dyn MarketDataPort,
}

impl<'a> InvestmentDetailService<'a> {
    pub fn new(store: &'a dyn TransactionStore, market: &'a dyn MarketDataPort) -> Self {
        Self { store, market }
    }

    /// Performance of a single stored transaction.
    pub fn by_transaction_id(&self, id: i64) -> Result<PerformanceReport, StockfolioError> {
        let record = self
            .store
            .fetch_transaction(id)?
            .ok_or_else(|| StockfolioError::not_found(format!("stock transaction {id}")))?;
        info!(id, ticker = %record.ticker_symbol, "resolving investment detail by transaction");

        let position = position::aggregate(std::slice::from_ref(&record))?;
        self.report(&position)
    }

    /// Performance of every stored transaction for `ticker`, aggregated.
    pub fn by_symbol(&self, ticker: &str) -> Result<PerformanceReport, StockfolioError> {
        let records = self.store.fetch_transactions(ticker)?;
        if records.is_empty() {
            return Err(StockfolioError::not_found(format!(
                "stock transactions for symbol {ticker}"
            )));
        }
        info!(
            ticker,
            transactions = records.len(),
            "resolving investment detail by symbol"
        );

        let position = position::aggregate(&records)?;
        self.report(&position)
    }

    fn report(&self, position: &Position) -> Result<PerformanceReport, StockfolioError> {
        debug!(
            ticker = %position.ticker_symbol,
            quantity = position.total_quantity,
            average_price_paid = %position.average_price_paid,
            since = %position.earliest_transaction_date,
            "aggregated position"
        );

        let series = self
            .market
            .fetch_series(&position.ticker_symbol, position.earliest_transaction_date)?;
        let quote = self
            .market
            .current_price_and_currency(&position.ticker_symbol)?;
        debug!(
            observations = series.len(),
            price = %quote.price,
            currency = %quote.currency,
            "fetched market data"
        );

        performance::calculate(position, &series, quote.price, &quote.currency)
    }
}
