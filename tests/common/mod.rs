#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use stockfolio::domain::error::StockfolioError;
pub use stockfolio::domain::observation::{HistoricalObservation, Quote};
pub use stockfolio::domain::transaction::{
    ListQuery, SortField, SortOrder, TransactionDraft, TransactionRecord, TransactionType, TransactionUpdate,
};
use stockfolio::ports::market_data_port::MarketDataPort;
use stockfolio::ports::transaction_port::TransactionStore;

/// In-memory store keeping insertion order. `fail_inserts_after` makes a batch
/// fail once the store would grow past that many rows; nothing from the
/// failing batch is kept.
#[derive(Default)]
pub struct MockTransactionStore {
    pub rows: RefCell<Vec<TransactionRecord>>,
    pub fail_inserts_after: Option<usize>,
}

impl MockTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TransactionRecord>) -> Self {
        Self {
            rows: RefCell::new(records),
            fail_inserts_after: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }
}

impl TransactionStore for MockTransactionStore {
    fn insert_all(
        &self,
        drafts: &[TransactionDraft],
    ) -> Result<Vec<TransactionRecord>, StockfolioError> {
        let mut rows = self.rows.borrow_mut();
        let mut next_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        let mut staged = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if self
                .fail_inserts_after
                .is_some_and(|n| rows.len() + staged.len() >= n)
            {
                return Err(StockfolioError::Database {
                    reason: "disk full".into(),
                });
            }
            next_id += 1;
            staged.push(draft.clone().into_record(next_id));
        }
        rows.extend(staged.iter().cloned());
        Ok(staged)
    }

    fn fetch_transaction(&self, id: i64) -> Result<Option<TransactionRecord>, StockfolioError> {
        Ok(self.rows.borrow().iter().find(|r| r.id == id).cloned())
    }

    fn fetch_transactions(&self, ticker: &str) -> Result<Vec<TransactionRecord>, StockfolioError> {
        let mut rows: Vec<_> = self
            .rows
            .borrow()
            .iter()
            .filter(|r| r.ticker_symbol == ticker)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.transaction_date, r.id));
        Ok(rows)
    }

    fn list(&self, query: &ListQuery) -> Result<Vec<TransactionRecord>, StockfolioError> {
        let mut rows = self.rows.borrow().clone();
        rows.sort_by(|a, b| {
            let by_field = match query.sort_by {
                SortField::Id => Ordering::Equal,
                SortField::TickerSymbol => a.ticker_symbol.cmp(&b.ticker_symbol),
                SortField::TransactionType => {
                    a.transaction_type.as_str().cmp(b.transaction_type.as_str())
                }
                SortField::Quantity => a.quantity.cmp(&b.quantity),
                SortField::PricePerUnit => a.price_per_unit.cmp(&b.price_per_unit),
                SortField::TransactionDate => a.transaction_date.cmp(&b.transaction_date),
            };
            by_field.then(a.id.cmp(&b.id))
        });
        if query.order == SortOrder::Desc {
            rows.reverse();
        }
        Ok(rows
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect())
    }

    fn update(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<TransactionRecord>, StockfolioError> {
        let mut rows = self.rows.borrow_mut();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|row| {
            *row = update.apply(row);
            row.clone()
        }))
    }

    fn delete(&self, id: i64) -> Result<bool, StockfolioError> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }
}

/// Market data keyed by ticker; `fetch_series` windows by start date like a
/// real provider.
pub struct MockMarketData {
    pub series: HashMap<String, Vec<HistoricalObservation>>,
    pub quotes: HashMap<String, Quote>,
    pub requested_starts: RefCell<Vec<(String, NaiveDate)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            quotes: HashMap::new(),
            requested_starts: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, ticker: &str, series: Vec<HistoricalObservation>) -> Self {
        self.series.insert(ticker.to_string(), series);
        self
    }

    pub fn with_quote(mut self, ticker: &str, price: Decimal, currency: &str) -> Self {
        self.quotes.insert(
            ticker.to_string(),
            Quote {
                price,
                currency: currency.to_string(),
            },
        );
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_series(
        &self,
        ticker: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<HistoricalObservation>, StockfolioError> {
        self.requested_starts
            .borrow_mut()
            .push((ticker.to_string(), start_date));
        Ok(self
            .series
            .get(ticker)
            .map(|s| s.iter().filter(|o| o.date >= start_date).cloned().collect())
            .unwrap_or_default())
    }

    fn current_price_and_currency(&self, ticker: &str) -> Result<Quote, StockfolioError> {
        self.quotes
            .get(ticker)
            .cloned()
            .ok_or_else(|| StockfolioError::MarketData {
                reason: format!("no quote for {ticker}"),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(
    id: i64,
    ticker: &str,
    quantity: i64,
    price: Decimal,
    on: NaiveDate,
) -> TransactionRecord {
    TransactionRecord {
        id,
        ticker_symbol: ticker.to_string(),
        transaction_type: TransactionType::Buy,
        quantity,
        price_per_unit: price,
        transaction_date: on,
    }
}

pub fn make_observation(
    on: NaiveDate,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    dividend: Decimal,
) -> HistoricalObservation {
    HistoricalObservation {
        date: on,
        open: close,
        high,
        low,
        close,
        dividend_per_share: dividend,
    }
}
