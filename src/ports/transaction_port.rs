//! Transaction store port.

use crate::domain::error::StockfolioError;
use crate::domain::transaction::{
    ListQuery, TransactionDraft, TransactionRecord, TransactionUpdate,
};

pub trait TransactionStore {
    /// Store the drafts in order as one unit: on error none of them remain.
    fn insert_all(
        &self,
        drafts: &[TransactionDraft],
    ) -> Result<Vec<TransactionRecord>, StockfolioError>;

    fn fetch_transaction(&self, id: i64) -> Result<Option<TransactionRecord>, StockfolioError>;

    /// Every transaction stored under the exact (already normalized) ticker,
    /// oldest first.
    fn fetch_transactions(&self, ticker: &str) -> Result<Vec<TransactionRecord>, StockfolioError>;

    fn list(&self, query: &ListQuery) -> Result<Vec<TransactionRecord>, StockfolioError>;

    /// Returns `None` when no transaction has this id.
    fn update(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<TransactionRecord>, StockfolioError>;

    /// Returns whether a row was removed.
    fn delete(&self, id: i64) -> Result<bool, StockfolioError>;
}
