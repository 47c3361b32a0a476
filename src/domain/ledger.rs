//! Transaction bookkeeping on top of a [`TransactionStore`].

use super::error::StockfolioError;
use super::transaction::{ListQuery, NewTransaction, TransactionRecord, TransactionUpdate};
use crate::ports::transaction_port::TransactionStore;
use tracing::info;

/// Validate every request, then store them in order as one batch. Nothing is
/// stored if any request is invalid or the store fails partway.
pub fn record_transactions(
    store: &dyn TransactionStore,
    requests: &[NewTransaction],
) -> Result<Vec<TransactionRecord>, StockfolioError> {
    let drafts = requests
        .iter()
        .enumerate()
        .map(|(i, req)| {
            req.validate().map_err(|e| match e {
                StockfolioError::Validation { reason } => StockfolioError::Validation {
                    reason: format!("transaction #{}: {}", i + 1, reason),
                },
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let records = store.insert_all(&drafts)?;
    for record in &records {
        info!(
            id = record.id,
            ticker = %record.ticker_symbol,
            kind = %record.transaction_type,
            quantity = record.quantity,
            "recorded transaction"
        );
    }
    Ok(records)
}

pub fn get_transaction(
    store: &dyn TransactionStore,
    id: i64,
) -> Result<TransactionRecord, StockfolioError> {
    store
        .fetch_transaction(id)?
        .ok_or_else(|| missing(id))
}

pub fn list_transactions(
    store: &dyn TransactionStore,
    query: &ListQuery,
) -> Result<Vec<TransactionRecord>, StockfolioError> {
    store.list(query)
}

pub fn update_transaction(
    store: &dyn TransactionStore,
    id: i64,
    update: &TransactionUpdate,
) -> Result<TransactionRecord, StockfolioError> {
    if update.is_empty() {
        return Err(StockfolioError::validation("update contains no fields"));
    }
    let record = store.update(id, update)?.ok_or_else(|| missing(id))?;
    info!(id, "updated transaction");
    Ok(record)
}

pub fn delete_transaction(store: &dyn TransactionStore, id: i64) -> Result<(), StockfolioError> {
    if !store.delete(id)? {
        return Err(missing(id));
    }
    info!(id, "deleted transaction");
    Ok(())
}

fn missing(id: i64) -> StockfolioError {
    StockfolioError::not_found(format!("stock transaction {id}"))
}
