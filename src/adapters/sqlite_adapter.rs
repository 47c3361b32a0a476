//! SQLite transaction store.
//!
//! Prices are stored as integer cents so they stay exact and sort numerically.

use crate::domain::config_validation::DEFAULT_POOL_SIZE;
use crate::domain::error::StockfolioError;
use crate::domain::money::MONEY_SCALE;
use crate::domain::transaction::{
    ListQuery, SortField, SortOrder, TransactionDraft, TransactionRecord, TransactionType,
    TransactionUpdate,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::transaction_port::TransactionStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::debug;

const SELECT_COLUMNS: &str =
    "SELECT id, ticker_symbol, transaction_type, quantity, price_cents, transaction_date
     FROM stock_transactions";

pub struct SqliteTransactionStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteTransactionStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockfolioError> {
        let db_path =
            config
                .get_path("sqlite", "path")
                .ok_or_else(|| StockfolioError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", DEFAULT_POOL_SIZE) as u32;
        debug!(path = %db_path.display(), pool_size, "opening sqlite transaction store");

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, StockfolioError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), StockfolioError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stock_transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker_symbol TEXT NOT NULL,
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('BUY', 'SELL')),
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
                transaction_date TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_stock_transactions_ticker
                ON stock_transactions(ticker_symbol);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockfolioError> {
        self.pool.get().map_err(pool_err)
    }
}

impl TransactionStore for SqliteTransactionStore {
    fn insert_all(
        &self,
        drafts: &[TransactionDraft],
    ) -> Result<Vec<TransactionRecord>, StockfolioError> {
        let mut conn = self.conn()?;
        // Dropping `tx` without commit rolls the whole batch back.
        let tx = conn.transaction().map_err(query_err)?;
        let mut records = Vec::with_capacity(drafts.len());
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO stock_transactions
                        (ticker_symbol, transaction_type, quantity, price_cents, transaction_date)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(query_err)?;

            for draft in drafts {
                let id = stmt
                    .insert(params![
                        draft.ticker_symbol,
                        draft.transaction_type.as_str(),
                        draft.quantity,
                        to_cents(draft.price_per_unit)?,
                        format_date(draft.transaction_date),
                    ])
                    .map_err(query_err)?;
                records.push(draft.clone().into_record(id));
            }
        }
        tx.commit().map_err(query_err)?;

        debug!(rows = records.len(), "inserted transactions");
        Ok(records)
    }

    fn fetch_transaction(&self, id: i64) -> Result<Option<TransactionRecord>, StockfolioError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            read_record,
        )
        .optional()
        .map_err(query_err)
    }

    fn fetch_transactions(&self, ticker: &str) -> Result<Vec<TransactionRecord>, StockfolioError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE ticker_symbol = ?1 ORDER BY transaction_date ASC, id ASC"
            ))
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![ticker], read_record)
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn list(&self, query: &ListQuery) -> Result<Vec<TransactionRecord>, StockfolioError> {
        let conn = self.conn()?;
        let direction = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = format!(
            "{SELECT_COLUMNS} ORDER BY {column} {direction}, id {direction} LIMIT ?1 OFFSET ?2",
            column = sort_column(query.sort_by),
        );

        let mut stmt = conn.prepare(&sql).map_err(query_err)?;
        let offset = i64::try_from(query.offset()).map_err(|_| {
            StockfolioError::validation(format!("page {} is out of range", query.page))
        })?;
        let rows = stmt
            .query_map(params![i64::from(query.per_page), offset], read_record)
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn update(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<TransactionRecord>, StockfolioError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        let current = tx
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                read_record,
            )
            .optional()
            .map_err(query_err)?;

        let Some(current) = current else {
            return Ok(None);
        };

        let updated = update.apply(&current);
        tx.execute(
            "UPDATE stock_transactions
             SET ticker_symbol = ?1, transaction_type = ?2, quantity = ?3,
                 price_cents = ?4, transaction_date = ?5
             WHERE id = ?6",
            params![
                updated.ticker_symbol,
                updated.transaction_type.as_str(),
                updated.quantity,
                to_cents(updated.price_per_unit)?,
                format_date(updated.transaction_date),
                id,
            ],
        )
        .map_err(query_err)?;

        tx.commit().map_err(query_err)?;
        Ok(Some(updated))
    }

    fn delete(&self, id: i64) -> Result<bool, StockfolioError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM stock_transactions WHERE id = ?1", params![id])
            .map_err(query_err)?;
        Ok(removed > 0)
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::PricePerUnit => "price_cents",
        other => other.column(),
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let kind: String = row.get(2)?;
    let transaction_type = kind.parse::<TransactionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let date_str: String = row.get(5)?;
    let transaction_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let cents: i64 = row.get(4)?;
    Ok(TransactionRecord {
        id: row.get(0)?,
        ticker_symbol: row.get(1)?,
        transaction_type,
        quantity: row.get(3)?,
        price_per_unit: Decimal::new(cents, MONEY_SCALE),
        transaction_date,
    })
}

fn to_cents(price: Decimal) -> Result<i64, StockfolioError> {
    let mut scaled = price;
    scaled.rescale(MONEY_SCALE);
    i64::try_from(scaled.mantissa()).map_err(|_| StockfolioError::Arithmetic {
        operation: format!("storing price {price}"),
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn pool_err(e: r2d2::Error) -> StockfolioError {
    StockfolioError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> StockfolioError {
    StockfolioError::DatabaseQuery {
        reason: e.to_string(),
    }
}
