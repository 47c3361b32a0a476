//! Stock transaction records, ingestion requests and the field-level update contract.

use super::error::StockfolioError;
use super::money::parse_money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Widest ticker the transaction store accepts, suffix included.
pub const MAX_TICKER_LEN: usize = 10;

pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = StockfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            other => Err(StockfolioError::validation(format!(
                "unknown transaction type '{other}' (expected BUY or SELL)"
            ))),
        }
    }
}

/// A stored buy or sell event. Never mutated by the calculation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub ticker_symbol: String,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    pub transaction_date: NaiveDate,
}

/// A validated transaction that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub ticker_symbol: String,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    pub transaction_date: NaiveDate,
}

impl TransactionDraft {
    pub fn into_record(self, id: i64) -> TransactionRecord {
        TransactionRecord {
            id,
            ticker_symbol: self.ticker_symbol,
            transaction_type: self.transaction_type,
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            transaction_date: self.transaction_date,
        }
    }
}

/// Raw ingestion request, as typed by a user or read from an import file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTransaction {
    pub ticker_symbol: String,
    #[serde(default)]
    pub ticker_suffix: String,
    pub transaction_type: String,
    pub quantity: i64,
    pub price_per_unit: String,
    pub transaction_date: String,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<TransactionDraft, StockfolioError> {
        Ok(TransactionDraft {
            ticker_symbol: normalize_ticker(&self.ticker_symbol, &self.ticker_suffix)?,
            transaction_type: self.transaction_type.parse()?,
            quantity: validate_quantity(self.quantity)?,
            price_per_unit: parse_money(&self.price_per_unit)?,
            transaction_date: parse_date(&self.transaction_date)?,
        })
    }
}

/// Base symbol plus market suffix, upper-cased. Applied once at ingestion.
pub fn normalize_ticker(symbol: &str, suffix: &str) -> Result<String, StockfolioError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(StockfolioError::validation("ticker_symbol must not be empty"));
    }
    let ticker = format!("{}{}", symbol, suffix.trim()).to_uppercase();
    if !is_valid_ticker(&ticker) {
        return Err(StockfolioError::validation(format!(
            "ticker '{ticker}' may only use A-Z, 0-9, '.', '^', '=' and '-', without '..'"
        )));
    }
    if ticker.chars().count() > MAX_TICKER_LEN {
        return Err(StockfolioError::validation(format!(
            "ticker '{ticker}' exceeds {MAX_TICKER_LEN} characters"
        )));
    }
    Ok(ticker)
}

/// Upper-case letters, digits and `. ^ = -`; never `..`. Tickers name market
/// data files, so anything else is refused.
pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && !ticker.contains("..")
        && ticker.chars().all(|c| {
            c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-')
        })
}

pub fn validate_quantity(quantity: i64) -> Result<i64, StockfolioError> {
    if quantity <= 0 {
        return Err(StockfolioError::validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(quantity)
}

pub fn parse_date(text: &str) -> Result<NaiveDate, StockfolioError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
        StockfolioError::validation(format!(
            "invalid date '{}' (expected YYYY-MM-DD)",
            text.trim()
        ))
    })
}

/// The fixed set of fields an existing transaction may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionUpdate {
    pub ticker_symbol: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub quantity: Option<i64>,
    pub price_per_unit: Option<Decimal>,
    pub transaction_date: Option<NaiveDate>,
}

impl TransactionUpdate {
    /// Build an update from unparsed user input; every present field is
    /// validated with the ingestion rules.
    pub fn parse(
        ticker_symbol: Option<&str>,
        ticker_suffix: Option<&str>,
        transaction_type: Option<&str>,
        quantity: Option<i64>,
        price_per_unit: Option<&str>,
        transaction_date: Option<&str>,
    ) -> Result<Self, StockfolioError> {
        if ticker_suffix.is_some() && ticker_symbol.is_none() {
            return Err(StockfolioError::validation(
                "ticker_suffix can only be changed together with ticker_symbol",
            ));
        }
        let update = TransactionUpdate {
            ticker_symbol: ticker_symbol
                .map(|s| normalize_ticker(s, ticker_suffix.unwrap_or("")))
                .transpose()?,
            transaction_type: transaction_type
                .map(|t| t.parse::<TransactionType>())
                .transpose()?,
            quantity: quantity.map(validate_quantity).transpose()?,
            price_per_unit: price_per_unit.map(parse_money).transpose()?,
            transaction_date: transaction_date.map(parse_date).transpose()?,
        };
        if update.is_empty() {
            return Err(StockfolioError::validation("update contains no fields"));
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.ticker_symbol.is_none()
            && self.transaction_type.is_none()
            && self.quantity.is_none()
            && self.price_per_unit.is_none()
            && self.transaction_date.is_none()
    }

    pub fn apply(&self, record: &TransactionRecord) -> TransactionRecord {
        TransactionRecord {
            id: record.id,
            ticker_symbol: self
                .ticker_symbol
                .clone()
                .unwrap_or_else(|| record.ticker_symbol.clone()),
            transaction_type: self.transaction_type.unwrap_or(record.transaction_type),
            quantity: self.quantity.unwrap_or(record.quantity),
            price_per_unit: self.price_per_unit.unwrap_or(record.price_per_unit),
            transaction_date: self.transaction_date.unwrap_or(record.transaction_date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    TickerSymbol,
    TransactionType,
    Quantity,
    PricePerUnit,
    #[default]
    TransactionDate,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::TickerSymbol => "ticker_symbol",
            SortField::TransactionType => "transaction_type",
            SortField::Quantity => "quantity",
            SortField::PricePerUnit => "price_per_unit",
            SortField::TransactionDate => "transaction_date",
        }
    }
}

impl FromStr for SortField {
    type Err = StockfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "ticker_symbol" => Ok(SortField::TickerSymbol),
            "transaction_type" => Ok(SortField::TransactionType),
            "quantity" => Ok(SortField::Quantity),
            "price_per_unit" => Ok(SortField::PricePerUnit),
            "transaction_date" => Ok(SortField::TransactionDate),
            other => Err(StockfolioError::validation(format!(
                "cannot sort by '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = StockfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(StockfolioError::validation(format!(
                "sort order must be asc or desc, got '{other}'"
            ))),
        }
    }
}

/// One page of the transaction listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            page: 1,
            per_page: 10,
            sort_by: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListQuery {
    pub fn new(
        page: u32,
        per_page: u32,
        sort_by: SortField,
        order: SortOrder,
    ) -> Result<Self, StockfolioError> {
        if page == 0 {
            return Err(StockfolioError::validation("page must be at least 1"));
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(StockfolioError::validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(ListQuery {
            page,
            per_page,
            sort_by,
            order,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}
