//! CSV file market data adapter and transaction import reader.
//!
//! History lives in `<base>/<TICKER>.csv` with the header
//! `date,open,high,low,close,dividends`; quotes in `<base>/quotes.csv` with
//! `ticker,price,currency`.

use crate::domain::error::StockfolioError;
use crate::domain::observation::{HistoricalObservation, Quote};
use crate::domain::transaction::{NewTransaction, is_valid_ticker};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

pub const QUOTES_FILE: &str = "quotes.csv";

pub struct CsvMarketData {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    ticker: String,
    price: String,
    currency: String,
}

impl CsvMarketData {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn history_path(&self, ticker: &str) -> Result<PathBuf, StockfolioError> {
        if !is_valid_ticker(ticker) {
            return Err(StockfolioError::validation(format!(
                "'{ticker}' is not a ticker symbol"
            )));
        }
        Ok(self.base_path.join(format!("{ticker}.csv")))
    }

    fn read(&self, path: &Path) -> Result<String, StockfolioError> {
        fs::read_to_string(path).map_err(|e| StockfolioError::MarketData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })
    }
}

impl MarketDataPort for CsvMarketData {
    fn fetch_series(
        &self,
        ticker: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<HistoricalObservation>, StockfolioError> {
        let path = self.history_path(ticker)?;
        let content = self.read(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut series = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockfolioError::MarketData {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let row = line + 2;

            let date_str = field(&record, 0, "date", row)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                StockfolioError::MarketData {
                    reason: format!("row {row}: invalid date format: {e}"),
                }
            })?;

            if date < start_date {
                continue;
            }

            series.push(HistoricalObservation {
                date,
                open: decimal_field(&record, 1, "open", row)?,
                high: decimal_field(&record, 2, "high", row)?,
                low: decimal_field(&record, 3, "low", row)?,
                close: decimal_field(&record, 4, "close", row)?,
                dividend_per_share: decimal_field(&record, 5, "dividends", row)?,
            });
        }

        series.sort_by_key(|o| o.date);
        debug!(ticker, since = %start_date, rows = series.len(), "loaded history");
        Ok(series)
    }

    fn current_price_and_currency(&self, ticker: &str) -> Result<Quote, StockfolioError> {
        let path = self.base_path.join(QUOTES_FILE);
        let content = self.read(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        for result in rdr.deserialize::<QuoteRow>() {
            let row = result.map_err(|e| StockfolioError::MarketData {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            if row.ticker.trim() != ticker {
                continue;
            }
            let text = row.price.trim();
            let price = parse_decimal(text).map_err(|e| StockfolioError::MarketData {
                reason: format!("invalid price '{text}' for {ticker}: {e}"),
            })?;
            if price.is_sign_negative() && !price.is_zero() {
                return Err(StockfolioError::MarketData {
                    reason: format!("negative price '{text}' for {ticker}"),
                });
            }
            return Ok(Quote {
                price,
                currency: row.currency.trim().to_string(),
            });
        }

        warn!(ticker, "no quote available");
        Err(StockfolioError::MarketData {
            reason: format!("no quote for {ticker} in {}", path.display()),
        })
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'r str, StockfolioError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| StockfolioError::MarketData {
            reason: format!("row {row}: missing {name} column"),
        })
}

fn decimal_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<Decimal, StockfolioError> {
    let text = field(record, index, name, row)?;
    parse_decimal(text).map_err(|e| StockfolioError::MarketData {
        reason: format!("row {row}: invalid {name} value '{text}': {e}"),
    })
}

// Providers often emit float text; scientific notation included.
fn parse_decimal(text: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))
}

/// Read ingestion requests from a CSV file with a header row naming the
/// `NewTransaction` fields (`ticker_suffix` may be left empty).
pub fn read_transaction_requests(path: &Path) -> Result<Vec<NewTransaction>, StockfolioError> {
    let content = fs::read_to_string(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.deserialize::<NewTransaction>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| {
                StockfolioError::validation(format!("{} row {}: {}", path.display(), i + 2, e))
            })
        })
        .collect()
}
