//! Cost-basis position aggregated from one ticker's transactions.
//!
//! BUY and SELL rows are summed identically: a SELL adds to quantity and cost
//! like a BUY does. Lot netting on sells (FIFO/LIFO, realized gains) is a known
//! gap that is intentionally not applied here.

use super::error::StockfolioError;
use super::money::{checked_add, checked_mul};
use super::transaction::TransactionRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ticker_symbol: String,
    pub total_quantity: i64,
    pub average_price_paid: Decimal,
    pub earliest_transaction_date: NaiveDate,
}

impl Position {
    /// Single-transaction position; the same path as [`aggregate`].
    pub fn from_transaction(record: &TransactionRecord) -> Result<Self, StockfolioError> {
        aggregate(std::slice::from_ref(record))
    }
}

/// Reduce the transactions of one ticker into a single position.
pub fn aggregate(transactions: &[TransactionRecord]) -> Result<Position, StockfolioError> {
    let first = transactions.first().ok_or(StockfolioError::EmptyInput)?;

    if let Some(other) = transactions
        .iter()
        .find(|t| t.ticker_symbol != first.ticker_symbol)
    {
        return Err(StockfolioError::validation(format!(
            "cannot aggregate mixed tickers {} and {}",
            first.ticker_symbol, other.ticker_symbol
        )));
    }

    let mut total_quantity: i64 = 0;
    let mut total_cost = Decimal::ZERO;
    let mut earliest = first.transaction_date;

    for t in transactions {
        total_quantity = total_quantity
            .checked_add(t.quantity)
            .ok_or_else(|| StockfolioError::Arithmetic {
                operation: "total quantity".into(),
            })?;
        let cost = checked_mul(Decimal::from(t.quantity), t.price_per_unit, "cost basis")?;
        total_cost = checked_add(total_cost, cost, "cost basis")?;
        earliest = earliest.min(t.transaction_date);
    }

    if total_quantity <= 0 {
        return Err(StockfolioError::validation(format!(
            "total quantity for {} must be positive, got {}",
            first.ticker_symbol, total_quantity
        )));
    }

    let average_price_paid = total_cost
        .checked_div(Decimal::from(total_quantity))
        .ok_or_else(|| StockfolioError::Arithmetic {
            operation: "average price paid".into(),
        })?;

    Ok(Position {
        ticker_symbol: first.ticker_symbol.clone(),
        total_quantity,
        average_price_paid,
        earliest_transaction_date: earliest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionType;
    use rust_decimal_macros::dec;

    fn tx(id: i64, ticker: &str, quantity: i64, price: Decimal, date: (i32, u32, u32)) -> TransactionRecord {
        TransactionRecord {
            id,
            ticker_symbol: ticker.into(),
            transaction_type: TransactionType::Buy,
            quantity,
            price_per_unit: price,
            transaction_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[test]
    fn single_transaction_keeps_its_price() {
        let t = tx(1, "X", 10, dec!(100.00), (2023, 1, 1));
        let pos = aggregate(&[t.clone()]).unwrap();
        assert_eq!(pos.ticker_symbol, "X");
        assert_eq!(pos.total_quantity, 10);
        assert_eq!(pos.average_price_paid, dec!(100.00));
        assert_eq!(pos.earliest_transaction_date, t.transaction_date);
        assert_eq!(Position::from_transaction(&t).unwrap(), pos);
    }

    #[test]
    fn weighted_average_of_two_lots() {
        let pos = aggregate(&[
            tx(1, "Y", 5, dec!(50.00), (2023, 2, 1)),
            tx(2, "Y", 5, dec!(70.00), (2023, 1, 1)),
        ])
        .unwrap();
        assert_eq!(pos.total_quantity, 10);
        assert_eq!(pos.average_price_paid, dec!(60.00));
        assert_eq!(
            pos.earliest_transaction_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn uneven_weights() {
        let pos = aggregate(&[
            tx(1, "Z", 1, dec!(10.00), (2023, 1, 1)),
            tx(2, "Z", 3, dec!(20.00), (2023, 1, 2)),
        ])
        .unwrap();
        assert_eq!(pos.average_price_paid, dec!(17.50));
    }

    #[test]
    fn sells_are_summed_like_buys() {
        let mut sell = tx(2, "Y", 5, dec!(70.00), (2023, 3, 1));
        sell.transaction_type = TransactionType::Sell;
        let pos = aggregate(&[tx(1, "Y", 5, dec!(50.00), (2023, 1, 1)), sell]).unwrap();
        assert_eq!(pos.total_quantity, 10);
        assert_eq!(pos.average_price_paid, dec!(60.00));
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(aggregate(&[]), Err(StockfolioError::EmptyInput)));
    }

    #[test]
    fn mixed_tickers_fail_validation() {
        let err = aggregate(&[
            tx(1, "X", 1, dec!(1.00), (2023, 1, 1)),
            tx(2, "Y", 1, dec!(1.00), (2023, 1, 1)),
        ])
        .unwrap_err();
        assert!(matches!(err, StockfolioError::Validation { .. }));
        assert!(err.to_string().contains("X and Y"));
    }

    #[test]
    fn zero_quantity_is_rejected_not_divided() {
        let err = aggregate(&[tx(1, "X", 0, dec!(1.00), (2023, 1, 1))]).unwrap_err();
        assert!(matches!(err, StockfolioError::Validation { .. }));
    }

    #[test]
    fn quantity_overflow_is_reported() {
        let err = aggregate(&[
            tx(1, "X", i64::MAX, dec!(0.00), (2023, 1, 1)),
            tx(2, "X", 1, dec!(0.00), (2023, 1, 1)),
        ])
        .unwrap_err();
        assert!(matches!(err, StockfolioError::Arithmetic { .. }));
    }

    #[test]
    fn zero_price_lots_average_to_zero() {
        let pos = aggregate(&[tx(1, "BONUS", 4, dec!(0.00), (2023, 1, 1))]).unwrap();
        assert!(pos.average_price_paid.is_zero());
    }
}
