//! Core domain types and logic.
//!
//! [`position`], [`performance`] and [`money`] are pure: plain data in, plain
//! data out. [`investment_detail`] and [`ledger`] drive them through the ports.

pub mod config_validation;
pub mod error;
pub mod investment_detail;
pub mod ledger;
pub mod money;
pub mod observation;
pub mod performance;
pub mod position;
pub mod transaction;
