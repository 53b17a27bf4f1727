//! Calorie ledger
//!
//! Normalization of raw records, the session ledger, and its aggregates.

pub mod aggregate;
pub mod normalizer;
mod store;

pub use aggregate::{DayBalance, Totals, TREND_DAYS};
pub use store::{AppendFailure, AppendReport, LedgerStore};
