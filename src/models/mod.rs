//! Core data models for fintrack
//!
//! This module contains the data structures that represent the ledger
//! domain: transactions, categories, and money amounts.

pub mod category;
pub mod ids;
pub mod money;
pub mod transaction;

pub use category::{Category, CategoryRecord, PREDEFINED_CATEGORIES};
pub use ids::TransactionId;
pub use money::Money;
pub use transaction::{
    Transaction, TransactionKind, TransactionRecord, TransactionUpdate, CURRENCY_SYMBOL,
    DEFAULT_CURRENCY,
};
