//! fintrack - Encrypted personal finance ledger
//!
//! This library implements a single-user finance ledger: transactions
//! grouped into budgeted categories, monthly summaries and trends, and
//! plaintext CSV/JSON interchange. The transaction store is encrypted at
//! rest with AES-256-GCM; the key lives in a generate-once key file or is
//! derived from a passphrase.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Core data models (money, transactions, categories)
//! - `crypto`: Store key handling and the AES-256-GCM cipher
//! - `storage`: CSV-backed stores with atomic writes
//! - `reports`: Summaries, budget alerts, trends and insights
//! - `services`: The ledger manager and import handling
//! - `export`: Plaintext CSV/JSON export formats
//!
//! # Example
//!
//! ```rust,ignore
//! use fintrack::config::LedgerPaths;
//! use fintrack::{LedgerManager, Money, TransactionKind};
//!
//! let paths = LedgerPaths::new()?;
//! let mut ledger = LedgerManager::open(paths)?;
//! ledger.add_transaction(
//!     Money::from_cents(11050),
//!     TransactionKind::Expense,
//!     "Food",
//!     "groceries",
//!     None,
//! )?;
//! ```

use std::sync::Once;

pub mod config;
pub mod crypto;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
pub use models::{Category, Money, Transaction, TransactionId, TransactionKind, TransactionUpdate};
pub use services::{ExportFormat, ImportFormat, ImportReport, LedgerManager, TransactionFilter};

/// Initialize logging for binaries embedding the ledger
///
/// Safe to call more than once; only the first call installs the
/// subscriber. Honors `RUST_LOG`, defaulting to `fintrack=info`.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fintrack=info"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
