//! Service layer for fintrack
//!
//! The ledger manager sits on top of the models, stores, and reports and
//! is the only component that mutates ledger state. Import parsing lives
//! in its own module because CSV row handling is fiddly enough to test in
//! isolation.

pub mod import;
pub mod manager;

pub use import::ImportReport;
pub use manager::{ExportFormat, ImportFormat, LedgerManager, TransactionFilter};
