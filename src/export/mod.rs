//! Export module for fintrack
//!
//! Provides data export functionality in two formats:
//! - CSV: transactions only (spreadsheet-compatible)
//! - JSON: machine-readable full ledger export
//!
//! Export artifacts are plaintext by design; only the transaction store
//! itself is encrypted at rest.

pub mod csv;
pub mod json;

pub use csv::{export_transactions_csv, CSV_EXPORT_HEADER};
pub use json::{export_full_json, parse_full_json, FullExport};
