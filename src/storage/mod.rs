//! Storage layer for fintrack
//!
//! CSV file stores with atomic writes and automatic directory creation.
//! The transaction store is encrypted at rest; the category store is
//! plaintext.

pub mod categories;
pub mod file_io;
pub mod transactions;

pub use categories::CategoryStore;
pub use file_io::{read_bytes, write_bytes_atomic};
pub use transactions::TransactionStore;
