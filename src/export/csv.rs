//! CSV export functionality
//!
//! Writes transactions to the plaintext CSV export layout. Import reads
//! the same layout back by header name.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Transaction;

/// Header row of the transactions CSV export
pub const CSV_EXPORT_HEADER: &str = "ID,Date,Type,Category,Amount,Description";

/// Export transactions to CSV
pub fn export_transactions_csv<W: Write>(
    transactions: &[Transaction],
    writer: &mut W,
) -> LedgerResult<()> {
    writeln!(writer, "{}", CSV_EXPORT_HEADER).map_err(|e| LedgerError::Export(e.to_string()))?;

    for txn in transactions {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            txn.id(),
            txn.day(),
            txn.kind().as_str(),
            escape_csv(txn.category()),
            txn.amount(),
            escape_csv(txn.description()),
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Escape a string for CSV format
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
