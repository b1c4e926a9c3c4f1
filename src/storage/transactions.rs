//! Encrypted transaction store
//!
//! Transactions persist as CSV rows encrypted into a JSON envelope. Saves
//! rewrite the whole file through an atomic replace; loads are strict and
//! refuse the entire file when any row is malformed. A plaintext
//! `transactions.csv` left behind by a pre-encryption version of the
//! ledger is migrated on first load and then deleted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::LedgerPaths;
use crate::crypto::{EncryptedData, StoreCipher};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Transaction, TransactionRecord};

use super::file_io::{read_bytes, write_bytes_atomic};

/// Store for the encrypted transactions file
#[derive(Debug, Clone)]
pub struct TransactionStore {
    path: PathBuf,
    legacy_path: PathBuf,
}

impl TransactionStore {
    pub fn new(paths: &LedgerPaths) -> Self {
        Self {
            path: paths.transactions_file(),
            legacy_path: paths.legacy_transactions_file(),
        }
    }

    /// Path of the encrypted store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize, encrypt, and atomically replace the store file
    pub fn save(&self, cipher: &StoreCipher, transactions: &[Transaction]) -> LedgerResult<()> {
        let csv_bytes = encode_csv(transactions)?;
        let envelope = cipher.encrypt(&csv_bytes)?;
        write_bytes_atomic(&self.path, &envelope.to_json()?)?;
        debug!(count = transactions.len(), "saved transaction store");
        Ok(())
    }

    /// Load every transaction from the store
    ///
    /// A missing store is a fresh ledger, not an error. A store that
    /// exists but cannot be fully decoded (bad envelope, wrong key, or a
    /// row that fails validation) aborts the load; no rows are silently
    /// skipped.
    pub fn load(&self, cipher: &StoreCipher) -> LedgerResult<Vec<Transaction>> {
        if self.path.exists() {
            let bytes = read_bytes(&self.path)?;
            let envelope = EncryptedData::from_json(&bytes)?;
            let csv_bytes = cipher.decrypt(&envelope)?;
            decode_csv(&csv_bytes, &self.path)
        } else if self.legacy_path.exists() {
            self.migrate_legacy(cipher)
        } else {
            Ok(Vec::new())
        }
    }

    /// One-time upgrade of a plaintext store: parse it, write the
    /// encrypted form, then remove the plaintext file
    fn migrate_legacy(&self, cipher: &StoreCipher) -> LedgerResult<Vec<Transaction>> {
        let bytes = read_bytes(&self.legacy_path)?;
        let transactions = decode_csv(&bytes, &self.legacy_path)?;

        info!(
            path = %self.legacy_path.display(),
            count = transactions.len(),
            "migrating plaintext transaction store to encrypted format"
        );
        self.save(cipher, &transactions)?;
        fs::remove_file(&self.legacy_path).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to remove legacy store {}: {}",
                self.legacy_path.display(),
                e
            ))
        })?;

        Ok(transactions)
    }
}

/// Encode transactions as CSV bytes (header + one row per transaction)
fn encode_csv(transactions: &[Transaction]) -> LedgerResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for txn in transactions {
        writer.serialize(txn.to_record())?;
    }
    writer
        .into_inner()
        .map_err(|e| LedgerError::Storage(format!("Failed to encode transactions: {}", e)))
}

/// Decode CSV bytes into transactions, re-validating every row
///
/// Row numbers in errors count the header as row 1.
fn decode_csv(bytes: &[u8], path: &Path) -> LedgerResult<Vec<Transaction>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut transactions = Vec::new();

    for (i, row) in reader.deserialize::<TransactionRecord>().enumerate() {
        let row_num = i + 2;
        let record = row.map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to parse {} row {}: {}",
                path.display(),
                row_num,
                e
            ))
        })?;
        let txn = Transaction::from_record(&record).map_err(|e| {
            LedgerError::Storage(format!(
                "Invalid transaction in {} row {}: {}",
                path.display(),
                row_num,
                e
            ))
        })?;
        transactions.push(txn);
    }

    Ok(transactions)
}
