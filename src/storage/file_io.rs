//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure. The
//! stores work on raw bytes here: the transactions store writes an
//! encrypted envelope and the categories store plain CSV, both through the
//! same replace-by-rename sequence.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};

/// Read the full contents of a file
pub fn read_bytes<P: AsRef<Path>>(path: P) -> LedgerResult<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path)
        .map_err(|e| LedgerError::Storage(format!("Failed to read {}: {}", path.display(), e)))
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all, so a
/// crash or power failure mid-write cannot corrupt the store.
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> LedgerResult<()> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory (important for atomic rename)
    let temp_path = temp_path_for(path)?;

    let file = File::create(&temp_path)
        .map_err(|e| LedgerError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|e| LedgerError::Storage(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| LedgerError::Storage(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| LedgerError::Storage(format!("Failed to sync data: {}", e)))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        LedgerError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Sibling path with ".tmp" appended to the full file name, so
/// "transactions.csv.enc" becomes "transactions.csv.enc.tmp"
fn temp_path_for(path: &Path) -> LedgerResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LedgerError::Storage(format!("Invalid path: {}", path.display())))?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}
