//! Category store
//!
//! Categories persist as a plaintext CSV file (`name,budget_limit,
//! is_predefined`). Unlike transactions they carry nothing sensitive, so
//! the file stays readable; writes still go through the atomic replace.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryRecord};

use super::file_io::{read_bytes, write_bytes_atomic};

/// Store for the categories CSV file
#[derive(Debug, Clone)]
pub struct CategoryStore {
    path: PathBuf,
}

impl CategoryStore {
    pub fn new(paths: &LedgerPaths) -> Self {
        Self {
            path: paths.categories_file(),
        }
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and atomically replace the store file
    pub fn save(&self, categories: &[Category]) -> LedgerResult<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for category in categories {
            writer.serialize(category.to_record())?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| LedgerError::Storage(format!("Failed to encode categories: {}", e)))?;

        write_bytes_atomic(&self.path, &bytes)?;
        debug!(count = categories.len(), "saved category store");
        Ok(())
    }

    /// Load every category from the store
    ///
    /// A missing file yields the empty set (the manager seeds predefined
    /// categories regardless). A malformed row aborts the load.
    pub fn load(&self) -> LedgerResult<Vec<Category>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let bytes = read_bytes(&self.path)?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut categories = Vec::new();

        for (i, row) in reader.deserialize::<CategoryRecord>().enumerate() {
            let row_num = i + 2;
            let record = row.map_err(|e| {
                LedgerError::Storage(format!(
                    "Failed to parse {} row {}: {}",
                    self.path.display(),
                    row_num,
                    e
                ))
            })?;
            let category = Category::from_record(&record).map_err(|e| {
                LedgerError::Storage(format!(
                    "Invalid category in {} row {}: {}",
                    self.path.display(),
                    row_num,
                    e
                ))
            })?;
            categories.push(category);
        }

        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CategoryStore) {
        let dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        (dir, CategoryStore::new(&paths))
    }

    #[test]
    fn test_missing_store_is_empty() {
        let (_dir, store) = setup();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = setup();
        let categories = vec![
            Category::new("Food", Some(Money::from_units(100)), true).unwrap(),
            Category::new("Books", None, false).unwrap(),
        ];

        store.save(&categories).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, categories);
    }

    #[test]
    fn test_store_is_plaintext_csv() {
        let (_dir, store) = setup();
        store
            .save(&[Category::new("Food", Some(Money::from_units(100)), true).unwrap()])
            .unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("name,budget_limit,is_predefined"));
        assert!(text.contains("Food,100.00,true"));
    }

    #[test]
    fn test_loads_capitalized_booleans() {
        let (_dir, store) = setup();
        fs::write(
            store.path(),
            "name,budget_limit,is_predefined\nFood,,True\nBooks,50.0,False\n",
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded[0].is_predefined());
        assert!(!loaded[1].is_predefined());
        assert_eq!(loaded[1].budget_limit(), Some(Money::from_units(50)));
    }

    #[test]
    fn test_bad_row_aborts_load() {
        let (_dir, store) = setup();
        fs::write(
            store.path(),
            "name,budget_limit,is_predefined\nFood,100.00,true\n,-5,false\n",
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }
}
