//! JSON export functionality
//!
//! Exports the complete ledger (transactions and categories in their
//! record form) to a single JSON document.

use std::io::Write;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryRecord, Transaction, TransactionRecord};

/// Full ledger export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// All transactions, in record form
    pub transactions: Vec<TransactionRecord>,

    /// All categories, in record form
    pub categories: Vec<CategoryRecord>,

    /// Local timestamp the export was created at
    pub export_date: String,

    /// Total number of transactions
    pub total_transactions: usize,

    /// Total number of categories
    pub total_categories: usize,
}

impl FullExport {
    /// Snapshot the ledger into its export form
    pub fn new(transactions: &[Transaction], categories: &[Category]) -> Self {
        Self {
            transactions: transactions.iter().map(|t| t.to_record()).collect(),
            categories: categories.iter().map(|c| c.to_record()).collect(),
            export_date: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            total_transactions: transactions.len(),
            total_categories: categories.len(),
        }
    }
}

/// Export the full ledger to pretty-printed JSON
pub fn export_full_json<W: Write>(export: &FullExport, writer: &mut W) -> LedgerResult<()> {
    serde_json::to_writer_pretty(writer, export)
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    Ok(())
}

/// Parse a JSON export payload
pub fn parse_full_json(json_str: &str) -> LedgerResult<FullExport> {
    serde_json::from_str(json_str).map_err(|e| LedgerError::Import(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionKind};

    fn sample_data() -> (Vec<Transaction>, Vec<Category>) {
        let transactions = vec![
            Transaction::new(Money::from_units(100), TransactionKind::Expense, "Food")
                .unwrap()
                .with_description("groceries"),
            Transaction::new(Money::from_units(2500), TransactionKind::Income, "Salary").unwrap(),
        ];
        let categories = vec![
            Category::new("Food", Some(Money::from_units(500)), true).unwrap(),
            Category::new("Salary", None, true).unwrap(),
        ];
        (transactions, categories)
    }

    #[test]
    fn test_full_export_counts() {
        let (transactions, categories) = sample_data();
        let export = FullExport::new(&transactions, &categories);

        assert_eq!(export.total_transactions, 2);
        assert_eq!(export.total_categories, 2);
        assert_eq!(export.transactions[0].category, "Food");
        assert_eq!(export.categories[0].budget_limit, "500.00");
        assert!(!export.export_date.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let (transactions, categories) = sample_data();
        let export = FullExport::new(&transactions, &categories);

        let mut output = Vec::new();
        export_full_json(&export, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("\"export_date\""));
        assert!(text.contains("\"total_transactions\": 2"));

        let parsed = parse_full_json(&text).unwrap();
        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.categories.len(), 2);
        assert_eq!(parsed.transactions[1].kind, "income");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_full_json("not json at all").unwrap_err();
        assert!(matches!(err, LedgerError::Import(_)));
    }
}
