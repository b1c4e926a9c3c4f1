//! Ledger summary
//!
//! Aggregates a set of transactions into income, expense and transfer
//! totals with a per-category breakdown.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Transaction, TransactionKind};

/// Per-category totals within a summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    /// Income recorded against the category
    pub income: Money,
    /// Expenses recorded against the category
    pub expense: Money,
    /// Transfers recorded against the category
    pub transfer: Money,
}

/// Aggregate view over a set of transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSummary {
    /// Total income
    pub total_income: Money,
    /// Total expenses
    pub total_expenses: Money,
    /// Total transfers
    pub total_transfers: Money,
    /// Income minus expenses
    pub net_amount: Money,
    /// Totals per category, name-ordered; only categories that appear
    pub category_breakdown: BTreeMap<String, CategoryTotals>,
    /// Number of transactions summarized
    pub transaction_count: usize,
}

impl LedgerSummary {
    /// Generate a summary over the given transactions
    pub fn generate(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();

        for txn in transactions {
            let totals = summary
                .category_breakdown
                .entry(txn.category().to_string())
                .or_default();

            match txn.kind() {
                TransactionKind::Income => {
                    summary.total_income += txn.amount();
                    totals.income += txn.amount();
                }
                TransactionKind::Expense => {
                    summary.total_expenses += txn.amount();
                    totals.expense += txn.amount();
                }
                TransactionKind::Transfer => {
                    summary.total_transfers += txn.amount();
                    totals.transfer += txn.amount();
                }
            }
        }

        summary.net_amount = summary.total_income - summary.total_expenses;
        summary.transaction_count = transactions.len();
        summary
    }
}

/// First and last day of a calendar month
///
/// December rolls over to January of the following year when computing
/// the upper bound, and February respects leap years.
pub fn month_bounds(year: i32, month: u32) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::Validation(format!("Invalid month '{}'", month)))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| LedgerError::Validation(format!("Invalid month '{}'", month)))?;

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(amount: i64, kind: TransactionKind, category: &str) -> Transaction {
        Transaction::new(Money::from_units(amount), kind, category).unwrap()
    }

    #[test]
    fn test_empty_summary() {
        let summary = LedgerSummary::generate(&[]);
        assert_eq!(summary.transaction_count, 0);
        assert!(summary.total_income.is_zero());
        assert!(summary.category_breakdown.is_empty());
    }

    #[test]
    fn test_totals_by_kind() {
        let transactions = vec![
            txn(5000, TransactionKind::Income, "Salary"),
            txn(1200, TransactionKind::Expense, "Rent"),
            txn(300, TransactionKind::Expense, "Food"),
            txn(250, TransactionKind::Transfer, "Transfer"),
        ];

        let summary = LedgerSummary::generate(&transactions);
        assert_eq!(summary.total_income, Money::from_units(5000));
        assert_eq!(summary.total_expenses, Money::from_units(1500));
        assert_eq!(summary.total_transfers, Money::from_units(250));
        assert_eq!(summary.net_amount, Money::from_units(3500));
        assert_eq!(summary.transaction_count, 4);
    }

    #[test]
    fn test_category_breakdown_only_holds_seen_categories() {
        let transactions = vec![
            txn(100, TransactionKind::Expense, "Food"),
            txn(200, TransactionKind::Expense, "Food"),
            txn(900, TransactionKind::Income, "Salary"),
        ];

        let summary = LedgerSummary::generate(&transactions);
        assert_eq!(summary.category_breakdown.len(), 2);

        let food = &summary.category_breakdown["Food"];
        assert_eq!(food.expense, Money::from_units(300));
        assert!(food.income.is_zero());

        let salary = &summary.category_breakdown["Salary"];
        assert_eq!(salary.income, Money::from_units(900));
    }

    #[test]
    fn test_month_bounds_ordinary_month() {
        let (start, end) = month_bounds(2025, 4).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn test_month_bounds_december_rolls_over() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let (_, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, end) = month_bounds(2025, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_month_bounds_rejects_invalid_month() {
        let err = month_bounds(2025, 13).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("13"));
    }
}
