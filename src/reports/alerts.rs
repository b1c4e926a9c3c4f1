//! Budget alerts
//!
//! Flags categories whose expenses for a period exceed their budget
//! limit. Spending exactly at the limit does not alert.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Category, Money, CURRENCY_SYMBOL};
use crate::reports::summary::LedgerSummary;

/// A category that overran its budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetAlert {
    /// Category name
    pub category: String,
    /// Expenses recorded in the period
    pub spent: Money,
    /// The category's budget limit
    pub limit: Money,
    /// Amount over the limit
    pub overage: Money,
}

impl BudgetAlert {
    /// Scan a summary for categories spending past their budget limit
    ///
    /// Categories without a limit never alert; a zero limit alerts on any
    /// expense. Results follow the breakdown's name order.
    pub fn evaluate(
        summary: &LedgerSummary,
        categories: &BTreeMap<String, Category>,
    ) -> Vec<BudgetAlert> {
        let mut alerts = Vec::new();

        for (name, totals) in &summary.category_breakdown {
            if let Some(limit) = categories.get(name).and_then(|c| c.budget_limit()) {
                if totals.expense > limit {
                    alerts.push(BudgetAlert {
                        category: name.clone(),
                        spent: totals.expense,
                        limit,
                        overage: totals.expense - limit,
                    });
                }
            }
        }

        alerts
    }
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Budget Alert: {} exceeded by {} (Spent: {}, Budget: {})",
            self.category,
            self.overage.format_with_symbol(CURRENCY_SYMBOL),
            self.spent.format_with_symbol(CURRENCY_SYMBOL),
            self.limit.format_with_symbol(CURRENCY_SYMBOL),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TransactionKind};

    fn category_map(entries: &[(&str, Option<i64>)]) -> BTreeMap<String, Category> {
        entries
            .iter()
            .map(|(name, limit)| {
                let category =
                    Category::new(*name, limit.map(Money::from_units), false).unwrap();
                (name.to_string(), category)
            })
            .collect()
    }

    fn expense(amount: i64, category: &str) -> Transaction {
        Transaction::new(Money::from_units(amount), TransactionKind::Expense, category).unwrap()
    }

    #[test]
    fn test_over_limit_alerts() {
        let categories = category_map(&[("Food", Some(100))]);
        let summary = LedgerSummary::generate(&[expense(150, "Food")]);

        let alerts = BudgetAlert::evaluate(&summary, &categories);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, "Food");
        assert_eq!(alerts[0].overage, Money::from_units(50));
    }

    #[test]
    fn test_spending_at_limit_does_not_alert() {
        let categories = category_map(&[("Food", Some(100))]);
        let summary = LedgerSummary::generate(&[expense(100, "Food")]);

        assert!(BudgetAlert::evaluate(&summary, &categories).is_empty());
    }

    #[test]
    fn test_no_limit_never_alerts() {
        let categories = category_map(&[("Food", None)]);
        let summary = LedgerSummary::generate(&[expense(900, "Food")]);

        assert!(BudgetAlert::evaluate(&summary, &categories).is_empty());
    }

    #[test]
    fn test_zero_limit_alerts_on_any_expense() {
        let categories = category_map(&[("Rent", Some(0))]);
        let summary = LedgerSummary::generate(&[expense(40, "Rent")]);

        let alerts = BudgetAlert::evaluate(&summary, &categories);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].limit, Money::zero());
        assert_eq!(alerts[0].overage, Money::from_units(40));
        assert_eq!(
            alerts[0].to_string(),
            "Budget Alert: Rent exceeded by ₹40.00 (Spent: ₹40.00, Budget: ₹0.00)"
        );
    }

    #[test]
    fn test_alerts_follow_name_order() {
        let categories = category_map(&[("Food", Some(10)), ("Entertainment", Some(10))]);
        let summary =
            LedgerSummary::generate(&[expense(20, "Food"), expense(30, "Entertainment")]);

        let alerts = BudgetAlert::evaluate(&summary, &categories);
        let names: Vec<_> = alerts.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(names, ["Entertainment", "Food"]);
    }

    #[test]
    fn test_alert_display_format() {
        let alert = BudgetAlert {
            category: "Food".to_string(),
            spent: Money::parse("150.50").unwrap(),
            limit: Money::from_units(100),
            overage: Money::parse("50.50").unwrap(),
        };

        assert_eq!(
            alert.to_string(),
            "Budget Alert: Food exceeded by ₹50.50 (Spent: ₹150.50, Budget: ₹100.00)"
        );
    }
}
