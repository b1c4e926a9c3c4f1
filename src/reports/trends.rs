//! Spending trends and insights
//!
//! Month-over-month expense trends, per-category budget performance and
//! the combined financial insights bundle.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::Money;
use crate::reports::alerts::BudgetAlert;
use crate::reports::summary::LedgerSummary;

/// One month's totals inside a trend window
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Total income for the month
    pub total_income: Money,
    /// Total expenses for the month
    pub total_expenses: Money,
    /// Income minus expenses
    pub net_amount: Money,
    /// Number of transactions in the month
    pub transaction_count: usize,
}

impl MonthlyTrend {
    /// Build a trend entry from a monthly summary
    pub fn from_summary(year: i32, month: u32, summary: &LedgerSummary) -> Self {
        Self {
            year,
            month,
            total_income: summary.total_income,
            total_expenses: summary.total_expenses,
            net_amount: summary.net_amount,
            transaction_count: summary.transaction_count,
        }
    }
}

impl fmt::Display for MonthlyTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Walk months backward from a starting month, newest first
///
/// January steps back to December of the previous year.
pub fn months_back(year: i32, month: u32, count: u32) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(count as usize);
    let (mut year, mut month) = (year, month);

    for _ in 0..count {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }

    months
}

/// Standing of a category relative to its budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceStatus {
    /// Expenses exceed the budget limit
    OverBudget,
    /// Expenses are within the budget limit
    UnderBudget,
    /// The category has no positive budget limit
    NoBudgetSet,
}

impl fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OverBudget => "over budget",
            Self::UnderBudget => "under budget",
            Self::NoBudgetSet => "no budget set",
        };
        write!(f, "{}", label)
    }
}

/// How a category performed against its budget in a month
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPerformance {
    /// Expenses recorded in the month
    pub spent: Money,
    /// The budget limit, when a positive one is set
    pub budget_limit: Option<Money>,
    /// Budget left after spending; negative when over budget, zero
    /// without a budget
    pub remaining: Money,
    /// Spent as a percentage of the budget limit; zero without a budget
    pub utilization_percent: f64,
    /// Spent as a percentage of the month's total income
    pub income_percentage: f64,
    /// Standing relative to the budget
    pub status: PerformanceStatus,
}

impl CategoryPerformance {
    /// Measure one category's spending against its budget
    ///
    /// A zero budget limit counts as unset.
    pub fn measure(spent: Money, budget_limit: Option<Money>, total_income: Money) -> Self {
        let income_percentage = if total_income.is_zero() {
            0.0
        } else {
            spent.cents() as f64 / total_income.cents() as f64 * 100.0
        };

        match budget_limit.filter(|limit| limit.is_positive()) {
            Some(limit) => Self {
                spent,
                budget_limit: Some(limit),
                remaining: limit - spent,
                utilization_percent: spent.cents() as f64 / limit.cents() as f64 * 100.0,
                income_percentage,
                status: if spent > limit {
                    PerformanceStatus::OverBudget
                } else {
                    PerformanceStatus::UnderBudget
                },
            },
            None => Self {
                spent,
                budget_limit: None,
                remaining: Money::zero(),
                utilization_percent: 0.0,
                income_percentage,
                status: PerformanceStatus::NoBudgetSet,
            },
        }
    }
}

/// Monthly summary, budget performance and recommendations in one bundle
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialInsights {
    /// The month's summary
    pub summary: LedgerSummary,
    /// Per-category budget performance, name-ordered
    pub performance: BTreeMap<String, CategoryPerformance>,
    /// Budget alerts raised for the month
    pub alerts: Vec<BudgetAlert>,
    /// Human-readable observations about the month
    pub recommendations: Vec<String>,
}

impl FinancialInsights {
    pub fn new(
        summary: LedgerSummary,
        performance: BTreeMap<String, CategoryPerformance>,
        alerts: Vec<BudgetAlert>,
    ) -> Self {
        let recommendations = Self::build_recommendations(&summary, &performance);
        Self {
            summary,
            performance,
            alerts,
            recommendations,
        }
    }

    fn build_recommendations(
        summary: &LedgerSummary,
        performance: &BTreeMap<String, CategoryPerformance>,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if summary.total_expenses > summary.total_income {
            recommendations.push(
                "Your expenses exceed your income this month. Consider reducing spending."
                    .to_string(),
            );
        }

        let over_budget: Vec<&str> = performance
            .iter()
            .filter(|(_, p)| p.status == PerformanceStatus::OverBudget)
            .map(|(name, _)| name.as_str())
            .collect();
        if !over_budget.is_empty() {
            recommendations.push(format!("Categories over budget: {}", over_budget.join(", ")));
        }

        if summary.transaction_count == 0 {
            recommendations.push(
                "No transactions recorded this month. Start tracking your finances!".to_string(),
            );
        }

        recommendations
    }
}
