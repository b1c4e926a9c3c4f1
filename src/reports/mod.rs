//! Reports module for fintrack
//!
//! Provides financial reports over the in-memory ledger: period
//! summaries, budget alerts, expense trends and category performance.

pub mod alerts;
pub mod summary;
pub mod trends;

pub use alerts::BudgetAlert;
pub use summary::{month_bounds, CategoryTotals, LedgerSummary};
pub use trends::{
    months_back, CategoryPerformance, FinancialInsights, MonthlyTrend, PerformanceStatus,
};
