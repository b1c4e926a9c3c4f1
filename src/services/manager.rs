//! Ledger manager
//!
//! The single entry point for ledger operations. Owns the in-memory
//! transactions and categories, enforces referential integrity between
//! them, and persists every mutation through the stores before
//! returning. The ledger is a single-process authority; concurrent
//! external writers are out of scope.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::{LedgerPaths, Settings};
use crate::crypto::StoreCipher;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_full_json, export_transactions_csv, parse_full_json, FullExport};
use crate::models::transaction::{validate_amount, validate_category_name};
use crate::models::{
    Category, Money, Transaction, TransactionId, TransactionKind, TransactionUpdate,
};
use crate::reports::{
    month_bounds, months_back, BudgetAlert, CategoryPerformance, FinancialInsights,
    LedgerSummary, MonthlyTrend,
};
use crate::storage::{CategoryStore, TransactionStore};

use super::import::{parse_csv_row, CsvColumns, ImportReport};

/// Formats [`LedgerManager::export_data`] can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(LedgerError::Export(
                "Unsupported export format. Use 'csv' or 'json'".into(),
            )),
        }
    }
}

/// Formats [`LedgerManager::import_data`] can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Infer the format from a file extension
    fn from_path(path: &Path) -> LedgerResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(LedgerError::Import(
                "Unsupported file format. Use .csv or .json files".into(),
            )),
        }
    }
}

impl FromStr for ImportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(LedgerError::Import(
                "Unsupported import format. Use 'csv' or 'json'".into(),
            )),
        }
    }
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by kind
    pub kind: Option<TransactionKind>,
    /// Filter by exact category name
    pub category: Option<String>,
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by kind
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filter by category name
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by inclusive date range
    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }
}

/// Coordinates the in-memory ledger and its persistent stores
///
/// Transactions keep insertion order; categories are keyed by name.
/// Category references on transactions are validated name strings, and
/// every operation that could break that link (rename, delete) repairs
/// or refuses it.
pub struct LedgerManager {
    paths: LedgerPaths,
    settings: Settings,
    cipher: StoreCipher,
    transaction_store: TransactionStore,
    category_store: CategoryStore,
    transactions: Vec<Transaction>,
    categories: BTreeMap<String, Category>,
}

impl LedgerManager {
    /// Open the ledger at the given paths, creating the key file and
    /// settings on first use
    pub fn open(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        let settings = Settings::load_or_create(&paths)?;
        if !paths.settings_file().exists() {
            settings.save(&paths)?;
        }

        let cipher = StoreCipher::load_or_generate(paths.key_file())?;
        Self::with_cipher(paths, settings, cipher)
    }

    /// Open the ledger with an externally managed cipher
    ///
    /// Stores are loaded eagerly. Predefined categories are seeded
    /// first and then overlaid by whatever the category store holds, so
    /// persisted budget limits on predefined names survive restarts.
    pub fn with_cipher(
        paths: LedgerPaths,
        settings: Settings,
        cipher: StoreCipher,
    ) -> LedgerResult<Self> {
        paths.ensure_directories()?;
        let transaction_store = TransactionStore::new(&paths);
        let category_store = CategoryStore::new(&paths);

        let mut categories: BTreeMap<String, Category> = Category::predefined()
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect();

        let transactions = transaction_store.load(&cipher)?;
        for category in category_store.load()? {
            categories.insert(category.name().to_string(), category);
        }

        debug!(
            transactions = transactions.len(),
            categories = categories.len(),
            "ledger loaded"
        );

        Ok(Self {
            paths,
            settings,
            cipher,
            transaction_store,
            category_store,
            transactions,
            categories,
        })
    }

    /// Paths this ledger lives at
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Active settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // === Transactions ===

    /// Record a new transaction
    ///
    /// The category must already exist; the ledger never creates
    /// categories implicitly. `date` defaults to now.
    pub fn add_transaction(
        &mut self,
        amount: Money,
        kind: TransactionKind,
        category: &str,
        description: &str,
        date: Option<NaiveDateTime>,
    ) -> LedgerResult<Transaction> {
        validate_amount(amount)?;
        let category = validate_category_name(category)?;
        if !self.categories.contains_key(&category) {
            return Err(LedgerError::category_not_found(category));
        }

        let mut txn = Transaction::new(amount, kind, category)?
            .with_description(description)
            .with_currency(self.settings.default_currency.clone());
        if let Some(date) = date {
            txn = txn.with_date(date);
        }

        self.transactions.push(txn.clone());
        self.save_transactions()?;
        Ok(txn)
    }

    /// Apply a partial update to a transaction
    ///
    /// Returns `Ok(false)` when no transaction has that id; errors are
    /// reserved for rule violations. A category change must name an
    /// existing category. Validation happens before any assignment, so
    /// a rejected update leaves the transaction untouched.
    pub fn edit_transaction(
        &mut self,
        id: TransactionId,
        update: &TransactionUpdate,
    ) -> LedgerResult<bool> {
        let position = match self.transactions.iter().position(|t| t.id() == id) {
            Some(position) => position,
            None => return Ok(false),
        };

        if let Some(raw) = &update.category {
            let name = validate_category_name(raw)?;
            if !self.categories.contains_key(&name) {
                return Err(LedgerError::Validation(format!(
                    "Category '{}' does not exist",
                    name
                )));
            }
        }

        self.transactions[position].apply_update(update)?;
        self.save_transactions()?;
        Ok(true)
    }

    /// Remove a transaction, reporting whether anything was removed
    pub fn delete_transaction(&mut self, id: TransactionId) -> LedgerResult<bool> {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id() != id);
        if self.transactions.len() == before {
            return Ok(false);
        }

        self.save_transactions()?;
        Ok(true)
    }

    /// Look up a transaction by id
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    /// Every transaction, in insertion order
    pub fn all_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    // === Queries and summaries ===

    /// Transactions matching all supplied filters, newest first
    ///
    /// The newest-date-first ordering is part of the contract; equal
    /// dates keep insertion order. Date bounds are inclusive at day
    /// granularity.
    pub fn get_transactions(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let mut transactions = self.transactions.clone();

        if let Some(kind) = filter.kind {
            transactions.retain(|t| t.kind() == kind);
        }
        if let Some(category) = &filter.category {
            transactions.retain(|t| t.category() == category);
        }
        if let Some(from) = filter.date_from {
            transactions.retain(|t| t.day() >= from);
        }
        if let Some(to) = filter.date_to {
            transactions.retain(|t| t.day() <= to);
        }

        transactions.sort_by(|a, b| b.date().cmp(&a.date()));
        transactions
    }

    /// Summarize transactions between two inclusive day bounds
    pub fn get_summary(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> LedgerSummary {
        let filter = TransactionFilter {
            date_from: from,
            date_to: to,
            ..TransactionFilter::default()
        };
        LedgerSummary::generate(&self.get_transactions(&filter))
    }

    /// Summarize one calendar month
    pub fn get_monthly_summary(&self, year: i32, month: u32) -> LedgerResult<LedgerSummary> {
        let (start, end) = month_bounds(year, month)?;
        Ok(self.get_summary(Some(start), Some(end)))
    }

    /// Budget alerts for one calendar month
    pub fn check_budget_alerts(&self, year: i32, month: u32) -> LedgerResult<Vec<BudgetAlert>> {
        let summary = self.get_monthly_summary(year, month)?;
        Ok(BudgetAlert::evaluate(&summary, &self.categories))
    }

    /// Case-insensitive search across descriptions, category names and
    /// amounts
    ///
    /// An empty query returns the full set in insertion order. A
    /// numeric query matches an amount exactly on whole units ("110"
    /// matches 110.00) or as a substring of its decimal rendering
    /// ("110.5" matches 110.50).
    pub fn search_transactions(&self, query: &str) -> Vec<Transaction> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.transactions.clone();
        }

        self.transactions
            .iter()
            .filter(|t| {
                t.description().to_lowercase().contains(&query)
                    || t.category().to_lowercase().contains(&query)
                    || t.amount().units().to_string() == query
                    || t.amount().to_string().contains(&query)
            })
            .cloned()
            .collect()
    }

    // === Categories ===

    /// Create a category
    pub fn add_category(
        &mut self,
        name: &str,
        budget_limit: Option<Money>,
    ) -> LedgerResult<Category> {
        let category = Category::new(name, budget_limit, false)?;
        if self.categories.contains_key(category.name()) {
            return Err(LedgerError::DuplicateCategory(category.name().to_string()));
        }

        self.categories
            .insert(category.name().to_string(), category.clone());
        self.save_categories()?;
        Ok(category)
    }

    /// Rename a category and/or change its budget limit
    ///
    /// Returns `Ok(false)` when the category is unknown. A rename
    /// cascades the new name into every transaction referencing the old
    /// one; the whole cascade is validated up front and applied
    /// in-memory before either store is written, so it is all-or-nothing.
    pub fn edit_category(
        &mut self,
        name: &str,
        new_name: Option<&str>,
        budget_limit: Option<Money>,
    ) -> LedgerResult<bool> {
        let name = name.trim();
        if !self.categories.contains_key(name) {
            return Ok(false);
        }

        let rename = match new_name {
            Some(new_name) => {
                let new_name = new_name.trim();
                if new_name.is_empty() {
                    return Err(LedgerError::Validation(
                        "Category name must be non-empty".into(),
                    ));
                }
                if new_name != name && self.categories.contains_key(new_name) {
                    return Err(LedgerError::DuplicateCategory(new_name.to_string()));
                }
                if new_name != name {
                    Some(new_name.to_string())
                } else {
                    None
                }
            }
            None => None,
        };

        if let Some(limit) = budget_limit {
            if let Some(category) = self.categories.get_mut(name) {
                category.set_budget_limit(limit)?;
            }
        }

        let renamed = rename.is_some();
        if let Some(new_name) = rename {
            if let Some(mut category) = self.categories.remove(name) {
                category.rename(&new_name)?;
                self.categories.insert(new_name.clone(), category);
            }
            for txn in &mut self.transactions {
                if txn.category() == name {
                    txn.set_category(new_name.clone());
                }
            }
        }

        self.save_categories()?;
        if renamed {
            self.save_transactions()?;
        }
        Ok(true)
    }

    /// Delete a category
    ///
    /// Predefined categories and categories still referenced by
    /// transactions cannot be deleted.
    pub fn delete_category(&mut self, name: &str) -> LedgerResult<bool> {
        let name = name.trim();
        let category = match self.categories.get(name) {
            Some(category) => category,
            None => return Ok(false),
        };

        if category.is_predefined() {
            return Err(LedgerError::CannotDelete(
                "Cannot delete predefined categories".into(),
            ));
        }
        if self.transactions.iter().any(|t| t.category() == name) {
            return Err(LedgerError::CannotDelete(format!(
                "Cannot delete category '{}' as it is used in transactions",
                name
            )));
        }

        self.categories.remove(name);
        self.save_categories()?;
        Ok(true)
    }

    /// Every category, in name order
    pub fn categories(&self) -> Vec<&Category> {
        self.categories.values().collect()
    }

    /// Category names, in name order
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name.trim())
    }

    // === Reports ===

    /// Expense trends for the last `months` calendar months, newest
    /// first, ending at the current local month
    pub fn get_expense_trends(&self, months: u32) -> LedgerResult<Vec<MonthlyTrend>> {
        let today = Local::now().date_naive();
        self.expense_trends_ending(today.year(), today.month(), months)
    }

    /// Trend window ending at an explicit month
    pub fn expense_trends_ending(
        &self,
        year: i32,
        month: u32,
        months: u32,
    ) -> LedgerResult<Vec<MonthlyTrend>> {
        let mut trends = Vec::with_capacity(months as usize);
        for (year, month) in months_back(year, month, months) {
            let summary = self.get_monthly_summary(year, month)?;
            trends.push(MonthlyTrend::from_summary(year, month, &summary));
        }
        Ok(trends)
    }

    /// Per-category budget performance for one calendar month
    ///
    /// Returns an empty map when the month has no income, since the
    /// income percentages are undefined without it.
    pub fn get_category_performance(
        &self,
        year: i32,
        month: u32,
    ) -> LedgerResult<BTreeMap<String, CategoryPerformance>> {
        let summary = self.get_monthly_summary(year, month)?;
        if summary.total_income.is_zero() {
            return Ok(BTreeMap::new());
        }

        let mut performance = BTreeMap::new();
        for (name, totals) in &summary.category_breakdown {
            if let Some(category) = self.categories.get(name) {
                performance.insert(
                    name.clone(),
                    CategoryPerformance::measure(
                        totals.expense,
                        category.budget_limit(),
                        summary.total_income,
                    ),
                );
            }
        }
        Ok(performance)
    }

    /// Monthly summary, performance map, alerts and recommendations in
    /// one bundle
    pub fn get_financial_insights(
        &self,
        year: i32,
        month: u32,
    ) -> LedgerResult<FinancialInsights> {
        let summary = self.get_monthly_summary(year, month)?;
        let performance = self.get_category_performance(year, month)?;
        let alerts = BudgetAlert::evaluate(&summary, &self.categories);
        Ok(FinancialInsights::new(summary, performance, alerts))
    }

    // === Export and import ===

    /// Export the ledger to a plaintext artifact, returning the path
    /// written
    ///
    /// Exports are cleartext on purpose; only the transaction store is
    /// encrypted at rest. Without an explicit path the artifact lands in
    /// the data directory as `export_YYYYMMDD_HHMMSS.{csv,json}`.
    pub fn export_data(
        &self,
        format: ExportFormat,
        path: Option<PathBuf>,
    ) -> LedgerResult<PathBuf> {
        let path = path.unwrap_or_else(|| self.default_export_path(format));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        match format {
            ExportFormat::Csv => export_transactions_csv(&self.transactions, &mut buffer)?,
            ExportFormat::Json => {
                let categories: Vec<Category> = self.categories.values().cloned().collect();
                let export = FullExport::new(&self.transactions, &categories);
                export_full_json(&export, &mut buffer)?;
            }
        }
        fs::write(&path, &buffer)?;

        debug!(count = self.transactions.len(), "exported ledger");
        Ok(path)
    }

    fn default_export_path(&self, format: ExportFormat) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.paths
            .data_dir()
            .join(format!("export_{}.{}", stamp, format.extension()))
    }

    /// Import transactions (and, for JSON, categories) from an export
    /// artifact
    ///
    /// The format is inferred from the file extension when not given.
    /// Every record is validated with the same rules as
    /// [`Self::add_transaction`] and [`Self::add_category`]; failures
    /// are collected per record while valid records still land. The
    /// stores are saved once at the end.
    pub fn import_data(
        &mut self,
        path: &Path,
        format: Option<ImportFormat>,
    ) -> LedgerResult<ImportReport> {
        let format = match format {
            Some(format) => format,
            None => ImportFormat::from_path(path)?,
        };

        let report = match format {
            ImportFormat::Csv => self.import_csv(path)?,
            ImportFormat::Json => self.import_json(path)?,
        };

        if report.imported_categories > 0 {
            self.save_categories()?;
        }
        if report.imported_transactions > 0 {
            self.save_transactions()?;
        }

        debug!(
            transactions = report.imported_transactions,
            categories = report.imported_categories,
            errors = report.errors.len(),
            "import finished"
        );
        Ok(report)
    }

    fn import_csv(&mut self, path: &Path) -> LedgerResult<ImportReport> {
        let text = fs::read_to_string(path)?;
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| LedgerError::Import(e.to_string()))?
            .clone();
        let columns = CsvColumns::from_headers(&headers);

        let mut report = ImportReport::default();
        for (i, row) in reader.records().enumerate() {
            let row_num = i + 2;
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    report.errors.push(format!("Row {}: {}", row_num, e));
                    continue;
                }
            };

            let parsed = match parse_csv_row(&record, &columns, row_num) {
                Ok(parsed) => parsed,
                Err(message) => {
                    report.errors.push(message);
                    continue;
                }
            };
            if !self.categories.contains_key(&parsed.category) {
                report.errors.push(format!(
                    "Row {}: {}",
                    row_num,
                    LedgerError::category_not_found(&parsed.category)
                ));
                continue;
            }

            let txn = Transaction::new(parsed.amount, parsed.kind, parsed.category)?
                .with_description(parsed.description)
                .with_date(parsed.date)
                .with_currency(self.settings.default_currency.clone());
            self.transactions.push(txn);
            report.imported_transactions += 1;
        }
        Ok(report)
    }

    fn import_json(&mut self, path: &Path) -> LedgerResult<ImportReport> {
        let text = fs::read_to_string(path)?;
        let export = parse_full_json(&text)?;

        let mut report = ImportReport::default();
        for record in &export.categories {
            match Category::from_record(record) {
                Ok(category) => {
                    // Existing names are kept as-is, not overwritten
                    if self.categories.contains_key(category.name()) {
                        continue;
                    }
                    self.categories
                        .insert(category.name().to_string(), category);
                    report.imported_categories += 1;
                }
                Err(e) => report.errors.push(format!("Category import error: {}", e)),
            }
        }

        for record in &export.transactions {
            match Transaction::from_record(record) {
                Ok(txn) => {
                    if !self.categories.contains_key(txn.category()) {
                        report.errors.push(format!(
                            "Transaction import error: {}",
                            LedgerError::category_not_found(txn.category())
                        ));
                        continue;
                    }
                    self.transactions.push(txn);
                    report.imported_transactions += 1;
                }
                Err(e) => report
                    .errors
                    .push(format!("Transaction import error: {}", e)),
            }
        }
        Ok(report)
    }

    // === Key handling ===

    /// Copy the encryption key to a backup location
    pub fn backup_key(&self, dest: &Path) -> LedgerResult<()> {
        self.cipher.backup_key(dest)
    }

    /// Replace the managed key file with a backed-up key
    ///
    /// Subsequent saves and loads use the restored key.
    pub fn restore_key(&mut self, src: &Path) -> LedgerResult<()> {
        self.cipher.restore_key(src)
    }

    fn save_transactions(&self) -> LedgerResult<()> {
        self.transaction_store
            .save(&self.cipher, &self.transactions)
    }

    fn save_categories(&self) -> LedgerResult<()> {
        let categories: Vec<Category> = self.categories.values().cloned().collect();
        self.category_store.save(&categories)
    }
}
