//! Transaction model
//!
//! Represents a single ledger entry (income, expense, or transfer) with
//! construction-time validation and a flat record form used by the CSV
//! store and the JSON interchange format.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

use super::ids::TransactionId;
use super::money::Money;

/// Currency code applied when a transaction does not specify one
pub const DEFAULT_CURRENCY: &str = "INR";

/// Symbol used for human-facing amount strings
pub const CURRENCY_SYMBOL: &str = "₹";

/// The kind of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    /// All kinds, in display order
    pub const ALL: [TransactionKind; 3] = [Self::Income, Self::Expense, Self::Transfer];

    /// Lowercase wire form ("income", "expense", "transfer")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    /// Uppercase label for display strings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(LedgerError::Validation(
                "Transaction type must be 'income', 'expense', or 'transfer'".into(),
            )),
        }
    }
}

/// A validated ledger entry
///
/// Fields are private: a `Transaction` can only come out of [`Transaction::new`]
/// or [`Transaction::from_record`], both of which enforce the invariants
/// (positive amount, non-empty trimmed category). Mutation goes through the
/// ledger manager so referential integrity holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    amount: Money,
    kind: TransactionKind,
    category: String,
    description: String,
    date: NaiveDateTime,
    currency: String,
}

impl Transaction {
    /// Create a new transaction dated now, with a fresh id, empty
    /// description, and the default currency
    pub fn new(
        amount: Money,
        kind: TransactionKind,
        category: impl Into<String>,
    ) -> LedgerResult<Self> {
        let category = category.into();
        validate_amount(amount)?;
        let category = validate_category_name(&category)?;

        Ok(Self {
            id: TransactionId::new(),
            amount,
            kind,
            category,
            description: String::new(),
            date: Local::now().naive_local(),
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the date
    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = date;
        self
    }

    /// Set the currency code
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Reuse an existing id (reconstruction from storage)
    pub(crate) fn with_id(mut self, id: TransactionId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// The calendar day, which is the granularity the store persists
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }

    /// Rewrite the category reference (cascading category rename)
    pub(crate) fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// Apply a partial update atomically
    ///
    /// Every supplied field is validated before anything is assigned, so a
    /// rejected update leaves the transaction exactly as it was.
    pub(crate) fn apply_update(&mut self, update: &TransactionUpdate) -> LedgerResult<()> {
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
        }
        let category = match &update.category {
            Some(name) => Some(validate_category_name(name)?),
            None => None,
        };

        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(currency) = &update.currency {
            self.currency = currency.clone();
        }
        Ok(())
    }

    /// Flat record form used by the CSV store and JSON interchange
    ///
    /// Dates are written at day granularity (`YYYY-MM-DD`); the time of day
    /// does not survive a round trip.
    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            id: self.id.to_string(),
            date: self.date.format("%Y-%m-%d").to_string(),
            amount: self.amount.to_string(),
            kind: self.kind.to_string(),
            category: self.category.clone(),
            description: self.description.clone(),
            currency: self.currency.clone(),
        }
    }

    /// Rebuild a transaction from its record form, re-running all
    /// construction-time validation
    pub fn from_record(record: &TransactionRecord) -> LedgerResult<Self> {
        let id = if record.id.trim().is_empty() {
            TransactionId::new()
        } else {
            record.id.parse().map_err(|_| {
                LedgerError::Validation(format!("Invalid transaction id '{}'", record.id))
            })?
        };

        let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d")
            .map_err(|_| {
                LedgerError::Validation(format!("Invalid date format '{}'", record.date))
            })?;

        let amount = Money::parse(&record.amount)
            .map_err(|_| LedgerError::Validation(format!("Invalid amount '{}'", record.amount)))?;

        let kind: TransactionKind = record.kind.parse()?;

        let currency = if record.currency.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            record.currency.clone()
        };

        Ok(Self::new(amount, kind, record.category.clone())?
            .with_id(id)
            .with_date(NaiveDateTime::new(date, NaiveTime::MIN))
            .with_description(record.description.clone())
            .with_currency(currency))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {}",
            self.date.format("%Y-%m-%d"),
            self.kind.label(),
            self.category,
            self.amount.format_with_symbol(CURRENCY_SYMBOL),
            self.description
        )
    }
}

pub(crate) fn validate_amount(amount: Money) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::Validation("Amount must be positive".into()));
    }
    Ok(())
}

pub(crate) fn validate_category_name(name: &str) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation("Category must be specified".into()));
    }
    Ok(trimmed.to_string())
}

/// Partial update for [`Transaction`]; unset fields are left alone
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub(crate) amount: Option<Money>,
    pub(crate) kind: Option<TransactionKind>,
    pub(crate) category: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) date: Option<NaiveDateTime>,
    pub(crate) currency: Option<String>,
}

impl TransactionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.currency.is_none()
    }
}

/// Flat serialization form of a transaction
///
/// Field order is the CSV column order: `id,date,amount,type,category,
/// description,currency`. All values are strings so the same shape works
/// for CSV rows and JSON interchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub date: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub description: String,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(Money::from_units(110), TransactionKind::Expense, "Food")
            .unwrap()
            .with_description("groceries")
            .with_date(NaiveDateTime::new(
                NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
                NaiveTime::MIN,
            ))
    }

    #[test]
    fn test_new_applies_defaults() {
        let txn = Transaction::new(Money::from_cents(500), TransactionKind::Income, "Salary")
            .unwrap();
        assert_eq!(txn.currency(), DEFAULT_CURRENCY);
        assert_eq!(txn.description(), "");
        assert_eq!(txn.day(), Local::now().date_naive());
        assert!(txn.is_income());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = Transaction::new(Money::zero(), TransactionKind::Expense, "Food").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Amount must be positive");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = Transaction::new(Money::from_units(-5), TransactionKind::Expense, "Food")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_blank_category_rejected() {
        let err =
            Transaction::new(Money::from_units(5), TransactionKind::Expense, "   ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Category must be specified"
        );
    }

    #[test]
    fn test_category_is_trimmed() {
        let txn =
            Transaction::new(Money::from_units(5), TransactionKind::Expense, "  Food  ").unwrap();
        assert_eq!(txn.category(), "Food");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "income".parse::<TransactionKind>().unwrap(),
            TransactionKind::Income
        );
        assert_eq!(
            " EXPENSE ".parse::<TransactionKind>().unwrap(),
            TransactionKind::Expense
        );
        assert_eq!(
            "Transfer".parse::<TransactionKind>().unwrap(),
            TransactionKind::Transfer
        );
        let err = "loan".parse::<TransactionKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Transaction type must be 'income', 'expense', or 'transfer'"
        );
    }

    #[test]
    fn test_record_round_trip_at_day_granularity() {
        let txn = sample().with_date(NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 5).unwrap(),
        ));
        let record = txn.to_record();
        assert_eq!(record.date, "2023-01-15");
        assert_eq!(record.amount, "110.00");
        assert_eq!(record.kind, "expense");

        let restored = Transaction::from_record(&record).unwrap();
        assert_eq!(restored.id(), txn.id());
        assert_eq!(restored.amount(), txn.amount());
        assert_eq!(restored.kind(), txn.kind());
        assert_eq!(restored.category(), txn.category());
        assert_eq!(restored.description(), txn.description());
        assert_eq!(restored.currency(), txn.currency());
        // Time of day is lost on purpose
        assert_eq!(restored.day(), txn.day());
        assert_eq!(restored.date().time(), NaiveTime::MIN);
    }

    #[test]
    fn test_from_record_generates_missing_id() {
        let mut record = sample().to_record();
        record.id = String::new();
        let restored = Transaction::from_record(&record).unwrap();
        assert!(!restored.id().as_uuid().is_nil());
    }

    #[test]
    fn test_from_record_rejects_bad_date() {
        let mut record = sample().to_record();
        record.date = "15/01/2023".into();
        let err = Transaction::from_record(&record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Invalid date format '15/01/2023'"
        );
    }

    #[test]
    fn test_from_record_rejects_bad_amount() {
        let mut record = sample().to_record();
        record.amount = "lots".into();
        assert!(Transaction::from_record(&record).unwrap_err().is_validation());
    }

    #[test]
    fn test_from_record_defaults_empty_currency() {
        let mut record = sample().to_record();
        record.currency = String::new();
        let restored = Transaction::from_record(&record).unwrap();
        assert_eq!(restored.currency(), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_apply_update_changes_fields() {
        let mut txn = sample();
        let update = TransactionUpdate::new()
            .amount(Money::from_units(75))
            .description("weekly shop");
        txn.apply_update(&update).unwrap();
        assert_eq!(txn.amount(), Money::from_units(75));
        assert_eq!(txn.description(), "weekly shop");
        assert_eq!(txn.category(), "Food");
    }

    #[test]
    fn test_apply_update_is_atomic() {
        let mut txn = sample();
        let update = TransactionUpdate::new()
            .description("should not stick")
            .amount(Money::zero());
        assert!(txn.apply_update(&update).is_err());
        assert_eq!(txn.description(), "groceries");
        assert_eq!(txn.amount(), Money::from_units(110));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(TransactionUpdate::new().is_empty());
        assert!(!TransactionUpdate::new().kind(TransactionKind::Income).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", sample()),
            "2023-01-15 | EXPENSE | Food | ₹110.00 | groceries"
        );
    }

    #[test]
    fn test_record_serde_field_names() {
        let json = serde_json::to_string(&sample().to_record()).unwrap();
        assert!(json.contains("\"type\":\"expense\""));
        assert!(json.contains("\"date\":\"2023-01-15\""));
    }
}
