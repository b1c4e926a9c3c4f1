//! Category model
//!
//! Categories are keyed by their (trimmed, unique) name and may carry an
//! optional budget limit. A predefined set is seeded into every ledger and
//! cannot be deleted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

use super::money::Money;

/// Names seeded into every new ledger
pub const PREDEFINED_CATEGORIES: [&str; 12] = [
    "Food",
    "Rent",
    "Salary",
    "Miscellaneous Expenses",
    "Transportation",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Shopping",
    "Education",
    "Investment",
    "Transfer",
];

/// A spending/income category with an optional budget limit
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: String,
    budget_limit: Option<Money>,
    is_predefined: bool,
}

impl Category {
    /// Create a category, validating the name and limit
    pub fn new(
        name: impl Into<String>,
        budget_limit: Option<Money>,
        is_predefined: bool,
    ) -> LedgerResult<Self> {
        let name = validate_name(&name.into())?;
        if let Some(limit) = budget_limit {
            validate_limit(limit)?;
        }
        Ok(Self {
            name,
            budget_limit,
            is_predefined,
        })
    }

    /// Build the predefined seed set (no budget limits)
    pub fn predefined() -> Vec<Self> {
        PREDEFINED_CATEGORIES
            .iter()
            .map(|name| Self {
                name: (*name).to_string(),
                budget_limit: None,
                is_predefined: true,
            })
            .collect()
    }

    /// Whether `name` (trimmed) is one of the predefined names
    pub fn is_predefined_name(name: &str) -> bool {
        let name = name.trim();
        PREDEFINED_CATEGORIES.iter().any(|p| *p == name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budget_limit(&self) -> Option<Money> {
        self.budget_limit
    }

    pub fn is_predefined(&self) -> bool {
        self.is_predefined
    }

    pub fn has_budget_limit(&self) -> bool {
        self.budget_limit.is_some()
    }

    /// Set or replace the budget limit
    pub(crate) fn set_budget_limit(&mut self, limit: Money) -> LedgerResult<()> {
        validate_limit(limit)?;
        self.budget_limit = Some(limit);
        Ok(())
    }

    /// Rename the category; the manager cascades the new name into
    /// referencing transactions
    pub(crate) fn rename(&mut self, new_name: &str) -> LedgerResult<()> {
        self.name = validate_name(new_name)?;
        Ok(())
    }

    /// Flat record form for the categories CSV
    pub fn to_record(&self) -> CategoryRecord {
        CategoryRecord {
            name: self.name.clone(),
            budget_limit: self
                .budget_limit
                .map(|limit| limit.to_string())
                .unwrap_or_default(),
            is_predefined: if self.is_predefined { "true" } else { "false" }.to_string(),
        }
    }

    /// Rebuild a category from its record form
    ///
    /// The predefined flag is parsed leniently ("true", "1", "yes" in any
    /// case) because files written by earlier versions used "True"/"False".
    pub fn from_record(record: &CategoryRecord) -> LedgerResult<Self> {
        let budget_limit = if record.budget_limit.trim().is_empty() {
            None
        } else {
            Some(Money::parse(&record.budget_limit).map_err(|_| {
                LedgerError::Validation(format!(
                    "Invalid budget limit '{}'",
                    record.budget_limit
                ))
            })?)
        };

        let is_predefined = matches!(
            record.is_predefined.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        );

        Self::new(record.name.clone(), budget_limit, is_predefined)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.budget_limit {
            Some(limit) => write!(
                f,
                "{} (budget: {})",
                self.name,
                limit.format_with_symbol(super::transaction::CURRENCY_SYMBOL)
            ),
            None => write!(f, "{}", self.name),
        }
    }
}

fn validate_name(name: &str) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(
            "Category name must be non-empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_limit(limit: Money) -> LedgerResult<()> {
    if limit.is_negative() {
        return Err(LedgerError::Validation(
            "Budget limit cannot be negative".into(),
        ));
    }
    Ok(())
}

/// Flat serialization form of a category
///
/// Field order is the CSV column order: `name,budget_limit,is_predefined`.
/// An absent limit is the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    pub budget_limit: String,
    pub is_predefined: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_name() {
        let cat = Category::new("  Books  ", None, false).unwrap();
        assert_eq!(cat.name(), "Books");
        assert!(!cat.is_predefined());
        assert!(!cat.has_budget_limit());
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = Category::new("   ", None, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Category name must be non-empty"
        );
    }

    #[test]
    fn test_negative_limit_rejected() {
        let err = Category::new("Books", Some(Money::from_cents(-1)), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Budget limit cannot be negative"
        );
    }

    #[test]
    fn test_zero_limit_allowed() {
        let cat = Category::new("Books", Some(Money::zero()), false).unwrap();
        assert_eq!(cat.budget_limit(), Some(Money::zero()));
    }

    #[test]
    fn test_set_budget_limit() {
        let mut cat = Category::new("Books", None, false).unwrap();
        cat.set_budget_limit(Money::from_units(100)).unwrap();
        assert_eq!(cat.budget_limit(), Some(Money::from_units(100)));
        assert!(cat.set_budget_limit(Money::from_cents(-5)).is_err());
        assert_eq!(cat.budget_limit(), Some(Money::from_units(100)));
    }

    #[test]
    fn test_predefined_set() {
        let seeds = Category::predefined();
        assert_eq!(seeds.len(), 12);
        assert!(seeds.iter().all(|c| c.is_predefined()));
        assert!(seeds.iter().all(|c| !c.has_budget_limit()));
        assert!(Category::is_predefined_name("Food"));
        assert!(Category::is_predefined_name(" Transfer "));
        assert!(!Category::is_predefined_name("Books"));
    }

    #[test]
    fn test_record_round_trip() {
        let cat = Category::new("Books", Some(Money::from_cents(9950)), false).unwrap();
        let record = cat.to_record();
        assert_eq!(record.budget_limit, "99.50");
        assert_eq!(record.is_predefined, "false");
        assert_eq!(Category::from_record(&record).unwrap(), cat);
    }

    #[test]
    fn test_record_with_no_limit() {
        let cat = Category::new("Books", None, false).unwrap();
        let record = cat.to_record();
        assert_eq!(record.budget_limit, "");
        let restored = Category::from_record(&record).unwrap();
        assert_eq!(restored.budget_limit(), None);
    }

    #[test]
    fn test_from_record_lenient_bool() {
        for flag in ["True", "true", "1", "YES"] {
            let record = CategoryRecord {
                name: "Food".into(),
                budget_limit: String::new(),
                is_predefined: flag.into(),
            };
            assert!(Category::from_record(&record).unwrap().is_predefined());
        }
        let record = CategoryRecord {
            name: "Food".into(),
            budget_limit: String::new(),
            is_predefined: "False".into(),
        };
        assert!(!Category::from_record(&record).unwrap().is_predefined());
    }

    #[test]
    fn test_from_record_bad_limit() {
        let record = CategoryRecord {
            name: "Food".into(),
            budget_limit: "lots".into(),
            is_predefined: "false".into(),
        };
        assert!(Category::from_record(&record).unwrap_err().is_validation());
    }

    #[test]
    fn test_display() {
        let cat = Category::new("Books", Some(Money::from_units(100)), false).unwrap();
        assert_eq!(format!("{}", cat), "Books (budget: ₹100.00)");
        let plain = Category::new("Books", None, false).unwrap();
        assert_eq!(format!("{}", plain), "Books");
    }
}
