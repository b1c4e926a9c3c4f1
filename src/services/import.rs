//! Import support
//!
//! Parses the CSV export layout back into transactions row by row,
//! collecting per-record errors instead of failing wholesale. The
//! ledger manager drives the import and applies the parsed records.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;

use crate::models::{Money, TransactionKind};

/// Outcome of an import run
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Number of transactions imported
    pub imported_transactions: usize,
    /// Number of categories imported
    pub imported_categories: usize,
    /// Per-record error messages, in input order
    pub errors: Vec<String>,
}

impl ImportReport {
    /// True when every record imported cleanly
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Column positions of the CSV export layout, resolved by header name
#[derive(Debug, Clone, Default)]
pub(crate) struct CsvColumns {
    date: Option<usize>,
    kind: Option<usize>,
    category: Option<usize>,
    amount: Option<usize>,
    description: Option<usize>,
}

impl CsvColumns {
    /// Locate the export columns in a header record
    ///
    /// Missing columns are tolerated here; the affected fields read as
    /// empty, failing row validation except for the date, which defaults.
    pub(crate) fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = Self::default();
        for (i, name) in headers.iter().enumerate() {
            match name.trim() {
                "Date" => columns.date = Some(i),
                "Type" => columns.kind = Some(i),
                "Category" => columns.category = Some(i),
                "Amount" => columns.amount = Some(i),
                "Description" => columns.description = Some(i),
                _ => {}
            }
        }
        columns
    }
}

/// One transaction parsed out of an export row, not yet admitted
#[derive(Debug, Clone)]
pub(crate) struct ParsedRow {
    pub amount: Money,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub date: NaiveDateTime,
}

/// Parse one data row of the CSV export layout
///
/// `row_num` counts the header as row 1, so the first data row is 2.
/// An empty Date field defaults to the current local time, the same
/// default a freshly added transaction gets. Category existence is the
/// manager's rule and is checked there.
pub(crate) fn parse_csv_row(
    record: &StringRecord,
    columns: &CsvColumns,
    row_num: usize,
) -> Result<ParsedRow, String> {
    let field = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("").trim();

    let category = field(columns.category);
    if category.is_empty() {
        return Err(format!("Row {}: Missing category", row_num));
    }

    let kind_str = field(columns.kind);
    let kind = kind_str
        .parse::<TransactionKind>()
        .map_err(|_| format!("Row {}: Invalid transaction type '{}'", row_num, kind_str))?;

    let date_str = field(columns.date);
    let date = if date_str.is_empty() {
        Local::now().naive_local()
    } else {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| format!("Row {}: Invalid date format '{}'", row_num, date_str))?
            .and_time(NaiveTime::MIN)
    };

    let amount_str = field(columns.amount);
    let amount = Money::parse(amount_str)
        .map_err(|_| format!("Row {}: Invalid amount '{}'", row_num, amount_str))?;
    if !amount.is_positive() {
        return Err(format!("Row {}: Amount must be positive", row_num));
    }

    Ok(ParsedRow {
        amount,
        kind,
        category: category.to_string(),
        description: field(columns.description).to_string(),
        date,
    })
}
