use chrono::{Datelike, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{coerce_date, coerce_number};

/// Columns every ledger export must carry, matched by exact, case-sensitive name.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "uniq_id",
    "id",
    "company_code",
    "document_date",
    "document_number",
    "description",
    "debit_account",
    "credit_account",
    "amount",
    "partner_code",
    "partner_name",
    "business_code",
    "material_code",
    "material_short_name",
    "material_name",
    "item_code",
    "item_name",
];

/// A raw spreadsheet cell, before any coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Builds a cell from CSV-style text, where an empty field means no value.
    pub fn from_text(raw: &str) -> Self {
        if raw.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    /// Integral numbers render without a fractional part so that account
    /// codes stored as numbers (`5111.0`) compare like their text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// One journal-entry line from the accounting export.
///
/// Text fields hold the string form of their source cell. `amount` and
/// `document_date` keep the raw cell so that coercion failures degrade to a
/// missing contribution instead of failing the load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerRow {
    pub uniq_id: String,
    pub id: String,
    pub company_code: String,
    pub document_date: CellValue,
    pub document_number: String,
    pub description: String,
    pub debit_account: String,
    pub credit_account: String,
    pub amount: CellValue,
    pub partner_code: String,
    pub partner_name: String,
    pub business_code: String,
    pub material_code: String,
    pub material_short_name: String,
    pub material_name: String,
    pub item_code: String,
    pub item_name: String,
}

impl LedgerRow {
    /// Numeric amount, or `None` when the cell cannot be read as a number.
    pub fn amount_value(&self) -> Option<f64> {
        coerce_number(&self.amount)
    }

    pub fn document_day(&self) -> Option<NaiveDate> {
        coerce_date(&self.document_date)
    }

    /// Month bucket of the document date, or `None` when the date is unparseable.
    pub fn month(&self) -> Option<MonthBucket> {
        self.document_day().and_then(MonthBucket::from_date)
    }
}

/// Calendar year-month grouping key, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthBucket {
    year: i32,
    month: u32,
}

impl MonthBucket {
    /// Years are limited to `0..=9999` so every bucket renders as `YYYY-MM`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .filter(|(year, month)| {
                year.len() == 4
                    && month.len() == 2
                    && year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
            })
            .ok_or_else(|| format!("Invalid month '{}': expected YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month number in '{}'", s))?;
        MonthBucket::new(year, month).ok_or_else(|| format!("Month out of range in '{}'", s))
    }
}

impl TryFrom<String> for MonthBucket {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthBucket> for String {
    fn from(value: MonthBucket) -> Self {
        value.to_string()
    }
}

impl JsonSchema for MonthBucket {
    fn schema_name() -> String {
        "MonthBucket".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

/// Options for decoding a workbook payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LoadOptions {
    #[serde(default)]
    #[schemars(description = "Worksheet to read. Defaults to the first sheet in the workbook.")]
    pub sheet_name: Option<String>,
}

impl LoadOptions {
    pub fn with_sheet(name: impl Into<String>) -> Self {
        Self {
            sheet_name: Some(name.into()),
        }
    }
}
