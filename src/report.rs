use crate::schema::MonthBucket;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const TOTAL_REVENUE: &str = "Total Revenue";
pub const TOTAL_COGS: &str = "Total COGS";
pub const TOTAL_FINANCIAL_INCOME: &str = "Total Financial Income";
pub const TOTAL_FINANCIAL_EXPENSE: &str = "Total Financial Expense";
pub const NET_PROFIT: &str = "Net Profit";

/// Summed amounts keyed by month.
pub type MonthlySums = BTreeMap<MonthBucket, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableRow {
    pub label: String,
    /// One value per entry in the owning table's `months`, in the same order.
    pub values: Vec<f64>,
}

/// Dense label × month grid of summed amounts.
///
/// Months are ascending and every row built by `from_series` holds a value
/// for every month. Deserialized tables may be ragged; a missing cell reads
/// as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryMonthTable {
    pub months: Vec<MonthBucket>,
    pub rows: Vec<TableRow>,
}

impl CategoryMonthTable {
    /// Builds a table from ragged per-label sums.
    ///
    /// First collects the union of months over every series, then
    /// materializes a value for each (label, month) pair, defaulting to 0.
    pub fn from_series<L: Into<String>>(series: Vec<(L, MonthlySums)>) -> Self {
        let months: Vec<MonthBucket> = series
            .iter()
            .flat_map(|(_, sums)| sums.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = series
            .into_iter()
            .map(|(label, sums)| TableRow {
                label: label.into(),
                values: months
                    .iter()
                    .map(|month| sums.get(month).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Self { months, rows }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.label.as_str()).collect()
    }

    pub fn row(&self, label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.label == label)
    }

    pub fn get(&self, label: &str, month: MonthBucket) -> Option<f64> {
        let column = self.months.iter().position(|m| *m == month)?;
        self.row(label).and_then(|row| row.values.get(column).copied())
    }

    /// A row as a month-keyed series; absent labels give an empty series.
    pub fn series(&self, label: &str) -> MonthlySums {
        self.row(label)
            .map(|row| self.months.iter().copied().zip(row.values.iter().copied()).collect())
            .unwrap_or_default()
    }

    /// Sum over all rows for each month.
    pub fn column_totals(&self) -> MonthlySums {
        self.months
            .iter()
            .enumerate()
            .map(|(column, month)| {
                let total = self
                    .rows
                    .iter()
                    .map(|row| row.values.get(column).copied().unwrap_or(0.0))
                    .sum();
                (*month, total)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::from("Category");
        for month in &self.months {
            output.push_str(&format!(",{}", month));
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&csv_field(&row.label));
            for value in &row.values {
                output.push_str(&format!(",{:.2}", value));
            }
            output.push('\n');
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::from("| Category |");
        for month in &self.months {
            output.push_str(&format!(" {} |", month));
        }
        output.push_str("\n|---|");
        for _ in &self.months {
            output.push_str("---:|");
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!("| {} |", row.label));
            for value in &row.values {
                output.push_str(&format!(" {:.2} |", value));
            }
            output.push('\n');
        }

        output
    }
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// The four tables produced for one ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialReport {
    #[schemars(description = "Revenue by business unit and month")]
    pub revenue: CategoryMonthTable,

    #[schemars(description = "Cost of goods sold by business unit and month")]
    pub cogs: CategoryMonthTable,

    #[schemars(description = "Financial income and expense totals by month")]
    pub financials: CategoryMonthTable,

    #[schemars(description = "Monthly totals and net profit")]
    pub summary: CategoryMonthTable,
}

impl FinancialReport {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FinancialReport)
    }

    pub fn tables(&self) -> [(&'static str, &CategoryMonthTable); 4] {
        [
            ("revenue", &self.revenue),
            ("cogs", &self.cogs),
            ("financials", &self.financials),
            ("summary", &self.summary),
        ]
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// All four tables, each preceded by a `# name` line.
    pub fn to_csv(&self) -> String {
        self.tables()
            .iter()
            .map(|(name, table)| format!("# {}\n{}", name, table.to_csv()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::from("# Financial Summary\n\n");
        for (name, table) in self.tables() {
            output.push_str(&format!("## {}\n\n", section_title(name)));
            output.push_str(&table.to_markdown());
            output.push('\n');
        }
        output
    }
}

fn section_title(name: &str) -> &'static str {
    match name {
        "revenue" => "Revenue",
        "cogs" => "Cost of Goods Sold",
        "financials" => "Financial Income & Expense",
        _ => "Summary",
    }
}
