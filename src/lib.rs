//! # Ledger Summary
//!
//! A library for turning a flat accounting ledger export (xlsx/xls/ods or CSV) into
//! categorized monthly financial tables.
//!
//! ## Core Concepts
//!
//! - **Ledger Row**: One journal-entry line carrying debit/credit account codes, an amount,
//!   a document date and a business unit code
//! - **Account Prefix Rules**: Revenue (`511`), COGS (`632`), financial income (`515`) and
//!   financial expense (`635`) are selected by account-code prefix, excluding closing and
//!   clearing counterparts
//! - **Business Units**: Mall, Office, Marketing, Parking and the catch-all Other
//! - **Month Buckets**: Amounts are summed per `YYYY-MM` of the document date
//! - **Net Profit**: Revenue - COGS + Financial Income - Financial Expense, per month
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_summary::*;
//!
//! let bytes = std::fs::read("ledger.xlsx")?;
//! let report = process_workbook(&bytes, &LoadOptions::default())?;
//!
//! println!("{}", report.to_markdown());
//! ```

pub mod chart_of_accounts;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod schema;
pub mod summary;
pub mod utils;

pub use chart_of_accounts::{
    AccountSide, BusinessUnit, Section, SelectionRule, COGS_RULE, FINANCIAL_EXPENSE_RULE,
    FINANCIAL_INCOME_RULE, REVENUE_RULE,
};
pub use engine::{classify_cogs, classify_financials, classify_revenue, SelectionStats};
pub use error::{LedgerError, Result};
pub use ingestion::{load_csv, load_workbook, LedgerTable};
pub use report::*;
pub use schema::*;
pub use summary::{generate_summary, verify_net_profit, SummaryAggregator};

use log::{debug, info};
use std::io::Read;

pub struct LedgerProcessor;

impl LedgerProcessor {
    /// Runs the three classifiers and the summary over a loaded ledger.
    ///
    /// The table is only read, so independent ledgers can be processed
    /// concurrently.
    pub fn process(table: &LedgerTable) -> Result<FinancialReport> {
        info!("Classifying {} ledger rows", table.len());

        let revenue = classify_revenue(&table.rows);
        let cogs = classify_cogs(&table.rows);
        let financials = classify_financials(&table.rows);

        debug!(
            "Revenue spans {} months, COGS {} months, financials {} months",
            revenue.months.len(),
            cogs.months.len(),
            financials.months.len()
        );

        let summary = generate_summary(&revenue, &cogs, &financials);

        info!("Summary covers {} months", summary.months.len());

        Ok(FinancialReport {
            revenue,
            cogs,
            financials,
            summary,
        })
    }

    pub fn process_with_verification(table: &LedgerTable, tolerance: f64) -> Result<FinancialReport> {
        let report = Self::process(table)?;

        verify_net_profit(&report.summary, tolerance)?;

        Ok(report)
    }
}

pub fn process_ledger(table: &LedgerTable) -> Result<FinancialReport> {
    LedgerProcessor::process(table)
}

/// Loads a spreadsheet payload and builds the full report.
pub fn process_workbook(bytes: &[u8], options: &LoadOptions) -> Result<FinancialReport> {
    let table = load_workbook(bytes, options)?;
    LedgerProcessor::process(&table)
}

pub fn process_csv<R: Read>(reader: R) -> Result<FinancialReport> {
    let table = load_csv(reader)?;
    LedgerProcessor::process(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(debit: &str, credit: &str, unit: &str, amount: f64, date: &str) -> LedgerRow {
        LedgerRow {
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            business_code: unit.to_string(),
            amount: CellValue::Number(amount),
            document_date: CellValue::from_text(date),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_processing() {
        let table = LedgerTable::new(vec![
            posting("1311", "5111", "S001", 1000.0, "2024-01-15"),
            posting("6321", "1561", "S002", 400.0, "2024-01-20"),
            posting("1121", "5154", "", 25.0, "2024-02-01"),
            posting("6358", "1121", "", 10.0, "2024-02-11"),
        ]);

        let report = LedgerProcessor::process_with_verification(&table, 1e-9).unwrap();
        let jan = MonthBucket::new(2024, 1).unwrap();
        let feb = MonthBucket::new(2024, 2).unwrap();

        assert_eq!(report.revenue.get("Mall Revenue", jan), Some(1000.0));
        assert_eq!(report.cogs.get("Office COGS", jan), Some(400.0));
        assert_eq!(report.summary.get(NET_PROFIT, jan), Some(600.0));
        assert_eq!(report.summary.get(NET_PROFIT, feb), Some(15.0));
        assert_eq!(report.revenue.months, vec![jan]);
        assert_eq!(report.summary.months, vec![jan, feb]);
    }

    #[test]
    fn test_empty_ledger_produces_labelled_tables() {
        let report = process_ledger(&LedgerTable::default()).unwrap();

        assert_eq!(report.revenue.rows.len(), 5);
        assert_eq!(report.cogs.rows.len(), 5);
        assert_eq!(report.financials.rows.len(), 2);
        assert_eq!(report.summary.rows.len(), 5);
        for (_, table) in report.tables() {
            assert!(table.months.is_empty());
        }
    }

    #[test]
    fn test_report_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LedgerTable>();
        assert_send_sync::<FinancialReport>();
    }
}
