use crate::chart_of_accounts::{
    BusinessUnit, Section, SelectionRule, FINANCIAL_EXPENSE_RULE, FINANCIAL_INCOME_RULE,
};
use crate::report::{
    CategoryMonthTable, MonthlySums, TOTAL_FINANCIAL_EXPENSE, TOTAL_FINANCIAL_INCOME,
};
use crate::schema::LedgerRow;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Counts gathered while reducing one selection to monthly sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub matched: usize,
    pub invalid_amounts: usize,
    pub undated: usize,
}

impl SelectionStats {
    fn log(&self, stage: &str) {
        debug!("{}: {} matching rows", stage, self.matched);
        if self.invalid_amounts > 0 {
            warn!(
                "{}: {} rows with a non-numeric amount counted as 0",
                stage, self.invalid_amounts
            );
        }
        if self.undated > 0 {
            warn!(
                "{}: {} rows with an unparseable document date excluded from monthly totals",
                stage, self.undated
            );
        }
    }
}

/// Adds one row to a monthly series.
///
/// Undated rows are skipped. A dated row with a bad amount still registers
/// its month, contributing 0.
fn accumulate(sums: &mut MonthlySums, stats: &mut SelectionStats, row: &LedgerRow) {
    stats.matched += 1;

    let amount = row.amount_value();
    if amount.is_none() {
        stats.invalid_amounts += 1;
    }

    match row.month() {
        Some(month) => *sums.entry(month).or_insert(0.0) += amount.unwrap_or(0.0),
        None => stats.undated += 1,
    }
}

pub fn monthly_totals(rows: &[LedgerRow], rule: &SelectionRule) -> (MonthlySums, SelectionStats) {
    let mut sums = MonthlySums::new();
    let mut stats = SelectionStats::default();

    for row in rows.iter().filter(|row| rule.matches(row)) {
        accumulate(&mut sums, &mut stats, row);
    }

    (sums, stats)
}

/// Monthly totals for every business unit, in presentation order.
pub fn monthly_totals_by_unit(
    rows: &[LedgerRow],
    rule: &SelectionRule,
) -> (Vec<(BusinessUnit, MonthlySums)>, SelectionStats) {
    let mut by_unit: BTreeMap<BusinessUnit, MonthlySums> = BusinessUnit::ALL
        .iter()
        .map(|unit| (*unit, MonthlySums::new()))
        .collect();
    let mut stats = SelectionStats::default();

    for row in rows.iter().filter(|row| rule.matches(row)) {
        let unit = BusinessUnit::classify(&row.business_code);
        let sums = by_unit.entry(unit).or_default();
        accumulate(sums, &mut stats, row);
    }

    let ordered = BusinessUnit::ALL
        .iter()
        .map(|unit| (*unit, by_unit.remove(unit).unwrap_or_default()))
        .collect();

    (ordered, stats)
}

fn classify_by_unit(rows: &[LedgerRow], section: Section) -> CategoryMonthTable {
    let rule = section.rule();
    let (by_unit, stats) = monthly_totals_by_unit(rows, rule);
    stats.log(rule.name);

    CategoryMonthTable::from_series(
        by_unit
            .into_iter()
            .map(|(unit, sums)| (unit.label(section), sums))
            .collect(),
    )
}

/// Revenue per business unit and month.
pub fn classify_revenue(rows: &[LedgerRow]) -> CategoryMonthTable {
    classify_by_unit(rows, Section::Revenue)
}

/// Cost of goods sold per business unit and month.
pub fn classify_cogs(rows: &[LedgerRow]) -> CategoryMonthTable {
    classify_by_unit(rows, Section::Cogs)
}

/// Financial income and expense totals per month, without unit breakdown.
pub fn classify_financials(rows: &[LedgerRow]) -> CategoryMonthTable {
    let (income, income_stats) = monthly_totals(rows, &FINANCIAL_INCOME_RULE);
    income_stats.log(FINANCIAL_INCOME_RULE.name);

    let (expense, expense_stats) = monthly_totals(rows, &FINANCIAL_EXPENSE_RULE);
    expense_stats.log(FINANCIAL_EXPENSE_RULE.name);

    CategoryMonthTable::from_series(vec![
        (TOTAL_FINANCIAL_INCOME, income),
        (TOTAL_FINANCIAL_EXPENSE, expense),
    ])
}
