use crate::error::{LedgerError, Result};
use crate::report::{
    CategoryMonthTable, MonthlySums, NET_PROFIT, TOTAL_COGS, TOTAL_FINANCIAL_EXPENSE,
    TOTAL_FINANCIAL_INCOME, TOTAL_REVENUE,
};
use crate::schema::MonthBucket;
use std::collections::BTreeSet;

/// Combines the classifier tables into monthly totals and net profit.
pub struct SummaryAggregator<'a> {
    revenue: &'a CategoryMonthTable,
    cogs: &'a CategoryMonthTable,
    financials: &'a CategoryMonthTable,
}

impl<'a> SummaryAggregator<'a> {
    pub fn new(
        revenue: &'a CategoryMonthTable,
        cogs: &'a CategoryMonthTable,
        financials: &'a CategoryMonthTable,
    ) -> Self {
        Self {
            revenue,
            cogs,
            financials,
        }
    }

    pub fn aggregate(&self) -> CategoryMonthTable {
        let total_revenue = self.revenue.column_totals();
        let total_cogs = self.cogs.column_totals();
        let income = self.financials.series(TOTAL_FINANCIAL_INCOME);
        let expense = self.financials.series(TOTAL_FINANCIAL_EXPENSE);

        let months = collect_all_months(&[&total_revenue, &total_cogs, &income, &expense]);

        let net_profit: MonthlySums = months
            .iter()
            .map(|month| {
                let value = value_or_zero(&total_revenue, month) - value_or_zero(&total_cogs, month)
                    + value_or_zero(&income, month)
                    - value_or_zero(&expense, month);
                (*month, value)
            })
            .collect();

        CategoryMonthTable::from_series(vec![
            (TOTAL_REVENUE, total_revenue),
            (TOTAL_COGS, total_cogs),
            (TOTAL_FINANCIAL_INCOME, income),
            (TOTAL_FINANCIAL_EXPENSE, expense),
            (NET_PROFIT, net_profit),
        ])
    }
}

pub fn generate_summary(
    revenue: &CategoryMonthTable,
    cogs: &CategoryMonthTable,
    financials: &CategoryMonthTable,
) -> CategoryMonthTable {
    SummaryAggregator::new(revenue, cogs, financials).aggregate()
}

/// Checks `Net Profit = Revenue - COGS + Financial Income - Financial Expense`
/// for every month of a summary table.
pub fn verify_net_profit(summary: &CategoryMonthTable, tolerance: f64) -> Result<()> {
    for month in &summary.months {
        let cell = |label: &str| summary.get(label, *month).unwrap_or(0.0);

        let expected = cell(TOTAL_REVENUE) - cell(TOTAL_COGS) + cell(TOTAL_FINANCIAL_INCOME)
            - cell(TOTAL_FINANCIAL_EXPENSE);
        let actual = cell(NET_PROFIT);

        if (expected - actual).abs() > tolerance {
            return Err(LedgerError::NetProfitMismatch {
                month: month.to_string(),
                expected,
                actual,
            });
        }
    }

    Ok(())
}

fn collect_all_months(series: &[&MonthlySums]) -> BTreeSet<MonthBucket> {
    series
        .iter()
        .flat_map(|sums| sums.keys().copied())
        .collect()
}

fn value_or_zero(series: &MonthlySums, month: &MonthBucket) -> f64 {
    series.get(month).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(y: i32, m: u32) -> MonthBucket {
        MonthBucket::new(y, m).unwrap()
    }

    fn sums(entries: &[(MonthBucket, f64)]) -> MonthlySums {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_summary_aligns_ragged_months() {
        let revenue = CategoryMonthTable::from_series(vec![
            ("Mall Revenue", sums(&[(month(2024, 1), 1000.0)])),
            ("Office Revenue", sums(&[(month(2024, 2), 500.0)])),
        ]);
        let cogs = CategoryMonthTable::from_series(vec![(
            "Mall COGS",
            sums(&[(month(2024, 1), 400.0)]),
        )]);
        let financials = CategoryMonthTable::from_series(vec![
            (TOTAL_FINANCIAL_INCOME, sums(&[(month(2024, 3), 50.0)])),
            (TOTAL_FINANCIAL_EXPENSE, sums(&[(month(2024, 2), 20.0)])),
        ]);

        let summary = generate_summary(&revenue, &cogs, &financials);
        assert_eq!(
            summary.labels(),
            vec![
                TOTAL_REVENUE,
                TOTAL_COGS,
                TOTAL_FINANCIAL_INCOME,
                TOTAL_FINANCIAL_EXPENSE,
                NET_PROFIT
            ]
        );
        assert_eq!(summary.months, vec![month(2024, 1), month(2024, 2), month(2024, 3)]);
        assert_eq!(summary.get(NET_PROFIT, month(2024, 1)), Some(600.0));
        assert_eq!(summary.get(NET_PROFIT, month(2024, 2)), Some(480.0));
        assert_eq!(summary.get(NET_PROFIT, month(2024, 3)), Some(50.0));
        assert_eq!(summary.get(TOTAL_COGS, month(2024, 3)), Some(0.0));
        assert!(verify_net_profit(&summary, 0.0).is_ok());
    }

    #[test]
    fn test_empty_inputs_give_empty_summary() {
        let empty = CategoryMonthTable::from_series(Vec::<(&str, MonthlySums)>::new());
        let summary = generate_summary(&empty, &empty, &empty);
        assert!(summary.is_empty());
        assert_eq!(summary.rows.len(), 5);
    }

    #[test]
    fn test_verify_handles_ragged_summary() {
        let summary: CategoryMonthTable = serde_json::from_str(
            r#"{"months":["2024-01","2024-02"],"rows":[{"label":"Total Revenue","values":[1.0]},{"label":"Net Profit","values":[1.0,2.0]}]}"#,
        )
        .unwrap();

        match verify_net_profit(&summary, 0.01) {
            Err(LedgerError::NetProfitMismatch { month, expected, actual }) => {
                assert_eq!(month, "2024-02");
                assert_eq!(expected, 0.0);
                assert_eq!(actual, 2.0);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_detects_tampered_net_profit() {
        let revenue =
            CategoryMonthTable::from_series(vec![("Mall Revenue", sums(&[(month(2024, 1), 10.0)]))]);
        let empty = CategoryMonthTable::from_series(Vec::<(&str, MonthlySums)>::new());
        let mut summary = generate_summary(&revenue, &empty, &empty);

        let net = summary
            .rows
            .iter_mut()
            .find(|row| row.label == NET_PROFIT)
            .unwrap();
        net.values[0] = 11.0;

        match verify_net_profit(&summary, 0.5) {
            Err(LedgerError::NetProfitMismatch { month, expected, actual }) => {
                assert_eq!(month, "2024-01");
                assert_eq!(expected, 10.0);
                assert_eq!(actual, 11.0);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }
}
