//! Fixed chart-of-accounts prefix scheme and business-unit codes used to
//! classify ledger rows.

use crate::schema::LedgerRow;
use crate::utils::{has_any_prefix, has_prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSide {
    Debit,
    Credit,
}

impl AccountSide {
    fn account<'a>(&self, row: &'a LedgerRow) -> &'a str {
        match self {
            AccountSide::Debit => &row.debit_account,
            AccountSide::Credit => &row.credit_account,
        }
    }

    fn counterpart(&self) -> AccountSide {
        match self {
            AccountSide::Debit => AccountSide::Credit,
            AccountSide::Credit => AccountSide::Debit,
        }
    }
}

/// Selects ledger rows posted to an account family on one side, unless the
/// opposite side belongs to one of the excluded families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRule {
    pub name: &'static str,
    pub side: AccountSide,
    pub prefix: &'static str,
    pub excluded_counterparts: &'static [&'static str],
}

impl SelectionRule {
    pub fn matches(&self, row: &LedgerRow) -> bool {
        has_prefix(self.side.account(row), self.prefix)
            && !has_any_prefix(
                self.side.counterpart().account(row),
                self.excluded_counterparts,
            )
    }
}

/// Sales credited to 511, excluding closing entries (911), sales deductions
/// (521) and tax clearing postings.
pub const REVENUE_RULE: SelectionRule = SelectionRule {
    name: "revenue",
    side: AccountSide::Credit,
    prefix: "511",
    excluded_counterparts: &["911", "521", "3332", "333301", "33381"],
};

pub const COGS_RULE: SelectionRule = SelectionRule {
    name: "cogs",
    side: AccountSide::Debit,
    prefix: "632",
    excluded_counterparts: &["911"],
};

pub const FINANCIAL_INCOME_RULE: SelectionRule = SelectionRule {
    name: "financial income",
    side: AccountSide::Credit,
    prefix: "515",
    excluded_counterparts: &["911"],
};

pub const FINANCIAL_EXPENSE_RULE: SelectionRule = SelectionRule {
    name: "financial expense",
    side: AccountSide::Debit,
    prefix: "635",
    excluded_counterparts: &["911"],
};

/// Business line a ledger row is attributed to.
///
/// `Other` is the complement of the four coded units, so every row lands in
/// exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BusinessUnit {
    Mall,
    Office,
    Marketing,
    Parking,
    Other,
}

impl BusinessUnit {
    /// Presentation order of the category rows.
    pub const ALL: [BusinessUnit; 5] = [
        BusinessUnit::Mall,
        BusinessUnit::Office,
        BusinessUnit::Marketing,
        BusinessUnit::Parking,
        BusinessUnit::Other,
    ];

    const CODED: [BusinessUnit; 4] = [
        BusinessUnit::Mall,
        BusinessUnit::Office,
        BusinessUnit::Marketing,
        BusinessUnit::Parking,
    ];

    pub fn code(&self) -> Option<&'static str> {
        match self {
            BusinessUnit::Mall => Some("S001"),
            BusinessUnit::Office => Some("S002"),
            BusinessUnit::Marketing => Some("S005"),
            BusinessUnit::Parking => Some("S004"),
            BusinessUnit::Other => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BusinessUnit::Mall => "Mall",
            BusinessUnit::Office => "Office",
            BusinessUnit::Marketing => "Marketing",
            BusinessUnit::Parking => "Parking",
            BusinessUnit::Other => "Other",
        }
    }

    pub fn classify(business_code: &str) -> Self {
        Self::CODED
            .into_iter()
            .find(|unit| unit.code() == Some(business_code))
            .unwrap_or(BusinessUnit::Other)
    }

    pub fn label(&self, section: Section) -> String {
        format!("{} {}", self.name(), section.suffix())
    }
}

/// Report sections that are broken down by business unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Revenue,
    Cogs,
}

impl Section {
    pub fn rule(&self) -> &'static SelectionRule {
        match self {
            Section::Revenue => &REVENUE_RULE,
            Section::Cogs => &COGS_RULE,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Section::Revenue => "Revenue",
            Section::Cogs => "COGS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(debit: &str, credit: &str) -> LedgerRow {
        LedgerRow {
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_revenue_rule_excludes_clearing_counterparts() {
        assert!(REVENUE_RULE.matches(&posting("1311", "5111")));
        assert!(REVENUE_RULE.matches(&posting("3331", "5113")));
        for debit in ["9111", "5211", "33321", "333301", "333811"] {
            assert!(!REVENUE_RULE.matches(&posting(debit, "5111")), "debit {}", debit);
        }
        assert!(!REVENUE_RULE.matches(&posting("1311", "5151")));
    }

    #[test]
    fn test_cost_and_financial_rules() {
        assert!(COGS_RULE.matches(&posting("6321", "1561")));
        assert!(!COGS_RULE.matches(&posting("6321", "911")));
        assert!(FINANCIAL_INCOME_RULE.matches(&posting("1121", "515")));
        assert!(!FINANCIAL_INCOME_RULE.matches(&posting("911", "515")));
        assert!(FINANCIAL_EXPENSE_RULE.matches(&posting("635", "1121")));
        assert!(!FINANCIAL_EXPENSE_RULE.matches(&posting("635", "9111")));
    }

    #[test]
    fn test_business_unit_partition() {
        assert_eq!(BusinessUnit::classify("S001"), BusinessUnit::Mall);
        assert_eq!(BusinessUnit::classify("S002"), BusinessUnit::Office);
        assert_eq!(BusinessUnit::classify("S005"), BusinessUnit::Marketing);
        assert_eq!(BusinessUnit::classify("S004"), BusinessUnit::Parking);
        assert_eq!(BusinessUnit::classify("S003"), BusinessUnit::Other);
        assert_eq!(BusinessUnit::classify(""), BusinessUnit::Other);
        assert_eq!(BusinessUnit::classify("s001"), BusinessUnit::Other);

        for code in ["S001", "S002", "S003", "S004", "S005", "", "X"] {
            let unit = BusinessUnit::classify(code);
            let hits = BusinessUnit::ALL
                .iter()
                .filter(|candidate| match candidate.code() {
                    Some(c) => c == code,
                    None => !BusinessUnit::CODED.iter().any(|u| u.code() == Some(code)),
                })
                .count();
            assert_eq!(hits, 1, "code {}", code);
            assert!(BusinessUnit::ALL.contains(&unit));
        }
    }

    #[test]
    fn test_rules_test_the_opposite_side_for_exclusions() {
        assert_eq!(AccountSide::Debit.counterpart(), AccountSide::Credit);
        assert_eq!(AccountSide::Credit.counterpart(), AccountSide::Debit);
        let row = posting("911", "5111");
        assert_eq!(AccountSide::Debit.account(&row), "911");
        assert_eq!(AccountSide::Credit.account(&row), "5111");
    }

    #[test]
    fn test_labels() {
        assert_eq!(BusinessUnit::Mall.label(Section::Revenue), "Mall Revenue");
        assert_eq!(BusinessUnit::Other.label(Section::Cogs), "Other COGS");
    }
}
