//! Bill selection by year and utility type

use crate::bills::{Bill, UtilityType};
use crate::constants;

/// Utility type selection; `All` matches every bill
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UtilityFilter {
    #[default]
    All,
    Only(UtilityType),
}

impl UtilityFilter {
    /// Parse "all" (any case) or a utility type name
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case(constants::ALL_UTILITIES) {
            UtilityFilter::All
        } else {
            UtilityFilter::Only(UtilityType::parse(value))
        }
    }

    pub fn matches(&self, kind: &UtilityType) -> bool {
        match self {
            UtilityFilter::All => true,
            UtilityFilter::Only(only) => only == kind,
        }
    }

    /// Key used to look this filter up in the budget mapping
    pub fn budget_key(&self) -> String {
        match self {
            UtilityFilter::All => constants::ALL_UTILITIES.to_string(),
            UtilityFilter::Only(kind) => kind.to_string(),
        }
    }
}

impl std::fmt::Display for UtilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtilityFilter::All => write!(f, "{}", constants::ALL_UTILITIES),
            UtilityFilter::Only(kind) => write!(f, "{}", kind),
        }
    }
}

/// Bills dated in `year` whose type passes `filter`, in input order
pub fn filter_bills(bills: &[Bill], year: i32, filter: &UtilityFilter) -> Vec<Bill> {
    bills
        .iter()
        .filter(|b| b.year() == year && filter.matches(&b.utility_type))
        .cloned()
        .collect()
}

/// Distinct bill years, newest first
pub fn available_years(bills: &[Bill]) -> Vec<i32> {
    let mut years: Vec<i32> = bills.iter().map(Bill::year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// "all" followed by each distinct type in first-seen order
pub fn utility_types(bills: &[Bill]) -> Vec<UtilityFilter> {
    let mut types = vec![UtilityFilter::All];
    for bill in bills {
        let candidate = UtilityFilter::Only(bill.utility_type.clone());
        if !types.contains(&candidate) {
            types.push(candidate);
        }
    }
    types
}
