//! Monthly, quarterly and per-type spending totals

use serde::Serialize;
use std::collections::BTreeMap;

use crate::bills::{Bill, UtilityType};
use crate::filter::{filter_bills, UtilityFilter};

/// Spending per calendar month, index 0 = January. Empty months are 0.
pub fn monthly_totals(bills: &[Bill]) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for bill in bills {
        totals[bill.month_index()] += bill.amount;
    }
    totals
}

/// Spending per quarter, index 0 = Q1
pub fn quarterly_totals(bills: &[Bill]) -> [f64; 4] {
    let mut totals = [0.0; 4];
    for bill in bills {
        totals[bill.month_index() / 3] += bill.amount;
    }
    totals
}

/// Spending per utility type present in `bills`
pub fn totals_by_type(bills: &[Bill]) -> BTreeMap<UtilityType, f64> {
    let mut totals = BTreeMap::new();
    for bill in bills {
        *totals.entry(bill.utility_type.clone()).or_insert(0.0) += bill.amount;
    }
    totals
}

/// Headline figures for a bill set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingStats {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

/// Count, total, mean and extremes; None for an empty set
pub fn spending_stats(bills: &[Bill]) -> Option<SpendingStats> {
    if bills.is_empty() {
        return None;
    }

    let total: f64 = bills.iter().map(|b| b.amount).sum();
    let max = bills.iter().map(|b| b.amount).fold(f64::NEG_INFINITY, f64::max);
    let min = bills.iter().map(|b| b.amount).fold(f64::INFINITY, f64::min);

    Some(SpendingStats {
        count: bills.len(),
        total,
        average: total / bills.len() as f64,
        max,
        min,
    })
}

/// Two years side by side under the same utility filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearComparison {
    pub year: i32,
    pub comparison_year: i32,
    pub current_monthly: [f64; 12],
    pub comparison_monthly: [f64; 12],
    pub current_total: f64,
    pub comparison_total: f64,
    /// Change of `year` relative to `comparison_year`; None when the
    /// comparison year has no spending.
    pub percentage_change: Option<f64>,
}

pub fn year_over_year(
    bills: &[Bill],
    year: i32,
    comparison_year: i32,
    filter: &UtilityFilter,
) -> YearComparison {
    let current = filter_bills(bills, year, filter);
    let comparison = filter_bills(bills, comparison_year, filter);

    let current_monthly = monthly_totals(&current);
    let comparison_monthly = monthly_totals(&comparison);
    let current_total: f64 = current_monthly.iter().sum();
    let comparison_total: f64 = comparison_monthly.iter().sum();

    let percentage_change = (comparison_total != 0.0)
        .then(|| (current_total - comparison_total) / comparison_total * 100.0);

    YearComparison {
        year,
        comparison_year,
        current_monthly,
        comparison_monthly,
        current_total,
        comparison_total,
        percentage_change,
    }
}

/// Even monthly share of an annual budget
pub fn monthly_budget_line(annual_budget: f64) -> f64 {
    annual_budget / 12.0
}
