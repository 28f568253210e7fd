//! Budget variance and savings-target progress

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::bills::{total_amount, total_for_year, Bill, SavingsTarget};

/// Spending against an annual budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetVariance {
    pub budget: f64,
    pub spent: f64,
    /// Positive when over budget
    pub variance: f64,
    pub percentage_variance: f64,
}

impl BudgetVariance {
    pub fn is_over_budget(&self) -> bool {
        self.variance >= 0.0
    }
}

/// Compare filtered spending with the configured budget.
///
/// `budget` is the value looked up for the active filter; None, zero or
/// negative means no budget is configured and no variance is reported.
pub fn budget_variance(bills: &[Bill], budget: Option<f64>) -> Option<BudgetVariance> {
    let budget = budget.filter(|b| b.is_finite() && *b > 0.0)?;
    let spent = total_amount(bills);
    let variance = spent - budget;

    Some(BudgetVariance {
        budget,
        spent,
        variance,
        percentage_variance: variance / budget * 100.0,
    })
}

/// Year-over-year savings measured against the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsProgress {
    pub target: f64,
    /// Last year's total minus this year's; negative when spending grew
    pub saved: f64,
    /// Percentage of the target reached, clamped to 0..=100
    pub progress: f64,
    pub remaining: f64,
}

/// Savings of the calendar year containing `as_of` versus the year before.
///
/// Uses every bill regardless of the active filter.
pub fn savings_progress(
    all_bills: &[Bill],
    target: Option<&SavingsTarget>,
    as_of: NaiveDate,
) -> Option<SavingsProgress> {
    let target = target.filter(|t| t.is_configured())?;
    let current_year = as_of.year();

    let last_year_total = total_for_year(all_bills, current_year - 1);
    let this_year_total = total_for_year(all_bills, current_year);
    let saved = last_year_total - this_year_total;
    let progress = saved / target.amount * 100.0;

    Some(SavingsProgress {
        target: target.amount,
        saved,
        progress: progress.clamp(0.0, 100.0),
        remaining: (target.amount - saved).max(0.0),
    })
}
