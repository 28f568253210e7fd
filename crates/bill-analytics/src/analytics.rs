//! One-shot analytics over a store snapshot
//!
//! Every derived value is recomputed from the inputs on each call; nothing
//! is cached between calls.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{
    monthly_totals, quarterly_totals, spending_stats, totals_by_type, year_over_year,
    SpendingStats, YearComparison,
};
use crate::anomaly::{detect_anomalies, Anomaly};
use crate::bills::{sort_by_date, Bill, Budgets, SavingsTarget, UtilityType};
use crate::budget::{budget_variance, savings_progress, BudgetVariance, SavingsProgress};
use crate::constants;
use crate::filter::{filter_bills, UtilityFilter};
use crate::forecast::budget_forecast;
use crate::predict::{predict, PredictionModel, PredictionPoint};

/// Filter selections and tuning for one analytics run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub year: i32,
    pub utility: UtilityFilter,
    pub comparison_year: Option<i32>,
    pub model: PredictionModel,
    pub forecast_months: usize,
    pub z_threshold: f64,
    /// "Today" for labels and the savings calendar years
    pub as_of: NaiveDate,
    /// Sort the filtered bills by date before fitting the trend
    pub chronological: bool,
}

impl AnalysisParams {
    /// Defaults for the given year and reference date
    pub fn new(year: i32, as_of: NaiveDate) -> Self {
        Self {
            year,
            utility: UtilityFilter::All,
            comparison_year: None,
            model: PredictionModel::default(),
            forecast_months: constants::DEFAULT_FORECAST_MONTHS,
            z_threshold: constants::DEFAULT_Z_THRESHOLD,
            as_of,
            chronological: true,
        }
    }

    /// Bills selected by year and utility filter, in trend order
    pub fn select(&self, bills: &[Bill]) -> Vec<Bill> {
        let mut filtered = filter_bills(bills, self.year, &self.utility);
        if self.chronological {
            sort_by_date(&mut filtered);
        }
        filtered
    }
}

/// Everything the dashboard shows for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub bill_count: usize,
    pub stats: Option<SpendingStats>,
    pub monthly: [f64; 12],
    pub quarterly: [f64; 4],
    pub by_type: BTreeMap<UtilityType, f64>,
    pub predictions: Vec<PredictionPoint>,
    pub anomalies: Vec<Anomaly>,
    pub budget_variance: Option<BudgetVariance>,
    pub savings_progress: Option<SavingsProgress>,
    pub forecast: Vec<PredictionPoint>,
    pub year_over_year: Option<YearComparison>,
}

/// Run the whole pipeline for one filter selection
pub fn compute_analytics(
    bills: &[Bill],
    budgets: &Budgets,
    target: Option<&SavingsTarget>,
    params: &AnalysisParams,
) -> Analytics {
    let filtered = params.select(bills);

    Analytics {
        bill_count: filtered.len(),
        stats: spending_stats(&filtered),
        monthly: monthly_totals(&filtered),
        quarterly: quarterly_totals(&filtered),
        by_type: totals_by_type(&filtered),
        predictions: predict(&filtered, params.model, params.as_of),
        anomalies: detect_anomalies(&filtered, params.z_threshold),
        budget_variance: budget_variance(&filtered, budgets.for_filter(&params.utility)),
        savings_progress: savings_progress(bills, target, params.as_of),
        forecast: budget_forecast(&filtered, params.forecast_months, params.as_of),
        year_over_year: params
            .comparison_year
            .map(|other| year_over_year(bills, params.year, other, &params.utility)),
    }
}
