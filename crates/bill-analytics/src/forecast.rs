//! Budget forecast by compound month-over-month growth
//!
//! This is a plain extrapolation of the average monthly change. It carries
//! no confidence interval and will overshoot on short, noisy histories.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::monthly_totals;
use crate::bills::Bill;
use crate::constants;
use crate::predict::PredictionPoint;

/// Inputs the projection was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthBasis {
    /// Mean fractional change between consecutive non-empty months
    pub average_change: f64,
    /// Last non-zero monthly total
    pub anchor: f64,
    /// Number of month pairs that contributed to the average
    pub samples: usize,
}

/// Average month-over-month change and the anchor month.
///
/// Pairs where either month is zero are skipped so missing months do not
/// register as -100% / +inf swings.
pub fn growth_basis(bills: &[Bill]) -> GrowthBasis {
    let monthly = monthly_totals(bills);

    let changes: Vec<f64> = monthly
        .windows(2)
        .filter(|pair| pair[0] != 0.0 && pair[1] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();

    let average_change = if changes.is_empty() {
        0.0
    } else {
        changes.iter().sum::<f64>() / changes.len() as f64
    };

    let anchor = monthly.iter().rev().copied().find(|m| *m != 0.0).unwrap_or(0.0);

    GrowthBasis {
        average_change,
        anchor,
        samples: changes.len(),
    }
}

/// Project `horizon_months` monthly amounts.
///
/// Point `i` is `anchor * (1 + average_change)^(i + 1)`, labeled with the
/// month and year of `as_of + 30*(i + 1) days`. Needs at least three bills.
/// The series stops early once a label date leaves the calendar range or an
/// amount is no longer finite.
pub fn budget_forecast(bills: &[Bill], horizon_months: usize, as_of: NaiveDate) -> Vec<PredictionPoint> {
    if bills.len() < constants::MIN_BILLS_FOR_STATISTICS {
        return Vec::new();
    }

    let basis = growth_basis(bills);
    let growth = 1.0 + basis.average_change;

    let points: Vec<PredictionPoint> = (1..=horizon_months)
        .map_while(|step| {
            let days = constants::DAYS_PER_PROJECTED_MONTH.checked_mul(i64::try_from(step).ok()?)?;
            let date = as_of.checked_add_signed(Duration::try_days(days)?)?;
            let amount = basis.anchor * growth.powf(step as f64);
            amount.is_finite().then(|| PredictionPoint {
                month: date.format("%b %Y").to_string(),
                amount,
            })
        })
        .collect();

    if points.len() < horizon_months {
        debug!(
            requested = horizon_months,
            produced = points.len(),
            "forecast truncated at the representable range"
        );
    }
    points
}
