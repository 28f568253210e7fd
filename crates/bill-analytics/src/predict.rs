//! Trend prediction from a regression over bill positions
//!
//! The x axis is the bill's position in the input slice, not its date.
//! Callers wanting a chronological trend sort the bills first.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bills::Bill;
use crate::constants;
use crate::regression::{self, Fit};

/// Regression family used by the trend predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PredictionModel {
    #[default]
    Linear,
    Exponential,
    Polynomial,
}

impl std::fmt::Display for PredictionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionModel::Linear => write!(f, "linear"),
            PredictionModel::Exponential => write!(f, "exponential"),
            PredictionModel::Polynomial => write!(f, "polynomial"),
        }
    }
}

/// A labeled projected amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub month: String,
    pub amount: f64,
}

/// Fit `model` to the bill amounts and project six points ahead.
///
/// Point `i` is labeled with the short month name of `as_of + 30*i days`
/// and valued at x = `bills.len() + i`. Fewer than two bills yield no
/// points. A singular or non-finite fit degrades to the mean amount.
pub fn predict(bills: &[Bill], model: PredictionModel, as_of: NaiveDate) -> Vec<PredictionPoint> {
    if bills.len() < constants::MIN_BILLS_FOR_PREDICTION {
        return Vec::new();
    }

    let points: Vec<(f64, f64)> = bills
        .iter()
        .enumerate()
        .map(|(i, b)| (i as f64, b.amount))
        .collect();
    let fit = fit_model(&points, model);
    let data_len = bills.len() as f64;

    (0..constants::PREDICTION_POINTS)
        .map(|i| {
            let date = as_of + Duration::days(constants::DAYS_PER_PROJECTED_MONTH * i as i64);
            PredictionPoint {
                month: date.format("%b").to_string(),
                amount: fit.evaluate(data_len + i as f64),
            }
        })
        .collect()
}

/// Fit the requested model, falling back to a flat mean line
fn fit_model(points: &[(f64, f64)], model: PredictionModel) -> Fit {
    let fitted = match model {
        PredictionModel::Linear => regression::linear(points),
        PredictionModel::Exponential => regression::exponential(points),
        // A parabola needs three points; two still give a line
        PredictionModel::Polynomial => {
            regression::quadratic(points).or_else(|| regression::linear(points))
        }
    };

    let horizon_end = (points.len() + constants::PREDICTION_POINTS) as f64;
    match fitted {
        Some(fit) if fit.evaluate(horizon_end).is_finite() => fit,
        _ => {
            let mean = points.iter().map(|p| p.1).sum::<f64>() / points.len() as f64;
            debug!(%model, mean, "degenerate trend fit, predicting flat mean");
            Fit::Flat(mean)
        }
    }
}
