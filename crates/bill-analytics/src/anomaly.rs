//! Z-score outlier detection over a bill cohort

use serde::Serialize;

use crate::bills::Bill;
use crate::constants;

/// A bill whose amount is unusually far from its cohort mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    #[serde(flatten)]
    pub bill: Bill,
    /// Cohort mean amount
    pub expected: f64,
    /// Signed percentage deviation from the mean. None when the mean is
    /// zero and the percentage is undefined.
    pub deviation: Option<f64>,
    pub z_score: f64,
}

impl Anomaly {
    /// Band of amounts considered normal for display
    pub fn expected_range(&self) -> (f64, f64) {
        (
            self.expected * constants::EXPECTED_RANGE_LOW,
            self.expected * constants::EXPECTED_RANGE_HIGH,
        )
    }
}

/// Population mean and standard deviation of the bill amounts
pub fn mean_and_std_dev(bills: &[Bill]) -> Option<(f64, f64)> {
    if bills.is_empty() {
        return None;
    }
    let n = bills.len() as f64;
    let mean = bills.iter().map(|b| b.amount).sum::<f64>() / n;
    let variance = bills.iter().map(|b| (b.amount - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Flag bills with `|amount - mean| / std_dev > z_threshold`.
///
/// Needs at least three bills. A zero standard deviation flags nothing.
pub fn detect_anomalies(bills: &[Bill], z_threshold: f64) -> Vec<Anomaly> {
    if bills.len() < constants::MIN_BILLS_FOR_STATISTICS {
        return Vec::new();
    }
    let Some((mean, std_dev)) = mean_and_std_dev(bills) else {
        return Vec::new();
    };
    if std_dev == 0.0 || !std_dev.is_finite() {
        return Vec::new();
    }

    bills
        .iter()
        .filter_map(|bill| {
            let z_score = (bill.amount - mean).abs() / std_dev;
            (z_score > z_threshold).then(|| Anomaly {
                bill: bill.clone(),
                expected: mean,
                deviation: (mean != 0.0).then(|| (bill.amount - mean) / mean * 100.0),
                z_score,
            })
        })
        .collect()
}
