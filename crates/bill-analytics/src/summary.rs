//! Console output for the CLI

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analytics::{AnalysisParams, Analytics};
use crate::anomaly::Anomaly;
use crate::constants::{MONTH_LABELS, QUARTER_LABELS};
use crate::predict::PredictionPoint;

#[derive(Debug, Tabled)]
pub struct AnomalyRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Utility")]
    pub utility: String,
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[tabled(rename = "Expected Range")]
    pub expected_range: String,
    #[tabled(rename = "Deviation")]
    pub deviation: String,
    #[tabled(rename = "Z-Score")]
    pub z_score: String,
}

impl From<&Anomaly> for AnomalyRow {
    fn from(anomaly: &Anomaly) -> Self {
        let (low, high) = anomaly.expected_range();
        Self {
            date: anomaly.bill.bill_date.format("%Y-%m-%d").to_string(),
            utility: anomaly.bill.utility_type.to_string(),
            amount: format!("${:.2}", anomaly.bill.amount),
            expected_range: format!("${:.2} - ${:.2}", low, high),
            deviation: anomaly
                .deviation
                .map_or_else(|| "n/a".to_string(), |d| format!("{:+.1}%", d)),
            z_score: format!("{:.2}", anomaly.z_score),
        }
    }
}

#[derive(Debug, Tabled)]
pub struct ForecastRow {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Projected")]
    pub amount: String,
}

impl From<&PredictionPoint> for ForecastRow {
    fn from(point: &PredictionPoint) -> Self {
        Self {
            month: point.month.clone(),
            amount: format!("${:.2}", point.amount),
        }
    }
}

pub fn anomaly_table(anomalies: &[Anomaly]) -> String {
    let mut table = Table::new(anomalies.iter().map(AnomalyRow::from));
    table.with(Style::rounded());
    table.to_string()
}

pub fn forecast_table(points: &[PredictionPoint]) -> String {
    let mut table = Table::new(points.iter().map(ForecastRow::from));
    table.with(Style::rounded());
    table.to_string()
}

fn banner(title: &str) {
    println!("\n============================================================");
    println!("  {}", title);
    println!("============================================================\n");
}

/// Print the full analytics summary
pub fn print_summary(analytics: &Analytics, params: &AnalysisParams) {
    banner(&format!(
        "UTILITY SPENDING SUMMARY ({}, {})",
        params.year, params.utility
    ));

    let Some(stats) = &analytics.stats else {
        println!("No bills match the selected year and utility.");
        return;
    };

    println!("OVERVIEW:");
    println!("  Bills:            {}", stats.count);
    println!("  Total Spent:      ${:.2}", stats.total);
    println!("  Average Bill:     ${:.2}", stats.average);
    println!("  Highest Bill:     ${:.2}", stats.max);
    println!("  Lowest Bill:      ${:.2}", stats.min);

    println!("\nMONTHLY SPENDING:");
    for (label, amount) in MONTH_LABELS.iter().zip(analytics.monthly) {
        if amount > 0.0 {
            println!("  {:<4} ${:>10.2}", label, amount);
        }
    }

    println!("\nQUARTERLY SPENDING:");
    for (label, amount) in QUARTER_LABELS.iter().zip(analytics.quarterly) {
        println!("  {:<4} ${:>10.2}", label, amount);
    }

    println!("\nBY UTILITY TYPE:");
    for (kind, amount) in &analytics.by_type {
        println!("  {:<14} ${:>10.2}", kind.to_string(), amount);
    }

    if !analytics.predictions.is_empty() {
        println!("\nTREND ({}):", params.model);
        let points: Vec<String> = analytics
            .predictions
            .iter()
            .map(|p| format!("{} ${:.2}", p.month, p.amount))
            .collect();
        println!("  {}", points.join(", "));
    }

    if let Some(budget) = &analytics.budget_variance {
        println!("\nBUDGET:");
        println!("  Budget:           ${:.2}", budget.budget);
        println!("  Spent:            ${:.2}", budget.spent);
        println!(
            "  Variance:         ${:.2} ({}, {:+.1}%)",
            budget.variance.abs(),
            if budget.is_over_budget() { "over" } else { "under" },
            budget.percentage_variance
        );
    }

    if let Some(savings) = &analytics.savings_progress {
        println!("\nSAVINGS TARGET:");
        println!("  Target:           ${:.2}", savings.target);
        println!("  Saved:            ${:.2}", savings.saved);
        println!("  Progress:         {:.1}%", savings.progress);
        println!("  Remaining:        ${:.2}", savings.remaining);
    }

    if let Some(yoy) = &analytics.year_over_year {
        println!("\nYEAR OVER YEAR ({} vs {}):", yoy.year, yoy.comparison_year);
        println!("  {:<14} ${:>10.2}", yoy.year, yoy.current_total);
        println!("  {:<14} ${:>10.2}", yoy.comparison_year, yoy.comparison_total);
        match yoy.percentage_change {
            Some(change) => println!("  Change:        {:+.1}%", change),
            None => println!("  Change:        n/a"),
        }
    }

    println!(
        "\n{} anomal{} at z > {}",
        analytics.anomalies.len(),
        if analytics.anomalies.len() == 1 { "y" } else { "ies" },
        params.z_threshold
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::detect_anomalies;
    use crate::bills::tests::bill;
    use crate::bills::UtilityType;

    #[test]
    fn test_anomaly_row_formatting() {
        let bills = vec![
            bill(1, UtilityType::Electricity, 100.0, 2024, 1),
            bill(2, UtilityType::Electricity, 100.0, 2024, 2),
            bill(3, UtilityType::Electricity, 100.0, 2024, 3),
            bill(4, UtilityType::Electricity, 1000.0, 2024, 4),
        ];
        let anomalies = detect_anomalies(&bills, 1.5);
        assert_eq!(anomalies.len(), 1);

        let row = AnomalyRow::from(&anomalies[0]);
        assert_eq!(row.date, "2024-04-15");
        assert_eq!(row.amount, "$1000.00");
        assert_eq!(row.expected_range, "$260.00 - $390.00");
        assert_eq!(row.deviation, "+207.7%");
        assert_eq!(row.z_score, "1.73");
    }

    #[test]
    fn test_forecast_table_lists_points() {
        let points = vec![
            PredictionPoint {
                month: "Jul 2024".to_string(),
                amount: 110.0,
            },
            PredictionPoint {
                month: "Aug 2024".to_string(),
                amount: 121.0,
            },
        ];
        let table = forecast_table(&points);
        assert!(table.contains("Projected"));
        assert!(table.contains("Aug 2024"));
        assert!(table.contains("$121.00"));
    }
}
