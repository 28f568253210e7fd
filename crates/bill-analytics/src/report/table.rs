//! Tabular view of a report, shared by the spreadsheet and CSV exporters

use crate::constants::{MONTH_LABELS, QUARTER_LABELS};

use super::ReportData;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Missing or non-finite numbers render as "n/a"
    fn number(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::text("n/a"),
        }
    }

    /// Plain string form used by CSV output
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => format!("{:.2}", value),
            Cell::Empty => String::new(),
        }
    }
}

/// One named grid of cells; the first row is a title or header
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub rows: Vec<Vec<Cell>>,
}

fn label_row(label: &str, value: f64) -> Vec<Cell> {
    vec![Cell::text(label), Cell::number(Some(value))]
}

/// Sheets for every section present in the report, in report order
pub fn sheets(report: &ReportData) -> Vec<Sheet> {
    let mut sheets = Vec::new();

    if let Some(overview) = &report.overview {
        sheets.push(Sheet {
            name: "Overview",
            rows: vec![
                vec![Cell::text("Overview")],
                vec![Cell::text("Generated"), Cell::text(report.timestamp())],
                label_row("Total Bills", overview.total_bills as f64),
                label_row("Total Spent", overview.total_spent),
                label_row("Average Bill", overview.average_spent),
                label_row("Highest Bill", overview.highest_bill),
                label_row("Lowest Bill", overview.lowest_bill),
            ],
        });
    }

    if let Some(trends) = &report.monthly_trends {
        let mut rows = vec![vec![
            Cell::text("Month"),
            Cell::text("Spending"),
            Cell::text("Predicted"),
            Cell::text("Monthly Budget"),
        ]];
        let budget = || trends.monthly_budget.map_or(Cell::Empty, |b| Cell::number(Some(b)));
        for (label, amount) in MONTH_LABELS.iter().zip(trends.monthly) {
            rows.push(vec![
                Cell::text(*label),
                Cell::number(Some(amount)),
                Cell::Empty,
                budget(),
            ]);
        }
        for point in &trends.predictions {
            rows.push(vec![
                Cell::text(format!("{} (Predicted)", point.month)),
                Cell::Empty,
                Cell::number(Some(point.amount)),
                Cell::Empty,
            ]);
        }
        rows.push(Vec::new());
        for (label, amount) in QUARTER_LABELS.iter().zip(trends.quarterly) {
            rows.push(label_row(label, amount));
        }
        sheets.push(Sheet {
            name: "Monthly Trends",
            rows,
        });
    }

    if let Some(breakdown) = &report.utility_breakdown {
        let mut rows = vec![vec![
            Cell::text("Utility Type"),
            Cell::text("Spending"),
            Cell::text("Share (%)"),
        ]];
        for share in breakdown {
            rows.push(vec![
                Cell::text(share.utility_type.clone()),
                Cell::number(Some(share.amount)),
                Cell::number(Some(share.share)),
            ]);
        }
        sheets.push(Sheet {
            name: "Utility Breakdown",
            rows,
        });
    }

    if let Some(budget) = &report.budget_analysis {
        sheets.push(Sheet {
            name: "Budget Analysis",
            rows: vec![
                vec![Cell::text("Budget Analysis")],
                label_row("Budget", budget.budget),
                label_row("Actual Spending", budget.spent),
                label_row("Variance", budget.variance),
                label_row("Percentage Variance", budget.percentage_variance),
            ],
        });
    }

    if let Some(savings) = &report.savings_progress {
        sheets.push(Sheet {
            name: "Savings Progress",
            rows: vec![
                vec![Cell::text("Savings Progress")],
                label_row("Target", savings.target),
                label_row("Saved", savings.saved),
                label_row("Progress (%)", savings.progress),
                label_row("Remaining", savings.remaining),
            ],
        });
    }

    if let Some(anomalies) = &report.anomalies {
        let mut rows = vec![vec![
            Cell::text("Date"),
            Cell::text("Utility Type"),
            Cell::text("Amount"),
            Cell::text("Expected"),
            Cell::text("Deviation (%)"),
            Cell::text("Z-Score"),
        ]];
        for anomaly in anomalies {
            rows.push(vec![
                Cell::text(anomaly.bill.bill_date.format("%Y-%m-%d").to_string()),
                Cell::text(anomaly.bill.utility_type.to_string()),
                Cell::number(Some(anomaly.bill.amount)),
                Cell::number(Some(anomaly.expected)),
                Cell::number(anomaly.deviation),
                Cell::number(Some(anomaly.z_score)),
            ]);
        }
        sheets.push(Sheet {
            name: "Anomalies",
            rows,
        });
    }

    if let Some(forecast) = &report.predictions {
        let mut rows = vec![vec![Cell::text("Month"), Cell::text("Amount")]];
        for point in &forecast.points {
            rows.push(vec![Cell::text(point.month.clone()), Cell::number(Some(point.amount))]);
        }
        sheets.push(Sheet {
            name: "Forecast",
            rows,
        });
    }

    if let Some(yoy) = &report.year_comparison {
        let mut rows = vec![vec![
            Cell::text("Month"),
            Cell::text(yoy.year.to_string()),
            Cell::text(yoy.comparison_year.to_string()),
        ]];
        for (i, label) in MONTH_LABELS.iter().enumerate() {
            rows.push(vec![
                Cell::text(*label),
                Cell::number(Some(yoy.current_monthly[i])),
                Cell::number(Some(yoy.comparison_monthly[i])),
            ]);
        }
        rows.push(vec![
            Cell::text("Total"),
            Cell::number(Some(yoy.current_total)),
            Cell::number(Some(yoy.comparison_total)),
        ]);
        rows.push(vec![Cell::text("Change (%)"), Cell::number(yoy.percentage_change)]);
        sheets.push(Sheet {
            name: "Year Comparison",
            rows,
        });
    }

    sheets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::full_report;

    #[test]
    fn test_sheet_names_follow_sections() {
        let names: Vec<&str> = sheets(&full_report()).iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "Overview",
                "Monthly Trends",
                "Utility Breakdown",
                "Budget Analysis",
                "Savings Progress",
                "Anomalies",
                "Forecast",
                "Year Comparison",
            ]
        );
    }

    #[test]
    fn test_blank_report_has_no_sheets() {
        let mut report = full_report();
        report.overview = None;
        report.monthly_trends = None;
        report.utility_breakdown = None;
        report.budget_analysis = None;
        report.savings_progress = None;
        report.anomalies = None;
        report.predictions = None;
        report.year_comparison = None;
        assert!(sheets(&report).is_empty());
    }

    #[test]
    fn test_budget_sheet_rows() {
        let all = sheets(&full_report());
        let budget = all.iter().find(|s| s.name == "Budget Analysis").unwrap();
        assert_eq!(budget.rows[1], vec![Cell::text("Budget"), Cell::Number(1200.0)]);
        assert_eq!(budget.rows[3], vec![Cell::text("Variance"), Cell::Number(160.0)]);
    }

    #[test]
    fn test_monthly_trends_rows() {
        let all = sheets(&full_report());
        let trends = all.iter().find(|s| s.name == "Monthly Trends").unwrap();
        // header + 12 months + 6 predictions + spacer + 4 quarters
        assert_eq!(trends.rows.len(), 1 + 12 + 6 + 1 + 4);
        assert_eq!(trends.rows[4][1], Cell::Number(1060.0));
        assert!(matches!(&trends.rows[13][0], Cell::Text(t) if t.ends_with("(Predicted)")));
    }

    #[test]
    fn test_undefined_values_render_as_na() {
        assert_eq!(Cell::number(None), Cell::text("n/a"));
        assert_eq!(Cell::number(Some(f64::NAN)), Cell::text("n/a"));
        assert_eq!(Cell::Number(12.3456).to_field(), "12.35");
    }
}
