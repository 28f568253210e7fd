//! Report assembly and export (PDF, Excel and CSV outputs)
//!
//! Assembly gathers the selected analytics sections into one `ReportData`;
//! the exporters are pure functions of that value and produce the same
//! bytes for the same report.

mod csv_bundle;
mod excel;
mod pdf;
mod table;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregate::{
    monthly_budget_line, monthly_totals, quarterly_totals, spending_stats, totals_by_type,
    year_over_year, YearComparison,
};
use crate::analytics::AnalysisParams;
use crate::anomaly::{detect_anomalies, Anomaly};
use crate::bills::{Bill, Budgets, SavingsTarget};
use crate::budget::{budget_variance, savings_progress, BudgetVariance, SavingsProgress};
use crate::constants;
use crate::error::ExportError;
use crate::forecast::{budget_forecast, growth_basis};
use crate::predict::{predict, PredictionPoint};

pub use table::{sheets, Cell, Sheet};

/// Sections to include in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub overview: bool,
    pub monthly_trends: bool,
    pub utility_breakdown: bool,
    pub budget_analysis: bool,
    pub savings_progress: bool,
    pub anomalies: bool,
    pub predictions: bool,
    pub year_comparison: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            overview: true,
            monthly_trends: true,
            utility_breakdown: true,
            budget_analysis: true,
            savings_progress: true,
            anomalies: true,
            predictions: true,
            year_comparison: false,
        }
    }
}

impl ReportOptions {
    /// Every section disabled
    pub fn none() -> Self {
        Self {
            overview: false,
            monthly_trends: false,
            utility_breakdown: false,
            budget_analysis: false,
            savings_progress: false,
            anomalies: false,
            predictions: false,
            year_comparison: false,
        }
    }

    /// Every section enabled
    pub fn all() -> Self {
        Self {
            year_comparison: true,
            ..Self::default()
        }
    }
}

/// Output document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Excel,
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Pdf => write!(f, "pdf"),
            ReportFormat::Excel => write!(f, "excel"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Headline figures; zeros when no bills matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_bills: usize,
    pub total_spent: f64,
    pub average_spent: f64,
    pub highest_bill: f64,
    pub lowest_bill: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrends {
    pub year: i32,
    pub monthly: [f64; 12],
    pub quarterly: [f64; 4],
    /// Regression trend beyond the last bill
    pub predictions: Vec<PredictionPoint>,
    /// Annual budget spread evenly, when one is configured
    pub monthly_budget: Option<f64>,
}

impl MonthlyTrends {
    /// Month with the highest spending, if any month has spending
    pub fn peak_month(&self) -> Option<(usize, f64)> {
        self.monthly
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, amount)| *amount > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    pub utility_type: String,
    pub amount: f64,
    /// Share of the filtered total; 0 when the total is 0
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSection {
    pub average_change: f64,
    pub anchor: f64,
    pub points: Vec<PredictionPoint>,
}

/// Assembled report. A disabled section, or one whose inputs are missing,
/// is None.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub generated_at: NaiveDateTime,
    pub overview: Option<Overview>,
    pub monthly_trends: Option<MonthlyTrends>,
    pub utility_breakdown: Option<Vec<TypeShare>>,
    pub budget_analysis: Option<BudgetVariance>,
    pub savings_progress: Option<SavingsProgress>,
    pub anomalies: Option<Vec<Anomaly>>,
    pub predictions: Option<ForecastSection>,
    pub year_comparison: Option<YearComparison>,
}

impl ReportData {
    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// True when no section is present
    pub fn is_blank(&self) -> bool {
        self.overview.is_none()
            && self.monthly_trends.is_none()
            && self.utility_breakdown.is_none()
            && self.budget_analysis.is_none()
            && self.savings_progress.is_none()
            && self.anomalies.is_none()
            && self.predictions.is_none()
            && self.year_comparison.is_none()
    }
}

/// Build the sections selected in `options`
pub fn assemble_report(
    bills: &[Bill],
    budgets: &Budgets,
    target: Option<&SavingsTarget>,
    params: &AnalysisParams,
    options: &ReportOptions,
    generated_at: NaiveDateTime,
) -> ReportData {
    let filtered = params.select(bills);
    let budget = budgets.for_filter(&params.utility);

    let overview = options.overview.then(|| {
        let stats = spending_stats(&filtered);
        Overview {
            total_bills: filtered.len(),
            total_spent: stats.as_ref().map_or(0.0, |s| s.total),
            average_spent: stats.as_ref().map_or(0.0, |s| s.average),
            highest_bill: stats.as_ref().map_or(0.0, |s| s.max),
            lowest_bill: stats.as_ref().map_or(0.0, |s| s.min),
        }
    });

    let monthly_trends = options.monthly_trends.then(|| MonthlyTrends {
        year: params.year,
        monthly: monthly_totals(&filtered),
        quarterly: quarterly_totals(&filtered),
        predictions: predict(&filtered, params.model, params.as_of),
        monthly_budget: budget.map(monthly_budget_line),
    });

    let utility_breakdown = options.utility_breakdown.then(|| {
        let totals = totals_by_type(&filtered);
        let grand_total: f64 = totals.values().sum();
        totals
            .into_iter()
            .map(|(kind, amount)| TypeShare {
                utility_type: kind.to_string(),
                amount,
                share: if grand_total != 0.0 { amount / grand_total * 100.0 } else { 0.0 },
            })
            .collect()
    });

    let anomalies = (options.anomalies && filtered.len() >= constants::MIN_BILLS_FOR_STATISTICS)
        .then(|| detect_anomalies(&filtered, params.z_threshold));

    let predictions = if options.predictions {
        let points = budget_forecast(&filtered, params.forecast_months, params.as_of);
        (!points.is_empty()).then(|| {
            let basis = growth_basis(&filtered);
            ForecastSection {
                average_change: basis.average_change,
                anchor: basis.anchor,
                points,
            }
        })
    } else {
        None
    };

    let year_comparison = if options.year_comparison {
        params
            .comparison_year
            .map(|other| year_over_year(bills, params.year, other, &params.utility))
    } else {
        None
    };

    ReportData {
        generated_at,
        overview,
        monthly_trends,
        utility_breakdown,
        budget_analysis: if options.budget_analysis {
            budget_variance(&filtered, budget)
        } else {
            None
        },
        savings_progress: if options.savings_progress {
            savings_progress(bills, target, params.as_of)
        } else {
            None
        },
        anomalies,
        predictions,
        year_comparison,
    }
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Render a report. PDF and Excel produce a single document; CSV produces
/// one file per section.
pub fn export(report: &ReportData, format: ReportFormat) -> Result<Vec<ExportedFile>, ExportError> {
    let files = match format {
        ReportFormat::Pdf => vec![ExportedFile {
            name: format!("{}.pdf", constants::REPORT_BASENAME),
            bytes: pdf::render(report)?,
        }],
        ReportFormat::Excel => vec![ExportedFile {
            name: format!("{}.xlsx", constants::REPORT_BASENAME),
            bytes: excel::render(report)?,
        }],
        ReportFormat::Csv => csv_bundle::render(report)?,
    };
    Ok(files)
}

/// Assemble and render in one step
pub fn generate_report(
    bills: &[Bill],
    budgets: &Budgets,
    target: Option<&SavingsTarget>,
    params: &AnalysisParams,
    options: &ReportOptions,
    format: ReportFormat,
    generated_at: NaiveDateTime,
) -> Result<Vec<ExportedFile>, ExportError> {
    let report = assemble_report(bills, budgets, target, params, options, generated_at);
    export(&report, format)
}

/// Write rendered files into `output_dir`, returning their paths
pub fn save(files: &[ExportedFile], output_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = output_dir.join(&file.name);
        std::fs::write(&path, &file.bytes)?;
        info!(path = %path.display(), bytes = file.bytes.len(), "report written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bills::UtilityType;
    use crate::bills::tests::bill;
    use crate::filter::UtilityFilter;
    use chrono::NaiveDate;

    pub(crate) fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    pub(crate) fn bills() -> Vec<Bill> {
        vec![
            bill(1, UtilityType::Electricity, 100.0, 2024, 1),
            bill(2, UtilityType::Electricity, 100.0, 2024, 2),
            bill(3, UtilityType::Electricity, 100.0, 2024, 3),
            bill(4, UtilityType::Electricity, 1000.0, 2024, 4),
            bill(5, UtilityType::Water, 60.0, 2024, 4),
            bill(6, UtilityType::Electricity, 1500.0, 2023, 4),
        ]
    }

    pub(crate) fn params() -> AnalysisParams {
        let mut params = AnalysisParams::new(2024, generated_at().date());
        params.comparison_year = Some(2023);
        params.z_threshold = 1.0;
        params
    }

    pub(crate) fn full_report() -> ReportData {
        let mut budgets = Budgets::new();
        budgets.insert("all", 1200.0);
        let target = SavingsTarget { amount: 500.0 };
        assemble_report(
            &bills(),
            &budgets,
            Some(&target),
            &params(),
            &ReportOptions::all(),
            generated_at(),
        )
    }

    #[test]
    fn test_all_sections_disabled_leaves_only_timestamp() {
        let mut budgets = Budgets::new();
        budgets.insert("all", 1200.0);
        let target = SavingsTarget { amount: 500.0 };
        let report = assemble_report(
            &bills(),
            &budgets,
            Some(&target),
            &params(),
            &ReportOptions::none(),
            generated_at(),
        );
        assert!(report.is_blank());
        assert_eq!(report.generated_at, generated_at());
    }

    #[test]
    fn test_full_report_sections() {
        let report = full_report();

        let overview = report.overview.as_ref().unwrap();
        assert_eq!(overview.total_bills, 5);
        assert_eq!(overview.total_spent, 1360.0);
        assert_eq!(overview.highest_bill, 1000.0);
        assert_eq!(overview.lowest_bill, 60.0);

        let trends = report.monthly_trends.as_ref().unwrap();
        assert_eq!(trends.monthly[3], 1060.0);
        assert_eq!(trends.monthly_budget, Some(100.0));
        assert_eq!(trends.predictions.len(), 6);
        assert_eq!(trends.peak_month(), Some((3, 1060.0)));

        let breakdown = report.utility_breakdown.as_ref().unwrap();
        assert_eq!(breakdown.len(), 2);
        let share_sum: f64 = breakdown.iter().map(|s| s.share).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);

        let budget = report.budget_analysis.as_ref().unwrap();
        assert_eq!(budget.variance, 160.0);

        // 2023 = 1500, 2024 = 1360
        let savings = report.savings_progress.as_ref().unwrap();
        assert_eq!(savings.saved, 140.0);
        assert!((savings.progress - 28.0).abs() < 1e-9);

        let anomalies = report.anomalies.as_ref().unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].bill.id, 4);

        let forecast = report.predictions.as_ref().unwrap();
        assert_eq!(forecast.points.len(), constants::DEFAULT_FORECAST_MONTHS);

        let yoy = report.year_comparison.as_ref().unwrap();
        assert_eq!(yoy.comparison_total, 1500.0);
    }

    #[test]
    fn test_missing_preconditions_yield_none() {
        let mut params = params();
        params.utility = UtilityFilter::Only(UtilityType::Water);
        params.comparison_year = None;
        let report = assemble_report(
            &bills(),
            &Budgets::new(),
            None,
            &params,
            &ReportOptions::all(),
            generated_at(),
        );

        // one water bill: below every statistical minimum
        assert!(report.overview.is_some());
        assert!(report.budget_analysis.is_none());
        assert!(report.savings_progress.is_none());
        assert!(report.anomalies.is_none());
        assert!(report.predictions.is_none());
        assert!(report.year_comparison.is_none());
        assert!(report.monthly_trends.as_ref().unwrap().predictions.is_empty());
    }

    #[test]
    fn test_empty_overview_is_zeroed() {
        let mut params = params();
        params.year = 1990;
        let report = assemble_report(
            &bills(),
            &Budgets::new(),
            None,
            &params,
            &ReportOptions::default(),
            generated_at(),
        );
        let overview = report.overview.unwrap();
        assert_eq!(overview.total_bills, 0);
        assert_eq!(overview.highest_bill, 0.0);
        assert!(report.monthly_trends.unwrap().peak_month().is_none());
    }

    #[test]
    fn test_export_file_names() {
        let report = full_report();
        let pdf = export(&report, ReportFormat::Pdf).unwrap();
        assert_eq!(pdf.len(), 1);
        assert_eq!(pdf[0].name, "utility-bill-analysis.pdf");

        let xlsx = export(&report, ReportFormat::Excel).unwrap();
        assert_eq!(xlsx[0].name, "utility-bill-analysis.xlsx");
    }

    #[test]
    fn test_generate_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let files = generate_report(
            &bills(),
            &Budgets::new(),
            None,
            &params(),
            &ReportOptions::default(),
            ReportFormat::Csv,
            generated_at(),
        )
        .unwrap();
        let written = save(&files, dir.path()).unwrap();
        assert_eq!(written.len(), files.len());
        assert!(written.iter().all(|p| p.exists()));
    }
}
