//! Utility Bill Analytics
//!
//! Reads bills, budgets and the savings target from the bill store and
//! prints spending analytics or writes PDF, Excel and CSV reports.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use bill_analytics::config::{Config, FileConfig, StoreSource};
use bill_analytics::filter::{available_years, utility_types};
use bill_analytics::{
    bills, compute_analytics, constants, report, summary, AnalysisParams, AnyStore, BillStore,
    FileStore, HttpStore, PredictionModel, ReportFormat, ReportOptions, SavingsTarget, Snapshot,
    UtilityFilter,
};

#[derive(Parser, Debug)]
#[command(name = "bill-analytics")]
#[command(about = "Spending analytics and reports for utility bills")]
struct Args {
    /// Config file path
    #[arg(long, default_value = constants::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Bill store API base URL (e.g., http://localhost:5000)
    #[arg(long, global = true, conflicts_with = "data_dir")]
    api_url: Option<String>,

    /// Local data directory with bills.json/bills.csv, budgets.json and savings_target.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Year to analyze (default: current year)
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Utility type to analyze, or "all"
    #[arg(long, default_value = constants::ALL_UTILITIES, global = true)]
    utility: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the spending summary for the selected year and utility
    Summary {
        /// Also compare against this year
        #[arg(long)]
        compare_year: Option<i32>,

        /// Trend model (default from config)
        #[arg(long, value_enum)]
        model: Option<PredictionModel>,
    },

    /// List bills with unusual amounts
    Anomalies {
        /// Z-score threshold (default from config)
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,
    },

    /// Project monthly spending forward
    Forecast {
        /// Horizon in months
        #[arg(long, value_parser = clap::value_parser!(u32).range(
            constants::MIN_FORECAST_MONTHS as i64..=constants::MAX_FORECAST_MONTHS as i64
        ))]
        months: Option<u32>,
    },

    /// Generate a report document
    Report {
        /// Output format (default from config)
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Sections to include, comma separated (default from config)
        #[arg(long, value_enum, value_delimiter = ',')]
        sections: Option<Vec<Section>>,

        /// Comparison year for the year comparison section
        #[arg(long)]
        compare_year: Option<i32>,
    },

    /// Show or change the annual savings target
    Target {
        #[command(subcommand)]
        action: TargetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TargetCommand {
    /// Show the saved target
    Show,

    /// Save a new target
    Set {
        /// Target reduction in USD versus last year's spending
        amount: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Overview,
    MonthlyTrends,
    UtilityBreakdown,
    BudgetAnalysis,
    SavingsProgress,
    Anomalies,
    Predictions,
    YearComparison,
}

/// Z-score thresholds must be positive and finite
fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(format!("threshold must be a positive number, got {}", value))
    }
}

fn section_options(sections: &[Section]) -> ReportOptions {
    let mut options = ReportOptions::none();
    for section in sections {
        match section {
            Section::Overview => options.overview = true,
            Section::MonthlyTrends => options.monthly_trends = true,
            Section::UtilityBreakdown => options.utility_breakdown = true,
            Section::BudgetAnalysis => options.budget_analysis = true,
            Section::SavingsProgress => options.savings_progress = true,
            Section::Anomalies => options.anomalies = true,
            Section::Predictions => options.predictions = true,
            Section::YearComparison => options.year_comparison = true,
        }
    }
    options
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "bill_analytics=debug"
    } else {
        "bill_analytics=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let config = Config::from_file(&file_config, args.api_url.clone(), args.data_dir.clone())
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;
    info!(store = %config.store, "using bill store");

    let store = match &config.store {
        StoreSource::Api(url) => AnyStore::Http(HttpStore::new(url.clone())),
        StoreSource::Directory(dir) => AnyStore::File(FileStore::new(dir.clone())),
    };

    let now = Local::now().naive_local();
    let mut params = AnalysisParams::new(args.year.unwrap_or(now.year()), now.date());
    params.utility = UtilityFilter::parse(&args.utility);
    params.model = config.prediction_model;
    params.z_threshold = config.z_threshold;
    params.forecast_months = config.forecast_months;

    handle_command(args.command, &store, &config, params, now).await
}

/// Dispatch a subcommand
async fn handle_command(
    command: Command,
    store: &AnyStore,
    config: &Config,
    mut params: AnalysisParams,
    now: NaiveDateTime,
) -> Result<()> {
    match command {
        Command::Target { action } => handle_target_command(action, store).await,

        Command::Summary {
            compare_year,
            model,
        } => {
            let snapshot = Snapshot::load(store).await;
            params.comparison_year = compare_year;
            if let Some(model) = model {
                params.model = model;
            }

            let years: Vec<String> = available_years(&snapshot.bills)
                .iter()
                .map(|y| y.to_string())
                .collect();
            let types: Vec<String> = utility_types(&snapshot.bills)
                .iter()
                .map(|t| t.to_string())
                .collect();
            if !years.is_empty() {
                println!("Years with bills: {}", years.join(", "));
                println!("Utility types:    {}", types.join(", "));
            }

            let analytics = compute_analytics(
                &snapshot.bills,
                &snapshot.budgets,
                snapshot.target.as_ref(),
                &params,
            );
            summary::print_summary(&analytics, &params);
            Ok(())
        }

        Command::Anomalies { threshold } => {
            let snapshot = Snapshot::load(store).await;
            if let Some(threshold) = threshold {
                params.z_threshold = threshold;
            }
            let analytics = compute_analytics(
                &snapshot.bills,
                &snapshot.budgets,
                snapshot.target.as_ref(),
                &params,
            );

            if analytics.anomalies.is_empty() {
                println!(
                    "No anomalies in {} bill(s) at z > {}.",
                    analytics.bill_count, params.z_threshold
                );
            } else {
                println!("{}", summary::anomaly_table(&analytics.anomalies));
                println!("\n{} anomaly(ies) found", analytics.anomalies.len());
            }
            Ok(())
        }

        Command::Forecast { months } => {
            let snapshot = Snapshot::load(store).await;
            if let Some(months) = months {
                params.forecast_months = months as usize;
            }
            let analytics = compute_analytics(
                &snapshot.bills,
                &snapshot.budgets,
                snapshot.target.as_ref(),
                &params,
            );

            if analytics.forecast.is_empty() {
                println!(
                    "Not enough bills to forecast ({} found, {} needed).",
                    analytics.bill_count,
                    constants::MIN_BILLS_FOR_STATISTICS
                );
            } else {
                println!("{}", summary::forecast_table(&analytics.forecast));
            }
            Ok(())
        }

        Command::Report {
            format,
            output,
            sections,
            compare_year,
        } => {
            let snapshot = Snapshot::load(store).await;
            params.comparison_year = compare_year;
            let format = format.unwrap_or(config.report_format);
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            let options = sections
                .as_deref()
                .map(section_options)
                .unwrap_or(config.report_sections);

            let files = report::generate_report(
                &snapshot.bills,
                &snapshot.budgets,
                snapshot.target.as_ref(),
                &params,
                &options,
                format,
                now,
            )?;
            let written = report::save(&files, &output_dir)?;

            if format == ReportFormat::Csv {
                let ledger = output_dir.join(constants::BILL_LEDGER_FILENAME);
                bills::export_to_csv(&params.select(&snapshot.bills), &ledger)
                    .with_context(|| format!("Failed to write {}", ledger.display()))?;
                println!("  {}", ledger.display());
            }
            for path in &written {
                println!("  {}", path.display());
            }
            println!("\n{} report written to {}", format, output_dir.display());
            Ok(())
        }
    }
}

/// Handle savings target subcommands
async fn handle_target_command(action: TargetCommand, store: &AnyStore) -> Result<()> {
    match action {
        TargetCommand::Show => {
            match store.fetch_savings_target().await? {
                Some(target) if target.is_configured() => {
                    println!("Savings target: ${:.2}", target.amount)
                }
                _ => println!("No savings target set."),
            }
            Ok(())
        }

        TargetCommand::Set { amount } => {
            anyhow::ensure!(
                amount.is_finite() && amount >= 0.0,
                "Savings target must be a non-negative amount, got {}",
                amount
            );
            store.save_savings_target(&SavingsTarget { amount }).await?;
            println!("Savings target set to ${:.2}", amount);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("bill-analytics").chain(args.iter().copied()))
    }

    #[test]
    fn test_forecast_months_flag_bounds() {
        for months in ["3", "12", "24"] {
            let args = parse(&["forecast", "--months", months]).unwrap();
            assert!(matches!(args.command, Command::Forecast { months: Some(_) }));
        }
        for months in ["0", "2", "25", "4000000"] {
            assert!(parse(&["forecast", "--months", months]).is_err());
        }
    }

    #[test]
    fn test_threshold_flag_must_be_positive() {
        let args = parse(&["anomalies", "--threshold", "1.5"]).unwrap();
        assert!(matches!(args.command, Command::Anomalies { threshold: Some(t) } if t == 1.5));
        for threshold in ["0", "-2", "NaN", "high"] {
            assert!(parse(&["anomalies", "--threshold", threshold]).is_err());
        }
    }

    #[test]
    fn test_store_flags_conflict() {
        assert!(parse(&["--api-url", "http://api", "--data-dir", "data", "summary"]).is_err());
    }

    #[test]
    fn test_section_options_from_flag() {
        let args = parse(&["report", "--sections", "overview,anomalies,year-comparison"]).unwrap();
        let Command::Report { sections: Some(sections), .. } = args.command else {
            panic!("expected report sections");
        };
        let options = section_options(&sections);
        assert!(options.overview);
        assert!(options.anomalies);
        assert!(options.year_comparison);
        assert!(!options.monthly_trends);
        assert!(!options.budget_analysis);
        assert!(!options.predictions);

        assert_eq!(section_options(&[]), ReportOptions::none());
    }
}
