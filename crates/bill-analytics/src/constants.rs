//! Centralized constants for the utility bill analytics engine
//!
//! Tunable defaults can be overridden from analytics.toml; the values here
//! are the fallbacks and the fixed document geometry.

// =============================================================================
// Store API Endpoints
// =============================================================================

/// Bills collection endpoint (relative to the API base URL)
pub const BILLS_PATH: &str = "/api/bills";

/// Budget mapping endpoint
pub const BUDGETS_PATH: &str = "/api/budgets";

/// Savings target endpoint (GET and POST)
pub const SAVINGS_TARGET_PATH: &str = "/api/savings-target";

// =============================================================================
// Analysis Defaults
// =============================================================================

/// Budget mapping key that applies to every utility type
pub const ALL_UTILITIES: &str = "all";

/// Default z-score above which a bill is reported as an anomaly
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Default forecast horizon in months
pub const DEFAULT_FORECAST_MONTHS: usize = 12;

/// Shortest forecast horizon accepted by the CLI
pub const MIN_FORECAST_MONTHS: u32 = 3;

/// Longest forecast horizon accepted by the CLI
pub const MAX_FORECAST_MONTHS: u32 = 24;

/// Number of points produced by the trend predictor
pub const PREDICTION_POINTS: usize = 6;

/// Days between successive projected points (approximate month)
pub const DAYS_PER_PROJECTED_MONTH: i64 = 30;

/// Minimum bills needed to fit a trend
pub const MIN_BILLS_FOR_PREDICTION: usize = 2;

/// Minimum bills needed for anomaly detection and forecasting
pub const MIN_BILLS_FOR_STATISTICS: usize = 3;

/// Expected range shown for an anomaly, as a fraction of the mean
pub const EXPECTED_RANGE_LOW: f64 = 0.8;
pub const EXPECTED_RANGE_HIGH: f64 = 1.2;

/// Short month labels, January first
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Quarter labels
pub const QUARTER_LABELS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

// =============================================================================
// PDF Layout (A4, points)
// =============================================================================

pub const PDF_PAGE_WIDTH: f32 = 595.276;
pub const PDF_PAGE_HEIGHT: f32 = 841.89;
pub const PDF_LEFT_MARGIN: f32 = 50.0;
pub const PDF_TOP_MARGIN: f32 = 50.0;
pub const PDF_LINE_HEIGHT: f32 = 20.0;

/// Extra gap after a section heading
pub const PDF_HEADING_GAP: f32 = 10.0;

/// Extra gap after a complete section
pub const PDF_SECTION_GAP: f32 = 20.0;

pub const PDF_TITLE_SIZE: i64 = 24;
pub const PDF_HEADING_SIZE: i64 = 18;
pub const PDF_BODY_SIZE: i64 = 12;

// =============================================================================
// File Names
// =============================================================================

/// Default configuration file
pub const CONFIG_FILENAME: &str = "analytics.toml";

/// Data directory used when neither an API URL nor a directory is given
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default report output directory
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Report base name; the extension follows the format
pub const REPORT_BASENAME: &str = "utility-bill-analysis";

/// Bills in a file-backed store (JSON preferred, CSV accepted)
pub const BILLS_JSON_FILENAME: &str = "bills.json";
pub const BILLS_CSV_FILENAME: &str = "bills.csv";

/// Budget mapping in a file-backed store
pub const BUDGETS_FILENAME: &str = "budgets.json";

/// Savings target in a file-backed store
pub const SAVINGS_TARGET_FILENAME: &str = "savings_target.json";

/// Raw ledger written alongside the CSV report bundle
pub const BILL_LEDGER_FILENAME: &str = "bill_ledger.csv";
