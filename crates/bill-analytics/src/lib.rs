//! Utility bill spending analytics
//!
//! Filters, aggregates, trend prediction, anomaly detection, budget and
//! savings analysis, forecasting and report export over bills fetched from
//! an external store.

pub mod aggregate;
pub mod analytics;
pub mod anomaly;
pub mod bills;
pub mod budget;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod predict;
pub mod regression;
pub mod report;
pub mod store;
pub mod summary;

pub use analytics::{compute_analytics, AnalysisParams, Analytics};
pub use bills::{Bill, Budgets, SavingsTarget, UtilityType};
pub use error::{ExportError, StoreError};
pub use filter::UtilityFilter;
pub use predict::PredictionModel;
pub use report::{assemble_report, export, generate_report, ReportData, ReportFormat, ReportOptions};
pub use store::{AnyStore, BillStore, FileStore, HttpStore, Snapshot};
