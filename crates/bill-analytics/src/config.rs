//! Configuration for the bill analytics CLI

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::predict::PredictionModel;
use crate::report::{ReportFormat, ReportOptions};

// =============================================================================
// File-based Configuration (analytics.toml)
// =============================================================================

/// Configuration loaded from analytics.toml. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

/// Where bills, budgets and the savings target come from
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Analysis tuning
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub prediction_model: PredictionModel,
    pub z_threshold: f64,
    pub forecast_months: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            prediction_model: PredictionModel::default(),
            z_threshold: constants::DEFAULT_Z_THRESHOLD,
            forecast_months: constants::DEFAULT_FORECAST_MONTHS,
        }
    }
}

/// Report output settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub format: ReportFormat,
    pub sections: ReportOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            format: ReportFormat::default(),
            sections: ReportOptions::default(),
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StoreSource {
    Api(String),
    Directory(PathBuf),
}

impl std::fmt::Display for StoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreSource::Api(url) => write!(f, "{}", url),
            StoreSource::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// Bill store location
    pub store: StoreSource,
    /// Trend model for monthly predictions
    pub prediction_model: PredictionModel,
    /// Z-score threshold for anomalies
    pub z_threshold: f64,
    /// Forecast horizon in months
    pub forecast_months: usize,
    /// Directory reports are written to
    pub output_dir: PathBuf,
    pub report_format: ReportFormat,
    pub report_sections: ReportOptions,
}

impl Config {
    /// Create config from file config and command-line store overrides.
    ///
    /// A store given on the command line wins over the file; an API URL
    /// wins over a data directory. The forecast horizon and z-score
    /// threshold are checked against the same bounds as their CLI flags.
    pub fn from_file(
        file_config: &FileConfig,
        api_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let analysis = &file_config.analysis;
        let min_months = constants::MIN_FORECAST_MONTHS as usize;
        let max_months = constants::MAX_FORECAST_MONTHS as usize;
        ensure!(
            (min_months..=max_months).contains(&analysis.forecast_months),
            "forecast_months must be between {} and {}, got {}",
            min_months,
            max_months,
            analysis.forecast_months
        );
        ensure!(
            analysis.z_threshold.is_finite() && analysis.z_threshold > 0.0,
            "z_threshold must be a positive number, got {}",
            analysis.z_threshold
        );

        let store = match (api_url, data_dir) {
            (Some(url), _) => StoreSource::Api(url),
            (None, Some(dir)) => StoreSource::Directory(dir),
            (None, None) => match (&file_config.store.api_url, &file_config.store.data_dir) {
                (Some(url), _) => StoreSource::Api(url.clone()),
                (None, Some(dir)) => StoreSource::Directory(dir.clone()),
                (None, None) => StoreSource::Directory(PathBuf::from(constants::DEFAULT_DATA_DIR)),
            },
        };

        Ok(Self {
            store,
            prediction_model: analysis.prediction_model,
            z_threshold: analysis.z_threshold,
            forecast_months: analysis.forecast_months,
            output_dir: file_config.report.output_dir.clone(),
            report_format: file_config.report.format,
            report_sections: file_config.report.sections,
        })
    }
}
