//! Error types for the store and exporter boundaries
//!
//! Analytics themselves never fail; empty or unconfigured inputs yield
//! empty results instead.

use thiserror::Error;

/// Failure talking to the bill/budget/target store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid store data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid bill file: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure rendering or writing a report
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("spreadsheet rendering failed: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
