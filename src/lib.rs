//! Carepath - a tracking dashboard for care pathway tasks.
//!
//! This library provides the core functionality for the `carepath` CLI and
//! its web page: loading the tracking sheet, the dependent edit pickers,
//! status edits, new-pathway creation, filtering, and summary reports.

pub mod cascade;
pub mod cli;
pub mod commands;
pub mod config;
#[cfg(feature = "gui")]
pub mod gui;
pub mod models;
pub mod report;
pub mod session;
pub mod storage;
pub mod transactions;
pub mod view;


/// Library-level error type for Carepath operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Spreadsheet write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file format: {0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("Malformed sheet: {0}")]
    Malformed(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("File already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Carepath operations.
pub type Result<T> = std::result::Result<T, Error>;
