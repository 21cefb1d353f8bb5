//! Sheet backend trait and format selection.
//!
//! This module provides the file formats a tracking sheet can live in:
//! - `XlsxBackend` - Excel workbook, first worksheet (default)
//! - `CsvBackend` - UTF-8 comma-separated text

use crate::{Error, Result};
use std::path::Path;

use super::csv::CsvBackend;
use super::xlsx::XlsxBackend;

/// Trait for backends that convert a whole sheet to and from bytes.
///
/// Rows are raw cell text; the first row is the header row. Backends never
/// touch the filesystem, the store owns all file I/O.
pub trait TableBackend: Send + Sync {
    /// Decode a complete file into rows of cells.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>>;

    /// Encode rows of cells into a complete file.
    fn encode(&self, rows: &[Vec<String>]) -> Result<Vec<u8>>;

    /// Get the backend format.
    fn format(&self) -> TableFormat;
}

/// Available sheet formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Excel workbook (.xlsx)
    Xlsx,
    /// Comma-separated values (.csv)
    Csv,
}

impl TableFormat {
    /// Pick a format from a file extension, case-insensitive.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Instantiate the backend for this format.
    pub fn backend(&self) -> Box<dyn TableBackend> {
        match self {
            Self::Xlsx => Box::new(XlsxBackend),
            Self::Csv => Box::new(CsvBackend),
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
