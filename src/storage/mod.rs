//! Storage layer for the tracking sheet.
//!
//! A [`TableStore`] owns the path of the backing file and the session's
//! cached [`Table`]. The file is read once, on first access. Changes are
//! made on a copy and handed to [`TableStore::commit`], which rewrites the
//! file completely before replacing the cache.
//!
//! ## Sheet Backends
//!
//! - **xlsx** (default): first worksheet of an Excel workbook
//! - **csv**: UTF-8 comma-separated text
//!
//! Saves go through a temporary file in the same directory that is then
//! renamed over the target, so a failed encode leaves the old file intact.

pub mod backend;
pub mod csv;
pub mod xlsx;

pub use self::backend::{TableBackend, TableFormat};
pub use self::csv::CsvBackend;
pub use self::xlsx::XlsxBackend;

use crate::models::{Locale, Table};
use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default backing file name, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "dashacompanhamento_formatado.xlsx";

/// Session-scoped store for one tracking sheet.
pub struct TableStore {
    path: PathBuf,
    backend: Box<dyn TableBackend>,
    table: Option<Table>,
}

impl TableStore {
    /// Open a store for the given file. Nothing is read until [`load`](Self::load).
    pub fn open(path: &Path) -> Result<Self> {
        let backend = TableFormat::from_path(path)?.backend();
        Ok(Self {
            path: path.to_path_buf(),
            backend,
            table: None,
        })
    }

    /// Create a header-only sheet and open a store over it.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn init(path: &Path, locale: Locale, force: bool) -> Result<Self> {
        let mut store = Self::open(path)?;
        if path.exists() && !force {
            return Err(Error::AlreadyExists(path.display().to_string()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        store.commit(Table::new(locale))?;
        tracing::info!(path = %path.display(), %locale, "initialized tracking sheet");
        Ok(store)
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> TableFormat {
        self.backend.format()
    }

    /// Whether the table has been read from disk yet.
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Read the sheet on first call; later calls return the cached table.
    pub fn load(&mut self) -> Result<&Table> {
        if self.table.is_none() {
            let table = self.read()?;
            self.table = Some(table);
        }
        self.table
            .as_ref()
            .ok_or_else(|| Error::Malformed("table cache is empty".to_string()))
    }

    fn read(&self) -> Result<Table> {
        let bytes = fs::read(&self.path)?;
        let rows = self.backend.decode(&bytes)?;
        let table = Table::from_rows(rows)?;
        tracing::info!(
            path = %self.path.display(),
            records = table.len(),
            locale = %table.locale(),
            "loaded tracking sheet"
        );
        Ok(table)
    }

    /// Overwrite the backing file with `table`, then make it the cached table.
    ///
    /// On failure the cache keeps the last table that reached disk.
    pub fn commit(&mut self, table: Table) -> Result<()> {
        self.write(&table)?;
        self.table = Some(table);
        Ok(())
    }

    fn write(&self, table: &Table) -> Result<()> {
        let bytes = self.backend.encode(&table.to_rows())?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::info!(path = %self.path.display(), records = table.len(), "saved tracking sheet");
        Ok(())
    }
}
