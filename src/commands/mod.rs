//! Command implementations for Carepath CLI.
//!
//! This module contains the business logic for each CLI command:
//! - `init` - Create an empty tracking sheet
//! - `options` - Resolve the edit form pickers
//! - `edit` / `add_pathway` - Write transactions
//! - `list` / `report` / `export` - Filtered reads
//! - `config_show` - Effective configuration

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cascade::{Cascade, FormChoice};
use crate::config::ResolvedConfig;
use crate::models::{Locale, TaskKey, TaskStatus};
use crate::report::{self, Summary};
use crate::storage::TableStore;
use crate::transactions::{self, AppendOutcome, EditOutcome};
use crate::view::{self, BrowseRow, FilterSelection};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Open the sheet and load it, so missing files and bad headers fail early.
fn open_loaded(path: &Path) -> Result<TableStore> {
    let mut store = TableStore::open(path)?;
    store.load()?;
    Ok(store)
}

/// Parse status filter values. Unknown labels are kept verbatim so
/// free-text statuses in the sheet can still be selected.
fn parse_filter_statuses(values: &[String]) -> Vec<TaskStatus> {
    values.iter().map(|v| TaskStatus::parse(v)).collect()
}

/// Build a filter selection from repeatable CLI flags.
pub fn filter_selection(
    pathways: &[String],
    phases: &[String],
    statuses: &[String],
) -> FilterSelection {
    FilterSelection::from_lists(
        pathways.to_vec(),
        phases.to_vec(),
        parse_filter_statuses(statuses),
    )
}

// === Init ===

#[derive(Serialize)]
pub struct InitResult {
    pub path: String,
    pub format: String,
    pub locale: Locale,
    pub headers: Vec<String>,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Created {} sheet at {}\nColumns: {}",
            self.format,
            self.path,
            self.headers.join(", ")
        )
    }
}

/// Create an empty tracking sheet.
pub fn init(path: &Path, locale: Locale, force: bool) -> Result<InitResult> {
    let mut store = TableStore::init(path, locale, force)?;
    let headers = store.load()?.headers().to_vec();
    Ok(InitResult {
        path: path.display().to_string(),
        format: store.format().to_string(),
        locale,
        headers,
    })
}

// === Options ===

#[derive(Serialize)]
pub struct OptionsResult {
    pub cascade: Cascade,
    pub selection: Option<TaskKey>,
    pub clamped: bool,
}

impl Output for OptionsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        let levels = [
            ("Pathway", &self.cascade.pathway),
            ("Phase", &self.cascade.phase),
            ("Task", &self.cascade.task),
        ];
        for (name, chooser) in levels {
            let _ = writeln!(out, "{}:", name);
            if chooser.options.is_empty() {
                let _ = writeln!(out, "  (none)");
            }
            for (i, option) in chooser.options.iter().enumerate() {
                let marker = if chooser.selected == Some(i) { "*" } else { " " };
                let _ = writeln!(out, "  {} {}", marker, option);
            }
        }
        match &self.selection {
            Some(key) => {
                let _ = write!(out, "Selected: {}", key);
            }
            None => {
                let _ = write!(out, "Selected: (nothing to edit)");
            }
        }
        if self.clamped {
            out.push_str("\n(unknown choices were replaced by the first option)");
        }
        out
    }
}

/// Resolve the three edit pickers for the given choices.
pub fn options(path: &Path, form: &FormChoice) -> Result<OptionsResult> {
    let mut store = open_loaded(path)?;
    let cascade = Cascade::resolve(store.load()?, form, None);
    Ok(OptionsResult {
        selection: cascade.selection(),
        clamped: cascade.clamped(),
        cascade,
    })
}

// === Edit ===

#[derive(Serialize)]
#[serde(transparent)]
pub struct EditResult(pub EditOutcome);

impl Output for EditResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.0 {
            EditOutcome::Updated { key, matched: 1 } => format!("Updated {}", key),
            EditOutcome::Updated { key, matched } => {
                format!("Updated {} ({} records share this task)", key, matched)
            }
            EditOutcome::NoMatch { key } => format!("No task matches {}; nothing changed", key),
        }
    }
}

/// Set status and note of one task. The status must be one of the four
/// assignable values, in English or Portuguese.
pub fn edit(path: &Path, key: &TaskKey, status: &str, note: Option<&str>) -> Result<EditResult> {
    let status: TaskStatus = status.parse().map_err(Error::InvalidInput)?;
    let mut store = open_loaded(path)?;
    transactions::edit_status(&mut store, key, status, note).map(EditResult)
}

// === Add Pathway ===

#[derive(Serialize)]
#[serde(transparent)]
pub struct AddPathwayResult(pub AppendOutcome);

impl Output for AddPathwayResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.0 {
            AppendOutcome::Appended { pathway, added } => {
                format!("Added pathway {} with {} pending tasks", pathway, added)
            }
            AppendOutcome::EmptyName => "Pathway name is empty; nothing changed".to_string(),
        }
    }
}

/// Add a pathway cloned from the sheet's phase/task pairs.
pub fn add_pathway(path: &Path, name: &str) -> Result<AddPathwayResult> {
    let mut store = open_loaded(path)?;
    transactions::append_pathway(&mut store, name).map(AddPathwayResult)
}

// === List ===

#[derive(Serialize)]
pub struct ListResult {
    pub count: usize,
    #[serde(skip)]
    pub locale: Locale,
    pub rows: Vec<BrowseRow>,
}

impl Output for ListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.rows.is_empty() {
            return "No tasks match the filters.".to_string();
        }
        let mut out = format!("{} task(s):\n", self.count);
        for row in &self.rows {
            let r = &row.record;
            let _ = write!(
                out,
                "\n  [{}] {} / {} / {}  {}",
                row.index,
                r.pathway,
                r.phase,
                r.task,
                r.status.label(self.locale)
            );
            if !r.note.is_empty() {
                let _ = write!(out, "  ({})", r.note);
            }
        }
        out
    }
}

/// List tasks passing the filters, in sheet order.
pub fn list(path: &Path, selection: &FilterSelection) -> Result<ListResult> {
    let mut store = open_loaded(path)?;
    let table = store.load()?;
    let rows = view::browse(table, selection);
    Ok(ListResult {
        count: rows.len(),
        locale: table.locale(),
        rows,
    })
}

// === Report ===

#[derive(Serialize)]
pub struct ReportResult {
    pub record_count: usize,
    #[serde(flatten)]
    pub summary: Summary,
}

impl Output for ReportResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!("{} task(s)\n\nCompletion by pathway:", self.record_count);
        if self.summary.by_pathway.is_empty() {
            out.push_str("\n  (no pathways)");
        }
        for p in &self.summary.by_pathway {
            let _ = write!(
                out,
                "\n  {:<24} {:>3}/{:<3} {:>5.1}%",
                p.pathway, p.completed, p.total, p.percent
            );
        }
        if let Some(ref p) = self.summary.selected {
            let _ = write!(out, "\n\nSelected pathway: {} {:.1}%", p.pathway, p.percent);
        }
        out.push_str("\n\nStatus distribution:");
        if self.summary.distribution.is_empty() {
            out.push_str("\n  (none)");
        }
        for s in &self.summary.distribution {
            let _ = write!(out, "\n  {:<24} {:>3} {:>5.1}%", s.label, s.count, s.percent);
        }
        out
    }
}

/// Completion and distribution figures. Only the selected-pathway gauge
/// depends on the filters.
pub fn report(path: &Path, selection: &FilterSelection) -> Result<ReportResult> {
    let mut store = open_loaded(path)?;
    let table = store.load()?;
    Ok(ReportResult {
        record_count: table.len(),
        summary: Summary::compute(table, selection),
    })
}

// === Export ===

#[derive(Serialize)]
pub struct ExportResult {
    pub path: String,
    pub rows: usize,
}

impl Output for ExportResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Exported {} task(s) to {}", self.rows, self.path)
    }
}

/// Write the filtered tasks as CSV to `output`.
pub fn export(path: &Path, selection: &FilterSelection, output: &Path) -> Result<ExportResult> {
    let mut store = open_loaded(path)?;
    let table = store.load()?;
    let records = view::filter_records(table, selection);
    let bytes = report::export_csv(table, &records)?;
    std::fs::write(output, bytes)?;
    tracing::info!(output = %output.display(), rows = records.len(), "exported filtered tasks");
    Ok(ExportResult {
        path: output.display().to_string(),
        rows: records.len(),
    })
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct ConfigShowResult {
    pub local_config: String,
    pub entries: Vec<ConfigEntry>,
    #[serde(skip)]
    pub kdl: String,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!("// local config: {}\n", self.local_config);
        out.push_str(self.kdl.trim_end());
        out.push_str("\n\n// sources");
        for entry in &self.entries {
            let _ = write!(out, "\n// {}: {}", entry.key, entry.source);
        }
        out
    }
}

/// Effective settings with the layer each came from.
pub fn config_show(config: &ResolvedConfig, local_config: &Path) -> ConfigShowResult {
    fn entry(key: &str, value: impl ToString, source: impl ToString) -> ConfigEntry {
        ConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
            source: source.to_string(),
        }
    }
    let entries = vec![
        entry(
            "data-file",
            config.data_file.value.display(),
            &config.data_file.source,
        ),
        entry("locale", config.locale.value, &config.locale.source),
        entry(
            "export-filename",
            &config.export_filename.value,
            &config.export_filename.source,
        ),
        entry(
            "output-format",
            &config.output_format.value,
            &config.output_format.source,
        ),
        entry("host", &config.host.value, &config.host.source),
        entry("port", config.port.value, &config.port.source),
    ];
    ConfigShowResult {
        local_config: local_config.display().to_string(),
        entries,
        kdl: config.to_config().to_kdl().to_string(),
    }
}

/// Where `export` writes when no `-o` is given.
pub fn default_export_path(config: &ResolvedConfig) -> PathBuf {
    PathBuf::from(&config.export_filename.value)
}
