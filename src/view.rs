//! Filtered browse view.
//!
//! Three independent multi-select filters over pathway, phase and status.
//! A record is shown when it passes all three; within one filter, any
//! selected value matches. An unset filter means "every value present".

use serde::{Deserialize, Serialize};

use crate::models::{Table, TaskKey, TaskRecord, TaskStatus};

/// Current selections of the three browse filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// `None` selects every pathway in the table
    #[serde(default)]
    pub pathways: Option<Vec<String>>,
    #[serde(default)]
    pub phases: Option<Vec<String>>,
    #[serde(default)]
    pub statuses: Option<Vec<TaskStatus>>,
}

impl FilterSelection {
    /// Selection that passes every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from CLI-style lists, where an empty list means "all".
    pub fn from_lists(pathways: Vec<String>, phases: Vec<String>, statuses: Vec<TaskStatus>) -> Self {
        fn some_if_any<T>(v: Vec<T>) -> Option<Vec<T>> {
            if v.is_empty() { None } else { Some(v) }
        }
        Self {
            pathways: some_if_any(pathways),
            phases: some_if_any(phases),
            statuses: some_if_any(statuses),
        }
    }

    pub fn matches(&self, record: &TaskRecord) -> bool {
        self.pathways
            .as_ref()
            .is_none_or(|s| s.contains(&record.pathway))
            && self
                .phases
                .as_ref()
                .is_none_or(|s| s.contains(&record.phase))
            && self
                .statuses
                .as_ref()
                .is_none_or(|s| s.contains(&record.status))
    }

    /// Selected pathways in selection order, resolving "all" against the table.
    pub fn selected_pathways(&self, table: &Table) -> Vec<String> {
        match &self.pathways {
            Some(selected) => selected.clone(),
            None => table.pathways(),
        }
    }
}

/// Values each filter can choose from, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub pathways: Vec<String>,
    pub phases: Vec<String>,
    pub statuses: Vec<TaskStatus>,
    /// `statuses` in the sheet's language, index for index
    pub status_labels: Vec<String>,
}

impl FilterOptions {
    pub fn from_table(table: &Table) -> Self {
        let statuses = table.statuses();
        let status_labels = statuses
            .iter()
            .map(|s| s.label(table.locale()).to_string())
            .collect();
        Self {
            pathways: table.pathways(),
            phases: table.phases(),
            statuses,
            status_labels,
        }
    }
}

/// One browsable row: a record and its position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseRow {
    pub index: usize,
    #[serde(flatten)]
    pub record: TaskRecord,
    pub status_label: String,
}

impl BrowseRow {
    /// Triple to hand to the edit form when this row is picked.
    pub fn edit_target(&self) -> TaskKey {
        self.record.key()
    }
}

/// Records passing the filters, in table order.
pub fn filter_records<'a>(table: &'a Table, selection: &FilterSelection) -> Vec<&'a TaskRecord> {
    table
        .records()
        .iter()
        .filter(|r| selection.matches(r))
        .collect()
}

/// Browse rows passing the filters, in table order.
pub fn browse(table: &Table, selection: &FilterSelection) -> Vec<BrowseRow> {
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| selection.matches(r))
        .map(|(index, record)| BrowseRow {
            index,
            record: record.clone(),
            status_label: record.status.label(table.locale()).to_string(),
        })
        .collect()
}
