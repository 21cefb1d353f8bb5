//! Dashboard session: one store, one user's state, explicit events.
//!
//! Every interaction is an [`Event`] passed to [`Dashboard::dispatch`],
//! which runs to completion before the next one. The page is then rebuilt
//! from current state with [`Dashboard::view`]; nothing else is cached.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::cascade::{Cascade, FormChoice};
use crate::models::{Locale, TaskKey, TaskStatus};
use crate::report::{self, DEFAULT_EXPORT_FILENAME, Summary};
use crate::storage::TableStore;
use crate::transactions::{self, AppendOutcome, EditOutcome};
use crate::view::{self, BrowseRow, FilterOptions, FilterSelection};

/// State carried between interactions of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Row picked from the browse list, pre-selected in the edit form
    pub pending_edit: Option<TaskKey>,
    pub filters: FilterSelection,
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Edit {
        key: TaskKey,
        status: TaskStatus,
        #[serde(default)]
        note: Option<String>,
    },
    AppendPathway {
        name: String,
    },
    SelectForEdit {
        key: TaskKey,
    },
    SetFilters {
        filters: FilterSelection,
    },
}

/// What an event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum EventOutcome {
    Edited(EditOutcome),
    Appended(AppendOutcome),
    EditTargetSet(TaskKey),
    FiltersSet,
}

/// Everything the page shows, recomputed from current state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub record_count: usize,
    pub locale: Locale,
    pub cascade: Cascade,
    /// Assignable statuses, labelled as the sheet writes them
    pub status_options: Vec<String>,
    pub pending_edit: Option<TaskKey>,
    pub filter_options: FilterOptions,
    pub filters: FilterSelection,
    pub rows: Vec<BrowseRow>,
    pub summary: Summary,
    pub export_filename: String,
}

/// A dashboard over one tracking sheet.
pub struct Dashboard {
    store: TableStore,
    state: SessionState,
    export_filename: String,
}

impl Dashboard {
    /// Load the sheet and start a fresh session. Fails if the sheet cannot be read.
    pub fn open(mut store: TableStore) -> Result<Self> {
        store.load()?;
        Ok(Self {
            store,
            state: SessionState::default(),
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        })
    }

    pub fn with_export_filename(mut self, filename: impl Into<String>) -> Self {
        self.export_filename = filename.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn export_filename(&self) -> &str {
        &self.export_filename
    }

    /// Apply one interaction.
    pub fn dispatch(&mut self, event: Event) -> Result<EventOutcome> {
        tracing::debug!(?event, "dispatching dashboard event");
        match event {
            Event::Edit { key, status, note } => {
                let outcome =
                    transactions::edit_status(&mut self.store, &key, status, note.as_deref())?;
                Ok(EventOutcome::Edited(outcome))
            }
            Event::AppendPathway { name } => {
                let outcome = transactions::append_pathway(&mut self.store, &name)?;
                Ok(EventOutcome::Appended(outcome))
            }
            Event::SelectForEdit { key } => {
                self.state.pending_edit = Some(key.clone());
                Ok(EventOutcome::EditTargetSet(key))
            }
            Event::SetFilters { filters } => {
                self.state.filters = filters;
                Ok(EventOutcome::FiltersSet)
            }
        }
    }

    /// Build the page for the given edit-form choices.
    pub fn view(&mut self, form: &FormChoice) -> Result<DashboardView> {
        let table = self.store.load()?;
        let locale = table.locale();
        Ok(DashboardView {
            record_count: table.len(),
            locale,
            cascade: Cascade::resolve(table, form, self.state.pending_edit.as_ref()),
            status_options: TaskStatus::ASSIGNABLE
                .iter()
                .map(|s| s.label(locale).to_string())
                .collect(),
            pending_edit: self.state.pending_edit.clone(),
            filter_options: FilterOptions::from_table(table),
            filters: self.state.filters.clone(),
            rows: view::browse(table, &self.state.filters),
            summary: Summary::compute(table, &self.state.filters),
            export_filename: self.export_filename.clone(),
        })
    }

    /// CSV of the currently filtered rows.
    pub fn export(&mut self) -> Result<Vec<u8>> {
        let table = self.store.load()?;
        let records = view::filter_records(table, &self.state.filters);
        report::export_csv(table, &records)
    }
}
