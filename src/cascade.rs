//! Dependent pickers for the edit form.
//!
//! The form picks a pathway, then a phase of that pathway, then a task of
//! that (pathway, phase). Each level's options are recomputed from the level
//! above, so a choice carried over from an earlier state may no longer be
//! valid; such choices are clamped to the first option instead of failing.
//!
//! Per level, the selection comes from (highest first):
//! 1. the explicit form choice
//! 2. the pending edit target, when every level above agrees with it
//! 3. the first option

use serde::{Deserialize, Serialize};

use crate::models::{Table, TaskKey};

/// One picker: its options and the resolved selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chooser {
    pub options: Vec<String>,
    /// Index into `options`; `None` only when there are no options
    pub selected: Option<usize>,
    /// Whether a requested selection was missing and replaced by the first option
    pub clamped: bool,
}

impl Chooser {
    /// Resolve a picker from an explicit choice and a fallback preference.
    pub fn new(options: Vec<String>, explicit: Option<&str>, preferred: Option<&str>) -> Self {
        let requested = explicit.or(preferred);
        let position = requested.and_then(|v| options.iter().position(|o| o == v));
        let selected = match position {
            Some(i) => Some(i),
            None if options.is_empty() => None,
            None => Some(0),
        };
        let clamped = requested.is_some() && position.is_none();
        if clamped {
            tracing::debug!(?requested, "stale picker selection clamped to first option");
        }
        Self {
            options,
            selected,
            clamped,
        }
    }

    /// Select by position; an index past the end falls back to the first option.
    pub fn select_index(&mut self, index: usize) {
        if index < self.options.len() {
            self.selected = Some(index);
            self.clamped = false;
        } else {
            self.selected = if self.options.is_empty() { None } else { Some(0) };
            self.clamped = true;
        }
    }

    /// The selected option's text.
    pub fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }
}

/// Choices currently held by the edit form, any of which may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormChoice {
    #[serde(default)]
    pub pathway: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
}

impl FormChoice {
    pub fn new(pathway: Option<String>, phase: Option<String>, task: Option<String>) -> Self {
        Self {
            pathway,
            phase,
            task,
        }
    }
}

/// The three resolved pickers of the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cascade {
    pub pathway: Chooser,
    pub phase: Chooser,
    pub task: Chooser,
}

impl Cascade {
    /// Resolve all three pickers against the current table.
    pub fn resolve(table: &Table, form: &FormChoice, pending: Option<&TaskKey>) -> Self {
        let pathway = Chooser::new(
            table.pathways(),
            form.pathway.as_deref(),
            pending.map(|k| k.pathway.as_str()),
        );

        // The pending target only steers a level whose parents match it
        let pending = pending.filter(|k| pathway.value() == Some(k.pathway.as_str()));
        let phases = pathway
            .value()
            .map(|p| table.phases_in(p))
            .unwrap_or_default();
        let phase = Chooser::new(
            phases,
            form.phase.as_deref(),
            pending.map(|k| k.phase.as_str()),
        );

        let pending = pending.filter(|k| phase.value() == Some(k.phase.as_str()));
        let tasks = match (pathway.value(), phase.value()) {
            (Some(p), Some(f)) => table.tasks_in(p, f),
            _ => Vec::new(),
        };
        let task = Chooser::new(tasks, form.task.as_deref(), pending.map(|k| k.task.as_str()));

        Self {
            pathway,
            phase,
            task,
        }
    }

    /// The selected triple, if every picker has a selection.
    pub fn selection(&self) -> Option<TaskKey> {
        Some(TaskKey::new(
            self.pathway.value()?,
            self.phase.value()?,
            self.task.value()?,
        ))
    }

    /// Whether any level had to fall back to its first option.
    pub fn clamped(&self) -> bool {
        self.pathway.clamped || self.phase.clamped || self.task.clamped
    }
}
