//! Data models for care pathway tracking.
//!
//! This module defines the core data structures:
//! - `TaskStatus` - Workflow status of a task record
//! - `Locale` - Column header and status label localization of a sheet
//! - `TaskRecord` - One row of the tracking table
//! - `TaskKey` - The (pathway, phase, task) triple identifying a record
//! - `Table` - The whole in-memory dataset (see [`table`])

pub mod table;

pub use table::{Column, Table};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Task status in the workflow.
///
/// Status text that matches none of the known labels is kept verbatim in
/// `Other` so it survives a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    /// Continuous action with no end state
    Ongoing,
    Other(String),
}

impl TaskStatus {
    /// The four statuses a user can assign.
    pub const ASSIGNABLE: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Ongoing,
    ];

    /// Parse a status from a label in any locale, case-insensitive.
    ///
    /// Unknown text becomes `Other` with the input preserved.
    pub fn parse(s: &str) -> Self {
        Self::parse_known(s).unwrap_or_else(|| TaskStatus::Other(s.to_string()))
    }

    /// Parse one of the four known statuses, or `None`.
    ///
    /// Accepts the display labels of every locale as well as the
    /// `snake_case` / `kebab-case` forms used on the command line.
    pub fn parse_known(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "pending" | "pendente" => Some(TaskStatus::Pending),
            "in progress" | "em andamento" => Some(TaskStatus::InProgress),
            "done" | "concluído" | "concluido" => Some(TaskStatus::Done),
            "ongoing" | "ação contínua" | "acao continua" => Some(TaskStatus::Ongoing),
            _ => None,
        }
    }

    /// Canonical (English) label.
    pub fn as_str(&self) -> &str {
        self.label(Locale::En)
    }

    /// Label of this status in the given locale.
    pub fn label(&self, locale: Locale) -> &str {
        match (self, locale) {
            (TaskStatus::Pending, Locale::En) => "Pending",
            (TaskStatus::InProgress, Locale::En) => "In Progress",
            (TaskStatus::Done, Locale::En) => "Done",
            (TaskStatus::Ongoing, Locale::En) => "Ongoing",
            (TaskStatus::Pending, Locale::Pt) => "Pendente",
            (TaskStatus::InProgress, Locale::Pt) => "Em andamento",
            (TaskStatus::Done, Locale::Pt) => "Concluído",
            (TaskStatus::Ongoing, Locale::Pt) => "Ação Contínua",
            (TaskStatus::Other(raw), _) => raw,
        }
    }

    /// Whether this status counts toward completion (Done or Ongoing).
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Ongoing)
    }

    /// Whether this status is, or mentions, the continuous-action status.
    pub fn is_ongoing(&self) -> bool {
        match self {
            TaskStatus::Ongoing => true,
            TaskStatus::Other(raw) => {
                let lower = raw.to_lowercase();
                Locale::ALL
                    .iter()
                    .any(|l| lower.contains(&TaskStatus::Ongoing.label(*l).to_lowercase()))
            }
            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    /// Strict parse: only the four assignable statuses are accepted.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_known(s).ok_or_else(|| {
            format!(
                "Unknown status: {} (expected one of: pending, in-progress, done, ongoing)",
                s
            )
        })
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TaskStatus::parse(&s))
    }
}

/// Localization of a sheet's column headers and status labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    /// Portuguese headers and labels
    Pt,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Pt];

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Locale::En),
            "pt" | "pt-br" | "portuguese" => Some(Locale::Pt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
        }
    }

    /// Header text of a required column in this locale.
    pub fn header(&self, field: Field) -> &'static str {
        match (self, field) {
            (Locale::En, Field::Pathway) => "pathway",
            (Locale::En, Field::Phase) => "phase",
            (Locale::En, Field::Task) => "task",
            (Locale::En, Field::Status) => "status",
            (Locale::En, Field::Note) => "note",
            (Locale::Pt, Field::Pathway) => "Linha de Cuidado",
            (Locale::Pt, Field::Phase) => "Fase",
            (Locale::Pt, Field::Task) => "Tarefa",
            (Locale::Pt, Field::Status) => "Status",
            (Locale::Pt, Field::Note) => "Observações",
        }
    }

    /// All five headers in canonical column order.
    pub fn headers(&self) -> Vec<String> {
        Field::ALL.iter().map(|f| self.header(*f).to_string()).collect()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five required columns of a tracking sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Pathway,
    Phase,
    Task,
    Status,
    Note,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Pathway,
        Field::Phase,
        Field::Task,
        Field::Status,
        Field::Note,
    ];

    /// Match a header cell against every locale's name for this field.
    ///
    /// Returns the locale whose header matched, if any.
    pub fn matches_header(&self, header: &str) -> Option<Locale> {
        let header = header.trim().to_lowercase();
        Locale::ALL
            .into_iter()
            .find(|l| l.header(*self).to_lowercase() == header)
    }
}

/// The (pathway, phase, task) triple that identifies a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub pathway: String,
    pub phase: String,
    pub task: String,
}

impl TaskKey {
    pub fn new(
        pathway: impl Into<String>,
        phase: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        Self {
            pathway: pathway.into(),
            phase: phase.into(),
            task: task.into(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.pathway, self.phase, self.task)
    }
}

/// A single row of the tracking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Care pathway this task belongs to
    pub pathway: String,

    /// Stage within the pathway
    pub phase: String,

    /// Unit of work within the phase
    pub task: String,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Free-text observations; cleared when the task is marked done
    #[serde(default)]
    pub note: String,

    /// Cells of non-required columns, in the table's extra-column order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,

    /// Status cell exactly as read from the sheet. Written back verbatim
    /// while it still parses to `status`.
    #[serde(skip)]
    pub status_cell: Option<String>,
}

impl TaskRecord {
    /// Create a pending record with an empty note.
    pub fn new(
        pathway: impl Into<String>,
        phase: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        Self {
            pathway: pathway.into(),
            phase: phase.into(),
            task: task.into(),
            status: TaskStatus::default(),
            note: String::new(),
            extra: Vec::new(),
            status_cell: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self.status_cell = None;
        self
    }

    /// Set a new status, dropping the original cell text.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.status_cell = None;
    }

    /// Status text to write in a sheet of the given locale.
    ///
    /// The original cell is kept unless the status changed since load.
    pub fn status_text(&self, locale: Locale) -> &str {
        match &self.status_cell {
            Some(raw) if TaskStatus::parse(raw) == self.status => raw,
            _ => self.status.label(locale),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(&self.pathway, &self.phase, &self.task)
    }

    pub fn matches(&self, key: &TaskKey) -> bool {
        self.pathway == key.pathway && self.phase == key.phase && self.task == key.task
    }
}
