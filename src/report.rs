//! Progress summaries and CSV export.
//!
//! "Complete" means Done or Ongoing. Percentages are rounded to one decimal.

use serde::Serialize;

use crate::Result;
use crate::models::{Table, TaskRecord, TaskStatus};
use crate::storage::{CsvBackend, TableBackend};
use crate::view::FilterSelection;

/// Default file name offered for the filtered export.
pub const DEFAULT_EXPORT_FILENAME: &str = "tarefas_filtradas.csv";

/// Completion of one pathway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayProgress {
    pub pathway: String,
    pub total: usize,
    pub completed: usize,
    pub percent: f64,
}

/// Share of one status among the counted records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: TaskStatus,
    /// Status text as written in the sheet
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// The three summaries shown under the browse list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub by_pathway: Vec<PathwayProgress>,
    pub selected: Option<PathwayProgress>,
    pub distribution: Vec<StatusShare>,
}

impl Summary {
    pub fn compute(table: &Table, selection: &FilterSelection) -> Self {
        Self {
            by_pathway: completion_by_pathway(table),
            selected: selected_pathway_completion(table, selection),
            distribution: status_distribution(table),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

fn progress_of<'a>(pathway: &str, records: impl Iterator<Item = &'a TaskRecord>) -> PathwayProgress {
    let (total, completed) = records
        .filter(|r| r.pathway == pathway)
        .fold((0, 0), |(total, completed), r| {
            (total + 1, completed + usize::from(r.status.is_complete()))
        });
    PathwayProgress {
        pathway: pathway.to_string(),
        total,
        completed,
        percent: percent(completed, total),
    }
}

/// Completion ratio of every pathway in the unfiltered table.
pub fn completion_by_pathway(table: &Table) -> Vec<PathwayProgress> {
    table
        .pathways()
        .iter()
        .map(|p| progress_of(p, table.records().iter()))
        .collect()
}

/// Completion of a single pathway; 0% when it has no records.
pub fn pathway_completion(table: &Table, pathway: &str) -> PathwayProgress {
    progress_of(pathway, table.records().iter())
}

/// Completion of the first pathway in the filter selection, if any is selected.
pub fn selected_pathway_completion(
    table: &Table,
    selection: &FilterSelection,
) -> Option<PathwayProgress> {
    selection
        .selected_pathways(table)
        .first()
        .map(|p| pathway_completion(table, p))
}

/// Share of each status in the unfiltered table, leaving out every record
/// whose status mentions the continuous-action status.
///
/// Excluded records count in neither numerator nor denominator, so the
/// result may be empty. Cells that parse to the same status share one
/// bucket, labelled the way the sheet's locale spells it.
pub fn status_distribution(table: &Table) -> Vec<StatusShare> {
    let counted: Vec<&TaskRecord> = table
        .records()
        .iter()
        .filter(|r| !r.status.is_ongoing())
        .collect();

    let mut shares: Vec<StatusShare> = Vec::new();
    for record in &counted {
        match shares.iter_mut().find(|s| s.status == record.status) {
            Some(share) => share.count += 1,
            None => shares.push(StatusShare {
                status: record.status.clone(),
                label: record.status.label(table.locale()).to_string(),
                count: 1,
                percent: 0.0,
            }),
        }
    }
    for share in &mut shares {
        share.percent = percent(share.count, counted.len());
    }
    shares
}

/// Render filtered records as CSV with the table's own header row.
pub fn export_csv(table: &Table, records: &[&TaskRecord]) -> Result<Vec<u8>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(table.headers().to_vec());
    rows.extend(records.iter().map(|r| table.row_cells(r)));
    CsvBackend.encode(&rows)
}
