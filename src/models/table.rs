//! In-memory tracking table.
//!
//! A `Table` keeps the sheet's header row exactly as it was read, the
//! position of each required column, and the records in file order.
//! Columns that are not one of the five required fields are carried along
//! untouched so a load/save cycle never drops data.

use super::{Field, Locale, TaskKey, TaskRecord, TaskStatus};
use crate::{Error, Result};
use std::collections::HashSet;

/// Position of a sheet column in the record model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// One of the five required fields
    Field(Field),
    /// Index into `TaskRecord::extra`
    Extra(usize),
}

/// The full dataset held for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    layout: Vec<Column>,
    locale: Locale,
    records: Vec<TaskRecord>,
}

impl Table {
    /// Create an empty table with the canonical headers of `locale`.
    pub fn new(locale: Locale) -> Self {
        Self {
            headers: locale.headers(),
            layout: Field::ALL.iter().map(|f| Column::Field(*f)).collect(),
            locale,
            records: Vec::new(),
        }
    }

    /// Create a table with canonical headers holding the given records.
    pub fn with_records(locale: Locale, records: Vec<TaskRecord>) -> Self {
        let mut table = Self::new(locale);
        table.records = records;
        table
    }

    /// Build a table from raw rows, the first of which is the header row.
    ///
    /// Rows whose cells are all empty are skipped. Short rows are padded
    /// with empty cells.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        let mut rows = rows.into_iter();
        let headers: Vec<String> = rows
            .next()
            .filter(|h| h.iter().any(|c| !c.trim().is_empty()))
            .ok_or_else(|| Error::Malformed("missing header row".to_string()))?;

        let mut layout = Vec::with_capacity(headers.len());
        let mut found: Vec<Field> = Vec::new();
        let mut locale = None;
        let mut extra_count = 0;
        for header in &headers {
            let matched = Field::ALL
                .iter()
                .filter(|f| !found.contains(*f))
                .find_map(|f| f.matches_header(header).map(|l| (*f, l)));
            match matched {
                Some((field, header_locale)) => {
                    if field == Field::Pathway {
                        locale = Some(header_locale);
                    }
                    found.push(field);
                    layout.push(Column::Field(field));
                }
                None => {
                    layout.push(Column::Extra(extra_count));
                    extra_count += 1;
                }
            }
        }

        let fallback = Locale::default();
        for field in Field::ALL {
            if !found.contains(&field) {
                return Err(Error::MissingColumn(
                    locale.unwrap_or(fallback).header(field).to_string(),
                ));
            }
        }

        let mut table = Self {
            headers,
            layout,
            locale: locale.unwrap_or(fallback),
            records: Vec::new(),
        };

        for row in rows {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            let record = table.record_from_cells(row, extra_count);
            table.records.push(record);
        }

        Ok(table)
    }

    fn record_from_cells(&self, cells: Vec<String>, extra_count: usize) -> TaskRecord {
        let mut record = TaskRecord::new("", "", "");
        record.extra = vec![String::new(); extra_count];
        let mut cells = cells.into_iter();
        for column in &self.layout {
            let cell = cells.next().unwrap_or_default();
            match column {
                Column::Field(Field::Pathway) => record.pathway = cell,
                Column::Field(Field::Phase) => record.phase = cell,
                Column::Field(Field::Task) => record.task = cell,
                Column::Field(Field::Status) => {
                    record.status = TaskStatus::parse(&cell);
                    record.status_cell = Some(cell);
                }
                Column::Field(Field::Note) => record.note = cell,
                Column::Extra(i) => record.extra[*i] = cell,
            }
        }
        record
    }

    /// Serialize back to raw rows, header row first.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.records.len() + 1);
        rows.push(self.headers.clone());
        rows.extend(self.records.iter().map(|r| self.row_cells(r)));
        rows
    }

    /// Cells of one record in sheet column order.
    pub fn row_cells(&self, record: &TaskRecord) -> Vec<String> {
        self.layout
            .iter()
            .map(|column| match column {
                Column::Field(Field::Pathway) => record.pathway.clone(),
                Column::Field(Field::Phase) => record.phase.clone(),
                Column::Field(Field::Task) => record.task.clone(),
                Column::Field(Field::Status) => record.status_text(self.locale).to_string(),
                Column::Field(Field::Note) => record.note.clone(),
                Column::Extra(i) => record.extra.get(*i).cloned().unwrap_or_default(),
            })
            .collect()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [TaskRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of non-required columns.
    pub fn extra_columns(&self) -> usize {
        self.layout
            .iter()
            .filter(|c| matches!(c, Column::Extra(_)))
            .count()
    }

    /// Append a record, padding its extra cells to the table's width.
    pub fn push(&mut self, mut record: TaskRecord) {
        record.extra.resize(self.extra_columns(), String::new());
        self.records.push(record);
    }

    /// Distinct pathways in first-seen order.
    pub fn pathways(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.pathway.as_str()))
    }

    /// Distinct phases across all pathways, in first-seen order.
    pub fn phases(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.phase.as_str()))
    }

    /// Distinct statuses in first-seen order.
    pub fn statuses(&self) -> Vec<TaskStatus> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(&r.status))
            .map(|r| r.status.clone())
            .collect()
    }

    /// Distinct phases of one pathway.
    pub fn phases_in(&self, pathway: &str) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter(|r| r.pathway == pathway)
                .map(|r| r.phase.as_str()),
        )
    }

    /// Distinct tasks of one (pathway, phase).
    pub fn tasks_in(&self, pathway: &str, phase: &str) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter(|r| r.pathway == pathway && r.phase == phase)
                .map(|r| r.task.as_str()),
        )
    }

    /// Distinct (phase, task) pairs across the whole table, first-seen order.
    pub fn template_pairs(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert((r.phase.as_str(), r.task.as_str())))
            .map(|r| (r.phase.clone(), r.task.clone()))
            .collect()
    }

    /// Indices of every record matching the triple.
    pub fn find(&self, key: &TaskKey) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(key))
            .map(|(i, _)| i)
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
