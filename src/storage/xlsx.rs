//! Excel workbook backend.
//!
//! Reads the first worksheet with `calamine` and writes a single-sheet
//! workbook with `rust_xlsxwriter`. Every cell is written as text.

use super::backend::{TableBackend, TableFormat};
use crate::{Error, Result};
use calamine::{DataType, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

pub struct XlsxBackend;

/// Render one spreadsheet cell as text.
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        // Whole numbers come back as floats; keep "1" as "1", not "1.0"
        DataType::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        DataType::Float(v) => format!("{v}"),
        DataType::Int(v) => format!("{v}"),
        DataType::Bool(b) => b.to_string(),
        DataType::Error(e) => format!("#{e:?}"),
        DataType::Empty => String::new(),
        DataType::DateTime(v) => format!("{v}"),
        DataType::DateTimeIso(s) => s.clone(),
        DataType::Duration(v) => format!("{v}"),
        DataType::DurationIso(s) => s.clone(),
    }
}

impl TableBackend for XlsxBackend {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| Error::Spreadsheet(format!("failed to read xlsx workbook: {e}")))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::Malformed("workbook has no worksheets".to_string()))?
            .map_err(|e| Error::Spreadsheet(format!("failed to read worksheet: {e}")))?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    fn encode(&self, rows: &[Vec<String>]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet.write_string(r as u32, c as u16, cell)?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn format(&self) -> TableFormat {
        TableFormat::Xlsx
    }
}
