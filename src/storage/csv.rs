//! CSV backend.
//!
//! Also used to render filtered exports, so both the backing file and the
//! download share one encoding: UTF-8, comma-delimited, no BOM.

use super::backend::{TableBackend, TableFormat};
use crate::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvBackend;

impl TableBackend for CsvBackend {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn encode(&self, rows: &[Vec<String>]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for row in rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    fn format(&self) -> TableFormat {
        TableFormat::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_bom_and_keeps_quoted_commas() {
        let input = "\u{feff}pathway,note\nX,\"a, b\"\n";
        let rows = CsvBackend.decode(input.as_bytes()).unwrap();
        assert_eq!(rows[0], vec!["pathway", "note"]);
        assert_eq!(rows[1], vec!["X", "a, b"]);
    }

    #[test]
    fn test_encode_quotes_when_needed() {
        let rows = vec![
            vec!["pathway".to_string(), "note".to_string()],
            vec!["X".to_string(), "line one\nline two".to_string()],
        ];
        let text = String::from_utf8(CsvBackend.encode(&rows).unwrap()).unwrap();
        assert_eq!(text, "pathway,note\nX,\"line one\nline two\"\n");
    }

    #[test]
    fn test_decode_allows_ragged_rows() {
        let rows = CsvBackend.decode(b"a,b,c\n1,2\n").unwrap();
        assert_eq!(rows[1], vec!["1", "2"]);
    }
}
