use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;

use crate::error::FootprintError;

/// Header plus string cells, as read from an upload.
///
/// Rows keep their own length: trailing missing cells are dropped rather
/// than padded, so a short line stays short.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Convert a DataFrame whose columns are all String dtype.
    pub fn from_frame(df: &DataFrame) -> Result<Self, FootprintError> {
        let header: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.to_string())
            .collect();

        let columns = df
            .get_columns()
            .iter()
            .map(|c| c.str())
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let cells: Vec<Option<&str>> = columns.iter().map(|c| c.get(i)).collect();
            let len = cells.iter().rposition(|c| c.is_some()).map_or(0, |p| p + 1);
            rows.push(
                cells[..len]
                    .iter()
                    .map(|c| c.unwrap_or_default().to_string())
                    .collect(),
            );
        }

        Ok(Self { header, rows })
    }
}

/// Read an upload held in memory.
///
/// Lines holding only whitespace are dropped before parsing, so they neither
/// appear as rows nor shift the row index used for record ids.
pub fn read_csv_bytes(bytes: impl Into<Vec<u8>>) -> Result<RawTable, FootprintError> {
    let bytes = drop_blank_lines(&bytes.into());
    if bytes.is_empty() {
        return Err(FootprintError::NoData);
    }
    let df = csv_options().into_reader_with_file_handle(Cursor::new(bytes)).finish()?;
    RawTable::from_frame(&df)
}

/// Read a CSV file from disk.
pub fn read_csv_path(path: impl AsRef<Path>) -> Result<RawTable, FootprintError> {
    let bytes = std::fs::read(path)?;
    read_csv_bytes(bytes)
}

fn drop_blank_lines(bytes: &[u8]) -> Vec<u8> {
    bytes
        .split_inclusive(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .flatten()
        .copied()
        .collect()
}

/// All columns as String, long lines truncated to the header width.
fn csv_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_truncate_ragged_lines(true))
}
