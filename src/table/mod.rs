//! Tabular sources - CSV files and spreadsheet workbooks
//!
//! Every source is reduced to the same shape: one header row and a list of
//! data rows, with every cell trimmed. Completely blank rows are dropped but
//! keep their position in the row numbering so errors point at the right line.

use calamine::{open_workbook_auto, Reader};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook parse failed: {0}")]
    Workbook(String),

    #[error("unsupported file format: {0:?} (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),
}

/// A data row and its 1-based position below the header
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<String>,
}

impl Row {
    /// Cell at `index`, or "" when the row is short
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl RawTable {
    /// Position of the column named exactly `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn push_row(&mut self, number: usize, cells: Vec<String>) {
        let row = Row { number, cells };
        if !row.is_blank() {
            self.rows.push(row);
        }
    }
}

/// Read CSV text with a header row
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, TableError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut table = RawTable {
        headers: reader.headers()?.iter().map(str::to_string).collect(),
        rows: Vec::new(),
    };

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        table.push_row(idx + 1, record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

/// Read the first worksheet of a workbook; its first row is the header
pub fn read_workbook(path: &Path) -> Result<RawTable, TableError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| TableError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TableError::Workbook("workbook has no worksheet".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TableError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| TableError::Workbook(format!("worksheet {sheet_name:?} is empty")))?;

    let mut table = RawTable {
        headers: header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        rows: Vec::new(),
    };

    for (idx, data_row) in rows.enumerate() {
        let cells = data_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        table.push_row(idx + 1, cells);
    }

    Ok(table)
}

/// Pick a reader from the file extension
pub fn read_path(path: &Path) -> Result<RawTable, TableError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|source| TableError::Io {
                path: path.display().to_string(),
                source,
            })?;
            read_csv(file)
        }
        "xlsx" | "xls" => read_workbook(path),
        _ => Err(TableError::UnsupportedFormat(ext)),
    }
}
