//! Header-row extraction.
//!
//! The header row is the first row with at least one non-blank cell. Cells are
//! trimmed and stripped of a leading byte-order mark; trailing blank cells are
//! dropped. Case is preserved, since matching applies its own normalization.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::kind::SpreadsheetKind;

/// Header row pulled from an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    pub headers: Vec<String>,
    /// Zero-based row the headers were taken from.
    pub row_index: usize,
    /// Worksheet name, for workbooks.
    pub sheet: Option<String>,
}

impl HeaderRow {
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn clean_cell(raw: &str) -> String {
    raw.trim_matches('\u{feff}').trim().to_string()
}

/// Returns the cleaned row, or `None` when every cell is blank.
fn clean_row<I, S>(cells: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row: Vec<String> = cells
        .into_iter()
        .map(|cell| clean_cell(cell.as_ref()))
        .collect();
    while row.last().is_some_and(String::is_empty) {
        row.pop();
    }
    if row.is_empty() { None } else { Some(row) }
}

/// Read the header row of a CSV/TSV/XLSX/XLS/ODS file.
pub fn read_headers(path: &Path) -> Result<HeaderRow> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let kind = SpreadsheetKind::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let row = match kind {
        SpreadsheetKind::Delimited(delimiter) => {
            let file = File::open(path).map_err(|source| IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv_headers_from_reader(file, delimiter).map_err(|source| {
                IngestError::CsvParse {
                    path: path.to_path_buf(),
                    source,
                }
            })?
        }
        SpreadsheetKind::Workbook => read_workbook_headers(path)?,
    };
    let row = row.ok_or_else(|| IngestError::EmptyFile {
        path: path.to_path_buf(),
    })?;
    debug!(
        path = %path.display(),
        column_count = row.len(),
        row_index = row.row_index,
        "read header row"
    );
    Ok(row)
}

/// Read the header row of delimited text. Returns `Ok(None)` when the input
/// has no non-blank row. Invalid UTF-8 is replaced rather than rejected.
pub fn read_csv_headers_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> std::result::Result<Option<HeaderRow>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    for (row_index, record) in reader.byte_records().enumerate() {
        let record = record?;
        let cells = record.iter().map(String::from_utf8_lossy);
        if let Some(headers) = clean_row(cells) {
            return Ok(Some(HeaderRow {
                headers,
                row_index,
                sheet: None,
            }));
        }
    }
    Ok(None)
}

fn workbook_error(path: &Path, error: impl std::fmt::Display) -> IngestError {
    IngestError::Workbook {
        path: PathBuf::from(path),
        message: error.to_string(),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(e) => format!("#{e:?}"),
    }
}

/// First non-blank row of the first worksheet.
fn read_workbook_headers(path: &Path) -> Result<Option<HeaderRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::NoSheets {
            path: path.to_path_buf(),
        });
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| workbook_error(path, e))?;
    // Ranges start at the first used cell; report rows relative to the sheet.
    let offset = range.start().map_or(0, |(row, _)| row as usize);
    for (index, row) in range.rows().enumerate() {
        if let Some(headers) = clean_row(row.iter().map(cell_text)) {
            return Ok(Some(HeaderRow {
                headers,
                row_index: offset + index,
                sheet: Some(sheet_name),
            }));
        }
    }
    Ok(None)
}
