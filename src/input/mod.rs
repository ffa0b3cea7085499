//! Workbook reader: turns one worksheet into a `Sheet` of `PatientRecord`s.
//!
//! Uses `calamine`, so `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods` are all
//! accepted. The first row is the header; header names are trimmed.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::{CellValue, PatientRecord, Sheet};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read workbook: {0}")]
    Workbook(String),

    #[error("Worksheet '{0}' not found in workbook")]
    SheetMissing(String),

    #[error("Worksheet '{0}' has no header row")]
    EmptySheet(String),
}

/// Read `sheet_name` from the workbook at `path`.
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<Sheet, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| InputError::Workbook(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(InputError::SheetMissing(sheet_name.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| InputError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| InputError::EmptySheet(sheet_name.to_string()))?;

    let columns: Vec<String> = header
        .iter()
        .map(|cell| cell_value(cell).map(|v| v.to_text()).unwrap_or_default())
        .map(|name| name.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let mut record = PatientRecord::new(idx + 1);
        for (column, cell) in columns.iter().zip(row.iter()) {
            if column.is_empty() {
                continue;
            }
            if let Some(value) = cell_value(cell) {
                record.insert(column, value);
            }
        }
        records.push(record);
    }

    tracing::debug!(
        sheet = sheet_name,
        columns = columns.len(),
        rows = records.len(),
        "Worksheet loaded"
    );

    Ok(Sheet { columns, records })
}

/// Map a raw cell to a `CellValue`. Empty cells and error cells are absent.
pub fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(CellValue::Text(s.clone()))
            }
        }
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) => Some(CellValue::Date(parsed)),
            None => Some(CellValue::Number(dt.as_f64())),
        },
        Data::DateTimeIso(s) => Some(
            parse_iso_datetime(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
        ),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
