use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

// Column names of the screening template (headers are trimmed before matching).
pub const COL_NAME: &str = "NOMBRE PACIENTE";
pub const COL_RUT: &str = "RUT";
pub const COL_OUTCOME: &str = "RESULTADO FINAL";
pub const COL_AGE: &str = "EDAD";
pub const COL_DATE: &str = "FECHA";
pub const COL_INSTITUTION: &str = "ESTABLECIMIENTO";
pub const COL_REGION: &str = "COMUNA";
pub const COL_OBSERVATIONS: &str = "OBSERVACIONES";
pub const COL_RIGHT_EYE: &str = "DETALLE OD";
pub const COL_LEFT_EYE: &str = "DETALLE OI";
pub const COL_REFERRAL: &str = "Derivacion";
pub const COL_OPHTHALMOLOGIST: &str = "OFTALMOLOGO";
pub const COL_TECHNICIAN: &str = "TECNOLOGO";

/// Columns a batch cannot be processed without.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_NAME, COL_RUT, COL_OUTCOME];

/// A non-empty spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Bool(bool),
}

impl CellValue {
    /// Plain-text rendering. Integral numbers drop the fractional part so
    /// ids and ages typed as numbers read naturally.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Date(dt) => dt.format("%Y-%m-%d").to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One patient row of the input sheet. Absent and blank cells are not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientRecord {
    /// 1-based position among the data rows of the sheet.
    pub row: usize,
    fields: BTreeMap<String, CellValue>,
}

impl PatientRecord {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            fields: BTreeMap::new(),
        }
    }

    /// Stores a cell, dropping empty text so that "blank" and "missing" coincide.
    pub fn insert(&mut self, column: &str, value: CellValue) {
        if let CellValue::Text(s) = &value {
            if s.trim().is_empty() {
                return;
            }
        }
        self.fields.insert(column.trim().to_string(), value);
    }

    pub fn with(mut self, column: &str, value: CellValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn with_text(self, column: &str, value: &str) -> Self {
        self.with(column, CellValue::Text(value.to_string()))
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Trimmed text of a cell, `None` when absent or blank.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .map(|v| v.to_text().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn has(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}

/// Header row plus records of one worksheet, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub records: Vec<PatientRecord>,
}

impl Sheet {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// First required column missing from the header, if any.
    pub fn missing_required_column(&self) -> Option<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .find(|col| !self.has_column(col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(54.0).to_text(), "54");
        assert_eq!(CellValue::Number(12345678.0).to_text(), "12345678");
        assert_eq!(CellValue::Number(54.5).to_text(), "54.5");
    }

    #[test]
    fn dates_render_iso() {
        let dt = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::Date(dt).to_text(), "2026-03-01");
    }

    #[test]
    fn blank_text_is_not_stored() {
        let record = PatientRecord::new(1)
            .with_text(COL_OBSERVATIONS, "   ")
            .with_text(COL_NAME, "Ana");
        assert!(!record.has(COL_OBSERVATIONS));
        assert_eq!(record.text(COL_NAME).as_deref(), Some("Ana"));
    }

    #[test]
    fn column_keys_are_trimmed() {
        let record = PatientRecord::new(1).with_text(" RUT ", "1-9");
        assert_eq!(record.text(COL_RUT).as_deref(), Some("1-9"));
    }

    #[test]
    fn missing_required_column_reported_in_order() {
        let sheet = Sheet {
            columns: vec!["NOMBRE PACIENTE".into(), "EDAD".into()],
            records: vec![],
        };
        assert_eq!(sheet.missing_required_column(), Some("RUT"));

        let complete = Sheet {
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records: vec![],
        };
        assert_eq!(complete.missing_required_column(), None);
    }
}
