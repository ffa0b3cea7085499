use serde::Serialize;

use crate::models::*;

/// Placeholder shown for an eye without recorded details.
pub const NO_OBSERVATIONS: &str = "Sin observaciones";

/// Display-ready fields of one patient. Missing values are empty strings
/// (identity block) or `None` (optional sections).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientFields {
    pub name: String,
    pub id: String,
    pub age: String,
    pub exam_date: String,
    pub institution: String,
    pub region: String,
    pub outcome: Option<String>,
    pub observations: Option<String>,
    pub right_eye: String,
    pub left_eye: String,
    pub referral: Option<String>,
    pub ophthalmologist: Option<String>,
    pub technician: Option<String>,
}

impl PatientFields {
    /// `"<age> años"`, or empty when age is unknown.
    pub fn age_label(&self) -> String {
        if self.age.is_empty() {
            String::new()
        } else {
            format!("{} años", self.age)
        }
    }
}

pub fn normalize_record(record: &PatientRecord) -> PatientFields {
    let text = |column: &str| record.text(column).unwrap_or_default();

    PatientFields {
        name: text(COL_NAME),
        id: text(COL_RUT),
        age: format_age(record.get(COL_AGE)),
        exam_date: format_exam_date(record.get(COL_DATE)),
        institution: text(COL_INSTITUTION),
        region: text(COL_REGION),
        outcome: record.text(COL_OUTCOME),
        observations: record.text(COL_OBSERVATIONS),
        right_eye: record
            .text(COL_RIGHT_EYE)
            .unwrap_or_else(|| NO_OBSERVATIONS.to_string()),
        left_eye: record
            .text(COL_LEFT_EYE)
            .unwrap_or_else(|| NO_OBSERVATIONS.to_string()),
        referral: record.text(COL_REFERRAL),
        ophthalmologist: record.text(COL_OPHTHALMOLOGIST),
        technician: record.text(COL_TECHNICIAN),
    }
}

/// Whole years. Numeric text is parsed; other text is kept as typed.
pub fn format_age(value: Option<&CellValue>) -> String {
    match value {
        None => String::new(),
        Some(CellValue::Number(n)) => whole_years(*n),
        Some(CellValue::Text(s)) => {
            let trimmed = s.trim();
            match trimmed.replace(',', ".").parse::<f64>() {
                Ok(n) => whole_years(n),
                Err(_) => trimmed.to_string(),
            }
        }
        Some(other) => other.to_text(),
    }
}

fn whole_years(n: f64) -> String {
    if n.is_finite() {
        (n.trunc() as i64).to_string()
    } else {
        String::new()
    }
}

/// Text dates are shown as typed; spreadsheet dates as `DD/MM/YYYY`.
pub fn format_exam_date(value: Option<&CellValue>) -> String {
    match value {
        None => String::new(),
        Some(CellValue::Date(dt)) => dt.format("%d/%m/%Y").to_string(),
        Some(other) => other.to_text().trim().to_string(),
    }
}
