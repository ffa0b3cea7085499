//! Output folder policy.
//!
//! `<base>/<region>/<institution>_<date>/<category>/<patient>.pdf`. Every
//! segment is sanitized. Same-named patients in one category overwrite each
//! other; there is no de-duplication.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::*;

pub const REPORT_EXTENSION: &str = "pdf";
pub const UNNAMED: &str = "sin_nombre";
pub const NO_REGION: &str = "Sin_Comuna";
pub const NO_INSTITUTION: &str = "Sin_Establecimiento";

const RESERVED_CHARS: [char; 10] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' '];

/// Filesystem-safe name: trimmed, each reserved character (and space)
/// replaced by `_`. Length in chars is preserved after trimming.
pub fn sanitize_name(raw: Option<&str>) -> String {
    match raw {
        None => UNNAMED.to_string(),
        Some(s) => s
            .trim()
            .chars()
            .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
            .collect(),
    }
}

/// Values that name the top-level folder of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchContext {
    pub region: String,
    pub institution: String,
    pub date_tag: String,
}

impl BatchContext {
    /// Dominant region and institution across `records`, and the date tag
    /// of the first record (`today` when it has none).
    pub fn from_records(records: &[PatientRecord], today: NaiveDate) -> Self {
        Self {
            region: dominant_value(records, COL_REGION).unwrap_or_else(|| NO_REGION.to_string()),
            institution: dominant_value(records, COL_INSTITUTION)
                .unwrap_or_else(|| NO_INSTITUTION.to_string()),
            date_tag: date_tag(records.first().and_then(|r| r.get(COL_DATE)), today),
        }
    }

    /// `<base>/<region>/<institution>_<date>`
    pub fn batch_root(&self, base: &Path) -> PathBuf {
        base.join(sanitize_name(Some(&self.region))).join(format!(
            "{}_{}",
            sanitize_name(Some(&self.institution)),
            self.date_tag
        ))
    }

    /// Summary workbook file name for this batch.
    pub fn summary_file_name(&self) -> String {
        format!(
            "Resumen_{}_{}.xlsx",
            sanitize_name(Some(&self.institution)),
            self.date_tag
        )
    }
}

/// Most frequent value of `column`; ties go to the smallest value. `None`
/// when the column is empty throughout.
pub fn dominant_value(records: &[PatientRecord], column: &str) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in records.iter().filter_map(|r| r.text(column)) {
        *counts.entry(value).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_value, a_count), (b_value, b_count)| {
            a_count.cmp(b_count).then_with(|| b_value.cmp(a_value))
        })
        .map(|(value, _)| value)
}

/// Date segment of the batch folder name.
///
/// Text keeps its first 10 characters with `/` → `-` and spaces → `_`;
/// spreadsheet dates become `YYYY-MM-DD`; absent values use `today`.
pub fn date_tag(value: Option<&CellValue>, today: NaiveDate) -> String {
    match value {
        None => today.format("%Y-%m-%d").to_string(),
        Some(CellValue::Date(dt)) => dt.format("%Y-%m-%d").to_string(),
        Some(CellValue::Text(s)) => s
            .replace('/', "-")
            .replace(' ', "_")
            .chars()
            .take(10)
            .collect(),
        Some(other) => other.to_text().chars().take(10).collect(),
    }
}

/// Destination of one patient document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub file_name: String,
    pub path: PathBuf,
}

impl OutputTarget {
    pub fn new(batch_root: &Path, category: DiagnosisCategory, patient_name: Option<&str>) -> Self {
        let directory = batch_root.join(sanitize_name(Some(&category.folder_name())));
        let file_name = format!("{}.{REPORT_EXTENSION}", sanitize_name(patient_name));
        let path = directory.join(&file_name);
        Self {
            directory,
            file_name,
            path,
        }
    }

    /// Create the category folder. Safe to call repeatedly.
    pub fn ensure_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sanitize_replaces_every_reserved_char() {
        let raw = r#"a/b\c:d*e?f"g<h>i|j k"#;
        let clean = sanitize_name(Some(raw));
        assert_eq!(clean, "a_b_c_d_e_f_g_h_i_j_k");
        assert_eq!(clean.chars().count(), raw.chars().count());
    }

    #[test]
    fn sanitize_trims_and_keeps_accents() {
        assert_eq!(sanitize_name(Some("  Juan Pérez ")), "Juan_Pérez");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in ["Juan Pérez", "A/B:C", "  María <José>  ", "plain"] {
            let once = sanitize_name(Some(raw));
            assert_eq!(sanitize_name(Some(&once)), once);
        }
    }

    #[test]
    fn sanitize_absent_uses_placeholder() {
        assert_eq!(sanitize_name(None), UNNAMED);
    }

    #[test]
    fn date_tag_from_text() {
        let today = day(2026, 10, 16);
        let text = CellValue::Text("01/03/2026 10:30".into());
        assert_eq!(date_tag(Some(&text), today), "01-03-2026");
        let spaced = CellValue::Text("1 mar 2026".into());
        assert_eq!(date_tag(Some(&spaced), today), "1_mar_2026");
    }

    #[test]
    fn date_tag_from_structured_date() {
        let dt = day(2026, 3, 1).and_hms_opt(9, 15, 0).unwrap();
        assert_eq!(date_tag(Some(&CellValue::Date(dt)), day(2026, 10, 16)), "2026-03-01");
    }

    #[test]
    fn date_tag_absent_uses_today() {
        assert_eq!(date_tag(None, day(2026, 10, 16)), "2026-10-16");
    }

    fn record(region: Option<&str>, institution: Option<&str>) -> PatientRecord {
        let mut r = PatientRecord::new(1).with_text(COL_NAME, "x");
        if let Some(region) = region {
            r = r.with_text(COL_REGION, region);
        }
        if let Some(institution) = institution {
            r = r.with_text(COL_INSTITUTION, institution);
        }
        r
    }

    #[test]
    fn dominant_value_is_mode() {
        let records = vec![
            record(Some("El Monte"), None),
            record(Some("Las Condes"), None),
            record(Some("Las Condes"), None),
        ];
        assert_eq!(dominant_value(&records, COL_REGION).as_deref(), Some("Las Condes"));
    }

    #[test]
    fn dominant_value_tie_prefers_smallest() {
        let records = vec![record(Some("Peñalolén"), None), record(Some("El Monte"), None)];
        assert_eq!(dominant_value(&records, COL_REGION).as_deref(), Some("El Monte"));
    }

    #[test]
    fn dominant_value_absent() {
        let records = vec![record(None, None)];
        assert_eq!(dominant_value(&records, COL_REGION), None);
        assert_eq!(dominant_value(&[], COL_REGION), None);
    }

    #[test]
    fn batch_context_placeholders() {
        let ctx = BatchContext::from_records(&[record(None, None)], day(2026, 10, 16));
        assert_eq!(ctx.region, NO_REGION);
        assert_eq!(ctx.institution, NO_INSTITUTION);
        assert_eq!(ctx.date_tag, "2026-10-16");
    }

    #[test]
    fn end_to_end_target_path() {
        let date = day(2026, 3, 1).and_hms_opt(0, 0, 0).unwrap();
        let records = vec![record(Some("Las Condes"), Some("CESFAM Las Condes"))
            .with(COL_DATE, CellValue::Date(date))];
        let ctx = BatchContext::from_records(&records, day(2026, 10, 16));
        let root = ctx.batch_root(Path::new("/informes"));
        assert_eq!(root, PathBuf::from("/informes/Las_Condes/CESFAM_Las_Condes_2026-03-01"));

        let target = OutputTarget::new(&root, DiagnosisCategory::Normal, Some("Juan Pérez"));
        assert_eq!(
            target.path,
            PathBuf::from("/informes/Las_Condes/CESFAM_Las_Condes_2026-03-01/NORMAL/Juan_Pérez.pdf")
        );
        assert_eq!(target.file_name, "Juan_Pérez.pdf");
        assert_eq!(ctx.summary_file_name(), "Resumen_CESFAM_Las_Condes_2026-03-01.xlsx");
    }

    #[test]
    fn category_folder_uses_underscores() {
        let target = OutputTarget::new(Path::new("root"), DiagnosisCategory::DiagnosedNormal, None);
        assert_eq!(target.path, PathBuf::from("root/DG_NORMAL/sin_nombre.pdf"));
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let target = OutputTarget::new(tmp.path(), DiagnosisCategory::Cataract, Some("Ana"));
        target.ensure_directory().unwrap();
        target.ensure_directory().unwrap();
        assert!(target.directory.is_dir());
    }
}
