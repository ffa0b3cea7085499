//! Batch summary workbook (`rust_xlsxwriter`).
//!
//! Brand logo at A1, institution title merged across C2:J2, a ten-column
//! header on row 4 and one row per patient, shading every even sequence number.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Image, Workbook};
use serde::Serialize;

use super::catalog::content_for;
use super::normalize::PatientFields;
use super::ReportError;
use crate::models::DiagnosisCategory;

pub const SUMMARY_SHEET: &str = "Resumen";

pub const SUMMARY_HEADERS: [&str; 10] = [
    "N°",
    "FECHA",
    "CENTRO",
    "RUT",
    "NOMBRE",
    "EDAD",
    "DIAGNÓSTICO",
    "DETALLE OD",
    "DETALLE OI",
    "OBSERVACIÓN / DERIVACIÓN",
];

const COLUMN_WIDTHS: [f64; 10] = [6.0, 12.0, 28.0, 14.0, 32.0, 7.0, 14.0, 30.0, 30.0, 40.0];

const TITLE_ROW: u32 = 1;
const HEADER_ROW: u32 = 3;
const FIRST_DATA_ROW: u32 = 4;

const HEADER_FILL: u32 = 0x2C5282;
const SHADED_FILL: u32 = 0xDCE6F1;

/// One line of the summary, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// 1-based position in the batch.
    pub sequence: u32,
    pub date: String,
    pub center: String,
    pub id: String,
    pub name: String,
    pub age: String,
    pub diagnosis: String,
    pub right_eye: String,
    pub left_eye: String,
    pub note: String,
}

impl SummaryRow {
    pub fn new(sequence: u32, fields: &PatientFields, category: DiagnosisCategory) -> Self {
        let referral = fields
            .referral
            .clone()
            .unwrap_or_else(|| content_for(category).referral.to_string());
        let note = match &fields.observations {
            Some(observations) => format!("{observations} / {referral}"),
            None => referral,
        };

        Self {
            sequence,
            date: fields.exam_date.clone(),
            center: fields.institution.clone(),
            id: fields.id.clone(),
            name: fields.name.clone(),
            age: fields.age.clone(),
            diagnosis: category.as_str().to_string(),
            right_eye: fields.right_eye.clone(),
            left_eye: fields.left_eye.clone(),
            note,
        }
    }

    /// Even sequence numbers get a background fill.
    pub fn is_shaded(&self) -> bool {
        self.sequence % 2 == 0
    }

    fn cells(&self) -> [&str; 9] {
        [
            &self.date,
            &self.center,
            &self.id,
            &self.name,
            &self.age,
            &self.diagnosis,
            &self.right_eye,
            &self.left_eye,
            &self.note,
        ]
    }
}

/// Write the summary workbook to `path`.
pub fn write_summary(
    path: &Path,
    institution: &str,
    rows: &[SummaryRow],
    brand_logo: Option<&Path>,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SUMMARY_SHEET)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    if let Some(logo) = brand_logo {
        let image = Image::new(logo)?.set_scale_to_size(150, 45, true);
        worksheet.insert_image(0, 0, &image)?;
    }

    let title = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_font_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    worksheet.set_row_height(TITLE_ROW, 24)?;
    worksheet.merge_range(TITLE_ROW, 2, TITLE_ROW, 9, institution, &title)?;

    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_text_wrap();
    for (col, text) in SUMMARY_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, col as u16, *text, &header)?;
    }

    let plain = Format::new().set_border(FormatBorder::Thin).set_text_wrap();
    let shaded = plain.clone().set_background_color(Color::RGB(SHADED_FILL));

    for (offset, row) in rows.iter().enumerate() {
        let excel_row = FIRST_DATA_ROW + offset as u32;
        let format = if row.is_shaded() { &shaded } else { &plain };

        worksheet.write_number_with_format(excel_row, 0, row.sequence, format)?;
        for (i, value) in row.cells().iter().enumerate() {
            let col = i as u16 + 1;
            match (col, value.parse::<f64>()) {
                (5, Ok(age)) => {
                    worksheet.write_number_with_format(excel_row, col, age, format)?;
                }
                _ => {
                    worksheet.write_string_with_format(excel_row, col, *value, format)?;
                }
            }
        }
    }

    workbook.save(path)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Summary workbook written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::normalize::NO_OBSERVATIONS;
    use calamine::{open_workbook_auto, Data, Reader};

    fn fields(name: &str) -> PatientFields {
        PatientFields {
            name: name.into(),
            id: "12.345.678-9".into(),
            age: "54".into(),
            exam_date: "01/03/2026".into(),
            institution: "CESFAM Las Condes".into(),
            right_eye: NO_OBSERVATIONS.into(),
            left_eye: "Drusas".into(),
            ..Default::default()
        }
    }

    #[test]
    fn note_falls_back_to_category_referral() {
        let row = SummaryRow::new(1, &fields("Ana"), DiagnosisCategory::Normal);
        assert_eq!(row.note, "FONDO DE OJO ANUAL");
        assert_eq!(row.diagnosis, "NORMAL");
    }

    #[test]
    fn note_combines_observations_and_referral() {
        let mut f = fields("Ana");
        f.observations = Some("Nevus OI".into());
        f.referral = Some("Control 6 meses".into());
        let row = SummaryRow::new(1, &f, DiagnosisCategory::Other);
        assert_eq!(row.note, "Nevus OI / Control 6 meses");
    }

    #[test]
    fn shading_follows_sequence_parity() {
        let f = fields("Ana");
        assert!(!SummaryRow::new(1, &f, DiagnosisCategory::Normal).is_shaded());
        assert!(SummaryRow::new(2, &f, DiagnosisCategory::Normal).is_shaded());
        assert!(!SummaryRow::new(3, &f, DiagnosisCategory::Normal).is_shaded());
    }

    #[test]
    fn writes_rows_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Resumen.xlsx");
        let rows = vec![
            SummaryRow::new(1, &fields("Ana"), DiagnosisCategory::Normal),
            SummaryRow::new(2, &fields("Luis"), DiagnosisCategory::DiabeticRetinopathy),
        ];
        write_summary(&path, "CESFAM Las Condes", &rows, None).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        assert_eq!(
            range.get_value((TITLE_ROW, 2)),
            Some(&Data::String("CESFAM Las Condes".into()))
        );
        assert_eq!(
            range.get_value((HEADER_ROW, 9)),
            Some(&Data::String("OBSERVACIÓN / DERIVACIÓN".into()))
        );
        assert_eq!(
            range.get_value((FIRST_DATA_ROW, 4)),
            Some(&Data::String("Ana".into()))
        );
        assert_eq!(
            range.get_value((FIRST_DATA_ROW + 1, 6)),
            Some(&Data::String("RD".into()))
        );
        assert_eq!(range.get_value((FIRST_DATA_ROW + 1, 5)), Some(&Data::Float(54.0)));
    }

    fn archive_part(path: &Path, name: &str) -> String {
        use std::io::Read;
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn attr<'a>(element: &'a str, name: &str) -> Option<&'a str> {
        let start = element.find(&format!(" {name}=\""))? + name.len() + 3;
        element[start..].split('"').next()
    }

    /// Style index of `cell` (e.g. `A5`) in the sheet XML.
    fn cell_style(sheet: &str, cell: &str) -> usize {
        let start = sheet.find(&format!("<c r=\"{cell}\"")).unwrap();
        let tag = &sheet[start..];
        let tag = &tag[..tag.find('>').unwrap()];
        attr(tag, "s").unwrap().parse().unwrap()
    }

    /// The `n`th `<element` inside `<section>...</section>`.
    fn nth_element<'a>(xml: &'a str, section: &str, element: &str, n: usize) -> &'a str {
        let body = &xml[xml.find(&format!("<{section}")).unwrap()..];
        let body = &body[..body.find(&format!("</{section}>")).unwrap()];
        body.split(element).nth(n + 1).unwrap()
    }

    fn fill_of_style(styles: &str, style: usize) -> String {
        let xf = nth_element(styles, "cellXfs", "<xf ", style);
        let fill_id: usize = attr(xf, "fillId").unwrap().parse().unwrap();
        nth_element(styles, "fills", "<fill>", fill_id).to_string()
    }

    #[test]
    fn even_rows_are_written_shaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Resumen.xlsx");
        let rows: Vec<SummaryRow> = ["Ana", "Luis", "Rosa"]
            .iter()
            .enumerate()
            .map(|(i, name)| SummaryRow::new(i as u32 + 1, &fields(name), DiagnosisCategory::Normal))
            .collect();
        write_summary(&path, "CESFAM Las Condes", &rows, None).unwrap();

        let sheet = archive_part(&path, "xl/worksheets/sheet1.xml");
        let styles = archive_part(&path, "xl/styles.xml");

        // Rows 5..7 hold sequence numbers 1..3.
        let first = cell_style(&sheet, "A5");
        let second = cell_style(&sheet, "A6");
        let third = cell_style(&sheet, "A7");
        assert_eq!(first, third);
        assert_ne!(first, second);
        assert_eq!(cell_style(&sheet, "E6"), second);

        assert!(fill_of_style(&styles, second).contains("FFDCE6F1"));
        assert!(!fill_of_style(&styles, first).contains("DCE6F1"));
    }

    #[test]
    fn empty_batch_still_writes_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Resumen.xlsx");
        write_summary(&path, "Sin_Establecimiento", &[], None).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn missing_logo_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Resumen.xlsx");
        let logo = tmp.path().join("nope.jpg");
        let err = write_summary(&path, "X", &[], Some(&logo)).unwrap_err();
        assert!(matches!(err, ReportError::Spreadsheet(_)));
    }
}
