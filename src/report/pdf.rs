//! PDF painting via `printpdf`.
//!
//! Walks a `ReportDocument` top to bottom on US-Letter pages, keeping a
//! vertical cursor in millimetres. Builtin Helvetica fonts carry no metrics,
//! so widths used for alignment are estimates.

use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{self, DynamicImage};
use printpdf::*;

use super::layout::{Block, ReportDocument, TextStyle, BRAND_TEXT, CONTACT_LINES};
use super::ReportError;
use crate::models::Signer;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_TOP: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 20.0;
const CONTENT_WIDTH: f32 = 170.0;

const PT_TO_MM: f32 = 0.3528;
const IMAGE_DPI: f32 = 300.0;

const BRAND_LOGO_SIZE: (f32, f32) = (40.0, 12.0);
const INSTITUTION_LOGO_SIZE: (f32, f32) = (25.0, 18.0);
const SIGNATURE_SIZE: (f32, f32) = (40.0, 25.0);

/// Patient grid column widths (label, value, label, value).
const GRID_COLUMNS: [f32; 4] = [25.0, 70.0, 30.0, 40.0];
const GRID_ROW_HEIGHT: f32 = 6.5;
const GRID_LINE_LEADING: f32 = 4.5;

fn accent() -> Color {
    Color::Rgb(Rgb::new(0.173, 0.322, 0.510, None)) // #2c5282
}

fn dark_gray() -> Color {
    Color::Rgb(Rgb::new(0.2, 0.2, 0.2, None)) // #333333
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

/// Rough Helvetica width of `text` in millimetres.
fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let factor = if bold { 0.58 } else { 0.52 };
    text.chars().count() as f32 * size * factor * PT_TO_MM
}

/// Characters that fit in `width` mm at `size` pt.
fn chars_per_line(width: f32, size: f32) -> usize {
    ((width / (size * 0.52 * PT_TO_MM)) as usize).max(10)
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        if current_len + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Lines painted in each cell of a patient grid row. Value cells wrap to
/// their column; labels stay on one line.
fn grid_row_lines(row: &[String; 4]) -> [Vec<String>; 4] {
    std::array::from_fn(|col| {
        let cell = &row[col];
        if cell.is_empty() {
            Vec::new()
        } else if col % 2 == 0 {
            vec![cell.clone()]
        } else {
            wrap_text(cell, chars_per_line(GRID_COLUMNS[col] - 2.0, 10.0))
        }
    })
}

struct Painter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance of the cursor from the bottom edge, in mm.
    y: f32,
}

impl<'a> Painter<'a> {
    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    /// Start a new page when fewer than `needed` mm remain.
    fn reserve(&mut self, needed: f32) {
        if self.y - needed >= MARGIN_BOTTOM {
            return;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn text_at(&self, text: &str, size: f32, x: f32, baseline: f32, bold: bool, color: Color) {
        self.layer.set_fill_color(color);
        self.layer
            .use_text(text, size, Mm(x), Mm(baseline), self.font(bold));
        self.layer.set_fill_color(black());
    }

    /// Wrapped lines starting at the cursor; advances it by `leading` per line.
    fn lines(&mut self, text: &str, size: f32, x: f32, width: f32, leading: f32, bold: bool) {
        for line in wrap_text(text, chars_per_line(width, size)) {
            self.reserve(leading);
            self.y -= leading;
            self.text_at(&line, size, x, self.y, bold, black());
        }
    }

    fn image(&self, path: &Path, x: f32, top: f32, size: (f32, f32)) -> Result<(), ReportError> {
        let decoded = image_crate::open(path).map_err(|e| ReportError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let rgb = decoded.to_rgb8();
        let (px_w, px_h) = rgb.dimensions();
        if px_w == 0 || px_h == 0 {
            return Err(ReportError::Image {
                path: path.to_path_buf(),
                reason: "image has no pixels".into(),
            });
        }
        let natural_w = px_w as f32 / IMAGE_DPI * 25.4;
        let natural_h = px_h as f32 / IMAGE_DPI * 25.4;

        Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(top - size.1)),
                scale_x: Some(size.0 / natural_w),
                scale_y: Some(size.1 / natural_h),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn block(&mut self, block: &Block) -> Result<(), ReportError> {
        match block {
            Block::Header {
                brand_logo,
                institution_logo,
            } => self.header(brand_logo.as_deref(), institution_logo.as_deref()),
            Block::Title(text) => {
                self.reserve(14.0);
                self.y -= 5.0 + 14.0 * PT_TO_MM;
                let x = MARGIN_LEFT + (CONTENT_WIDTH - text_width(text, 14.0, true)) / 2.0;
                self.text_at(text, 14.0, x, self.y, true, accent());
                self.y -= 8.0;
                Ok(())
            }
            Block::PatientGrid(rows) => {
                self.grid(rows);
                Ok(())
            }
            Block::Divider => {
                self.reserve(1.0);
                self.layer.set_outline_color(accent());
                self.layer.set_outline_thickness(0.5 / PT_TO_MM);
                self.layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(MARGIN_LEFT), Mm(self.y)), false),
                        (Point::new(Mm(MARGIN_LEFT + CONTENT_WIDTH), Mm(self.y)), false),
                    ],
                    is_closed: false,
                });
                self.y -= 0.5;
                Ok(())
            }
            Block::Spacer(mm) => {
                self.y -= *mm;
                Ok(())
            }
            Block::Paragraph { text, style } => {
                match style {
                    TextStyle::Body => {
                        self.y -= 2.0;
                        self.lines(text, 10.0, MARGIN_LEFT, CONTENT_WIDTH, 4.9, false);
                        self.y -= 2.0;
                    }
                    TextStyle::Item => {
                        self.y -= 1.0;
                        let indent = MARGIN_LEFT + 5.0;
                        self.lines(text, 10.0, indent, CONTENT_WIDTH - 5.0, 4.5, false);
                        self.y -= 1.0;
                    }
                }
                Ok(())
            }
            Block::Labeled { label, value } => {
                self.labeled(label, value);
                Ok(())
            }
            Block::Subheading(text) => {
                self.reserve(12.0);
                self.y -= 5.0 + 11.0 * PT_TO_MM;
                self.text_at(text, 11.0, MARGIN_LEFT, self.y, true, accent());
                self.y -= 3.0;
                Ok(())
            }
            Block::Signature { signer, image } => self.signature(*signer, image.as_deref()),
        }
    }

    fn header(
        &mut self,
        brand_logo: Option<&Path>,
        institution_logo: Option<&Path>,
    ) -> Result<(), ReportError> {
        let top = self.y;

        let mut baseline = top;
        for line in CONTACT_LINES {
            baseline -= 3.5;
            self.text_at(line, 8.0, MARGIN_LEFT, baseline, false, dark_gray());
        }

        // Three columns (90/50/30 mm) when the institution has a logo, else two (120/50 mm).
        let (brand_x, brand_centered) = if institution_logo.is_some() {
            (MARGIN_LEFT + 90.0, true)
        } else {
            (MARGIN_LEFT + 120.0, false)
        };
        let brand_column = 50.0;

        match brand_logo {
            Some(path) => {
                let x = if brand_centered {
                    brand_x + (brand_column - BRAND_LOGO_SIZE.0) / 2.0
                } else {
                    brand_x + brand_column - BRAND_LOGO_SIZE.0
                };
                self.image(path, x, top, BRAND_LOGO_SIZE)?;
            }
            None => {
                let width = text_width(BRAND_TEXT, 14.0, true);
                let x = brand_x + (brand_column - width) / 2.0;
                self.text_at(BRAND_TEXT, 14.0, x, top - 8.0, true, accent());
            }
        }

        let mut height: f32 = 4.0 * 3.5 + 2.0;
        if let Some(path) = institution_logo {
            let x = MARGIN_LEFT + CONTENT_WIDTH - INSTITUTION_LOGO_SIZE.0;
            self.image(path, x, top, INSTITUTION_LOGO_SIZE)?;
            height = height.max(INSTITUTION_LOGO_SIZE.1);
        }
        if brand_logo.is_some() {
            height = height.max(BRAND_LOGO_SIZE.1);
        }

        self.y = top - height;
        Ok(())
    }

    fn grid(&mut self, rows: &[[String; 4]]) {
        let offsets: Vec<f32> = GRID_COLUMNS
            .iter()
            .scan(MARGIN_LEFT, |x, width| {
                let start = *x;
                *x += width;
                Some(start)
            })
            .collect();

        for row in rows {
            let cells = grid_row_lines(row);
            let extra = cells.iter().map(Vec::len).max().unwrap_or(1).max(1) - 1;
            self.reserve(GRID_ROW_HEIGHT + extra as f32 * GRID_LINE_LEADING);
            self.y -= GRID_ROW_HEIGHT;
            let first_baseline = self.y;

            for (col, lines) in cells.iter().enumerate() {
                let is_label = col % 2 == 0;
                for (i, line) in lines.iter().enumerate() {
                    let baseline = first_baseline - i as f32 * GRID_LINE_LEADING;
                    if is_label {
                        // Labels are right-aligned against their value column.
                        let right = offsets[col] + GRID_COLUMNS[col] - 1.5;
                        let x = right - text_width(line, 10.0, true);
                        self.text_at(line, 10.0, x, baseline, true, black());
                    } else {
                        self.text_at(line, 10.0, offsets[col] + 1.5, baseline, false, black());
                    }
                }
            }
            self.y = first_baseline - extra as f32 * GRID_LINE_LEADING;
        }
    }

    fn labeled(&mut self, label: &str, value: &str) {
        let indent = MARGIN_LEFT + 5.0;
        let width = CONTENT_WIDTH - 5.0;
        let leading = 4.5;
        let wrapped = wrap_text(&format!("{label} {value}"), chars_per_line(width, 10.0));

        self.y -= 1.0;
        for (i, line) in wrapped.iter().enumerate() {
            self.reserve(leading);
            self.y -= leading;
            match line.strip_prefix(label).filter(|_| i == 0) {
                Some(rest) => {
                    self.text_at(label, 10.0, indent, self.y, true, black());
                    let x = indent + text_width(label, 10.0, true);
                    self.text_at(rest, 10.0, x, self.y, false, black());
                }
                None => self.text_at(line, 10.0, indent, self.y, false, black()),
            }
        }
        self.y -= 1.0;
    }

    fn signature(&mut self, signer: Signer, image: Option<&Path>) -> Result<(), ReportError> {
        let caption = signer.caption();
        self.reserve(SIGNATURE_SIZE.1 + 8.0);

        let center = MARGIN_LEFT + CONTENT_WIDTH / 2.0;
        if let Some(path) = image {
            self.image(path, center - SIGNATURE_SIZE.0 / 2.0, self.y, SIGNATURE_SIZE)?;
        }
        // Same footprint whether or not the signature image exists.
        self.y -= SIGNATURE_SIZE.1 + 5.0;

        let x = center - text_width(caption, 10.0, false) / 2.0;
        self.text_at(caption, 10.0, x, self.y, false, black());
        self.y -= 3.0;
        Ok(())
    }
}

/// Paint `document` and return the PDF bytes.
pub fn paint(document: &ReportDocument) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&document.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?;

    {
        let mut painter = Painter {
            doc: &doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN_TOP,
        };
        for block in &document.blocks {
            painter.block(block)?;
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))
}
