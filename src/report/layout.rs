//! Report composition: turns one patient's fields into a `ReportDocument`,
//! the content tree painted by `report::pdf`.
//!
//! Layout, top to bottom: header (contact block, brand logo, optional
//! institution logo), title, patient grid, divider, findings, eye details,
//! suggestions, optional referral, closing line, and one signature block.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::assets::AssetResolver;
use super::catalog::content_for;
use super::normalize::PatientFields;
use super::pdf;
use super::ReportError;
use crate::models::{DiagnosisCategory, Signer};

pub const CONTACT_LINES: &[&str] = &[
    "www.retidiag.com",
    "Hernando de Aguirre 128 Of. 904",
    "Fono: 24816886/7",
    "Providencia, Santiago",
];
pub const BRAND_TEXT: &str = "RETIDIAG";
pub const REPORT_TITLE: &str = "INFORME RETINOGRÁFICO";
pub const INTRO_TEXT: &str =
    "Por medio de la evaluación realizada con cámara no midriática es posible informar que:";
pub const SUGGESTIONS_HEADING: &str = "SUGERENCIAS";
pub const CLOSING_TEXT: &str = "Es todo cuanto se puede informar.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Justified body copy (intro and closing).
    Body,
    /// Indented clinical line.
    Item,
}

/// One element of a report, painted top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Header {
        brand_logo: Option<PathBuf>,
        institution_logo: Option<PathBuf>,
    },
    Title(String),
    /// Rows of `[label, value, label, value]`; empty strings leave the cell blank.
    PatientGrid(Vec<[String; 4]>),
    Divider,
    /// Vertical gap in millimetres.
    Spacer(f32),
    Paragraph { text: String, style: TextStyle },
    Labeled { label: String, value: String },
    Subheading(String),
    /// `image: None` keeps the footprint blank.
    Signature { signer: Signer, image: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    /// Every piece of visible text, in paint order.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Header { brand_logo, .. } => {
                    lines.extend(CONTACT_LINES.iter().map(|l| l.to_string()));
                    if brand_logo.is_none() {
                        lines.push(BRAND_TEXT.to_string());
                    }
                }
                Block::Title(text) | Block::Subheading(text) => lines.push(text.clone()),
                Block::PatientGrid(rows) => {
                    for row in rows {
                        lines.extend(row.iter().filter(|c| !c.is_empty()).cloned());
                    }
                }
                Block::Paragraph { text, .. } => lines.push(text.clone()),
                Block::Labeled { label, value } => lines.push(format!("{label} {value}")),
                Block::Signature { signer, .. } => lines.push(signer.caption().to_string()),
                Block::Divider | Block::Spacer(_) => {}
            }
        }
        lines
    }

    pub fn signature(&self) -> Option<(&Signer, &Option<PathBuf>)> {
        self.blocks.iter().find_map(|b| match b {
            Block::Signature { signer, image } => Some((signer, image)),
            _ => None,
        })
    }
}

/// Images resolved for one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportAssets {
    pub brand_logo: Option<PathBuf>,
    pub institution_logo: Option<PathBuf>,
    pub signature: Option<PathBuf>,
}

impl ReportAssets {
    /// Looks up the images for a record; only the signer chosen by the
    /// category is resolved.
    pub fn resolve(
        resolver: &AssetResolver,
        fields: &PatientFields,
        category: DiagnosisCategory,
    ) -> Self {
        let signature = match category.signer() {
            Signer::Ophthalmologist => {
                resolver.ophthalmologist_signature(fields.ophthalmologist.as_deref())
            }
            Signer::Technician => resolver.technician_signature(fields.technician.as_deref()),
        };
        Self {
            brand_logo: resolver.brand_logo(),
            institution_logo: resolver.institution_logo(Some(fields.region.as_str())),
            signature,
        }
    }
}

fn item(text: impl Into<String>) -> Block {
    Block::Paragraph {
        text: text.into(),
        style: TextStyle::Item,
    }
}

fn body(text: impl Into<String>) -> Block {
    Block::Paragraph {
        text: text.into(),
        style: TextStyle::Body,
    }
}

pub fn compose_report(
    fields: &PatientFields,
    category: DiagnosisCategory,
    assets: &ReportAssets,
) -> ReportDocument {
    let content = content_for(category);
    let mut blocks = Vec::with_capacity(32);

    blocks.push(Block::Header {
        brand_logo: assets.brand_logo.clone(),
        institution_logo: assets.institution_logo.clone(),
    });
    blocks.push(Block::Spacer(8.0));
    blocks.push(Block::Title(REPORT_TITLE.to_string()));

    blocks.push(Block::PatientGrid(vec![
        [
            "Nombre:".into(),
            fields.name.clone(),
            "Fecha Exámen:".into(),
            fields.exam_date.clone(),
        ],
        [
            "RUT:".into(),
            fields.id.clone(),
            "Edad:".into(),
            fields.age_label(),
        ],
        [
            "Institución:".into(),
            fields.institution.clone(),
            String::new(),
            String::new(),
        ],
    ]));
    blocks.push(Block::Spacer(8.0));
    blocks.push(Block::Divider);
    blocks.push(Block::Spacer(5.0));

    blocks.push(body(INTRO_TEXT));
    blocks.push(Block::Spacer(3.0));
    for line in content.findings {
        if line.is_empty() {
            blocks.push(Block::Spacer(3.0));
        } else {
            blocks.push(item(*line));
        }
    }

    if let Some(observations) = &fields.observations {
        blocks.push(Block::Spacer(3.0));
        blocks.push(Block::Labeled {
            label: "Observaciones:".into(),
            value: observations.clone(),
        });
    }

    blocks.push(Block::Spacer(2.0));
    blocks.push(item(format!("- Ojo Derecho (OD): {}", fields.right_eye)));
    blocks.push(item(format!("- Ojo Izquierdo (OI): {}", fields.left_eye)));
    blocks.push(Block::Spacer(5.0));

    blocks.push(Block::Subheading(SUGGESTIONS_HEADING.to_string()));
    blocks.extend(content.suggestions.iter().map(|line| item(*line)));

    // Only the record's own referral is shown; the catalog default is not injected.
    if let Some(referral) = &fields.referral {
        blocks.push(Block::Spacer(2.0));
        blocks.push(Block::Labeled {
            label: "Derivación:".into(),
            value: referral.clone(),
        });
    }

    blocks.push(Block::Spacer(5.0));
    blocks.push(body(CLOSING_TEXT));
    blocks.push(Block::Spacer(10.0));
    blocks.push(Block::Signature {
        signer: category.signer(),
        image: assets.signature.clone(),
    });

    ReportDocument {
        title: format!("{REPORT_TITLE} - {}", fields.name),
        blocks,
    }
}

/// Paint `document` and write it to `path`. The file only appears once the
/// whole PDF is written; a failed report leaves nothing behind.
pub fn render_report(document: &ReportDocument, path: &Path) -> Result<(), ReportError> {
    let bytes = pdf::paint(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(&bytes)?;
    staged.flush()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
