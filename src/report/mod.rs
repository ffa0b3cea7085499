pub mod assets;
pub mod catalog;
pub mod classify;
pub mod layout;
pub mod normalize;
pub mod orchestrator;
pub mod output;
pub mod pdf;
pub mod summary;

pub use assets::*;
pub use catalog::*;
pub use classify::*;
pub use layout::*;
pub use normalize::*;
pub use orchestrator::*;
pub use output::*;
pub use summary::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::input::InputError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Missing required column '{0}' in the input sheet")]
    MissingColumn(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Could not load image {}: {reason}", path.display())]
    Image { path: PathBuf, reason: String },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl ReportError {
    /// Fatal errors stop the batch before any document is written.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Input(_) | Self::MissingColumn(_))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(e.to_string())
    }
}
