use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "Retidiag";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Worksheet the screening template stores patient rows in.
pub const INPUT_SHEET: &str = "INPUT";

/// File name of the template the clinic exports every screening round.
pub const DEFAULT_INPUT_FILE: &str = "Plantilla para crear informes PDF de FO 2026.xlsm";

/// Folder (under Documents) that receives the generated reports.
pub const DEFAULT_OUTPUT_FOLDER: &str = "informes retidiag";

/// Env var that overrides the image asset root.
pub const ASSETS_ENV: &str = "RETIDIAG_ASSETS_DIR";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "retidiag=info,retidiag_lib=info"
}

/// Template path used when the CLI gets no input argument.
/// ~/Downloads/<template> on all platforms.
pub fn default_input_path() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_INPUT_FILE)
}

/// Root folder for generated reports when none is given.
pub fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_OUTPUT_FOLDER)
}

/// Asset root relative to the working directory (`imagenes/logos`, `imagenes/firmas`).
pub fn default_assets_dir() -> PathBuf {
    PathBuf::from("imagenes")
}

/// Paths a batch run reads from and writes to.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_base: PathBuf,
    pub assets_dir: PathBuf,
    pub sheet_name: String,
}

impl ReportConfig {
    pub fn new(output_base: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_base: output_base.into(),
            assets_dir: assets_dir.into(),
            sheet_name: INPUT_SHEET.to_string(),
        }
    }

    pub fn with_sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    pub fn logos_dir(&self) -> PathBuf {
        self.assets_dir.join("logos")
    }

    pub fn signatures_dir(&self) -> PathBuf {
        self.assets_dir.join("firmas")
    }

    pub fn output_base(&self) -> &Path {
        &self.output_base
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new(default_output_dir(), default_assets_dir())
    }
}
