//! Logo and signature lookup.
//!
//! Identity strings are normalized (trimmed, uppercased) and matched against
//! static tables. A lookup yields a path only when the file exists; callers
//! render a blank placeholder otherwise.

use std::path::{Path, PathBuf};

use crate::config::ReportConfig;

pub const BRAND_LOGO: &str = "logo_retidiag.jpg";
pub const DEFAULT_TECHNICIAN_SIGNATURE: &str = "firma_tmo_felipe_rojas.jpg";

/// Region (comuna) → institution logo. Exact match.
const INSTITUTION_LOGOS: &[(&str, &str)] = &[
    ("PEÑALOLÉN", "logo_penalolen.jpg"),
    ("PENALOLEN", "logo_penalolen.jpg"),
    ("LAS CONDES", "logo_las_condes.png"),
    ("EL MONTE", "logo_el_monte.png"),
];

/// Ophthalmologist → signature. Substring match, longest key wins.
const OPHTHALMOLOGIST_SIGNATURES: &[(&str, &str)] = &[
    ("DR. CONTRERAS", "firma_felipe_contreras.jpg"),
    ("DRA. ELTIT", "firma_yasmine_eltit.png"),
    ("YASMINE ELTIT", "firma_yasmine_eltit.png"),
];

/// Medical technologist (TMO) → signature. Substring match, longest key wins.
const TECHNICIAN_SIGNATURES: &[(&str, &str)] = &[
    ("FELIPE ROJAS", "firma_tmo_felipe_rojas.jpg"),
    ("MAURICIO PEREZ", "firma_mauricio_perez.png"),
    ("MAURICIO PÉREZ", "firma_mauricio_perez.png"),
    ("JOSEFINA HERRERA", "firma_josefina_herrera.png"),
    ("JAVIERA COMPAN", "firma_javiera_compan.png"),
    ("HECTOR VERA", "firma_hector_vera.png"),
    ("HÉCTOR VERA", "firma_hector_vera.png"),
];

fn normalize_identity(identity: Option<&str>) -> Option<String> {
    identity
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

/// Table entries whose key occurs in `identity`, longest key first.
/// Equal-length keys keep table order.
fn contains_matches<'a>(
    table: &'a [(&'static str, &'static str)],
    identity: &str,
) -> Vec<&'a (&'static str, &'static str)> {
    let mut hits: Vec<_> = table.iter().filter(|(key, _)| identity.contains(*key)).collect();
    hits.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    hits
}

fn existing(dir: &Path, file: &str) -> Option<PathBuf> {
    let path = dir.join(file);
    if path.is_file() {
        Some(path)
    } else {
        tracing::debug!(path = %path.display(), "Asset file not found");
        None
    }
}

/// Resolves image assets below the configured logo and signature folders.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    logos_dir: PathBuf,
    signatures_dir: PathBuf,
}

impl AssetResolver {
    pub fn new(logos_dir: impl Into<PathBuf>, signatures_dir: impl Into<PathBuf>) -> Self {
        Self {
            logos_dir: logos_dir.into(),
            signatures_dir: signatures_dir.into(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.logos_dir(), config.signatures_dir())
    }

    /// Company logo shown in every report header and in the batch summary.
    pub fn brand_logo(&self) -> Option<PathBuf> {
        existing(&self.logos_dir, BRAND_LOGO)
    }

    pub fn institution_logo(&self, region: Option<&str>) -> Option<PathBuf> {
        let region = normalize_identity(region)?;
        INSTITUTION_LOGOS
            .iter()
            .find(|(key, _)| *key == region)
            .and_then(|(_, file)| existing(&self.logos_dir, file))
    }

    pub fn ophthalmologist_signature(&self, name: Option<&str>) -> Option<PathBuf> {
        let name = normalize_identity(name)?;
        contains_matches(OPHTHALMOLOGIST_SIGNATURES, &name)
            .into_iter()
            .find_map(|(_, file)| existing(&self.signatures_dir, file))
    }

    /// Falls back to the default technician when no name is given or none matches.
    pub fn technician_signature(&self, name: Option<&str>) -> Option<PathBuf> {
        normalize_identity(name)
            .and_then(|name| {
                contains_matches(TECHNICIAN_SIGNATURES, &name)
                    .into_iter()
                    .find_map(|(_, file)| existing(&self.signatures_dir, file))
            })
            .or_else(|| existing(&self.signatures_dir, DEFAULT_TECHNICIAN_SIGNATURE))
    }
}
