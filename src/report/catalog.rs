//! Clinical text per diagnosis category.
//!
//! Lines are rendered verbatim; an empty line marks a paragraph break.

use crate::models::DiagnosisCategory;

/// Text assembled into a report for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryContent {
    pub findings: &'static [&'static str],
    pub suggestions: &'static [&'static str],
    /// Default next step. Documents only show the record's own referral;
    /// the batch summary falls back to this.
    pub referral: &'static str,
}

const NO_RETINOPATHY: &str = "- No se observan signos de retinopatía diabética.";
const NO_OTHER_FINDINGS: &str = "- No se observan otras alteraciones retinianas significativas.";
const KEEP_CONTROL: &str = "- Mantener control metabólico.";
const YEARLY_CONTROL: &str = "- Control en un año.";

const ANNUAL_FUNDUS: &str = "FONDO DE OJO ANUAL";
const REFER_OPHTHALMOLOGY: &str = "DERIVAR OFTALMOLOGÍA";

const NORMAL: CategoryContent = CategoryContent {
    findings: &[NO_RETINOPATHY, NO_OTHER_FINDINGS],
    suggestions: &[KEEP_CONTROL, YEARLY_CONTROL],
    referral: ANNUAL_FUNDUS,
};

const DIAGNOSED_NORMAL: CategoryContent = CategoryContent {
    findings: &[
        NO_RETINOPATHY,
        NO_OTHER_FINDINGS,
        "",
        "Este examen fue evaluado por oftalmólogo.",
    ],
    suggestions: &[KEEP_CONTROL, YEARLY_CONTROL],
    referral: ANNUAL_FUNDUS,
};

const CATARACT: CategoryContent = CategoryContent {
    findings: &[
        "- No se logró observar la retina en forma nítida en las múltiples fotografías obtenidas, opacidad de medios, sospecha de cataratas.",
    ],
    suggestions: &["- Se sugiere derivar a oftalmología para evaluación de cataratas."],
    referral: REFER_OPHTHALMOLOGY,
};

const DIABETIC_RETINOPATHY: CategoryContent = CategoryContent {
    findings: &["Se observan signos de retinopatía diabética."],
    suggestions: &[
        "- Se sugiere derivar a oftalmología para evaluación y tratamiento.",
        "- Mantener estricto control metabólico.",
    ],
    referral: REFER_OPHTHALMOLOGY,
};

const OTHER: CategoryContent = CategoryContent {
    findings: &[
        "- No se observan signos de retinopatía diabética, pero se aprecian otras alteraciones:",
    ],
    suggestions: &["- Se sugiere derivar a oftalmología para evaluación."],
    referral: REFER_OPHTHALMOLOGY,
};

/// Catalog entry for `category`.
pub fn content_for(category: DiagnosisCategory) -> &'static CategoryContent {
    match category {
        DiagnosisCategory::Normal => &NORMAL,
        DiagnosisCategory::DiagnosedNormal => &DIAGNOSED_NORMAL,
        DiagnosisCategory::Cataract => &CATARACT,
        DiagnosisCategory::DiabeticRetinopathy => &DIABETIC_RETINOPATHY,
        DiagnosisCategory::Other => &OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_findings_and_suggestions() {
        for category in DiagnosisCategory::ALL {
            let content = content_for(*category);
            assert!(
                content.findings.iter().any(|l| !l.is_empty()),
                "{category} has no findings"
            );
            assert!(!content.suggestions.is_empty(), "{category} has no suggestions");
            assert!(!content.referral.is_empty());
        }
    }

    #[test]
    fn diagnosed_normal_appends_qualifier_after_break() {
        let content = content_for(DiagnosisCategory::DiagnosedNormal);
        assert_eq!(content.findings.len(), 4);
        assert_eq!(content.findings[2], "");
        assert_eq!(content.findings[3], "Este examen fue evaluado por oftalmólogo.");
        assert_eq!(
            &content.findings[..2],
            content_for(DiagnosisCategory::Normal).findings
        );
    }

    #[test]
    fn retinopathy_has_single_finding_and_two_suggestions() {
        let content = content_for(DiagnosisCategory::DiabeticRetinopathy);
        assert_eq!(content.findings.len(), 1);
        assert_eq!(content.suggestions.len(), 2);
    }

    #[test]
    fn default_referrals() {
        assert_eq!(content_for(DiagnosisCategory::Normal).referral, "FONDO DE OJO ANUAL");
        assert_eq!(content_for(DiagnosisCategory::Other).referral, "DERIVAR OFTALMOLOGÍA");
    }
}
