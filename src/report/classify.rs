use crate::models::DiagnosisCategory;

/// How a rule tests the normalized (trimmed, uppercased) outcome.
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// Whole-string match against any of the literals.
    Exact(&'static [&'static str]),
    /// Substring match.
    Contains(&'static str),
}

impl Matcher {
    fn matches(&self, outcome: &str) -> bool {
        match self {
            Self::Exact(literals) => literals.contains(&outcome),
            Self::Contains(needle) => outcome.contains(needle),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    matcher: Matcher,
    category: DiagnosisCategory,
}

/// Evaluated top to bottom, first match wins. The exact "DG NORMAL" rule must
/// stay above the "NORMAL" substring rule, and "NORMAL" above "CATARATA".
const RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Exact(&["DG NORMAL", "DGNORMAL"]),
        category: DiagnosisCategory::DiagnosedNormal,
    },
    Rule {
        matcher: Matcher::Contains("NORMAL"),
        category: DiagnosisCategory::Normal,
    },
    Rule {
        matcher: Matcher::Contains("CATARATA"),
        category: DiagnosisCategory::Cataract,
    },
    Rule {
        matcher: Matcher::Exact(&["RD", "RETINOPATIA", "RETINOPATÍA"]),
        category: DiagnosisCategory::DiabeticRetinopathy,
    },
    Rule {
        matcher: Matcher::Exact(&["OTROS"]),
        category: DiagnosisCategory::Other,
    },
];

/// Classify the raw `RESULTADO FINAL` value. Absent or blank outcomes are NORMAL;
/// anything no rule recognizes is OTHER.
pub fn classify_outcome(raw: Option<&str>) -> DiagnosisCategory {
    let outcome = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_uppercase(),
        None => return DiagnosisCategory::Normal,
    };

    RULES
        .iter()
        .find(|rule| rule.matcher.matches(&outcome))
        .map(|rule| rule.category)
        .unwrap_or(DiagnosisCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_outcome_is_normal() {
        assert_eq!(classify_outcome(None), DiagnosisCategory::Normal);
        assert_eq!(classify_outcome(Some("   ")), DiagnosisCategory::Normal);
    }

    #[test]
    fn diagnosed_normal_forms_never_demoted() {
        for raw in ["DG NORMAL", "dgnormal", "  Dg Normal  ", "DGNORMAL"] {
            assert_eq!(
                classify_outcome(Some(raw)),
                DiagnosisCategory::DiagnosedNormal,
                "{raw}"
            );
        }
    }

    #[test]
    fn normal_substring_is_normal() {
        for raw in ["normal", "NORMAL OD", "fondo de ojo normal", "DG NORMAL OI"] {
            assert_eq!(classify_outcome(Some(raw)), DiagnosisCategory::Normal, "{raw}");
        }
    }

    #[test]
    fn normal_rule_wins_over_cataract() {
        assert_eq!(
            classify_outcome(Some("CATARATA / NORMAL")),
            DiagnosisCategory::Normal
        );
    }

    #[test]
    fn cataract_substring() {
        for raw in ["catarata", "SOSPECHA CATARATA", "Catarata OD"] {
            assert_eq!(classify_outcome(Some(raw)), DiagnosisCategory::Cataract, "{raw}");
        }
    }

    #[test]
    fn retinopathy_exact_forms() {
        for raw in ["RD", "rd", "Retinopatia", "retinopatía"] {
            assert_eq!(
                classify_outcome(Some(raw)),
                DiagnosisCategory::DiabeticRetinopathy,
                "{raw}"
            );
        }
    }

    #[test]
    fn retinopathy_requires_exact_match() {
        assert_eq!(
            classify_outcome(Some("RD LEVE")),
            DiagnosisCategory::Other
        );
    }

    #[test]
    fn unrecognized_is_other() {
        for raw in ["GLAUCOMA", "otros", "nevus coroideo", "DMAE"] {
            assert_eq!(classify_outcome(Some(raw)), DiagnosisCategory::Other, "{raw}");
        }
    }
}
