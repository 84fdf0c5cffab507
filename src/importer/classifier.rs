// ==========================================
// Setup Sheet Analyzer - Operation classifier
// ==========================================
// Scope: raw CAM operation code -> OperationCategory
// Rule: case-insensitive prefix test, categories tried in fixed order,
//       first match wins, no match is an error
// ==========================================

use crate::domain::types::OperationCategory;
use crate::importer::error::{ImportError, ImportResult};

/// Order in which categories are tried. Ties between overlapping
/// prefixes are resolved by this order.
pub const CLASSIFICATION_ORDER: [OperationCategory; 5] = [
    OperationCategory::Rough,
    OperationCategory::SemiFinish,
    OperationCategory::Finish,
    OperationCategory::Drilling,
    OperationCategory::FaceMilling,
];

const ROUGH_PREFIXES: &[&str] = &[
    "R_",
    "THSR",
    "I3DROUGH",
    "IROUGH",
    "IMACHINING",
    "IREST",
    "TURBO_CZ",
    "S_TURBO",
    "IMT_",
    "TSLOT",
];

const SEMI_FINISH_PREFIXES: &[&str] = &["SEMI_", "S_HSM"];

const FINISH_PREFIXES: &[&str] = &[
    "HSS", "HSM", "F_", "P_", "F3D", "BN2Z2", "FINI", "DEBUR", "ENGCALL1", "ENGCALL2",
    "ENGCALL3", "ENGCALL4", "ENGCALL5", "ENGCALL6", "ENGCALL7", "ENGCALL8",
];

const DRILLING_PREFIXES: &[&str] = &["D_", "SPOT", "REAMER", "THM_DRILL"];

const FACE_MILLING_PREFIXES: &[&str] = &["FM_"];

/// Prefix list of one category.
pub fn prefixes(category: OperationCategory) -> &'static [&'static str] {
    match category {
        OperationCategory::Rough => ROUGH_PREFIXES,
        OperationCategory::SemiFinish => SEMI_FINISH_PREFIXES,
        OperationCategory::Finish => FINISH_PREFIXES,
        OperationCategory::Drilling => DRILLING_PREFIXES,
        OperationCategory::FaceMilling => FACE_MILLING_PREFIXES,
    }
}

fn starts_with_ignore_case(raw: &str, prefix: &str) -> bool {
    raw.len() >= prefix.len()
        && raw.is_char_boundary(prefix.len())
        && raw[..prefix.len()].eq_ignore_ascii_case(prefix)
}

// ==========================================
// OperationClassifier
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationClassifier;

impl OperationClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Category of `raw_code`, if any prefix matches.
    pub fn try_classify(&self, raw_code: &str) -> Option<OperationCategory> {
        CLASSIFICATION_ORDER.into_iter().find(|category| {
            prefixes(*category)
                .iter()
                .any(|prefix| starts_with_ignore_case(raw_code, prefix))
        })
    }

    /// Classify an operation code from `file_name`.
    ///
    /// # Errors
    /// - `ImportError::UnknownOperation`: no category prefix matches
    pub fn classify(&self, raw_code: &str, file_name: &str) -> ImportResult<OperationCategory> {
        self.try_classify(raw_code)
            .ok_or_else(|| ImportError::UnknownOperation {
                raw_code: raw_code.to_string(),
                file_name: file_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_category() {
        let classifier = OperationClassifier::new();
        let cases = [
            ("R_POCKET_1", OperationCategory::Rough),
            ("IMACHINING 3D", OperationCategory::Rough),
            ("SEMI_WALLS", OperationCategory::SemiFinish),
            ("HSM_CONSTANT_Z", OperationCategory::Finish),
            ("ENGCALL3", OperationCategory::Finish),
            ("D_8.5", OperationCategory::Drilling),
            ("THM_DRILL_M10", OperationCategory::Drilling),
            ("FM_TOP", OperationCategory::FaceMilling),
        ];
        for (raw, expected) in cases {
            assert_eq!(classifier.classify(raw, "job.html").unwrap(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let classifier = OperationClassifier::new();
        assert_eq!(
            classifier.classify("semi_floor", "job.html").unwrap(),
            OperationCategory::SemiFinish
        );
        assert_eq!(
            classifier.classify("spot_c", "job.html").unwrap(),
            OperationCategory::Drilling
        );
    }

    #[test]
    fn test_prefix_not_substring() {
        let classifier = OperationClassifier::new();
        let err = classifier.classify("X_R_POCKET", "job.html").unwrap_err();
        assert_eq!(
            err,
            ImportError::UnknownOperation {
                raw_code: "X_R_POCKET".to_string(),
                file_name: "job.html".to_string(),
            }
        );
    }

    #[test]
    fn test_declared_order_breaks_ties() {
        let classifier = OperationClassifier::new();
        // "S_HSM" is a semi-finish prefix; semi-finish is tried before finish
        assert_eq!(
            classifier.try_classify("S_HSM_PASS"),
            Some(OperationCategory::SemiFinish)
        );
        // "S_TURBO" is a rough prefix; rough is tried first
        assert_eq!(
            classifier.try_classify("S_TURBO_1"),
            Some(OperationCategory::Rough)
        );
    }

    #[test]
    fn test_unknown_and_empty_codes_fail() {
        let classifier = OperationClassifier::new();
        assert!(classifier.classify("CONTOUR", "a.html").is_err());
        assert!(classifier.classify("", "a.html").is_err());
    }

    #[test]
    fn test_non_ascii_code_does_not_panic() {
        let classifier = OperationClassifier::new();
        assert!(classifier.try_classify("خشن").is_none());
        assert!(classifier.try_classify("Rß").is_none());
    }
}
