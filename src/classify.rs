//! Eligibility check for discovered files.
//!
//! A file qualifies for upload when its name ends with one of the accepted
//! extensions, compared case-insensitively. The check never opens the file.

/// Result of classifying a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The file may be uploaded.
    Eligible,
    /// The file must be routed to the error directory.
    Ineligible { reason: String },
}

/// Extension-based file classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    accepted: Vec<String>,
}

impl Classifier {
    /// Create a classifier for the given extension set.
    pub fn new(accepted: &[String]) -> Self {
        Self {
            accepted: accepted.iter().map(|ext| ext.to_lowercase()).collect(),
        }
    }

    /// Classify a file by name.
    pub fn classify(&self, file_name: &str) -> Classification {
        let lower = file_name.to_lowercase();
        if self.accepted.iter().any(|ext| lower.ends_with(ext.as_str())) {
            Classification::Eligible
        } else {
            Classification::Ineligible {
                reason: format!(
                    "unsupported extension (accepted: {})",
                    self.accepted.join(", ")
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_only() -> Classifier {
        Classifier::new(&[".xml".to_string()])
    }

    #[test]
    fn test_extension_case_is_ignored() {
        assert_eq!(xml_only().classify("report.XML"), Classification::Eligible);
        assert_eq!(xml_only().classify("report.xml"), Classification::Eligible);
        assert_eq!(xml_only().classify("report.Xml"), Classification::Eligible);
    }

    #[test]
    fn test_wrong_extension_is_ineligible() {
        assert!(matches!(
            xml_only().classify("notes.txt"),
            Classification::Ineligible { .. }
        ));
    }

    #[test]
    fn test_name_without_extension_is_ineligible() {
        assert!(matches!(
            xml_only().classify("README"),
            Classification::Ineligible { .. }
        ));
    }

    #[test]
    fn test_extension_set_is_configurable() {
        let classifier = Classifier::new(&[".xml".to_string(), ".CSV".to_string()]);
        assert_eq!(classifier.classify("data.csv"), Classification::Eligible);
        assert_eq!(classifier.classify("data.Csv"), Classification::Eligible);
        assert!(matches!(
            classifier.classify("data.json"),
            Classification::Ineligible { .. }
        ));
    }

    #[test]
    fn test_rejection_reason_names_accepted_set() {
        match xml_only().classify("notes.txt") {
            Classification::Ineligible { reason } => assert!(reason.contains(".xml")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
