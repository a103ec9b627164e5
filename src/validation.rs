//! Validation of a profile's dietary restrictions and accessibilities
//! against the reference catalogs.
//!
//! There is no partial acceptance: a single unknown label in either list
//! fails the whole check.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::catalog::{is_valid_accessibility, is_valid_dietary};

/// Labels rejected by the catalogs, per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreferenceReport {
    pub invalid_dietary: Vec<String>,
    pub invalid_accessibilities: Vec<String>,
}

impl PreferenceReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.invalid_dietary.is_empty() && self.invalid_accessibilities.is_empty()
    }
}

impl fmt::Display for PreferenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.invalid_dietary.is_empty() {
            parts.push(format!(
                "invalid dietary restrictions: {}",
                self.invalid_dietary.join(", ")
            ));
        }
        if !self.invalid_accessibilities.is_empty() {
            parts.push(format!(
                "invalid accessibilities: {}",
                self.invalid_accessibilities.join(", ")
            ));
        }
        if parts.is_empty() {
            write!(f, "all preferences valid")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

fn invalid_labels(labels: &[String], is_valid: fn(&str) -> bool) -> Vec<String> {
    labels
        .iter()
        .filter(|label| !is_valid(label.as_str()))
        .cloned()
        .collect()
}

/// Check both lists, returning the full report when anything is rejected
pub fn validate_preferences(
    dietary_restrictions: &[String],
    accessibilities: &[String],
) -> Result<(), PreferenceReport> {
    let report = PreferenceReport {
        invalid_dietary: invalid_labels(dietary_restrictions, is_valid_dietary),
        invalid_accessibilities: invalid_labels(accessibilities, is_valid_accessibility),
    };

    if report.is_valid() {
        return Ok(());
    }

    if !report.invalid_dietary.is_empty() {
        warn!(
            "Invalid dietary restrictions: {}",
            report.invalid_dietary.join(", ")
        );
    }
    if !report.invalid_accessibilities.is_empty() {
        warn!(
            "Invalid accessibilities: {}",
            report.invalid_accessibilities.join(", ")
        );
    }

    Err(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_all_valid() {
        let result = validate_preferences(
            &labels(&["Vegan", "Nut allergy"]),
            &labels(&["Wheelchair user"]),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_lists_pass() {
        assert!(validate_preferences(&[], &[]).is_ok());
    }

    #[test]
    fn test_single_invalid_label_fails_whole_request() {
        let report = validate_preferences(
            &labels(&["Vegan", "Unicorn-free", "Halal"]),
            &labels(&["None"]),
        )
        .unwrap_err();

        assert_eq!(report.invalid_dietary, vec!["Unicorn-free"]);
        assert!(report.invalid_accessibilities.is_empty());
        assert!(report.to_string().contains("Unicorn-free"));
    }

    #[test]
    fn test_reports_both_categories() {
        let report = validate_preferences(
            &labels(&["Carnivore"]),
            &labels(&["Autism", "Night owl", "Jetlag"]),
        )
        .unwrap_err();

        assert_eq!(report.invalid_dietary, vec!["Carnivore"]);
        assert_eq!(report.invalid_accessibilities, vec!["Night owl", "Jetlag"]);
        assert_eq!(
            report.to_string(),
            "invalid dietary restrictions: Carnivore; invalid accessibilities: Night owl, Jetlag"
        );
    }
}
