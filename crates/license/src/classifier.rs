use crate::config::LicenseProfile;
use std::sync::Arc;

/// Terms signalling the query is about license levels at all.
const LICENSE_TERMS: [&str; 7] = [
    "license",
    "edition",
    "tier",
    "standard",
    "pro",
    "enterprise",
    "pro+",
];

/// Terms signalling the query compares something.
const COMPARISON_TERMS: [&str; 6] = [
    "compare",
    "comparison",
    "difference",
    "vs",
    "versus",
    "between",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClassification {
    pub is_license_query: bool,
    pub feature: String,
}

/// Detects license-comparison queries and pulls out the feature they ask
/// about.
pub struct LicenseQueryClassifier {
    profile: Arc<LicenseProfile>,
}

impl LicenseQueryClassifier {
    pub fn new(profile: Arc<LicenseProfile>) -> Self {
        Self { profile }
    }

    /// True iff the query mentions both a license term and a comparison term.
    pub fn is_license_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let has_license = LICENSE_TERMS.iter().any(|term| query.contains(term));
        let has_comparison = COMPARISON_TERMS.iter().any(|term| query.contains(term));
        has_license && has_comparison
    }

    /// The first vocabulary feature appearing in the query.
    ///
    /// Falls back to the profile's configured fallback feature when nothing
    /// matches — a deliberate policy so license answers always have a
    /// subject, not a parsing defect.
    pub fn extract_feature(&self, query: &str) -> String {
        let query = query.to_lowercase();
        self.profile
            .features()
            .iter()
            .find(|feature| query.contains(feature.as_str()))
            .cloned()
            .unwrap_or_else(|| self.profile.fallback_feature().to_string())
    }

    pub fn classify(&self, query: &str) -> QueryClassification {
        QueryClassification {
            is_license_query: self.is_license_query(query),
            feature: self.extract_feature(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classifier() -> LicenseQueryClassifier {
        LicenseQueryClassifier::new(Arc::new(LicenseProfile::builtin().unwrap()))
    }

    #[test]
    fn detects_license_comparison_queries() {
        let c = classifier();
        assert!(c.is_license_query("compare standard vs pro for virtual agent"));
        assert!(c.is_license_query("what is the difference between pro and enterprise licenses"));
    }

    #[test]
    fn plain_product_questions_are_not_license_queries() {
        let c = classifier();
        assert!(!c.is_license_query("what is itsm"));
        // License term without a comparison term is not enough.
        assert!(!c.is_license_query("tell me about the enterprise roadmap"));
        // Comparison term without a license term is not enough either.
        assert!(!c.is_license_query("compare workflow and automation"));
    }

    #[test]
    fn extracts_the_queried_feature() {
        let c = classifier();
        assert_eq!(
            c.extract_feature("compare standard vs pro for virtual agent"),
            "virtual agent"
        );
        assert_eq!(
            c.extract_feature("is performance analytics in enterprise?"),
            "performance analytics"
        );
    }

    #[test]
    fn unmatched_queries_fall_back_to_the_configured_feature() {
        let c = classifier();
        assert_eq!(c.extract_feature("standard vs pro"), "virtual agent");
    }

    #[test]
    fn classify_bundles_both_signals() {
        let c = classifier();
        let result = c.classify("compare standard vs pro for virtual agent");
        assert!(result.is_license_query);
        assert_eq!(result.feature, "virtual agent");
    }
}
