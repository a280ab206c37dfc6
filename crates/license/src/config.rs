use crate::tiers::Tier;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_PROFILE: &str = include_str!("../../../profiles/license.json");

/// License analysis configuration: the feature vocabulary, synonym groups,
/// and the default-knowledge table applied when no concrete tier evidence
/// exists. The defaults encode assumptions about a specific licensing scheme,
/// which is exactly why they live in a profile file rather than in code.
#[derive(Clone, Debug)]
pub struct LicenseProfile {
    features: Vec<String>,
    fallback_feature: String,
    synonyms: BTreeMap<String, Vec<String>>,
    defaults: BTreeMap<String, BTreeMap<Tier, bool>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    schema_version: Option<u32>,
    features: Option<Vec<String>>,
    fallback_feature: Option<String>,
    synonyms: Option<BTreeMap<String, Vec<String>>>,
    defaults: Option<BTreeMap<String, BTreeMap<Tier, bool>>>,
}

impl LicenseProfile {
    /// The profile shipped with the binary (`profiles/license.json`).
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PROFILE).context("built-in license profile is invalid")
    }

    /// Load an operator-supplied profile, replacing the built-in one.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read license profile {}", path.display()))?;
        Self::from_json(&data)
            .with_context(|| format!("invalid license profile {}", path.display()))
    }

    fn from_json(data: &str) -> Result<Self> {
        let raw: RawProfile = serde_json::from_str(data)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawProfile) -> Result<Self> {
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(anyhow!(
                    "license profile schema_version {schema_version} is not supported (expected 1)"
                ));
            }
        }

        let features: Vec<String> = raw
            .features
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.trim().to_lowercase())
            .collect();
        let fallback_feature = raw
            .fallback_feature
            .map(|f| f.trim().to_lowercase())
            .unwrap_or_default();
        let synonyms = raw
            .synonyms
            .unwrap_or_default()
            .into_iter()
            .map(|(base, variants)| {
                (
                    base.trim().to_lowercase(),
                    variants.into_iter().map(|v| v.trim().to_lowercase()).collect(),
                )
            })
            .collect();
        let defaults = raw
            .defaults
            .unwrap_or_default()
            .into_iter()
            .map(|(feature, tiers)| (feature.trim().to_lowercase(), tiers))
            .collect();

        let profile = Self {
            features,
            fallback_feature,
            synonyms,
            defaults,
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(anyhow!("license profile must name at least one feature"));
        }
        if self.fallback_feature.is_empty() {
            return Err(anyhow!("license profile must set fallback_feature"));
        }
        if !self.features.contains(&self.fallback_feature) {
            return Err(anyhow!(
                "fallback_feature '{}' is not in the feature vocabulary",
                self.fallback_feature
            ));
        }
        for feature in self.defaults.keys() {
            if !self.features.contains(feature) {
                return Err(anyhow!(
                    "defaults entry '{feature}' is not in the feature vocabulary"
                ));
            }
        }
        Ok(())
    }

    /// Feature vocabulary, in match-priority order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn fallback_feature(&self) -> &str {
        &self.fallback_feature
    }

    /// Default-knowledge row for a feature, when the profile carries one.
    pub fn defaults_for(&self, feature: &str) -> Option<&BTreeMap<Tier, bool>> {
        self.defaults.get(feature)
    }

    /// Fuzzy feature-name equality: direct substring either way, or both
    /// names inside the same synonym group.
    pub fn feature_matches(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if a.contains(&b) || b.contains(&a) {
            return true;
        }
        self.synonyms.iter().any(|(base, variants)| {
            let in_group = |name: &str| name == base || variants.iter().any(|v| v == name);
            in_group(&a) && in_group(&b)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_profile_parses_and_validates() {
        let profile = LicenseProfile::builtin().unwrap();
        assert!(profile.features().contains(&"virtual agent".to_string()));
        assert_eq!(profile.fallback_feature(), "virtual agent");
        let defaults = profile.defaults_for("virtual agent").unwrap();
        assert_eq!(defaults.get(&Tier::Standard), Some(&false));
        assert_eq!(defaults.get(&Tier::Pro), Some(&true));
    }

    #[test]
    fn feature_matches_by_substring() {
        let profile = LicenseProfile::builtin().unwrap();
        assert!(profile.feature_matches("virtual agent", "Virtual Agent (VA)"));
        assert!(profile.feature_matches("agent", "virtual agent"));
        assert!(!profile.feature_matches("workflow", "virtual agent"));
    }

    #[test]
    fn feature_matches_through_synonym_groups() {
        let profile = LicenseProfile::builtin().unwrap();
        assert!(profile.feature_matches("virtual agent", "chatbot"));
        assert!(profile.feature_matches("va", "chatbot"));
        assert!(!profile.feature_matches("va", "reporting"));
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let err = LicenseProfile::from_json(r#"{"schema_version": 2}"#).unwrap_err();
        assert!(err.to_string().contains("schema_version"));
    }

    #[test]
    fn rejects_fallback_outside_vocabulary() {
        let err = LicenseProfile::from_json(
            r#"{"features": ["workflow"], "fallback_feature": "virtual agent"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("fallback_feature"));
    }

    #[test]
    fn rejects_defaults_for_unknown_feature() {
        let err = LicenseProfile::from_json(
            r#"{
                "features": ["workflow"],
                "fallback_feature": "workflow",
                "defaults": {"virtual agent": {"pro": true}}
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("defaults entry"));
    }
}
