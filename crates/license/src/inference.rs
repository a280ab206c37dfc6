use crate::config::LicenseProfile;
use crate::tables::{LicenseTableParser, ParsedBlock};
use crate::tiers::{unknown_tiers, Availability, Tier, TierMap};
use serde::Serialize;
use std::sync::Arc;

/// The inference result for one feature.
#[derive(Debug, Clone, Serialize)]
pub struct TierReport {
    pub feature: String,
    pub tiers: TierMap,
    /// Whether any direct evidence (table or prose) was found at all.
    pub has_concrete_info: bool,
    /// True when the tiers come from the profile's default-knowledge table
    /// rather than from the slides.
    pub used_defaults: bool,
    pub tables: Vec<ParsedBlock>,
}

/// Fills gaps in partially known tier availability.
///
/// Direct evidence is merged first (tables, tier feature lists, literal
/// prose statements), then a forward-and-backward monotone fill runs over
/// the tier order: entitlement never regresses at a higher tier once a
/// lower tier is known to have the feature, and tiers below the lowest
/// confirmed tier are not assumed to have it. Whatever stays unknown is
/// reported as unknown, never guessed.
pub struct TierInferencer {
    profile: Arc<LicenseProfile>,
    parser: LicenseTableParser,
}

impl TierInferencer {
    pub fn new(profile: Arc<LicenseProfile>) -> Self {
        let parser = LicenseTableParser::new(Arc::clone(&profile));
        Self { profile, parser }
    }

    pub fn infer_tiers<'a, I>(&self, feature: &str, slide_texts: I) -> TierReport
    where
        I: IntoIterator<Item = &'a str>,
    {
        let feature = feature.trim().to_lowercase();
        let texts: Vec<&str> = slide_texts.into_iter().collect();

        let tables: Vec<ParsedBlock> = texts
            .iter()
            .flat_map(|text| self.parser.parse(text))
            .filter(|block| *block != ParsedBlock::Unrecognized)
            .collect();

        let mut tiers = unknown_tiers();
        self.merge_table_evidence(&feature, &tables, &mut tiers);
        for text in &texts {
            merge_prose_evidence(&feature, text, &mut tiers);
        }

        let has_evidence = tiers.values().any(|a| a.is_known());
        let has_concrete_info = has_evidence || !tables.is_empty();

        let mut used_defaults = false;
        if !has_evidence {
            if let Some(defaults) = self.profile.defaults_for(&feature) {
                log::info!("No tier evidence for '{feature}', using profile defaults");
                for (&tier, &included) in defaults {
                    tiers.insert(tier, Availability::from(included));
                }
                used_defaults = true;
            }
        } else {
            monotone_fill(&mut tiers);
        }

        TierReport {
            feature,
            tiers,
            has_concrete_info,
            used_defaults,
            tables,
        }
    }

    fn merge_table_evidence(&self, feature: &str, tables: &[ParsedBlock], tiers: &mut TierMap) {
        for block in tables {
            match block {
                ParsedBlock::LicenseTable { features, .. } => {
                    for (name, availability) in features {
                        if !self.profile.feature_matches(feature, name) {
                            continue;
                        }
                        for (&tier, &included) in availability {
                            tiers.insert(tier, Availability::from(included));
                        }
                    }
                }
                ParsedBlock::TierFeatures { features_by_tier } => {
                    for (&tier, names) in features_by_tier {
                        if names
                            .iter()
                            .any(|name| self.profile.feature_matches(feature, name))
                        {
                            tiers.insert(tier, Availability::Included);
                        }
                    }
                }
                ParsedBlock::Unrecognized => {}
            }
        }
    }
}

/// Literal prose statements about one feature in one tier, e.g.
/// `"virtual agent is included in pro"`. Negative statements are applied
/// after positive ones so an explicit denial wins within the same text.
fn merge_prose_evidence(feature: &str, text: &str, tiers: &mut TierMap) {
    let text = text.to_lowercase();

    for tier in Tier::ORDER {
        let name = tier.as_str();
        let positive = [
            format!("{feature} is included in {name}"),
            format!("{feature} is available in {name}"),
            format!("{name} includes {feature}"),
            format!("{name} license includes {feature}"),
        ];
        let negative = [
            format!("{feature} is not included in {name}"),
            format!("{feature} is not available in {name}"),
            format!("{name} does not include {feature}"),
            format!("{name} license does not include {feature}"),
        ];

        for pattern in &positive {
            if contains_phrase(&text, pattern) {
                tiers.insert(tier, Availability::Included);
            }
        }
        for pattern in &negative {
            if contains_phrase(&text, pattern) {
                tiers.insert(tier, Availability::NotIncluded);
            }
        }
    }
}

/// Substring match that refuses a match immediately followed by `+`, so a
/// statement about `pro+` is never read as evidence about `pro`.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let mut start = 0;
    while let Some(offset) = text[start..].find(phrase) {
        let end = start + offset + phrase.len();
        if text[end..].chars().next() != Some('+') {
            return true;
        }
        start = start + offset + 1;
    }
    false
}

/// The forward-and-backward monotone fill over the tier order, anchored at
/// the lowest tier confirmed to have the feature.
///
/// Forward: every unknown tier above the anchor has the feature too.
/// Backward: every unknown tier strictly below the anchor does not —
/// entitlement never regresses upward, but lower tiers are not assumed to
/// have it without evidence. Without a confirmed tier there is nothing to
/// anchor on and unknowns stay unknown.
fn monotone_fill(tiers: &mut TierMap) {
    let Some(lowest_included) = Tier::ORDER
        .iter()
        .copied()
        .find(|tier| tiers.get(tier) == Some(&Availability::Included))
    else {
        return;
    };

    for tier in Tier::ORDER {
        if tiers.get(&tier) != Some(&Availability::Unknown) {
            continue;
        }
        let filled = if tier > lowest_included {
            Availability::Included
        } else {
            Availability::NotIncluded
        };
        tiers.insert(tier, filled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inferencer() -> TierInferencer {
        TierInferencer::new(Arc::new(LicenseProfile::builtin().unwrap()))
    }

    fn tier_values(report: &TierReport) -> Vec<Availability> {
        Tier::ORDER.iter().map(|t| report.tiers[t]).collect()
    }

    #[test]
    fn table_evidence_propagates_up_and_down() {
        // The lowest known-true tier propagates upward; the tier below the
        // lowest confirmed one is marked absent by its own table cell.
        let slides = ["Table 1:\nFeature | Standard | Pro\nVirtual Agent | No | Yes"];
        let report = inferencer().infer_tiers("virtual agent", slides);

        assert_eq!(
            tier_values(&report),
            vec![
                Availability::NotIncluded,
                Availability::Included,
                Availability::Included,
                Availability::Included,
            ]
        );
        assert!(report.has_concrete_info);
        assert!(!report.used_defaults);
    }

    #[test]
    fn prose_statements_are_direct_evidence() {
        let slides = ["Note that virtual agent is included in pro deployments."];
        let report = inferencer().infer_tiers("virtual agent", slides);
        assert_eq!(report.tiers[&Tier::Pro], Availability::Included);
        assert_eq!(report.tiers[&Tier::ProPlus], Availability::Included);
        // Nothing confirmed standard either way below the lowest included
        // tier: backward fill marks it absent.
        assert_eq!(report.tiers[&Tier::Standard], Availability::NotIncluded);
        assert!(report.has_concrete_info);
    }

    #[test]
    fn negative_prose_wins_over_positive_in_the_same_text() {
        let slides = [
            "virtual agent is included in standard\nvirtual agent is not included in standard",
        ];
        let report = inferencer().infer_tiers("virtual agent", slides);
        assert_eq!(report.tiers[&Tier::Standard], Availability::NotIncluded);
    }

    #[test]
    fn statements_about_pro_plus_do_not_leak_into_pro() {
        let slides = ["now assist is available in pro+ only."];
        let report = inferencer().infer_tiers("now assist", slides);
        assert_eq!(report.tiers[&Tier::ProPlus], Availability::Included);
        // Pro must stay below the confirmed tier, not inherit its value.
        assert_eq!(report.tiers[&Tier::Pro], Availability::NotIncluded);
        assert_eq!(report.tiers[&Tier::Standard], Availability::NotIncluded);
        assert_eq!(report.tiers[&Tier::Enterprise], Availability::Included);
    }

    #[test]
    fn lowest_known_false_leaves_higher_tiers_unknown() {
        let slides = ["virtual agent is not included in standard"];
        let report = inferencer().infer_tiers("virtual agent", slides);
        assert_eq!(report.tiers[&Tier::Standard], Availability::NotIncluded);
        // A known-false floor says nothing about higher tiers.
        assert_eq!(report.tiers[&Tier::Pro], Availability::Unknown);
        assert_eq!(report.tiers[&Tier::Enterprise], Availability::Unknown);
    }

    #[test]
    fn defaults_apply_only_when_nothing_is_known() {
        let report = inferencer().infer_tiers("virtual agent", ["Totally unrelated slide."]);
        assert_eq!(
            tier_values(&report),
            vec![
                Availability::NotIncluded,
                Availability::Included,
                Availability::Included,
                Availability::Included,
            ]
        );
        assert!(report.used_defaults);
        assert!(!report.has_concrete_info);
    }

    #[test]
    fn features_without_defaults_stay_unknown() {
        let report = inferencer().infer_tiers("cmdb", ["Totally unrelated slide."]);
        assert!(report.tiers.values().all(|a| !a.is_known()));
        assert!(!report.used_defaults);
        assert!(!report.has_concrete_info);
    }

    #[test]
    fn tier_feature_lists_count_as_inclusion() {
        let slides = ["Pro includes:\n• Virtual Agent\n• Performance Analytics\n\nMore text."];
        let report = inferencer().infer_tiers("virtual agent", slides);
        assert_eq!(report.tiers[&Tier::Pro], Availability::Included);
        assert_eq!(report.tiers[&Tier::Enterprise], Availability::Included);
    }

    #[test]
    fn synonym_rows_match_the_queried_feature() {
        let slides = ["Table 1:\nFeature | Standard | Pro\nChatbot | No | Yes"];
        let report = inferencer().infer_tiers("virtual agent", slides);
        assert_eq!(report.tiers[&Tier::Pro], Availability::Included);
        assert_eq!(report.tiers[&Tier::Standard], Availability::NotIncluded);
    }

    #[test]
    fn output_is_monotone_once_any_tier_is_included() {
        // Mixed, partial evidence across several slides.
        let slides = [
            "Table 1:\nFeature | Pro\nVirtual Agent | Yes",
            "virtual agent is not included in standard",
        ];
        let report = inferencer().infer_tiers("virtual agent", slides);

        let mut seen_included = false;
        for tier in Tier::ORDER {
            match report.tiers[&tier] {
                Availability::Included => seen_included = true,
                Availability::NotIncluded => {
                    assert!(!seen_included, "availability regressed above {tier}")
                }
                Availability::Unknown => {}
            }
        }
        assert!(seen_included);
    }
}
