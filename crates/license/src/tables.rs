use crate::config::LicenseProfile;
use crate::tiers::Tier;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const TABLES_MARKER: &str = "--- Tables ---";

static TABLE_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Table \d+:").expect("valid table header pattern"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[•\-\*]\s*(.+)$").expect("valid bullet pattern"));

/// One structured block recovered from slide text.
///
/// `Unrecognized` keeps format quirks (a pipe table with no tier column)
/// out of the inference stage without losing the fact that a table was
/// there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedBlock {
    LicenseTable {
        tier_columns: BTreeMap<Tier, usize>,
        features: BTreeMap<String, BTreeMap<Tier, bool>>,
    },
    TierFeatures {
        features_by_tier: BTreeMap<Tier, Vec<String>>,
    },
    Unrecognized,
}

/// Extracts tier-availability tables and prose tier statements from the
/// extractor's structured slide text.
pub struct LicenseTableParser {
    profile: Arc<LicenseProfile>,
}

impl LicenseTableParser {
    pub fn new(profile: Arc<LicenseProfile>) -> Self {
        Self { profile }
    }

    pub fn parse(&self, text: &str) -> Vec<ParsedBlock> {
        let mut blocks = Vec::new();

        if let Some(section) = tables_section(text) {
            for raw_table in TABLE_HEADER_RE.split(section) {
                let rows: Vec<&str> = raw_table
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect();
                // Need at least a header and one data row.
                if rows.len() < 2 {
                    continue;
                }
                blocks.push(process_table(&rows));
            }
        }

        let features_by_tier = self.tier_feature_blocks(text);
        if !features_by_tier.is_empty() {
            blocks.push(ParsedBlock::TierFeatures { features_by_tier });
        }

        blocks
    }

    /// Prose statements like `"Pro includes ..."` or `"available in
    /// Standard: ..."` — each runs to the next blank line and names the
    /// features of one tier.
    fn tier_feature_blocks(&self, text: &str) -> BTreeMap<Tier, Vec<String>> {
        let lower = text.to_lowercase();
        let mut features_by_tier: BTreeMap<Tier, Vec<String>> = BTreeMap::new();

        for tier in Tier::ORDER {
            let name = tier.as_str();
            let patterns = [
                format!("{name} includes"),
                format!("{name} license includes"),
                format!("available in {name}"),
                format!("{name} edition features"),
                format!("{name} edition"),
                format!("{name} license"),
            ];

            for pattern in &patterns {
                let Some(idx) = lower.find(pattern.as_str()) else {
                    continue;
                };
                let end = lower[idx..]
                    .find("\n\n")
                    .map_or(lower.len(), |offset| idx + offset);
                let found = self.features_from_section(&lower[idx..end]);
                if found.is_empty() {
                    continue;
                }
                let entry = features_by_tier.entry(tier).or_default();
                for feature in found {
                    if !entry.contains(&feature) {
                        entry.push(feature);
                    }
                }
            }
        }

        features_by_tier
    }

    fn features_from_section(&self, section: &str) -> Vec<String> {
        let mut found = Vec::new();
        for feature in self.profile.features() {
            if section.contains(feature.as_str()) {
                found.push(feature.clone());
            }
        }
        // Bullet lines are feature candidates too; tiny fragments are noise.
        for capture in BULLET_RE.captures_iter(section) {
            let item = capture[1].trim().to_string();
            if item.len() > 3 && !found.contains(&item) {
                found.push(item);
            }
        }
        found
    }
}

/// The region of slide text holding pipe tables.
///
/// Normally that is everything between the `--- Tables ---` banner and the
/// next section marker; extractor output sometimes omits the banner, in
/// which case the first `Table N:` header starts the region.
fn tables_section(text: &str) -> Option<&str> {
    if let Some(idx) = text.find(TABLES_MARKER) {
        let rest = &text[idx + TABLES_MARKER.len()..];
        let end = rest.find("---").unwrap_or(rest.len());
        return Some(&rest[..end]);
    }
    TABLE_HEADER_RE.find(text).map(|m| {
        let rest = &text[m.start()..];
        let end = rest.find("---").unwrap_or(rest.len());
        &rest[..end]
    })
}

fn process_table(rows: &[&str]) -> ParsedBlock {
    let headers: Vec<String> = rows[0]
        .split('|')
        .map(|cell| cell.trim().to_lowercase())
        .collect();

    let mut tier_columns: BTreeMap<Tier, usize> = BTreeMap::new();
    for (idx, cell) in headers.iter().enumerate() {
        if let Some(tier) = Tier::from_header_cell(cell) {
            tier_columns.entry(tier).or_insert(idx);
        }
    }
    if tier_columns.is_empty() {
        return ParsedBlock::Unrecognized;
    }

    let mut features = BTreeMap::new();
    for row in &rows[1..] {
        let cells: Vec<String> = row
            .split('|')
            .map(|cell| cell.trim().to_lowercase())
            .collect();
        if cells.len() < headers.len() {
            // Malformed row.
            continue;
        }

        let feature_name = cells[0].clone();
        if feature_name.is_empty() || cells[1..].iter().all(String::is_empty) {
            continue;
        }

        let mut availability = BTreeMap::new();
        for (&tier, &column) in &tier_columns {
            if let Some(cell) = cells.get(column) {
                availability.insert(tier, interpret_cell(cell));
            }
        }
        features.insert(feature_name, availability);
    }

    ParsedBlock::LicenseTable {
        tier_columns,
        features,
    }
}

/// Whether a table cell reads as "the feature is available".
///
/// Negative forms and add-on wording are checked first — `"not included"`
/// must never satisfy the `"included"` positive token. After those, the
/// positive vocabulary (`yes`, `y`, `included`, `available`, `x`, `true`,
/// checkmarks) and any other non-empty cell both count as available.
fn interpret_cell(cell: &str) -> bool {
    let cell = cell.trim();
    if cell.is_empty() {
        return false;
    }
    if matches!(cell, "no" | "n" | "-" | "false") {
        return false;
    }
    if cell.contains("not included") || cell.contains("not available") {
        return false;
    }
    // Available as an add-on means not included in the tier itself.
    if cell.contains("add-on") || cell.contains("addon") || cell.contains("additional") {
        return false;
    }
    true
}
