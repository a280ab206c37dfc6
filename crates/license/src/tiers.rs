use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An ordered license level. The derived `Ord` follows entitlement order:
/// `Standard < Pro < ProPlus < Enterprise`. That order is semantically
/// meaningful — tier inference propagates availability along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Standard,
    Pro,
    #[serde(rename = "pro+")]
    ProPlus,
    Enterprise,
}

impl Tier {
    /// All tiers, ascending by entitlement.
    pub const ORDER: [Tier; 4] = [Tier::Standard, Tier::Pro, Tier::ProPlus, Tier::Enterprise];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Pro => "pro",
            Tier::ProPlus => "pro+",
            Tier::Enterprise => "enterprise",
        }
    }

    /// The tier a table header cell refers to, if any.
    ///
    /// Picks the most specific mention: a `Pro+` cell must never be claimed
    /// by `pro`, whose name it contains.
    pub fn from_header_cell(cell: &str) -> Option<Tier> {
        let cell = cell.to_lowercase();
        if cell.contains("pro+") {
            return Some(Tier::ProPlus);
        }
        if cell.contains("enterprise") {
            return Some(Tier::Enterprise);
        }
        if cell.contains("standard") {
            return Some(Tier::Standard);
        }
        if cell.contains("pro") {
            return Some(Tier::Pro);
        }
        None
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier availability for one feature: known-present, known-absent, or no
/// information. Serializes as `true` / `false` / `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Availability {
    Included,
    NotIncluded,
    Unknown,
}

impl Availability {
    pub fn is_known(self) -> bool {
        self != Availability::Unknown
    }
}

impl From<bool> for Availability {
    fn from(included: bool) -> Self {
        if included {
            Availability::Included
        } else {
            Availability::NotIncluded
        }
    }
}

impl From<Option<bool>> for Availability {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Availability::Unknown, Availability::from)
    }
}

impl From<Availability> for Option<bool> {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Included => Some(true),
            Availability::NotIncluded => Some(false),
            Availability::Unknown => None,
        }
    }
}

/// Per-tier availability of one feature, iterated in tier order.
pub type TierMap = BTreeMap<Tier, Availability>;

/// A map with every tier unknown — the starting point for evidence merging.
pub fn unknown_tiers() -> TierMap {
    Tier::ORDER
        .iter()
        .map(|&tier| (tier, Availability::Unknown))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tier_order_is_ascending_entitlement() {
        assert!(Tier::Standard < Tier::Pro);
        assert!(Tier::Pro < Tier::ProPlus);
        assert!(Tier::ProPlus < Tier::Enterprise);
    }

    #[test]
    fn header_cells_map_to_most_specific_tier() {
        assert_eq!(Tier::from_header_cell("Pro+"), Some(Tier::ProPlus));
        assert_eq!(Tier::from_header_cell("Pro"), Some(Tier::Pro));
        assert_eq!(Tier::from_header_cell("Pro+ License"), Some(Tier::ProPlus));
        assert_eq!(Tier::from_header_cell("Standard Edition"), Some(Tier::Standard));
        assert_eq!(Tier::from_header_cell("Enterprise"), Some(Tier::Enterprise));
        assert_eq!(Tier::from_header_cell("Feature"), None);
    }

    #[test]
    fn availability_serializes_as_nullable_bool() {
        assert_eq!(
            serde_json::to_string(&Availability::Included).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&Availability::NotIncluded).unwrap(),
            "false"
        );
        assert_eq!(serde_json::to_string(&Availability::Unknown).unwrap(), "null");
        assert_eq!(
            serde_json::from_str::<Availability>("null").unwrap(),
            Availability::Unknown
        );
    }

    #[test]
    fn tier_serializes_by_name() {
        assert_eq!(serde_json::to_string(&Tier::ProPlus).unwrap(), "\"pro+\"");
        assert_eq!(
            serde_json::from_str::<Tier>("\"standard\"").unwrap(),
            Tier::Standard
        );
    }

    #[test]
    fn unknown_tiers_covers_every_tier() {
        let map = unknown_tiers();
        assert_eq!(map.len(), Tier::ORDER.len());
        assert!(map.values().all(|&a| a == Availability::Unknown));
    }
}
