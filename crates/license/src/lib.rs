//! # Deck License
//!
//! License-tier analysis over slide text: a total order of tiers, a parser
//! for capability tables and prose tier statements, and an inference pass
//! that fills gaps in partial tier evidence under a monotonicity assumption
//! (a feature present in a tier is present in every higher tier).
//!
//! The feature vocabulary, synonym groups, and the default-knowledge table
//! are configuration (`profiles/license.json`), not code — the built-in
//! profile can be replaced wholesale by an operator file.

mod classifier;
mod config;
mod inference;
mod tables;
mod tiers;

pub use classifier::{LicenseQueryClassifier, QueryClassification};
pub use config::LicenseProfile;
pub use inference::{TierInferencer, TierReport};
pub use tables::{LicenseTableParser, ParsedBlock};
pub use tiers::{Availability, Tier, TierMap};
