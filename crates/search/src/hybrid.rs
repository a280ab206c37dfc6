use crate::error::{Result, SearchError};
use crate::keyword::KeywordScorer;
use crate::semantic::{SemanticOutcome, SemanticScorer};
use deck_license::LicenseQueryClassifier;
use deck_slide_store::{ScoredSlide, SlideStore};
use std::sync::Arc;

/// Maximum possible score of the license matrix rubric; used to normalize.
const LICENSE_RUBRIC_MAX: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Global switch; callers can still disable semantic scoring per
    /// request, but not enable it when this is off.
    pub semantic_enabled: bool,
    /// Queries longer than this are rejected as invalid before scoring.
    pub max_query_len: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            semantic_enabled: true,
            max_query_len: 512,
        }
    }
}

/// Orchestrates the scorers: picks semantic or keyword mode, special-cases
/// license-comparison queries, merges and deduplicates results.
pub struct HybridRetriever {
    store: Arc<SlideStore>,
    semantic: Option<SemanticScorer>,
    classifier: LicenseQueryClassifier,
    config: RetrieverConfig,
}

impl HybridRetriever {
    pub fn new(
        store: Arc<SlideStore>,
        semantic: Option<SemanticScorer>,
        classifier: LicenseQueryClassifier,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            store,
            semantic,
            classifier,
            config,
        }
    }

    /// Retrieve up to `max_results` slides ranked by relevance.
    ///
    /// `use_semantic` overrides the global semantic switch downward only.
    /// An empty store or a query matching nothing returns an empty list,
    /// not an error.
    pub async fn retrieve(
        &self,
        query: &str,
        max_results: usize,
        use_semantic: Option<bool>,
    ) -> Result<Vec<ScoredSlide>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let len = query.chars().count();
        if len > self.config.max_query_len {
            return Err(SearchError::QueryTooLong {
                len,
                max: self.config.max_query_len,
            });
        }

        let semantic_mode =
            self.config.semantic_enabled && use_semantic.unwrap_or(true) && self.semantic.is_some();
        log::debug!(
            "Retrieve: mode={}, limit={max_results}",
            if semantic_mode { "semantic" } else { "keyword" }
        );

        let mut results = match (semantic_mode, self.semantic.as_ref()) {
            (true, Some(scorer)) => match scorer.score_all(query, &self.store).await {
                SemanticOutcome::Scored(scores) => self.rank_semantic(scores, max_results),
                SemanticOutcome::Unavailable { reason } => {
                    log::warn!("Semantic search unavailable ({reason}); falling back to keyword search");
                    self.keyword_results(query, max_results)
                }
            },
            _ => self.keyword_results(query, max_results),
        };

        if self.classifier.is_license_query(query) {
            let license_results = self.license_search(query, max_results);
            log::debug!("License search matched {} slides", license_results.len());
            results = merge_prepending(license_results, results, max_results);
        }

        log::info!("Retrieved {} slides", results.len());
        Ok(results)
    }

    fn rank_semantic(&self, mut scores: Vec<(String, f32)>, max_results: usize) -> Vec<ScoredSlide> {
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(max_results);
        scores
            .into_iter()
            .filter_map(|(slide_id, score)| {
                self.store
                    .get(&slide_id)
                    .map(|slide| ScoredSlide::new(slide_id.clone(), slide.text.clone(), score))
            })
            .collect()
    }

    fn keyword_results(&self, query: &str, max_results: usize) -> Vec<ScoredSlide> {
        let mut scored: Vec<(&deck_slide_store::Slide, crate::keyword::KeywordScore)> = self
            .store
            .iter()
            .filter_map(|slide| KeywordScorer::score(query, &slide.text).map(|s| (slide, s)))
            .collect();

        // Stable sort: equal raw scores keep corpus order.
        scored.sort_by(|a, b| b.1.raw.cmp(&a.1.raw));
        scored.truncate(max_results);

        scored
            .into_iter()
            .map(|(slide, score)| {
                ScoredSlide::new(slide.id.clone(), slide.text.clone(), score.normalized)
            })
            .collect()
    }

    /// Specialized search for license-comparison queries: capability
    /// matrices and tier-comparison slides mentioning the queried feature,
    /// scored by a fixed rubric.
    fn license_search(&self, query: &str, max_results: usize) -> Vec<ScoredSlide> {
        let feature = self.classifier.extract_feature(query);

        let mut matches: Vec<(&deck_slide_store::Slide, u32)> = Vec::new();
        for slide in self.store.iter() {
            let text = slide.text.to_lowercase();

            let is_capability_matrix = (text.contains("capability") && text.contains("matrix"))
                || text.contains("feature matrix");
            let has_license_comparison = ["standard", "pro", "enterprise", "pro+"]
                .iter()
                .any(|tier| text.contains(tier))
                && ["license", "edition", "tier"]
                    .iter()
                    .any(|term| text.contains(term));
            let has_feature = text.contains(&feature);

            if !(is_capability_matrix || has_license_comparison) || !has_feature {
                continue;
            }

            let mut relevance = 0;
            if is_capability_matrix {
                relevance += 2;
            }
            if has_license_comparison {
                relevance += 2;
            }
            if has_feature {
                relevance += 3;
            }
            if text.contains("table") {
                relevance += 1;
            }
            matches.push((slide, relevance));
        }

        matches.sort_by(|a, b| b.1.cmp(&a.1));
        matches.truncate(max_results);

        matches
            .into_iter()
            .map(|(slide, relevance)| {
                ScoredSlide::new(
                    slide.id.clone(),
                    slide.text.clone(),
                    relevance as f32 / LICENSE_RUBRIC_MAX,
                )
            })
            .collect()
    }
}

/// License-specialized results go first; anything already present is not
/// duplicated; the list is cut to `max_results`.
fn merge_prepending(
    priority: Vec<ScoredSlide>,
    rest: Vec<ScoredSlide>,
    max_results: usize,
) -> Vec<ScoredSlide> {
    let mut merged = priority;
    merged.truncate(max_results);
    for slide in rest {
        if merged.len() >= max_results {
            break;
        }
        if merged.iter().any(|s| s.slide_id == slide.slide_id) {
            continue;
        }
        merged.push(slide);
    }
    merged
}
