use deck_slide_store::{cosine_similarity, Embedder, EmbedderError, EmbeddingSet, SlideStore};
use std::sync::Arc;

/// Outcome of a semantic scoring pass. Unavailability is a value the
/// retriever pattern-matches on, not an exception: semantic search is an
/// optimization, and losing it must never fail the request.
#[derive(Debug)]
pub enum SemanticOutcome {
    /// `(slide_id, cosine similarity)` for every slide with an embedding.
    Scored(Vec<(String, f32)>),
    Unavailable { reason: String },
}

/// Scores slides by cosine similarity between each slide's precomputed
/// embedding and a query embedding computed on demand.
pub struct SemanticScorer {
    embeddings: Arc<EmbeddingSet>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticScorer {
    pub fn new(embeddings: Arc<EmbeddingSet>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embeddings,
            embedder,
        }
    }

    /// Similarity for one slide; `None` when the slide has no embedding.
    pub async fn score(&self, query: &str, slide_id: &str) -> Result<Option<f32>, EmbedderError> {
        let query_vector = self.embedder.embed(query).await?;
        Ok(self
            .embeddings
            .get(slide_id)
            .map(|vector| cosine_similarity(&query_vector, vector)))
    }

    /// Score every embedded slide in the store against the query.
    ///
    /// A failing or timed-out embedding call degrades to
    /// [`SemanticOutcome::Unavailable`]; slides without an embedding entry
    /// are skipped silently.
    pub async fn score_all(&self, query: &str, store: &SlideStore) -> SemanticOutcome {
        let query_vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(err) => {
                return SemanticOutcome::Unavailable {
                    reason: err.to_string(),
                }
            }
        };

        let scores: Vec<(String, f32)> = store
            .iter()
            .filter_map(|slide| {
                self.embeddings
                    .get(&slide.id)
                    .map(|vector| (slide.id.clone(), cosine_similarity(&query_vector, vector)))
            })
            .collect();

        log::debug!("Semantic pass scored {} slides", scores.len());
        SemanticOutcome::Scored(scores)
    }
}
