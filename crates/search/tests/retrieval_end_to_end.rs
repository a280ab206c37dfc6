//! End-to-end retrieval over a small corpus: semantic ranking with a stub
//! embedding provider, automatic keyword fallback, and the license pipeline
//! from query classification through tier inference.

use async_trait::async_trait;
use deck_license::{Availability, LicenseProfile, LicenseQueryClassifier, Tier, TierInferencer};
use deck_search::{HybridRetriever, RetrieverConfig, SemanticScorer};
use deck_slide_store::{Embedder, EmbedderError, EmbeddingSet, Slide, SlideStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Embeds any query as a fixed vector, standing in for the remote provider.
struct StubEmbedder(Vec<f32>);

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
        Ok(self.0.clone())
    }
}

struct OfflineEmbedder;

#[async_trait]
impl Embedder for OfflineEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
        Err(EmbedderError::Provider("connection refused".to_string()))
    }
}

fn corpus() -> Vec<Slide> {
    vec![
        Slide::new(
            "slide_1",
            "Title: Licensing\nTable 1:\nFeature | Standard | Pro\nVirtual Agent | No | Yes",
        ),
        Slide::new(
            "slide_2",
            "Title: Virtual Agent Overview\nThe virtual agent automates conversations",
        ),
        Slide::new("slide_3", "Title: Roadmap\nDelivery milestones for the year"),
    ]
}

fn embeddings() -> Arc<EmbeddingSet> {
    let mut vectors = HashMap::new();
    vectors.insert("slide_1".to_string(), vec![0.1, 0.9]);
    vectors.insert("slide_2".to_string(), vec![0.9, 0.1]);
    vectors.insert("slide_3".to_string(), vec![0.5, 0.5]);
    Arc::new(EmbeddingSet::from_vectors(vectors).unwrap())
}

fn profile() -> Arc<LicenseProfile> {
    Arc::new(LicenseProfile::builtin().unwrap())
}

fn retriever(embedder: Arc<dyn Embedder>) -> HybridRetriever {
    let store = Arc::new(SlideStore::from_slides(corpus()));
    let semantic = SemanticScorer::new(embeddings(), embedder);
    HybridRetriever::new(
        store,
        Some(semantic),
        LicenseQueryClassifier::new(profile()),
        RetrieverConfig::default(),
    )
}

#[tokio::test]
async fn semantic_mode_ranks_by_similarity() {
    // Query vector points at slide_2's embedding.
    let retriever = retriever(Arc::new(StubEmbedder(vec![0.9, 0.1])));
    let results = retriever.retrieve("how does the agent work", 2, None).await.unwrap();
    assert_eq!(results[0].slide_id, "slide_2");
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn offline_provider_falls_back_to_keyword_silently() {
    let retriever = retriever(Arc::new(OfflineEmbedder));
    let results = retriever.retrieve("virtual agent", 5, None).await.unwrap();
    // Keyword scoring still finds the virtual agent slides.
    assert!(!results.is_empty());
    assert!(results.iter().any(|r| r.slide_id == "slide_2"));
}

#[tokio::test]
async fn caller_can_force_keyword_mode() {
    // The stub would rank slide_1 first; keyword mode ranks slide_2 first
    // on term matches instead.
    let retriever = retriever(Arc::new(StubEmbedder(vec![0.1, 0.9])));
    let results = retriever
        .retrieve("agent conversations", 5, Some(false))
        .await
        .unwrap();
    assert_eq!(results[0].slide_id, "slide_2");
}

#[tokio::test]
async fn license_question_flows_from_retrieval_to_tier_report() {
    let retriever = retriever(Arc::new(OfflineEmbedder));
    let query = "compare standard vs pro for virtual agent";

    let results = retriever.retrieve(query, 5, None).await.unwrap();
    assert!(!results.is_empty());

    let classifier = LicenseQueryClassifier::new(profile());
    let classification = classifier.classify(query);
    assert!(classification.is_license_query);
    assert_eq!(classification.feature, "virtual agent");

    let inferencer = TierInferencer::new(profile());
    let texts: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
    let report = inferencer.infer_tiers(&classification.feature, texts);

    assert_eq!(report.tiers[&Tier::Standard], Availability::NotIncluded);
    assert_eq!(report.tiers[&Tier::Pro], Availability::Included);
    assert_eq!(report.tiers[&Tier::ProPlus], Availability::Included);
    assert_eq!(report.tiers[&Tier::Enterprise], Availability::Included);
    assert!(report.has_concrete_info);
    assert!(!report.used_defaults);
}
