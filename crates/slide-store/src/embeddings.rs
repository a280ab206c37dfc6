use crate::error::{Result, SlideStoreError};
use std::collections::HashMap;
use std::path::Path;

/// Precomputed slide embeddings, one vector per slide.
///
/// All vectors share a fixed dimensionality, enforced at load time. The set
/// is read-only after construction; a slide without an entry is simply
/// invisible to semantic scoring.
#[derive(Debug)]
pub struct EmbeddingSet {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl EmbeddingSet {
    /// Load an embeddings file: a JSON object mapping `slide_id -> [f32]`.
    ///
    /// Returns `Ok(None)` when the file does not exist — absence of
    /// embeddings disables semantic search without being an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "No embeddings file at {}, semantic search disabled",
                path.display()
            );
            return Ok(None);
        }

        let data = tokio::fs::read_to_string(path).await?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_str(&data)?;
        let set = Self::from_vectors(vectors)?;
        log::info!(
            "Loaded embeddings for {} slides (dimension {})",
            set.len(),
            set.dimension()
        );
        Ok(Some(set))
    }

    /// Build a set from in-memory vectors, enforcing a single dimensionality.
    pub fn from_vectors(vectors: HashMap<String, Vec<f32>>) -> Result<Self> {
        let dimension = vectors.values().next().map_or(0, Vec::len);
        for vector in vectors.values() {
            if vector.len() != dimension {
                return Err(SlideStoreError::InvalidDimension {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }
        Ok(Self { vectors, dimension })
    }

    pub fn get(&self, slide_id: &str) -> Option<&[f32]> {
        self.vectors.get(slide_id).map(Vec::as_slice)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Zero-magnitude input scores 0.0 rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
