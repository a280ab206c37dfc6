use crate::error::{Result, SlideStoreError};
use crate::types::Slide;
use std::collections::HashMap;
use std::path::Path;

/// Immutable, in-memory collection of slides.
///
/// Built once at startup from the extractor's JSON output and never mutated
/// afterwards, so it can be shared across concurrent requests without
/// locking. Slides keep their insertion order: equal-score retrieval ties
/// resolve in original corpus order.
#[derive(Debug)]
pub struct SlideStore {
    slides: Vec<Slide>,
    index: HashMap<String, usize>,
}

impl SlideStore {
    /// Load the extractor output: a JSON object mapping `slide_id -> text`.
    ///
    /// A missing or unreadable source file is fatal; the caller decides
    /// whether to retry or abort. An empty mapping is valid.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SlideStoreError::SourceMissing(path.to_path_buf()));
        }

        let data = tokio::fs::read_to_string(path).await?;
        let mapping: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&data)?;

        let mut slides = Vec::with_capacity(mapping.len());
        for (id, value) in mapping {
            let text = value
                .as_str()
                .ok_or_else(|| {
                    serde_json::Error::io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("slide {id} is not a string"),
                    ))
                })?
                .to_string();
            slides.push(Slide::new(id, text));
        }

        log::info!("Loaded {} slides from {}", slides.len(), path.display());
        Ok(Self::from_slides(slides))
    }

    /// Build a store from already-extracted slides, keeping their order.
    pub fn from_slides(slides: Vec<Slide>) -> Self {
        let index = slides
            .iter()
            .enumerate()
            .map(|(idx, slide)| (slide.id.clone(), idx))
            .collect();
        Self { slides, index }
    }

    pub fn get(&self, slide_id: &str) -> Option<&Slide> {
        self.index.get(slide_id).map(|&idx| &self.slides[idx])
    }

    /// Slides in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slides.iter().map(|slide| slide.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
