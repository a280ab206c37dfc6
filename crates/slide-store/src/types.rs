use serde::{Deserialize, Serialize};

/// Number of characters included in a content preview.
pub const PREVIEW_CHARS: usize = 200;

/// One unit of source content with a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    pub text: String,
}

impl Slide {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Precomputed embedding vector for one slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideEmbedding {
    pub slide_id: String,
    pub vector: Vec<f32>,
}

/// A retrieval hit: slide content plus its relevance score.
///
/// Transient, produced per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSlide {
    pub slide_id: String,
    pub content: String,
    pub content_preview: String,
    pub score: f32,
}

impl ScoredSlide {
    pub fn new(slide_id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        let content = content.into();
        Self {
            slide_id: slide_id.into(),
            content_preview: preview(&content),
            content,
            score,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `content`, with an ellipsis when
/// truncated. Operates on characters, never on raw bytes.
pub fn preview(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}
