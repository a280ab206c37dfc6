use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlideStoreError>;

#[derive(Error, Debug)]
pub enum SlideStoreError {
    #[error("slide source not found: {0}")]
    SourceMissing(PathBuf),

    #[error("failed to read slide source: {0}")]
    IoError(#[from] std::io::Error),

    #[error("malformed slide data: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedding provider API key not configured")]
    MissingApiKey,

    #[error("embedding request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding provider error: {0}")]
    Provider(String),
}
