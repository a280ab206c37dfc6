use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
