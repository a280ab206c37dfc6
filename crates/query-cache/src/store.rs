use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One cached result. `timestamp` is seconds since the Unix epoch, which is
/// also the on-disk representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: serde_json::Value,
    pub timestamp: f64,
}

pub type CacheMap = HashMap<String, CacheEntry>;

/// Key/value persistence seam for the query cache.
///
/// The cache owns its entry map exclusively and is the sole writer to the
/// backing store; implementations only load the map at startup and persist
/// it wholesale after mutations.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load(&self) -> Result<CacheMap>;
    async fn persist(&self, entries: &CacheMap) -> Result<()>;
}

/// Whole-map JSON file:
/// `{ "<normalized query>": { "result": ..., "timestamp": <seconds> } }`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CacheStore for JsonFileStore {
    async fn load(&self) -> Result<CacheMap> {
        if !self.path.exists() {
            return Ok(CacheMap::new());
        }
        let data = tokio::fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&data) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                // Losing the cache is recoverable; start over.
                log::warn!("Query cache corrupted at {}: {err}", self.path.display());
                Ok(CacheMap::new())
            }
        }
    }

    async fn persist(&self, entries: &CacheMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

/// No-op persistence for embedded and test use.
pub struct MemoryStore;

#[async_trait]
impl CacheStore for MemoryStore {
    async fn load(&self) -> Result<CacheMap> {
        Ok(CacheMap::new())
    }

    async fn persist(&self, _entries: &CacheMap) -> Result<()> {
        Ok(())
    }
}
