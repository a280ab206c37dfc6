use crate::store::{CacheEntry, CacheMap, CacheStore};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key normalization: lowercase, trimmed, internal whitespace runs
/// collapsed to single spaces. Queries differing only in case or spacing
/// share an entry.
pub fn normalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// TTL-bounded cache for final query results.
///
/// The entry map lives behind a single async mutex: concurrent get/set/
/// delete calls serialize, which also serializes writes to the backing
/// store. Store failures are logged and swallowed — an uncached response
/// beats a failed request.
pub struct QueryCache {
    store: Box<dyn CacheStore>,
    ttl: Duration,
    entries: Mutex<CacheMap>,
}

impl QueryCache {
    /// Load persisted entries (dropping any that already expired) and wrap
    /// them in a live cache.
    pub async fn open(store: impl CacheStore + 'static, ttl: Duration) -> Self {
        let mut entries = match store.load().await {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Could not load query cache: {err}");
                CacheMap::new()
            }
        };

        let now = now_secs();
        let before = entries.len();
        entries.retain(|_, entry| !is_expired(entry, now, ttl));
        if entries.len() < before {
            log::debug!("Dropped {} expired entries on load", before - entries.len());
        }
        log::info!(
            "Query cache ready with {} entries (TTL {:?})",
            entries.len(),
            ttl
        );

        Self {
            store: Box::new(store),
            ttl,
            entries: Mutex::new(entries),
        }
    }

    /// Cached result for a query, or `None` when absent or expired.
    /// Expired entries are removed on the way out.
    pub async fn get(&self, query: &str) -> Option<serde_json::Value> {
        let key = normalize_query(query);
        let mut entries = self.entries.lock().await;

        let entry = entries.get(&key)?;
        if is_expired(entry, now_secs(), self.ttl) {
            log::debug!("Cache entry expired for: {key}");
            entries.remove(&key);
            self.persist(&entries).await;
            return None;
        }

        log::debug!("Cache hit for: {key}");
        Some(entry.result.clone())
    }

    /// Store a result, replacing any previous entry wholesale.
    pub async fn set(&self, query: &str, result: serde_json::Value) {
        let key = normalize_query(query);
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CacheEntry {
                result,
                timestamp: now_secs(),
            },
        );
        self.persist(&entries).await;
    }

    /// Remove one entry; true when it existed.
    pub async fn delete(&self, query: &str) -> bool {
        let key = normalize_query(query);
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(&key).is_some();
        if removed {
            self.persist(&entries).await;
        }
        removed
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.persist(&entries).await;
        log::info!("Cleared query cache");
    }

    /// Proactively sweep out every expired entry. Idempotent; returns the
    /// number removed.
    pub async fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = now_secs();
        let before = entries.len();
        entries.retain(|_, entry| !is_expired(entry, now, self.ttl));
        let removed = before - entries.len();
        if removed > 0 {
            self.persist(&entries).await;
            log::info!("Cleaned up {removed} expired cache entries");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn persist(&self, entries: &CacheMap) {
        if let Err(err) = self.store.persist(entries).await {
            log::warn!("Could not persist query cache: {err}");
        }
    }
}

fn is_expired(entry: &CacheEntry, now: f64, ttl: Duration) -> bool {
    now - entry.timestamp >= ttl.as_secs_f64()
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}
