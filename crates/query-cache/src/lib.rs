//! # Deck Query Cache
//!
//! Time-bounded cache for final query results, keyed by normalized query
//! string. Two queries differing only in case or whitespace hit the same
//! entry. Entries expire after a configurable TTL: an expired entry is
//! treated as absent and removed lazily on the next touch, or proactively
//! by [`QueryCache::cleanup`].
//!
//! Persistence goes through the [`CacheStore`] seam — a whole-map JSON file
//! by default, a no-op memory store for embedded use. A failing store is
//! never fatal: the cache logs and keeps serving from memory.

mod cache;
mod error;
mod store;

pub use cache::{normalize_query, QueryCache, DEFAULT_TTL};
pub use error::{CacheError, Result};
pub use store::{CacheEntry, CacheMap, CacheStore, JsonFileStore, MemoryStore};
