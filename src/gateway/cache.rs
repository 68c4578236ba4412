//! In-memory response cache.
//!
//! Stores raw response bodies keyed by the canonical request URL. Entries
//! carry an absolute expiry and are evicted lazily when a read finds them
//! stale. Nothing here is persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use reqwest::Url;
use tokio::time::Instant;

use super::query::QueryParams;

/// Entry in the response cache.
struct CacheEntry {
    payload: Bytes,
    expires_at: Instant,
}

/// Hit/miss counters and current size of a [`ResponseCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub keys: usize,
}

/// Thread-safe TTL cache for provider responses.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a cache whose fallback TTL is `default_ttl`.
    ///
    /// A zero default means writes without an explicit positive TTL are
    /// dropped, so such calls always reach the network.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a payload if it is cached and not expired.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.payload.clone());
            }
            drop(entry);
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a payload for `ttl`, or for the default TTL when `ttl` is
    /// missing or zero. Returns whether the payload was stored.
    pub fn set(&self, key: impl Into<String>, payload: Bytes, ttl: Option<Duration>) -> bool {
        let ttl = ttl
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return false;
        }

        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.into(), entry);
        true
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys: self.entries.len(),
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("default_ttl", &self.default_ttl)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Canonical cache key for a request: the fully expanded URL with query
/// parameters in name order.
pub fn cache_key(base_url: &str, path: &str, params: &QueryParams) -> String {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    match Url::parse_with_params(&raw, params.iter()) {
        Ok(url) => url.to_string(),
        Err(_) => {
            let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{raw}?{}", query.join("&"))
        }
    }
}
