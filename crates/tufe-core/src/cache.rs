//! Edge cache capability for serialized response bodies.
//!
//! The handler never reaches for a global cache; it receives an
//! `Arc<dyn EdgeCache>` and tests substitute their own.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Synthetic key under which the latest-figures body is stored.
pub const LATEST_CACHE_KEY: &str = "https://cache.tufe.internal/__tufe_latest_v1";

/// Default lifetime of a cached body: six hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key/value store for response bodies with per-entry TTL.
pub trait EdgeCache: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

    fn put<'a>(&'a self, key: String, body: String, ttl: Duration) -> CacheFuture<'a, ()>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// Thread-safe in-process cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<tokio::sync::RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired entries.
    pub async fn clear_expired(&self) {
        let now = Instant::now();
        let mut store = self.inner.write().await;
        store.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl EdgeCache for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
        Box::pin(async move {
            let store = self.inner.read().await;
            store
                .get(key)
                .filter(|entry| Instant::now() <= entry.expires_at)
                .map(|entry| entry.body.clone())
        })
    }

    fn put<'a>(&'a self, key: String, body: String, ttl: Duration) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            // A zero TTL disables caching.
            if ttl.is_zero() {
                return;
            }
            let expires_at = Instant::now() + ttl;
            let mut store = self.inner.write().await;
            store.insert(key, CacheEntry { body, expires_at });
        })
    }
}
