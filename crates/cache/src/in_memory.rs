//! In-memory cache store: process-local, optional TTL and capacity.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use voxintent_core::cache::{CacheNamespace, CacheStore};
use voxintent_core::error::CacheError;

struct Entry {
    value: String,
    inserted_at: Instant,
}

/// An in-memory store keyed by `(namespace, key)`.
///
/// Expired entries are dropped lazily on read. When the capacity is reached
/// the oldest entry is evicted before inserting a new key.
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<(String, String), Entry>>>,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: None,
            max_entries: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Number of stored entries, including ones that expired but were not read yet.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    fn name(&self) -> &str { "memory" }

    async fn get(&self, namespace: &CacheNamespace, key: &str) -> Result<Option<String>, CacheError> {
        let id = (namespace.as_str().to_string(), key.to_string());
        {
            let entries = self.entries.read().await;
            match entries.get(&id) {
                None => return Ok(None),
                Some(entry) if !self.is_expired(entry) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        // Expired: re-check under the write lock, a concurrent set may have refreshed it.
        let mut entries = self.entries.write().await;
        if entries.get(&id).is_some_and(|e| self.is_expired(e)) {
            entries.remove(&id);
        }
        Ok(None)
    }

    async fn set(&self, namespace: &CacheNamespace, key: &str, value: String) -> Result<(), CacheError> {
        let id = (namespace.as_str().to_string(), key.to_string());
        let mut entries = self.entries.write().await;

        if let Some(max) = self.max_entries {
            if max == 0 {
                return Ok(());
            }
            if !entries.contains_key(&id) && entries.len() >= max {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            id,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns() -> CacheNamespace {
        CacheNamespace::intent()
    }

    #[tokio::test]
    async fn set_and_get() {
        let cache = InMemoryCache::new();
        cache.set(&ns(), "k1", "v1".into()).await.unwrap();
        assert_eq!(cache.get(&ns(), "k1").await.unwrap().as_deref(), Some("v1"));
        assert!(cache.get(&ns(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let cache = InMemoryCache::new();
        cache.set(&ns(), "k1", "intent".into()).await.unwrap();
        let other = CacheNamespace::new("reply");
        assert!(cache.get(&other, "k1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCache::new().with_ttl(Duration::from_secs(60));
        cache.set(&ns(), "k1", "v1".into()).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cache.get(&ns(), "k1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get(&ns(), "k1").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_evicts_oldest() {
        let cache = InMemoryCache::new().with_max_entries(2);
        cache.set(&ns(), "a", "1".into()).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.set(&ns(), "b", "2".into()).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.set(&ns(), "c", "3".into()).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&ns(), "a").await.unwrap().is_none());
        assert!(cache.get(&ns(), "c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn overwrite_does_not_evict() {
        let cache = InMemoryCache::new().with_max_entries(1);
        cache.set(&ns(), "a", "1".into()).await.unwrap();
        cache.set(&ns(), "a", "2".into()).await.unwrap();
        assert_eq!(cache.get(&ns(), "a").await.unwrap().as_deref(), Some("2"));
    }
}
