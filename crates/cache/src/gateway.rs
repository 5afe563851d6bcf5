//! Cache gateway: `(session, utterance)` in, best-effort lookups out.

use std::sync::Arc;
use tracing::warn;
use voxintent_core::cache::{CacheNamespace, CacheStore};

use crate::key::{CacheKey, compute_key};

/// Thin adapter between the pipeline and a shared [`CacheStore`].
///
/// Store failures are logged and swallowed: a failed read is a miss and a
/// failed write is skipped.
#[derive(Clone)]
pub struct IntentCache {
    store: Arc<dyn CacheStore>,
    namespace: CacheNamespace,
}

impl IntentCache {
    pub fn new(store: Arc<dyn CacheStore>, namespace: CacheNamespace) -> Self {
        Self { store, namespace }
    }

    pub fn key(&self, session_id: &str, utterance: &str) -> CacheKey {
        compute_key(session_id, utterance)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        match self.store.get(&self.namespace, key.as_str()).await {
            Ok(value) => value,
            Err(e) => {
                warn!(store = self.store.name(), cache_key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn set(&self, key: &CacheKey, value: String) {
        if let Err(e) = self.store.set(&self.namespace, key.as_str(), value).await {
            warn!(store = self.store.name(), cache_key = %key, error = %e, "Cache write failed, skipping");
        }
    }
}
