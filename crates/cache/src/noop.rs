//! No-op cache store: disables intent caching entirely.

use async_trait::async_trait;
use voxintent_core::cache::{CacheNamespace, CacheStore};
use voxintent_core::error::CacheError;

/// A cache store that stores nothing.
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    fn name(&self) -> &str { "none" }

    async fn get(&self, _namespace: &CacheNamespace, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _namespace: &CacheNamespace, _key: &str, _value: String) -> Result<(), CacheError> {
        Ok(())
    }
}
