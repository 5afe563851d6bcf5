//! Cache store trait: the shared, best-effort intent cache.
//!
//! Eviction and expiry belong to the store. Callers treat every lookup as
//! possibly empty and never rely on read-your-writes across processes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::CacheError;

/// A logical partition of the cache (e.g. "intent").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheNamespace(pub String);

impl CacheNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The namespace used for classified intents.
    pub fn intent() -> Self {
        Self::new("intent")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The core CacheStore trait.
///
/// Implementations: in-memory (TTL), none (no-op). No locking is expected
/// from callers; concurrent get/set on the same key is allowed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The store name (e.g., "memory", "none").
    fn name(&self) -> &str;

    /// Look up a value.
    async fn get(&self, namespace: &CacheNamespace, key: &str) -> std::result::Result<Option<String>, CacheError>;

    /// Store a value, replacing any previous one.
    async fn set(&self, namespace: &CacheNamespace, key: &str, value: String) -> std::result::Result<(), CacheError>;
}
