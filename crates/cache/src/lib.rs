//! Intent cache for voxintent.
//!
//! [`IntentCache`] is the gateway the pipeline talks to: it derives keys
//! from `(session, utterance)` and forwards to a [`CacheStore`] without
//! letting store failures reach the caller.
//!
//! [`CacheStore`]: voxintent_core::cache::CacheStore

pub mod gateway;
pub mod in_memory;
pub mod key;
pub mod noop;

pub use gateway::IntentCache;
pub use in_memory::InMemoryCache;
pub use key::{CacheKey, compute_key};
pub use noop::NoopCache;
