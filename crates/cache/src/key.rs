//! Cache key derivation.

use sha2::{Digest, Sha256};

/// A hex-encoded SHA-256 digest identifying one `(session, utterance)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest a session identifier and an utterance into a cache key.
///
/// The session id is length-prefixed so that `("ab", "c")` and `("a", "bc")`
/// never share a key.
pub fn compute_key(session_id: &str, utterance: &str) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update((session_id.len() as u64).to_le_bytes());
    hasher.update(session_id.as_bytes());
    hasher.update(utterance.as_bytes());
    CacheKey(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_key() {
        assert_eq!(
            compute_key("device-1", "turn on the light"),
            compute_key("device-1", "turn on the light")
        );
    }

    #[test]
    fn sessions_do_not_collide() {
        assert_ne!(
            compute_key("device-1", "turn on the light"),
            compute_key("device-2", "turn on the light")
        );
    }

    #[test]
    fn boundary_between_session_and_utterance_matters() {
        assert_ne!(compute_key("ab", "c"), compute_key("a", "bc"));
    }

    #[test]
    fn key_is_hex_sha256() {
        let key = compute_key("s", "u");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
