//! Errors surfaced by the intent pipeline.
//!
//! Bad backend output is never an error here; it becomes a degraded
//! classification instead.

use thiserror::Error;
use voxintent_core::error::ProviderError;

#[derive(Debug, Error)]
pub enum IntentError {
    /// No backend attached; raised before any other work.
    #[error("Intent classifier not configured: {0}")]
    NotConfigured(String),

    /// The backend call failed. Nothing was cached.
    #[error("Backend unavailable: {0}")]
    Backend(#[from] ProviderError),
}

impl From<IntentError> for voxintent_core::Error {
    fn from(err: IntentError) -> Self {
        match err {
            IntentError::NotConfigured(message) => voxintent_core::Error::Config { message },
            IntentError::Backend(e) => voxintent_core::Error::Provider(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_wraps_provider_error() {
        let err: IntentError = ProviderError::Timeout("60s".into()).into();
        assert!(matches!(err, IntentError::Backend(ProviderError::Timeout(_))));
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn rolls_up_into_core_error() {
        let err: voxintent_core::Error = IntentError::NotConfigured("no backend".into()).into();
        assert!(matches!(err, voxintent_core::Error::Config { .. }));
    }
}
