//! Error types shared across voxintent crates.
//!
//! Each bounded context owns a small `thiserror` enum; [`Error`] rolls
//! them up for callers that do not care which layer failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to a text-completion backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Non-success status not covered by a more specific variant.
    #[error("Backend returned {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether the same request could succeed later without a config change.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::ModelNotFound(_) => false,
        }
    }
}

/// Failures of an external cache store. The pipeline never surfaces these.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}
