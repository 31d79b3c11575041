//! Metadata provider integration (OMDb).
//!
//! The provider is the upstream source of truth for search results and full
//! detail records. Clients are stateless adapters: one call is one outbound
//! request, with no retries. Callers decide whether a failure is fatal.

mod omdb;
mod rate_limiter;
mod types;

pub use omdb::{OmdbClient, OmdbConfig};
pub use rate_limiter::{ProviderThrottle, TokenBucket};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Fixed number of hits per provider search page.
pub const PROVIDER_PAGE_SIZE: u32 = 10;

/// Errors that can occur when talking to the metadata provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request did not complete within the configured timeout.
    #[error("Provider request timed out")]
    Timeout,

    /// Provider refused the request because of its rate limit.
    #[error("Provider rate limit reached, please wait before retrying")]
    RateLimited,

    /// Provider has no record for the id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Reply body could not be read as the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing or rejected API key).
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether this is an upstream/transport-class failure rather than a bad payload.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_)
                | ProviderError::Timeout
                | ProviderError::RateLimited
                | ProviderError::Api { .. }
                | ProviderError::NotConfigured(_)
        )
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderError::NotFound(_) => "not_found",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Timeout => "timeout",
            ProviderError::Parse(_) => "parse_error",
            _ => "error",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Trait for metadata provider clients.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search titles. `page` is the provider's 1-based page number.
    ///
    /// A provider reply that simply has no hits is `Ok` with an empty result.
    async fn search(&self, query: &str, page: u32) -> Result<SearchResults, ProviderError>;

    /// Fetch the full record for an external id.
    async fn fetch_detail(
        &self,
        external_id: &str,
        plot: PlotLength,
    ) -> Result<crate::catalog::MovieDetail, ProviderError>;
}
