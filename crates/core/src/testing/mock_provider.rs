//! Mock metadata provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::MovieDetail;
use crate::provider::{MetadataProvider, PlotLength, ProviderError, SearchResults};

/// A recorded provider call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedProviderCall {
    Search { query: String, page: u32 },
    FetchDetail { external_id: String, plot: PlotLength },
}

/// Mock implementation of the MetadataProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search pages and detail records
/// - Track calls for assertions
/// - Simulate failures and slow detail fetches
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::testing::{MockMetadataProvider, fixtures};
///
/// let provider = MockMetadataProvider::new();
/// provider
///     .add_search_page("batman", 1, fixtures::search_results(vec![fixtures::search_hit("tt1", "Batman", "1989")], 25))
///     .await;
///
/// let results = provider.search("Batman", 1).await?;
/// assert_eq!(results.total_results, 25);
/// ```
#[derive(Debug)]
pub struct MockMetadataProvider {
    /// Search pages by (lowercased query, 1-based page).
    pages: Arc<RwLock<HashMap<(String, u32), SearchResults>>>,
    /// Detail records by external id.
    details: Arc<RwLock<HashMap<String, MovieDetail>>>,
    /// Queries whose search fails with a transport error.
    failing_queries: Arc<RwLock<HashSet<String>>>,
    /// Ids whose detail fetch fails with a transport error.
    failing_details: Arc<RwLock<HashSet<String>>>,
    /// Delay applied to every detail fetch.
    detail_delay: Arc<RwLock<Option<Duration>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedProviderCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ProviderError>>>,
}

impl Default for MockMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataProvider {
    /// Create a new empty mock provider.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            failing_queries: Arc::new(RwLock::new(HashSet::new())),
            failing_details: Arc::new(RwLock::new(HashSet::new())),
            detail_delay: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Search Configuration
    // =========================================================================

    /// Set the reply for one search page. Queries match case-insensitively.
    pub async fn add_search_page(&self, query: &str, page: u32, results: SearchResults) {
        self.pages
            .write()
            .await
            .insert((query.trim().to_lowercase(), page), results);
    }

    /// Make every search for `query` fail with a transport error.
    pub async fn fail_query(&self, query: &str) {
        self.failing_queries
            .write()
            .await
            .insert(query.trim().to_lowercase());
    }

    // =========================================================================
    // Detail Configuration
    // =========================================================================

    /// Add a detail record.
    pub async fn add_detail(&self, detail: MovieDetail) {
        self.details
            .write()
            .await
            .insert(detail.external_id.clone(), detail);
    }

    /// Make the detail fetch for `external_id` fail with a transport error.
    pub async fn fail_detail(&self, external_id: &str) {
        self.failing_details
            .write()
            .await
            .insert(external_id.to_string());
    }

    /// Delay every detail fetch (to observe the caller not waiting on enrichment).
    pub async fn set_detail_delay(&self, delay: Duration) {
        *self.detail_delay.write().await = Some(delay);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedProviderCall> {
        self.calls.read().await.clone()
    }

    /// Recorded search calls as (query, page).
    pub async fn search_calls(&self) -> Vec<(String, u32)> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedProviderCall::Search { query, page } => Some((query.clone(), *page)),
                _ => None,
            })
            .collect()
    }

    /// Recorded detail fetches as (external id, plot).
    pub async fn detail_calls(&self) -> Vec<(String, PlotLength)> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedProviderCall::FetchDetail { external_id, plot } => {
                    Some((external_id.clone(), *plot))
                }
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    async fn take_error(&self) -> Option<ProviderError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedProviderCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn search(&self, query: &str, page: u32) -> Result<SearchResults, ProviderError> {
        self.record(RecordedProviderCall::Search {
            query: query.to_string(),
            page,
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let key = query.trim().to_lowercase();
        if self.failing_queries.read().await.contains(&key) {
            return Err(ProviderError::Transport(format!(
                "connection refused while searching '{}'",
                query
            )));
        }

        Ok(self
            .pages
            .read()
            .await
            .get(&(key, page))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_detail(
        &self,
        external_id: &str,
        plot: PlotLength,
    ) -> Result<MovieDetail, ProviderError> {
        self.record(RecordedProviderCall::FetchDetail {
            external_id: external_id.to_string(),
            plot,
        })
        .await;

        let delay = *self.detail_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if self.failing_details.read().await.contains(external_id) {
            return Err(ProviderError::Transport(format!(
                "connection reset while fetching {}",
                external_id
            )));
        }

        self.details
            .read()
            .await
            .get(external_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(external_id.to_string()))
    }
}
