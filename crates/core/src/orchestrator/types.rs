//! Types for the catalog orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, MovieSummary, Page};
use crate::provider::ProviderError;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No record for the id, locally or upstream.
    #[error("movie not found: {0}")]
    NotFound(String),

    /// Provider failure on a request-blocking path.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provider replied with something we couldn't read.
    #[error("unreadable provider response: {0}")]
    Parse(String),

    /// Local store error.
    #[error("catalog store error: {0}")]
    Store(#[from] CatalogError),
}

impl OrchestratorError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrchestratorError::NotFound(_))
    }
}

/// One page of summaries as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub data: Vec<MovieSummary>,
    /// Requested page size for browsing, number of returned items for search.
    pub size: u32,
    /// Zero-based page index echoed back.
    pub page_number: u32,
    pub total_pages: u64,
    pub total: u64,
}

impl CatalogPage {
    /// Well-formed page with nothing in it.
    pub fn empty(page_number: u32) -> Self {
        Self {
            data: Vec::new(),
            size: 0,
            page_number,
            total_pages: 0,
            total: 0,
        }
    }
}

impl From<Page<MovieSummary>> for CatalogPage {
    fn from(page: Page<MovieSummary>) -> Self {
        let total_pages = page.total_pages();
        Self {
            data: page.items,
            size: page.size,
            page_number: page.page,
            total_pages,
            total: page.total,
        }
    }
}

/// Ordering applied to a provider search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrder {
    /// Year descending, compared as strings.
    Year,
    /// Rating descending.
    Rating,
    /// Keep provider order.
    Provider,
}

impl ResultOrder {
    /// `year` and `rating` (case-insensitive) select an order; anything else
    /// keeps the provider's order.
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("year") => ResultOrder::Year,
            Some("rating") => ResultOrder::Rating,
            _ => ResultOrder::Provider,
        }
    }

    /// Stable in-place sort.
    pub fn apply(&self, items: &mut [MovieSummary]) {
        match self {
            ResultOrder::Year => items.sort_by(|a, b| b.year.cmp(&a.year)),
            ResultOrder::Rating => items.sort_by(|a, b| b.rating.cmp(&a.rating)),
            ResultOrder::Provider => {}
        }
    }
}

/// What one seeding pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub keywords_searched: usize,
    pub keywords_failed: usize,
    pub summaries_written: usize,
}
