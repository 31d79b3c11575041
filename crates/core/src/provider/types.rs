//! Types for metadata provider responses.

use serde::{Deserialize, Serialize};

use crate::catalog::{MediaKind, MovieSummary};

/// One summary-shaped entry of a provider search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub external_id: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl SearchHit {
    /// Build an unenriched summary (no genres, rating 0).
    pub fn to_summary(&self, fetched_at: i64) -> MovieSummary {
        MovieSummary {
            external_id: self.external_id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            kind: self.kind,
            poster: self.poster.clone(),
            genres: Vec::new(),
            rating: 0,
            last_fetched_at: fetched_at,
        }
    }
}

/// One page of provider search results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits in provider order.
    pub hits: Vec<SearchHit>,
    /// Total hits across all provider pages.
    pub total_results: u64,
    /// Whether the provider reported a successful response.
    pub found: bool,
}

impl SearchResults {
    /// A legitimate "nothing found" reply.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn external_ids(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.external_id.clone()).collect()
    }
}

/// Plot length selector for detail lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotLength {
    Short,
    Full,
}

impl PlotLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotLength::Short => "short",
            PlotLength::Full => "full",
        }
    }
}
