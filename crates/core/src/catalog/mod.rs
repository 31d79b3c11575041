//! Movie catalog - the local durable cache of provider data.
//!
//! Two keyed tables share the provider's external id as natural key:
//! summaries (for browsing) and full details. Search results and detail
//! lookups are written here so later requests can be served locally.

mod detail_sqlite;
mod parse;
mod summary_sqlite;
mod types;

pub use detail_sqlite::SqliteDetailStore;
pub use parse::{
    non_placeholder, parse_rating, parse_runtime, split_genres, DEFAULT_RUNTIME_MINUTES,
    NOT_AVAILABLE,
};
pub use summary_sqlite::SqliteSummaryStore;
pub use types::*;

/// Current time as epoch millis, the unit of `MovieSummary::last_fetched_at`.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Storage for movie summaries.
pub trait SummaryStore: Send + Sync {
    /// Get a summary by external id.
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<MovieSummary>, CatalogError>;

    /// Insert the summary unless a row with the same external id exists.
    ///
    /// Returns the stored row: the new one, or the pre-existing one untouched.
    /// Safe under concurrent callers for the same id (first writer wins).
    fn upsert_if_absent(&self, summary: &MovieSummary) -> Result<MovieSummary, CatalogError>;

    /// Fill in genres and rating where they are still empty, and refresh the
    /// fetch timestamp. Populated fields are never overwritten.
    ///
    /// Returns false if no summary exists for the id.
    fn patch_missing(
        &self,
        external_id: &str,
        genres: &[String],
        rating: u32,
        fetched_at: i64,
    ) -> Result<bool, CatalogError>;

    /// Page through summaries whose title contains the query text.
    fn search_by_title_substring(
        &self,
        query: &SummarySearchQuery,
    ) -> Result<Page<MovieSummary>, CatalogError>;

    /// Page through the whole table, ordered descending by `sort`.
    fn list_all(
        &self,
        page: u32,
        size: u32,
        sort: SortField,
    ) -> Result<Page<MovieSummary>, CatalogError>;

    /// Total number of summaries.
    fn count(&self) -> Result<u64, CatalogError>;

    /// Remove a summary (administrative).
    fn remove(&self, external_id: &str) -> Result<(), CatalogError>;
}

/// Storage for full movie details.
pub trait DetailStore: Send + Sync {
    /// Get a detail record by external id.
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<MovieDetail>, CatalogError>;

    /// Insert or overwrite the detail record for its external id.
    fn upsert(&self, detail: &MovieDetail) -> Result<(), CatalogError>;
}
