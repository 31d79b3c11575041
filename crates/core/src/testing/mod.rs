//! Testing utilities and mock implementations.
//!
//! The stores are exercised against real in-memory SQLite, so only the
//! metadata provider needs a double.
//!
//! # Example
//!
//! ```rust,ignore
//! use marquee_core::testing::{fixtures, MockMetadataProvider};
//!
//! let provider = MockMetadataProvider::new();
//! provider.add_detail(fixtures::movie_detail("tt0133093", "The Matrix", "1999", "Action, Sci-Fi", "8.7")).await;
//!
//! // Use in an orchestrator or AppState...
//! ```

mod mock_provider;

pub use mock_provider::{MockMetadataProvider, RecordedProviderCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{MediaKind, MovieDetail, MovieSummary, RatingEntry};
    use crate::provider::{SearchHit, SearchResults};

    /// Create a search hit with a poster.
    pub fn search_hit(external_id: &str, title: &str, year: &str) -> SearchHit {
        SearchHit {
            external_id: external_id.to_string(),
            title: title.to_string(),
            year: year.to_string(),
            kind: MediaKind::Movie,
            poster: Some(format!("https://img.example/{}.jpg", external_id)),
        }
    }

    /// Create a successful search page.
    pub fn search_results(hits: Vec<SearchHit>, total_results: u64) -> SearchResults {
        SearchResults {
            hits,
            total_results,
            found: true,
        }
    }

    /// Create `count` numbered hits for a keyword, e.g. `"Batman 1"`.
    pub fn numbered_hits(prefix: &str, keyword: &str, count: usize) -> Vec<SearchHit> {
        (1..=count)
            .map(|i| {
                search_hit(
                    &format!("{}{:03}", prefix, i),
                    &format!("{} {}", keyword, i),
                    &format!("{}", 1990 + i),
                )
            })
            .collect()
    }

    /// Create an unenriched summary with an old fetch timestamp.
    pub fn summary(external_id: &str, title: &str, year: &str) -> MovieSummary {
        MovieSummary {
            external_id: external_id.to_string(),
            title: title.to_string(),
            year: year.to_string(),
            kind: MediaKind::Movie,
            poster: Some(format!("https://img.example/{}.jpg", external_id)),
            genres: Vec::new(),
            rating: 0,
            last_fetched_at: 1_000,
        }
    }

    /// Create a detail record.
    pub fn movie_detail(
        external_id: &str,
        title: &str,
        year: &str,
        genre: &str,
        imdb_rating: &str,
    ) -> MovieDetail {
        MovieDetail {
            external_id: external_id.to_string(),
            title: title.to_string(),
            year: Some(year.to_string()),
            rated: Some("PG-13".to_string()),
            released: Some(format!("01 Jan {}", year)),
            runtime: Some("120 min".to_string()),
            genre: Some(genre.to_string()),
            director: Some("Jane Director".to_string()),
            writer: Some("John Writer".to_string()),
            actors: Some("Actor One, Actor Two".to_string()),
            plot: Some(format!("The story of {}.", title.to_lowercase())),
            language: Some("English".to_string()),
            country: Some("United States".to_string()),
            awards: None,
            poster: Some(format!("https://img.example/{}.jpg", external_id)),
            metascore: Some("70".to_string()),
            imdb_rating: Some(imdb_rating.to_string()),
            imdb_votes: Some("100,000".to_string()),
            kind: MediaKind::Movie,
            total_seasons: None,
            ratings: vec![RatingEntry {
                source: "Internet Movie Database".to_string(),
                value: format!("{}/10", imdb_rating),
            }],
        }
    }
}
