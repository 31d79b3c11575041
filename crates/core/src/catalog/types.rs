//! Types for the movie catalog (summary and detail cache).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::parse::{parse_rating, parse_runtime, split_genres};

/// Kind of title as reported by the metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
    Episode,
    Game,
    /// Anything the provider sends that we don't model.
    #[serde(other)]
    Other,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Episode => "episode",
            MediaKind::Game => "game",
            MediaKind::Other => "other",
        }
    }
}

impl FromStr for MediaKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "movie" => MediaKind::Movie,
            "series" => MediaKind::Series,
            "episode" => MediaKind::Episode,
            "game" => MediaKind::Game,
            _ => MediaKind::Other,
        })
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight cached record used for listing and browsing.
///
/// One row per external id. Created on first sighting and afterwards only
/// mutated to fill in genres/rating or to refresh `last_fetched_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Provider-assigned identifier (e.g. `tt0372784`).
    pub external_id: String,
    pub title: String,
    /// Release year as sent by the provider (may be a range like `2008–2013`).
    pub year: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    /// Empty until enrichment or a detail lookup fills it in.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Rounded rating, 0 when unknown.
    #[serde(default)]
    pub rating: u32,
    /// Epoch millis of the last time this row was written from provider data.
    pub last_fetched_at: i64,
}

/// One entry of the multi-source rating list (`Internet Movie Database`, `Rotten Tomatoes`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub source: String,
    pub value: String,
}

/// Full metadata record for a single title.
///
/// Text fields are kept as the provider sends them; `imdb_rating` may hold
/// the literal `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub external_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Comma-joined genre list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metascore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seasons: Option<String>,
    #[serde(default)]
    pub ratings: Vec<RatingEntry>,
}

impl MovieDetail {
    /// Genre list derived from the comma-joined `genre` field.
    pub fn genres(&self) -> Vec<String> {
        self.genre.as_deref().map(split_genres).unwrap_or_default()
    }

    /// Rounded rating derived from `imdb_rating` (0 when unknown).
    pub fn rating(&self) -> u32 {
        parse_rating(self.imdb_rating.as_deref())
    }

    /// Runtime in minutes, with the documented fallback for unparsable values.
    pub fn runtime_minutes(&self) -> u32 {
        parse_runtime(self.runtime.as_deref().unwrap_or_default())
    }

    /// Build the summary row that a detail lookup creates when none exists.
    pub fn to_summary(&self, fetched_at: i64) -> MovieSummary {
        MovieSummary {
            external_id: self.external_id.clone(),
            title: self.title.clone(),
            year: self.year.clone().unwrap_or_default(),
            kind: self.kind,
            poster: self.poster.clone(),
            genres: self.genres(),
            rating: self.rating(),
            last_fetched_at: fetched_at,
        }
    }
}

/// Field the summary table can be ordered by. Always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Year,
    Rating,
}

impl SortField {
    /// Homepage sort selection: absent, blank or `year` orders by year,
    /// any other value orders by rating.
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort.map(str::trim) {
            None | Some("") => SortField::Year,
            Some(s) if s.eq_ignore_ascii_case("year") => SortField::Year,
            Some(_) => SortField::Rating,
        }
    }

    pub(crate) fn column(&self) -> &'static str {
        match self {
            SortField::Year => "year",
            SortField::Rating => "rating",
        }
    }
}

/// Query for the local title search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySearchQuery {
    /// Substring matched case-insensitively against the title.
    pub text: String,
    /// Optional genre that must be present on the summary (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    10
}

/// One page of stored rows plus the table-level total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Total rows matching, across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size as u64)
        }
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}
