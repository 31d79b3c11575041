//! OMDb (Open Movie Database) API client.
//!
//! OMDb requires an API key for access and enforces a daily request limit.
//! Search pages are fixed at 10 hits and numbered from 1.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::ProviderThrottle;
use super::types::{PlotLength, SearchHit, SearchResults};
use super::{MetadataProvider, ProviderError};
use crate::catalog::{non_placeholder, MediaKind, MovieDetail, RatingEntry};
use crate::metrics;

/// OMDb API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// OMDb API key (required).
    pub api_key: String,
    /// Base URL (default: http://www.omdbapi.com/).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Client-side throttle; unset means no throttling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,
}

fn default_base_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl OmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            requests_per_minute: None,
        }
    }
}

/// OMDb API client.
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    throttle: Option<ProviderThrottle>,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: OmdbConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OMDb API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            throttle: config.requests_per_minute.map(ProviderThrottle::new),
        })
    }

    /// Issue one GET and return the body text of a successful reply.
    async fn get(&self, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // OMDb answers 401 both for bad keys and for an exhausted quota
            let body = response.text().await.unwrap_or_default();
            return Err(classify_rejection(&body).unwrap_or_else(|| {
                ProviderError::NotConfigured("Invalid OMDb API key".to_string())
            }));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(format!("{:?}", params)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

fn record(operation: &str, started: Instant, result: &Result<impl Sized, ProviderError>) {
    metrics::PROVIDER_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
    let label = match result {
        Ok(_) => "success",
        Err(e) => e.label(),
    };
    metrics::PROVIDER_REQUESTS
        .with_label_values(&[operation, label])
        .inc();
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    async fn search(&self, query: &str, page: u32) -> Result<SearchResults, ProviderError> {
        debug!("OMDb search: query='{}', page={}", query, page);

        let started = Instant::now();
        let page = page.max(1).to_string();
        let result = match self.get(&[("s", query), ("page", page.as_str())]).await {
            Ok(body) => parse_search_body(&body),
            Err(e) => Err(e),
        };
        record("search", started, &result);

        if let Ok(results) = &result {
            metrics::PROVIDER_SEARCH_RESULTS
                .with_label_values(&[])
                .observe(results.hits.len() as f64);
        }
        result
    }

    async fn fetch_detail(
        &self,
        external_id: &str,
        plot: PlotLength,
    ) -> Result<MovieDetail, ProviderError> {
        debug!("OMDb get detail: id={}, plot={}", external_id, plot.as_str());

        let started = Instant::now();
        let result = match self
            .get(&[("i", external_id), ("plot", plot.as_str())])
            .await
        {
            Ok(body) => parse_detail_body(external_id, &body),
            Err(e) => Err(e),
        };
        record("detail", started, &result);
        result
    }
}

/// Map an OMDb error message to a transport-class error, if it is one.
fn classify_rejection(message: &str) -> Option<ProviderError> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("limit reached") {
        Some(ProviderError::RateLimited)
    } else if lower.contains("api key") {
        Some(ProviderError::NotConfigured(message.trim().to_string()))
    } else {
        None
    }
}

fn is_true(flag: Option<&str>) -> bool {
    flag.is_some_and(|f| f.trim().eq_ignore_ascii_case("true"))
}

/// Parse a search reply body.
///
/// An empty body or `Response: "False"` is a legitimate empty result.
pub(crate) fn parse_search_body(body: &str) -> Result<SearchResults, ProviderError> {
    if body.trim().is_empty() {
        return Ok(SearchResults::empty());
    }

    let reply: OmdbSearchResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::Parse(format!("Failed to parse search response: {}", e))
    })?;

    if !is_true(reply.response.as_deref()) {
        let message = reply.error.unwrap_or_default();
        if let Some(err) = classify_rejection(&message) {
            return Err(err);
        }
        debug!("OMDb search returned no results: {}", message);
        return Ok(SearchResults::empty());
    }

    let total_results = reply
        .total_results
        .as_deref()
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(0);

    let hits = reply
        .search
        .into_iter()
        .filter_map(|item| SearchHit::try_from(item).ok())
        .collect();

    Ok(SearchResults {
        hits,
        total_results,
        found: true,
    })
}

/// Parse a detail reply body.
///
/// An empty body or `Response: "False"` means the provider has no record.
pub(crate) fn parse_detail_body(external_id: &str, body: &str) -> Result<MovieDetail, ProviderError> {
    if body.trim().is_empty() {
        return Err(ProviderError::NotFound(external_id.to_string()));
    }

    let reply: OmdbDetailResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::Parse(format!("Failed to parse detail response: {}", e))
    })?;

    if !is_true(reply.response.as_deref()) {
        let message = reply.error.clone().unwrap_or_default();
        if let Some(err) = classify_rejection(&message) {
            return Err(err);
        }
        return Err(ProviderError::NotFound(external_id.to_string()));
    }

    reply.into_detail(external_id)
}

// ============================================================================
// OMDb API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Rated")]
    rated: Option<String>,
    #[serde(rename = "Released")]
    released: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Writer")]
    writer: Option<String>,
    #[serde(rename = "Actors")]
    actors: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Language")]
    language: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "Awards")]
    awards: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<OmdbRating>,
    #[serde(rename = "Metascore")]
    metascore: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    imdb_votes: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "totalSeasons")]
    total_seasons: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

impl TryFrom<OmdbSearchItem> for SearchHit {
    type Error = ProviderError;

    fn try_from(item: OmdbSearchItem) -> Result<Self, Self::Error> {
        let external_id = item
            .imdb_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::Parse("search hit without imdbID".to_string()))?;

        Ok(Self {
            external_id,
            title: item.title.unwrap_or_default(),
            year: item.year.unwrap_or_default(),
            kind: item
                .kind
                .as_deref()
                .map(|k| k.parse().unwrap_or(MediaKind::Other))
                .unwrap_or_default(),
            poster: non_placeholder(item.poster),
        })
    }
}

impl OmdbDetailResponse {
    fn into_detail(self, requested_id: &str) -> Result<MovieDetail, ProviderError> {
        let title = non_placeholder(self.title).ok_or_else(|| {
            ProviderError::Parse(format!("detail for {} has no title", requested_id))
        })?;

        let external_id = non_placeholder(self.imdb_id).unwrap_or_else(|| requested_id.to_string());

        Ok(MovieDetail {
            external_id,
            title,
            year: non_placeholder(self.year),
            rated: non_placeholder(self.rated),
            released: non_placeholder(self.released),
            runtime: non_placeholder(self.runtime),
            genre: non_placeholder(self.genre),
            director: non_placeholder(self.director),
            writer: non_placeholder(self.writer),
            actors: non_placeholder(self.actors),
            plot: non_placeholder(self.plot),
            language: non_placeholder(self.language),
            country: non_placeholder(self.country),
            awards: non_placeholder(self.awards),
            poster: non_placeholder(self.poster),
            metascore: non_placeholder(self.metascore),
            // Kept verbatim; "N/A" is meaningful to clients here
            imdb_rating: self.imdb_rating,
            imdb_votes: non_placeholder(self.imdb_votes),
            kind: self
                .kind
                .as_deref()
                .map(|k| k.parse().unwrap_or(MediaKind::Other))
                .unwrap_or_default(),
            total_seasons: non_placeholder(self.total_seasons),
            ratings: self
                .ratings
                .into_iter()
                .map(|r| RatingEntry {
                    source: r.source,
                    value: r.value,
                })
                .collect(),
        })
    }
}
