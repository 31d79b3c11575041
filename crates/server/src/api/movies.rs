//! Movie catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use marquee_core::{CatalogPage, MovieDetail};
use serde::Deserialize;

use super::handlers::{error_response, orchestrator_error, ErrorResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HomepageParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CachedSearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 {
    10
}

fn check_size(size: u32) -> Result<(), ApiError> {
    if size == 0 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "size must be greater than 0",
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/movies/all
///
/// Browse the local catalog; seeds it on first use.
pub async fn homepage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HomepageParams>,
) -> Result<Json<CatalogPage>, ApiError> {
    check_size(params.size)?;

    state
        .orchestrator()
        .get_homepage(params.page, params.size, params.sort.as_deref())
        .await
        .map(Json)
        .map_err(orchestrator_error)
}

/// GET /api/v1/movies
///
/// Search the provider. Without a search term this is the homepage.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CatalogPage>, ApiError> {
    check_size(params.size)?;

    state
        .orchestrator()
        .search(
            params.search.as_deref(),
            params.sort.as_deref(),
            params.filter.as_deref(),
            params.page,
            params.size,
        )
        .await
        .map(Json)
        .map_err(orchestrator_error)
}

/// GET /api/v1/movies/cached
///
/// Title search over the local cache only.
pub async fn search_cached(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CachedSearchParams>,
) -> Result<Json<CatalogPage>, ApiError> {
    check_size(params.size)?;

    state
        .orchestrator()
        .search_cached(
            params.query.as_deref().unwrap_or_default(),
            params.genre.as_deref(),
            params.page,
            params.size,
        )
        .map(Json)
        .map_err(orchestrator_error)
}

/// GET /api/v1/movies/{id}
///
/// Full detail for one movie.
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetail>, ApiError> {
    state
        .orchestrator()
        .get_by_id(&id)
        .await
        .map(Json)
        .map_err(orchestrator_error)
}
