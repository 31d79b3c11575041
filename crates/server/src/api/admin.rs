//! Catalog administration handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use marquee_core::MovieSummary;
use serde::Serialize;

use super::handlers::{orchestrator_error, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// POST /api/v1/admin/movies/{id}
///
/// Make sure a movie is in the catalog, fetching it if needed.
pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MovieSummary>), (StatusCode, Json<ErrorResponse>)> {
    state
        .orchestrator()
        .add_movie(&id)
        .await
        .map(|summary| (StatusCode::CREATED, Json(summary)))
        .map_err(orchestrator_error)
}

/// DELETE /api/v1/admin/movies/{id}
///
/// Remove a movie summary from the catalog.
pub async fn remove_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .orchestrator()
        .remove_movie(&id)
        .map(|()| {
            Json(SuccessResponse {
                message: format!("Removed movie {}", id),
            })
        })
        .map_err(orchestrator_error)
}
