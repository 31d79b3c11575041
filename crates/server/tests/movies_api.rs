//! API tests for the movie catalog endpoints.
//!
//! These tests run the full router in-process with the mock metadata
//! provider and real SQLite stores.

mod common;

use axum::http::StatusCode;
use marquee_core::{ProviderError, SeedingConfig, SummaryStore};

use common::{fixtures, TestFixture};

fn one_keyword(keyword: &str) -> SeedingConfig {
    let mut seeding = SeedingConfig::default();
    seeding.categories.clear();
    seeding
        .categories
        .insert("Action".to_string(), vec![keyword.to_string()]);
    seeding
}

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_hides_api_key() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["provider"]["api_key_configured"], true);
    assert!(response.body["provider"].get("api_key").is_none());
    assert!(!response.body.to_string().contains("test-api-key"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("marquee_http_requests_total"));
    assert!(body.contains("marquee_catalog_summaries"));
}

// =============================================================================
// Homepage
// =============================================================================

#[tokio::test]
async fn test_homepage_seeds_on_first_request() {
    let fixture = TestFixture::with_seeding(one_keyword("Batman")).await;
    fixture
        .provider
        .add_search_page(
            "batman",
            1,
            fixtures::search_results(fixtures::numbered_hits("tt", "Batman", 5), 5),
        )
        .await;

    let response = fixture.get("/api/v1/movies/all?page=0&size=3&sort=year").await;

    // Seeding keeps one page worth of hits per keyword
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 3);
    assert_eq!(response.body["totalPages"], 1);
    assert_eq!(response.body["pageNumber"], 0);
    assert_eq!(response.body["size"], 3);

    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["year"], "1993");
    assert_eq!(data[0]["type"], "movie");
    assert_eq!(data[0]["rating"], 0);
}

#[tokio::test]
async fn test_homepage_defaults() {
    let fixture = TestFixture::new().await;
    fixture
        .summaries
        .upsert_if_absent(&fixtures::summary("tt1", "Heat", "1995"))
        .unwrap();

    let response = fixture.get("/api/v1/movies/all").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["size"], 10);
    assert_eq!(response.body["total"], 1);
}

#[tokio::test]
async fn test_homepage_rejects_zero_size() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/movies/all?size=0").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_homepage_rejects_negative_page() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/movies/all?page=-1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_translates_pages() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .add_search_page(
            "batman",
            1,
            fixtures::search_results(fixtures::numbered_hits("tt", "Batman", 10), 25),
        )
        .await;

    let response = fixture.get("/api/v1/movies?search=batman&page=0&size=10").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalPages"], 3);
    assert_eq!(response.body["pageNumber"], 0);
    assert_eq!(response.body["total"], 25);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 10);
    assert_eq!(
        fixture.provider.search_calls().await,
        vec![("batman".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_search_no_results_is_empty_page() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/movies?search=qqqzzz&page=2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 0);
    assert_eq!(response.body["totalPages"], 0);
    assert_eq!(response.body["pageNumber"], 2);
    assert!(response.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_largest_page_is_empty_page() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .get("/api/v1/movies?search=batman&page=4294967295")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 0);
    assert_eq!(response.body["pageNumber"], 4294967295u64);
    assert!(fixture.provider.search_calls().await.is_empty());
}

#[tokio::test]
async fn test_search_without_term_is_homepage() {
    let fixture = TestFixture::new().await;
    fixture
        .summaries
        .upsert_if_absent(&fixtures::summary("tt1", "Heat", "1995"))
        .unwrap();

    let response = fixture.get("/api/v1/movies?sort=rating").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert!(fixture.provider.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_search_provider_failure_is_internal_error() {
    let fixture = TestFixture::new().await;
    fixture.provider.fail_query("batman").await;

    let response = fixture.get("/api/v1/movies?search=batman").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_search_cached_only_reads_local_store() {
    let fixture = TestFixture::new().await;
    let mut alien = fixtures::summary("tt1", "Alien", "1979");
    alien.genres = vec!["Horror".to_string(), "Sci-Fi".to_string()];
    fixture.summaries.upsert_if_absent(&alien).unwrap();
    fixture
        .summaries
        .upsert_if_absent(&fixtures::summary("tt2", "Aliens", "1986"))
        .unwrap();

    let response = fixture
        .get("/api/v1/movies/cached?query=alien&genre=sci-fi")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["data"][0]["external_id"], "tt1");
    assert!(fixture.provider.recorded_calls().await.is_empty());
}

// =============================================================================
// Detail
// =============================================================================

#[tokio::test]
async fn test_get_movie_detail() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .add_detail(fixtures::movie_detail(
            "tt0133093",
            "The Matrix",
            "1999",
            "Action, Sci-Fi",
            "8.7",
        ))
        .await;

    let response = fixture.get("/api/v1/movies/tt0133093").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "The Matrix");
    assert_eq!(response.body["imdb_rating"], "8.7");
    assert_eq!(response.body["type"], "movie");

    let summary = fixture
        .summaries
        .find_by_external_id("tt0133093")
        .unwrap()
        .unwrap();
    assert_eq!(summary.rating, 9);
}

#[tokio::test]
async fn test_get_movie_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/movies/tt9999999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("tt9999999"));
}

#[tokio::test]
async fn test_get_movie_unreadable_reply_is_internal_error() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_next_error(ProviderError::Parse("expected value".into()))
        .await;

    let response = fixture.get("/api/v1/movies/tt1").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Administration
// =============================================================================

#[tokio::test]
async fn test_admin_add_and_remove_movie() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .add_detail(fixtures::movie_detail("tt1", "Heat", "1995", "Crime, Drama", "8.3"))
        .await;

    let added = fixture.post("/api/v1/admin/movies/tt1").await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.body["external_id"], "tt1");
    assert_eq!(added.body["genres"][0], "Crime");

    let removed = fixture.delete("/api/v1/admin/movies/tt1").await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(fixture.summaries.count().unwrap(), 0);

    let again = fixture.delete("/api/v1/admin/movies/tt1").await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_add_unknown_movie() {
    let fixture = TestFixture::new().await;
    let response = fixture.post("/api/v1/admin/movies/tt404").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
