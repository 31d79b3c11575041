//! Common test utilities for API testing with a mock provider.
//!
//! This module provides a test fixture that creates an in-process server
//! with the mock metadata provider injected, real SQLite stores in a temp
//! directory and a live enrichment worker.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use marquee_core::{
    create_enrichment_system, testing::MockMetadataProvider, CatalogOrchestrator, Config,
    DatabaseConfig, EnrichmentConfig, OmdbConfig, SeedingConfig, ServerConfig, SqliteDetailStore,
    SqliteSummaryStore,
};

/// Re-export fixtures for test convenience
pub use marquee_core::testing::fixtures;

/// Test fixture for API testing with a mock provider.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_detail() {
///     let fixture = TestFixture::new().await;
///     fixture.provider.add_detail(fixtures::movie_detail("tt1", "Heat", "1995", "Crime", "8.3")).await;
///
///     let response = fixture.get("/api/v1/movies/tt1").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock provider - configure search pages and details
    pub provider: Arc<MockMetadataProvider>,
    /// Summary store, for direct assertions
    pub summaries: Arc<SqliteSummaryStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the default seed keywords.
    pub async fn new() -> Self {
        Self::with_seeding(SeedingConfig::default()).await
    }

    /// Create a test fixture with custom seed keywords.
    pub async fn with_seeding(seeding: SeedingConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            provider: OmdbConfig::new("test-api-key"),
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            enrichment: EnrichmentConfig::default(),
            seeding: seeding.clone(),
        };

        let provider = Arc::new(MockMetadataProvider::new());
        let summaries = Arc::new(
            SqliteSummaryStore::new(&db_path).expect("Failed to create summary store"),
        );
        let details =
            Arc::new(SqliteDetailStore::new(&db_path).expect("Failed to create detail store"));

        let (handle, worker) = create_enrichment_system(
            provider.clone(),
            summaries.clone(),
            details.clone(),
            &config.enrichment,
        );
        tokio::spawn(worker.run());

        let orchestrator = Arc::new(CatalogOrchestrator::new(
            seeding,
            provider.clone(),
            summaries.clone(),
            details,
            handle,
        ));

        let state = Arc::new(marquee_server::state::AppState::new(config, orchestrator));
        let router = marquee_server::api::create_router(state);

        Self {
            router,
            provider,
            summaries,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
