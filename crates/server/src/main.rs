use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{
    create_enrichment_system, load_config, validate_config, CatalogOrchestrator, DetailStore,
    MetadataProvider, OmdbClient, SqliteDetailStore, SqliteSummaryStore, SummaryStore,
};
use marquee_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MARQUEE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Provider: {}", config.provider.base_url);

    // Create SQLite stores (both tables share one database file)
    let summaries: Arc<dyn SummaryStore> = Arc::new(
        SqliteSummaryStore::new(&config.database.path)
            .context("Failed to create summary store")?,
    );
    let details: Arc<dyn DetailStore> = Arc::new(
        SqliteDetailStore::new(&config.database.path).context("Failed to create detail store")?,
    );
    info!("Catalog stores initialized");

    // Create provider client
    let provider: Arc<dyn MetadataProvider> = Arc::new(
        OmdbClient::new(config.provider.clone()).context("Failed to create provider client")?,
    );
    if let Some(rpm) = config.provider.requests_per_minute {
        info!("Provider throttled to {} requests/minute", rpm);
    }

    // Create enrichment system and spawn the worker
    let (enrichment_handle, enrichment_worker) = create_enrichment_system(
        Arc::clone(&provider),
        Arc::clone(&summaries),
        Arc::clone(&details),
        &config.enrichment,
    );
    let worker_handle = tokio::spawn(enrichment_worker.run());
    info!(
        "Enrichment worker started (queue: {}, concurrency: {})",
        config.enrichment.queue_capacity, config.enrichment.concurrency
    );

    let orchestrator = Arc::new(CatalogOrchestrator::new(
        config.seeding.clone(),
        provider,
        summaries,
        details,
        enrichment_handle,
    ));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), orchestrator));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router (and with it the last EnrichmentHandle) is gone once serve
    // returns, so the worker drains its queue and exits.
    info!("Server shutting down...");
    let _ = worker_handle.await;
    info!("Enrichment worker stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
