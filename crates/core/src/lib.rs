pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod metrics;
pub mod orchestrator;
pub mod provider;
pub mod testing;

pub use catalog::{
    CatalogError, DetailStore, MediaKind, MovieDetail, MovieSummary, Page, RatingEntry, SortField,
    SqliteDetailStore, SqliteSummaryStore, SummarySearchQuery, SummaryStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, ServerConfig,
};
pub use enrichment::{create_enrichment_system, EnrichmentConfig, EnrichmentHandle, EnrichmentWorker};
pub use orchestrator::{
    CatalogOrchestrator, CatalogPage, OrchestratorError, ResultOrder, SeedReport, SeedingConfig,
};
pub use provider::{
    MetadataProvider, OmdbClient, OmdbConfig, PlotLength, ProviderError, SearchHit, SearchResults,
};
