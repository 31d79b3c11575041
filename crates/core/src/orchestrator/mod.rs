//! Catalog orchestrator - decides where each request is served from.
//!
//! - **Homepage**: local store only; an empty store is seeded once from the
//!   configured keywords before the page is read
//! - **Search**: always the provider, written through to the store, with
//!   enrichment dispatched in the background
//! - **Single item**: detail store first, provider on a miss

mod config;
mod engine;
mod types;

pub use config::SeedingConfig;
pub use engine::CatalogOrchestrator;
pub use types::{CatalogPage, OrchestratorError, ResultOrder, SeedReport};
