//! Background enrichment of cached summaries.
//!
//! Callers on the request path hand a batch of external ids to an
//! [`EnrichmentHandle`] and return immediately. The [`EnrichmentWorker`]
//! fetches full details for ids the detail store doesn't have yet, stores
//! them, and fills in the summary's genres and rating where those are still
//! empty. Failures are logged and counted, never returned to anyone.

mod config;
mod handle;
mod worker;

pub use config::EnrichmentConfig;
pub use handle::{EnrichmentHandle, EnrichmentRequest};
pub use worker::{
    create_enrichment_system, Enricher, EnrichmentOutcome, EnrichmentReport, EnrichmentWorker,
};
