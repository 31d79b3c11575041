//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Metadata provider calls
//! - Cache lookups against the local stores
//! - Seeding and enrichment

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Provider Metrics
// =============================================================================

/// Provider request duration.
pub static PROVIDER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marquee_provider_request_duration_seconds",
            "Duration of metadata provider calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"], // "search", "detail"
    )
    .unwrap()
});

/// Provider requests total.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_provider_requests_total",
            "Total metadata provider requests",
        ),
        &["operation", "result"], // result: "success", "not_found", "rate_limited", "error"
    )
    .unwrap()
});

/// Results returned per provider search.
pub static PROVIDER_SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marquee_provider_search_results",
            "Number of hits returned per provider search page",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Local store lookups by store and outcome.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marquee_cache_lookups_total", "Local cache lookups"),
        &["store", "result"], // store: "summary", "detail"; result: "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Seeding Metrics
// =============================================================================

/// Seeding passes run.
pub static SEEDING_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("marquee_seeding_runs_total", "Cold-start seeding passes run").unwrap()
});

/// Summaries written by seeding.
pub static SEEDED_SUMMARIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_seeded_summaries_total",
        "Summaries written during seeding",
    )
    .unwrap()
});

/// Seed keywords whose provider search failed.
pub static SEEDING_KEYWORD_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_seeding_keyword_failures_total",
        "Seed keywords skipped because the provider search failed",
    )
    .unwrap()
});

// =============================================================================
// Enrichment Metrics
// =============================================================================

/// Per-id enrichment outcomes.
pub static ENRICHMENT_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_enrichment_outcomes_total",
            "Enrichment outcomes per external id",
        ),
        &["outcome"], // "fetched", "skipped", "failed"
    )
    .unwrap()
});

/// Enrichment batches dropped because the queue was full or closed.
pub static ENRICHMENT_BATCHES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_enrichment_batches_dropped_total",
        "Enrichment batches dropped before reaching the worker",
    )
    .unwrap()
});

/// Enrichment batch duration.
pub static ENRICHMENT_BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marquee_enrichment_batch_duration_seconds",
            "Duration of one enrichment batch",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Provider
        Box::new(PROVIDER_REQUEST_DURATION.clone()),
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_SEARCH_RESULTS.clone()),
        // Cache
        Box::new(CACHE_LOOKUPS.clone()),
        // Seeding
        Box::new(SEEDING_RUNS.clone()),
        Box::new(SEEDED_SUMMARIES.clone()),
        Box::new(SEEDING_KEYWORD_FAILURES.clone()),
        // Enrichment
        Box::new(ENRICHMENT_OUTCOMES.clone()),
        Box::new(ENRICHMENT_BATCHES_DROPPED.clone()),
        Box::new(ENRICHMENT_BATCH_DURATION.clone()),
    ]
}
