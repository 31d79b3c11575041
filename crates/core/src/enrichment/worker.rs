use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{EnrichmentConfig, EnrichmentHandle, EnrichmentRequest};
use crate::catalog::{now_millis, DetailStore, SummaryStore};
use crate::metrics;
use crate::provider::{MetadataProvider, PlotLength};

/// What happened to a single id in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Detail fetched and stored, summary patched.
    Fetched,
    /// Detail already cached; nothing to do.
    Skipped,
    /// Lookup, fetch or write failed. Logged, not surfaced.
    Failed,
}

impl EnrichmentOutcome {
    fn label(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Fetched => "fetched",
            EnrichmentOutcome::Skipped => "skipped",
            EnrichmentOutcome::Failed => "failed",
        }
    }
}

/// Per-batch tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub fetched: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl EnrichmentReport {
    pub fn total(&self) -> usize {
        self.fetched + self.skipped + self.failed
    }

    fn record(&mut self, outcome: EnrichmentOutcome) {
        match outcome {
            EnrichmentOutcome::Fetched => self.fetched += 1,
            EnrichmentOutcome::Skipped => self.skipped += 1,
            EnrichmentOutcome::Failed => self.failed += 1,
        }
    }
}

/// Fetches and persists details for summaries that lack them.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
    summaries: Arc<dyn SummaryStore>,
    details: Arc<dyn DetailStore>,
    concurrency: usize,
}

impl Enricher {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        summaries: Arc<dyn SummaryStore>,
        details: Arc<dyn DetailStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            summaries,
            details,
            concurrency: concurrency.max(1),
        }
    }

    /// Enrich every distinct id in the batch.
    ///
    /// Each id is attempted at most once. One id failing never stops the rest.
    pub async fn enrich_batch(&self, external_ids: &[String]) -> EnrichmentReport {
        let started = Instant::now();

        let unique: Vec<String> = {
            let mut seen = HashSet::new();
            external_ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty() && seen.insert(*id))
                .map(str::to_string)
                .collect()
        };

        // Owned ids and a cloned enricher keep the stream 'static, so the
        // worker future stays Send.
        let outcomes: Vec<EnrichmentOutcome> = stream::iter(unique)
            .map(|id| {
                let this = self.clone();
                async move { this.enrich_one(&id).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = EnrichmentReport::default();
        for outcome in outcomes {
            metrics::ENRICHMENT_OUTCOMES
                .with_label_values(&[outcome.label()])
                .inc();
            report.record(outcome);
        }

        metrics::ENRICHMENT_BATCH_DURATION
            .with_label_values(&[])
            .observe(started.elapsed().as_secs_f64());

        report
    }

    async fn enrich_one(&self, external_id: &str) -> EnrichmentOutcome {
        match self.details.find_by_external_id(external_id) {
            Ok(Some(_)) => {
                debug!(external_id, "Detail already cached, skipping enrichment");
                return EnrichmentOutcome::Skipped;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(external_id, error = %e, "Detail lookup failed during enrichment");
                return EnrichmentOutcome::Failed;
            }
        }

        let detail = match self
            .provider
            .fetch_detail(external_id, PlotLength::Short)
            .await
        {
            Ok(detail) => detail,
            Err(e) => {
                warn!(external_id, error = %e, "Detail fetch failed during enrichment");
                return EnrichmentOutcome::Failed;
            }
        };

        if let Err(e) = self.details.upsert(&detail) {
            warn!(external_id, error = %e, "Failed to store detail during enrichment");
            return EnrichmentOutcome::Failed;
        }

        match self.summaries.patch_missing(
            external_id,
            &detail.genres(),
            detail.rating(),
            now_millis(),
        ) {
            Ok(true) => {}
            Ok(false) => debug!(external_id, "No summary to patch after enrichment"),
            Err(e) => {
                warn!(external_id, error = %e, "Failed to patch summary during enrichment");
                return EnrichmentOutcome::Failed;
            }
        }

        EnrichmentOutcome::Fetched
    }
}

/// Background task that receives enrichment batches and processes them.
pub struct EnrichmentWorker {
    rx: mpsc::Receiver<EnrichmentRequest>,
    enricher: Enricher,
}

impl EnrichmentWorker {
    pub fn new(rx: mpsc::Receiver<EnrichmentRequest>, enricher: Enricher) -> Self {
        Self { rx, enricher }
    }

    /// Run the worker, consuming batches until every handle is dropped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Enrichment worker started");

        while let Some(request) = self.rx.recv().await {
            let queued_ms = (chrono::Utc::now() - request.requested_at).num_milliseconds();
            let report = self.enricher.enrich_batch(&request.external_ids).await;
            info!(
                fetched = report.fetched,
                skipped = report.skipped,
                failed = report.failed,
                queued_ms,
                "Enrichment batch finished"
            );
        }

        info!("Enrichment worker shutting down");
    }
}

/// Create a complete enrichment system
///
/// Returns:
/// - `EnrichmentHandle` - for dispatching batches (clone this to share across tasks)
/// - `EnrichmentWorker` - spawn this as a background task with `tokio::spawn(worker.run())`
pub fn create_enrichment_system(
    provider: Arc<dyn MetadataProvider>,
    summaries: Arc<dyn SummaryStore>,
    details: Arc<dyn DetailStore>,
    config: &EnrichmentConfig,
) -> (EnrichmentHandle, EnrichmentWorker) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let handle = EnrichmentHandle::new(tx);
    let enricher = Enricher::new(provider, summaries, details, config.concurrency);
    let worker = EnrichmentWorker::new(rx, enricher);
    (handle, worker)
}
