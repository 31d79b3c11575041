use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::metrics;

/// One batch of external ids to enrich.
#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    pub requested_at: DateTime<Utc>,
    pub external_ids: Vec<String>,
}

/// Handle for dispatching enrichment batches.
///
/// This is cheaply cloneable and can be shared across tasks.
/// Batches are sent through a bounded channel to be processed by the
/// EnrichmentWorker.
#[derive(Clone)]
pub struct EnrichmentHandle {
    tx: mpsc::Sender<EnrichmentRequest>,
}

impl EnrichmentHandle {
    /// Create a new enrichment handle from a channel sender
    pub fn new(tx: mpsc::Sender<EnrichmentRequest>) -> Self {
        Self { tx }
    }

    /// Queue a batch without waiting.
    ///
    /// Never blocks the caller. If the queue is full or the worker is gone
    /// the batch is dropped and logged. Returns true if the batch was queued.
    pub fn dispatch(&self, external_ids: Vec<String>) -> bool {
        if external_ids.is_empty() {
            return true;
        }

        let count = external_ids.len();
        let request = EnrichmentRequest {
            requested_at: Utc::now(),
            external_ids,
        };

        match self.tx.try_send(request) {
            Ok(()) => {
                tracing::debug!(ids = count, "Queued enrichment batch");
                true
            }
            Err(TrySendError::Full(_)) => {
                metrics::ENRICHMENT_BATCHES_DROPPED.inc();
                tracing::warn!(ids = count, "Enrichment queue full, dropping batch");
                false
            }
            Err(TrySendError::Closed(_)) => {
                metrics::ENRICHMENT_BATCHES_DROPPED.inc();
                tracing::warn!(ids = count, "Enrichment worker stopped, dropping batch");
                false
            }
        }
    }
}
