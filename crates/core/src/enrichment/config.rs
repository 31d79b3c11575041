//! Enrichment worker configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the background enrichment worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Batches that can wait in the queue before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Detail fetches in flight at once within a batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_concurrency() -> usize {
    4
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            concurrency: default_concurrency(),
        }
    }
}
