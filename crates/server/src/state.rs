use std::sync::Arc;

use marquee_core::{CatalogOrchestrator, Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<CatalogOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<CatalogOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &CatalogOrchestrator {
        self.orchestrator.as_ref()
    }
}
