use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Provider section exists (enforced by serde)
/// - Provider API key is not blank and the timeout is not 0
/// - Server port is not 0
/// - Enrichment queue capacity and concurrency are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Provider validation
    if config.provider.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.api_key cannot be empty".to_string(),
        ));
    }
    if config.provider.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "provider.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Enrichment validation
    if config.enrichment.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "enrichment.queue_capacity cannot be 0".to_string(),
        ));
    }
    if config.enrichment.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "enrichment.concurrency cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ServerConfig};
    use crate::enrichment::EnrichmentConfig;
    use crate::orchestrator::SeedingConfig;
    use crate::provider::OmdbConfig;

    fn valid_config() -> Config {
        Config {
            provider: OmdbConfig::new("abc123"),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            enrichment: EnrichmentConfig::default(),
            seeding: SeedingConfig::default(),
        }
    }

    fn assert_invalid(config: &Config, field: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains(field), "{}", msg),
            other => panic!("expected validation error for {}, got {:?}", field, other),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_blank_api_key_fails() {
        let mut config = valid_config();
        config.provider.api_key = "   ".to_string();
        assert_invalid(&config, "provider.api_key");
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.provider.timeout_secs = 0;
        assert_invalid(&config, "provider.timeout_secs");
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        assert_invalid(&config, "server.port");
    }

    #[test]
    fn test_validate_enrichment_limits() {
        let mut config = valid_config();
        config.enrichment.queue_capacity = 0;
        assert_invalid(&config, "enrichment.queue_capacity");

        let mut config = valid_config();
        config.enrichment.concurrency = 0;
        assert_invalid(&config, "enrichment.concurrency");
    }
}
