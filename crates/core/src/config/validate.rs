use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one non-blank collection term
/// - Page and listing limits within what the remote API accepts
///
/// Missing API keys are not a validation error: they surface on every
/// remote call instead, so cached data can still be served.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.roster.collections.iter().all(|c| c.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "roster.collections must contain at least one search term".to_string(),
        ));
    }

    if !(1..=100).contains(&config.roster.page_limit) {
        return Err(ConfigError::ValidationError(format!(
            "roster.page_limit must be between 1 and 100, got {}",
            config.roster.page_limit
        )));
    }

    if !(1..=100).contains(&config.marvel.collection_listing_limit) {
        return Err(ConfigError::ValidationError(format!(
            "marvel.collection_listing_limit must be between 1 and 100, got {}",
            config.marvel.collection_listing_limit
        )));
    }

    Ok(())
}
