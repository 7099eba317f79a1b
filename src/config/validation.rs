//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Catch discovery conventions that cannot work (colliding directories)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("discovery.api_prefix `{0}` must start with '/'")]
    InvalidApiPrefix(String),

    #[error("discovery.source_extensions must contain at least one extension")]
    NoSourceExtensions,

    #[error("discovery.source_extensions entry `{0}` must not be empty or contain '.'")]
    InvalidSourceExtension(String),

    #[error("discovery directories must be non-empty and distinct (got `{0}`)")]
    InvalidDiscoveryDirs(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address `{0}` is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let discovery = &config.discovery;
    if !discovery.api_prefix.starts_with('/') {
        errors.push(ValidationError::InvalidApiPrefix(
            discovery.api_prefix.clone(),
        ));
    }

    if discovery.source_extensions.is_empty() {
        errors.push(ValidationError::NoSourceExtensions);
    }
    for ext in &discovery.source_extensions {
        if ext.is_empty() || ext.contains('.') {
            errors.push(ValidationError::InvalidSourceExtension(ext.clone()));
        }
    }

    let dirs = [
        discovery.routes_dir.as_str(),
        discovery.api_dir.as_str(),
        discovery.middleware_dir.as_str(),
    ];
    let distinct = dirs[0] != dirs[1] && dirs[0] != dirs[2] && dirs[1] != dirs[2];
    if !distinct || dirs.iter().any(|d| d.is_empty()) {
        errors.push(ValidationError::InvalidDiscoveryDirs(dirs.join(", ")));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.discovery.api_prefix = "api".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_colliding_directories_rejected() {
        let mut config = RouterConfig::default();
        config.discovery.api_dir = "routes".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_dotted_extension_rejected() {
        let mut config = RouterConfig::default();
        config.discovery.source_extensions = vec![".ts".into()];
        assert!(validate_config(&config).is_err());
    }
}
