//! Configuration validation.
//!
//! Serde handles syntactic validation; this module covers the semantic
//! checks: addresses must parse, the rate window must be non-zero, vendor
//! URLs must be absolute http(s) URLs. All errors are collected and
//! reported together rather than failing on the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("shield rate_limit must be greater than zero")]
    ZeroRateLimit,

    #[error("shield window_secs must be greater than zero")]
    ZeroWindow,

    #[error("vendor route '{0}' must start with '/'")]
    InvalidVendorRoute(String),

    #[error("vendor asset '{key}' has invalid URL '{url}'")]
    InvalidVendorUrl { key: String, url: String },
}

/// Validate a configuration, returning every failure found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.shield.rate_limit == 0 {
        errors.push(ValidationError::ZeroRateLimit);
    }
    if config.shield.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }

    if !config.vendor.route.starts_with('/') {
        errors.push(ValidationError::InvalidVendorRoute(config.vendor.route.clone()));
    }

    for (key, url) in &config.vendor.assets {
        let valid = Url::parse(url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidVendorUrl {
                key: key.clone(),
                url: url.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
