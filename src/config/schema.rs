//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Development mode. Enables the live-reload watcher and the reload
    /// client script; disables production-only response headers.
    pub dev: bool,

    /// Directory served as static files (and watched in dev mode).
    pub static_dir: String,

    /// Abuse filter settings.
    pub shield: ShieldConfig,

    /// Vendor asset proxy settings.
    pub vendor: VendorConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            dev: false,
            static_dir: "static".to_string(),
            shield: ShieldConfig::default(),
            vendor: VendorConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Abuse filter configuration.
///
/// The denylist itself is fixed (scanner probes do not vary per deployment);
/// only the rate limiting knobs are configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Enable the abuse filter.
    pub enabled: bool,

    /// Maximum requests per client identity within one window.
    pub rate_limit: u32,

    /// Fixed window length in seconds.
    pub window_secs: u64,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_limit: 180,
            window_secs: 60,
        }
    }
}

/// Vendor asset proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Route prefix the vendor assets are served under (e.g., "/vendor").
    pub route: String,

    /// Allow-list mapping public keys to remote URLs
    /// (e.g., { "alpinejs.mjs" = "https://esm.sh/alpinejs@3.15.4/..." }).
    pub assets: HashMap<String, String>,

    /// Timeout for a single upstream fetch in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            route: "/".to_string(),
            assets: HashMap::new(),
            fetch_timeout_secs: 10,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (time until response headers) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
