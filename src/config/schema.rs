//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the facade.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::providers::{ecan, yours};

/// Root configuration for the routing facade.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FacadeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound request timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Upstream routing providers.
    pub providers: ProvidersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one inbound request, in seconds.
    /// Backstop above the per-provider timeouts.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum JSON body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Upstream provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Honor HTTP(S)_PROXY environment variables for outbound calls.
    pub system_proxy: bool,

    pub yours: ProviderConfig,

    pub ecan: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            system_proxy: true,
            yours: ProviderConfig::new(yours::DEFAULT_BASE_URL),
            ecan: ProviderConfig::new(ecan::DEFAULT_BASE_URL),
        }
    }
}

/// Settings for one upstream provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Register this provider at startup.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Endpoint URL (query parameters are appended).
    pub base_url: String,

    /// Deadline for one upstream call in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            enabled: default_enabled(),
            base_url: base_url.into(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_provider_timeout() -> u64 {
    15
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error, or an EnvFilter string).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
