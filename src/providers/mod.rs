//! Upstream routing provider subsystem.
//!
//! # Data Flow
//! ```text
//! RouteQuery
//!     → adapter.build_request() (provider URL + params, mode remapping)
//!     → client.rs (GET with deadline, status classification)
//!     → adapter.parse_response() (axis swap / reprojection)
//!     → RouteResult
//! ```
//!
//! # Design Decisions
//! - Adapters are pure translators; transport lives in one shared client
//! - Registry is built once at startup and never mutated
//! - New providers implement [`ProviderAdapter`] and register under a unique name

pub mod client;
pub mod ecan;
pub mod projection;
pub mod yours;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::ProvidersConfig;
use crate::routing::{LatLon, RouteError, RouteOutcome, RouteQuery, RouteResult};

pub use client::UpstreamClient;
pub use ecan::EcanAdapter;
pub use yours::YoursAdapter;

/// Outbound GET request description.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub url: Url,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Look up a query parameter by name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Translator between the canonical models and one provider's wire format.
pub trait ProviderAdapter: Send + Sync + std::fmt::Debug {
    /// Service name the adapter is registered under.
    fn name(&self) -> &str;

    /// Deadline for one outbound call.
    fn timeout(&self) -> Duration;

    /// Describe the outbound call for a query.
    fn build_request(&self, query: &RouteQuery) -> RouteOutcome<UpstreamRequest>;

    /// Turn the provider's raw response body into a canonical result.
    fn parse_response(&self, body: &[u8]) -> RouteOutcome<RouteResult>;
}

/// Reject geometry that is not plain degrees.
pub(crate) fn ensure_geographic(provider: &str, points: &[LatLon]) -> RouteOutcome<()> {
    match points.iter().position(|p| !p.is_geographic()) {
        Some(i) => Err(RouteError::malformed(
            provider,
            format!("point {} is not a valid latitude/longitude: {}", i, points[i]),
        )),
        None => Ok(()),
    }
}

/// Immutable name → adapter lookup.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    adapters: BTreeMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Build the registry from the enabled providers in the configuration.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, url::ParseError> {
        let mut builder = ProviderRegistryBuilder::default();

        if config.yours.enabled {
            builder = builder.register(YoursAdapter::new(
                config.yours.base_url.parse()?,
                Duration::from_secs(config.yours.timeout_secs),
            ));
        }
        if config.ecan.enabled {
            builder = builder.register(EcanAdapter::new(
                config.ecan.base_url.parse()?,
                Duration::from_secs(config.ecan.timeout_secs),
            ));
        }

        Ok(builder.build())
    }

    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// Find the adapter registered under `name`.
    pub fn get(&self, name: &str) -> RouteOutcome<Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(name)
            .cloned()
            .ok_or_else(|| RouteError::UnknownService(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Collects adapters before the registry is frozen.
#[derive(Debug, Default)]
pub struct ProviderRegistryBuilder {
    adapters: BTreeMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistryBuilder {
    /// Add an adapter. A later registration under the same name replaces the earlier one.
    pub fn register(mut self, adapter: impl ProviderAdapter + 'static) -> Self {
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), Arc::new(adapter)).is_some() {
            tracing::warn!(provider = %name, "Provider registered twice; keeping the last one");
        }
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            adapters: self.adapters,
        }
    }
}
