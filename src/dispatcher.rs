//! Request pipeline: adapter lookup, upstream call, formatting.
//!
//! # States
//! ```text
//! RouteQuery (already validated)
//!     → select adapter      (UnknownService → 404)
//!     → select formatter    (UnsupportedFormat → 400)
//!     → build → call → parse (Upstream* → 502 / 400)
//!     → echo waypoints → format
//! ```
//!
//! The formatter is resolved before the upstream call so that an unusable
//! `format` never costs a provider round trip. Nothing is retried here.

use std::sync::Arc;

use crate::formats::FormatRegistry;
use crate::providers::{ProviderRegistry, UpstreamClient};
use crate::routing::{RouteOutcome, RouteQuery};

/// A serialized route ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRoute {
    pub content_type: &'static str,
    pub body: String,
}

/// Wires providers and formatters together. Cheap to clone; holds no per-request state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    providers: Arc<ProviderRegistry>,
    formats: Arc<FormatRegistry>,
    client: UpstreamClient,
}

impl Dispatcher {
    pub fn new(providers: ProviderRegistry, formats: FormatRegistry, client: UpstreamClient) -> Self {
        Self {
            providers: Arc::new(providers),
            formats: Arc::new(formats),
            client,
        }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Route `query` through `service` and render it as `format`.
    pub async fn dispatch(
        &self,
        service: &str,
        query: RouteQuery,
        format: &str,
    ) -> RouteOutcome<FormattedRoute> {
        let adapter = self.providers.get(service)?;
        let formatter = self.formats.get(format)?;

        tracing::info!(service = %service, format = %format, query = %query, "Dispatching route request");

        let request = adapter.build_request(&query)?;
        let body = self
            .client
            .execute(adapter.name(), &request, adapter.timeout())
            .await?;
        let result = adapter
            .parse_response(&body)?
            .with_waypoints(query.waypoints().to_vec());

        tracing::debug!(
            service = %service,
            points = result.coordinates().len(),
            "Upstream route parsed"
        );

        Ok(FormattedRoute {
            content_type: formatter.content_type(),
            body: formatter.format(&result)?,
        })
    }
}
