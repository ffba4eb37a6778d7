//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, timeouts, body limits, request ID)
//! - Build the provider and format registries from config
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::FacadeConfig;
use crate::dispatcher::Dispatcher;
use crate::formats::FormatRegistry;
use crate::http::handlers;
use crate::http::request::{self, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::providers::{ProviderRegistry, UpstreamClient};
use crate::routing::RouteError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid provider URL: {0}")]
    ProviderUrl(#[from] url::ParseError),

    #[error("Failed to build upstream client: {0}")]
    Client(#[from] RouteError),
}

/// HTTP server for the routing facade.
pub struct HttpServer {
    router: Router,
    config: FacadeConfig,
}

impl HttpServer {
    /// Create a server with registries built from `config`.
    pub fn new(config: FacadeConfig) -> Result<Self, ServerError> {
        let providers = ProviderRegistry::from_config(&config.providers)?;
        let client = UpstreamClient::new(config.providers.system_proxy)?;
        let dispatcher = Dispatcher::new(providers, FormatRegistry::with_defaults(), client);
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    /// Create a server around an already assembled dispatcher.
    pub fn with_dispatcher(config: FacadeConfig, dispatcher: Dispatcher) -> Self {
        tracing::debug!(
            providers = ?dispatcher.providers().names().collect::<Vec<_>>(),
            formats = ?dispatcher.formats().names().collect::<Vec<_>>(),
            "Registries ready"
        );
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FacadeConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::banner))
            .route("/health", get(handlers::health))
            .route(
                "/api/v1/{service}",
                get(handlers::route).post(handlers::route),
            )
            .route("/api/osrm/v1", get(handlers::osrm).post(handlers::osrm))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request::request_id(req),
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        // A dropped client connection drops its handler future, cancelling the upstream call
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }
}
