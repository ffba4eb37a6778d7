//! Routing facade library.
//!
//! One HTTP API over several third-party route-planning services. A request
//! names a service and an output format; the facade validates it, asks the
//! provider, normalizes the answer and renders it.

// Core pipeline
pub mod dispatcher;
pub mod formats;
pub mod providers;
pub mod routing;

// Surfaces
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::FacadeConfig;
pub use dispatcher::{Dispatcher, FormattedRoute};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteError, RouteQuery, RouteResult};
