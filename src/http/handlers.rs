//! Route handlers.
//!
//! # Responsibilities
//! - Turn query strings or JSON bodies into a `RouteQuery`; only a JSON content type selects the body
//! - Hand the query to the dispatcher
//! - Log and record every outcome

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::dispatcher::FormattedRoute;
use crate::http::request::{self, X_REQUEST_ID};
use crate::http::response::status_for;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::providers::{yours, ProviderRegistry};
use crate::routing::{RouteOutcome, RouteQuery};

/// Default output of `/api/v1/{service}`.
pub const DEFAULT_FORMAT: &str = "json";

/// Default output of `/api/osrm/v1`.
pub const DEFAULT_OSRM_OUTPUT: &str = "gpx";

pub async fn banner() -> &'static str {
    concat!("route-facade ", env!("CARGO_PKG_VERSION"), "\n")
}

pub async fn health() -> &'static str {
    "ok"
}

/// `GET|POST /api/v1/{service}`
pub async fn route(
    State(state): State<AppState>,
    Path(service): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let params = request::query_pairs(raw.as_deref());
    let format = request::first(&params, "format").unwrap_or(DEFAULT_FORMAT);

    let outcome = match parse_route_query(&params, &headers, &body) {
        Ok(query) => state.dispatcher.dispatch(&service, query, format).await,
        Err(e) => Err(e),
    };

    let label = metrics_label(state.dispatcher.providers(), &service);
    respond(&service, label, &headers, outcome, start)
}

/// `GET|POST /api/osrm/v1`
pub async fn osrm(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let params = request::query_pairs(raw.as_deref());
    let locations = request::all(&params, "loc");
    let output = request::first(&params, "output").unwrap_or(DEFAULT_OSRM_OUTPUT);

    let outcome = match RouteQuery::from_locations(&locations, request::first(&params, "mode")) {
        Ok(query) => state.dispatcher.dispatch(yours::NAME, query, output).await,
        Err(e) => Err(e),
    };

    let label = metrics_label(state.dispatcher.providers(), yours::NAME);
    respond(yours::NAME, label, &headers, outcome, start)
}

/// A JSON body wins over query parameters. Bodies of any other type are ignored.
fn parse_route_query(
    params: &[(String, String)],
    headers: &HeaderMap,
    body: &[u8],
) -> RouteOutcome<RouteQuery> {
    if request::is_json(headers) && request::has_body(body) {
        RouteQuery::from_json(body)
    } else {
        RouteQuery::from_params(params)
    }
}

/// Metrics label for a path segment. Unregistered names share one label.
fn metrics_label<'a>(providers: &ProviderRegistry, service: &'a str) -> &'a str {
    if providers.get(service).is_ok() {
        service
    } else {
        "unknown"
    }
}

fn respond(
    service: &str,
    label: &str,
    headers: &HeaderMap,
    outcome: RouteOutcome<FormattedRoute>,
    start: Instant,
) -> Response {
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    match outcome {
        Ok(route) => {
            tracing::info!(
                request_id = %request_id,
                service = %service,
                content_type = route.content_type,
                bytes = route.body.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Route served"
            );
            metrics::record_request(label, 200, start);
            route.into_response()
        }
        Err(error) => {
            let status = status_for(&error);
            if status.is_server_error() {
                tracing::warn!(request_id = %request_id, service = %service, error = %error, "Route request failed");
            } else {
                tracing::info!(request_id = %request_id, service = %service, error = %error, "Route request rejected");
            }
            metrics::record_request(label, status.as_u16(), start);
            error.into_response()
        }
    }
}
