//! Metrics collection and exposition.
//!
//! # Metrics
//! - `facade_requests_total` (counter): inbound requests by service, status
//! - `facade_request_duration_seconds` (histogram): inbound latency by service
//! - `facade_upstream_requests_total` (counter): provider calls by provider, outcome
//! - `facade_upstream_duration_seconds` (histogram): provider latency by provider
//!
//! Without an installed recorder every call is a no-op, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(service: &str, status: u16, start: Instant) {
    let service = service.to_string();
    counter!("facade_requests_total", "service" => service.clone(), "status" => status.to_string())
        .increment(1);
    histogram!("facade_request_duration_seconds", "service" => service)
        .record(start.elapsed().as_secs_f64());
}

/// Record one outbound provider call.
pub fn record_upstream(provider: &str, success: bool, start: Instant) {
    let provider = provider.to_string();
    let outcome = if success { "ok" } else { "error" };
    counter!("facade_upstream_requests_total", "provider" => provider.clone(), "outcome" => outcome)
        .increment(1);
    histogram!("facade_upstream_duration_seconds", "provider" => provider)
        .record(start.elapsed().as_secs_f64());
}
