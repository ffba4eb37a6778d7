//! Outbound HTTP transport shared by all provider adapters.
//!
//! # Responsibilities
//! - Execute an adapter's [`UpstreamRequest`] with a hard deadline
//! - Classify transport failures and upstream status codes
//! - Return the raw body for the adapter to parse
//!
//! Dropping the future returned by [`UpstreamClient::execute`] aborts the
//! in-flight call, so a disconnected client does not keep the upstream busy.

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::observability::metrics;
use crate::providers::UpstreamRequest;
use crate::routing::{RouteError, RouteOutcome};

/// Longest upstream body excerpt written to logs.
pub const LOG_EXCERPT_BYTES: usize = 2048;

/// HTTP client for upstream routing providers.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Build a client. `system_proxy` controls whether proxy environment variables apply.
    pub fn new(system_proxy: bool) -> RouteOutcome<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("route-facade/", env!("CARGO_PKG_VERSION")));
        if !system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| RouteError::UpstreamUnavailable {
                provider: "*".into(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { http })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Perform the request and return the response body.
    pub async fn execute(
        &self,
        provider: &str,
        request: &UpstreamRequest,
        deadline: Duration,
    ) -> RouteOutcome<Vec<u8>> {
        let start = Instant::now();

        tracing::debug!(
            provider = %provider,
            url = %request.url,
            params = request.query.len(),
            "Calling upstream provider"
        );

        let call = async {
            let response = self
                .http
                .get(request.url.clone())
                .query(&request.query)
                .send()
                .await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let outcome = match timeout(deadline, call).await {
            Ok(Ok((status, body))) if status.is_success() => Ok(body.to_vec()),
            Ok(Ok((status, body))) => {
                tracing::warn!(
                    provider = %provider,
                    status = %status,
                    body = %excerpt(&body),
                    "Upstream returned error status"
                );
                if status.is_client_error() {
                    Err(RouteError::UpstreamRejected {
                        provider: provider.to_string(),
                        message: format!("HTTP {}", status.as_u16()),
                    })
                } else {
                    Err(RouteError::UpstreamUnavailable {
                        provider: provider.to_string(),
                        message: format!("HTTP {}", status.as_u16()),
                    })
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(provider = %provider, error = %e, "Upstream transport error");
                Err(RouteError::UpstreamUnavailable {
                    provider: provider.to_string(),
                    message: "connection failed".into(),
                })
            }
            Err(_) => {
                tracing::warn!(provider = %provider, timeout = ?deadline, "Upstream timeout");
                Err(RouteError::UpstreamUnavailable {
                    provider: provider.to_string(),
                    message: format!("no response within {}s", deadline.as_secs_f64()),
                })
            }
        };

        metrics::record_upstream(provider, outcome.is_ok(), start);
        outcome
    }
}

/// Lossy, length-capped rendering of an upstream payload for logs.
pub fn excerpt(body: &[u8]) -> String {
    let cut = body.len().min(LOG_EXCERPT_BYTES);
    let mut text = String::from_utf8_lossy(&body[..cut]).into_owned();
    if body.len() > cut {
        text.push_str("...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates() {
        let body = vec![b'a'; LOG_EXCERPT_BYTES + 10];
        let text = excerpt(&body);
        assert_eq!(text.len(), LOG_EXCERPT_BYTES + 3);
        assert!(text.ends_with("..."));

        assert_eq!(excerpt(b"short"), "short");
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = UpstreamClient::new(false).unwrap();
        let request = UpstreamRequest {
            url: format!("http://{}/route", addr).parse().unwrap(),
            query: Vec::new(),
        };

        let err = client
            .execute("yours", &request, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::UpstreamUnavailable { .. }));
    }
}
