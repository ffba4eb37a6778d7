//! Response construction.
//!
//! # Responsibilities
//! - Map each route error class to its HTTP status
//! - Render errors as `{"error": "..."}`
//! - Send formatted routes with the formatter's content type

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::dispatcher::FormattedRoute;
use crate::routing::RouteError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP status for an error class.
pub fn status_for(error: &RouteError) -> StatusCode {
    match error {
        RouteError::MissingParameter(_)
        | RouteError::InvalidParameter(_)
        | RouteError::UnsupportedFormat(_)
        | RouteError::UpstreamRejected { .. } => StatusCode::BAD_REQUEST,
        RouteError::UnknownService(_) => StatusCode::NOT_FOUND,
        RouteError::UpstreamUnavailable { .. } | RouteError::UpstreamMalformedResponse { .. } => {
            StatusCode::BAD_GATEWAY
        }
        RouteError::Formatting(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message. Malformed payload details stay in the logs.
pub fn client_message(error: &RouteError) -> String {
    match error {
        RouteError::UpstreamMalformedResponse { provider, .. } => {
            format!("Provider '{provider}' returned an unusable response")
        }
        other => other.to_string(),
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        (
            status,
            Json(ErrorBody {
                error: client_message(&self),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for FormattedRoute {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}
