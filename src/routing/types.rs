//! Shared routing types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Geographic coordinate in decimal degrees.
///
/// Always latitude first. Serializes as a `[lat, lon]` JSON array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True if both components are finite and within geographic bounds.
    pub fn is_geographic(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl Serialize for LatLon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.lat, self.lon).serialize(serializer)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Transport mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Car,
    Bicycle,
    Pedestrian,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Car, Mode::Bicycle, Mode::Pedestrian];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Car => "car",
            Mode::Bicycle => "bicycle",
            Mode::Pedestrian => "pedestrian",
        }
    }
}

impl FromStr for Mode {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                RouteError::InvalidParameter(format!(
                    "mode must be one of {}, got '{}'",
                    join_names(Mode::ALL.iter().map(Mode::as_str)),
                    s
                ))
            })
    }
}

/// Route optimisation preference. Providers ignore values they cannot honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    #[default]
    Fastest,
    Shortest,
    Safest,
}

impl RouteType {
    pub const ALL: [RouteType; 3] = [RouteType::Fastest, RouteType::Shortest, RouteType::Safest];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Fastest => "fastest",
            RouteType::Shortest => "shortest",
            RouteType::Safest => "safest",
        }
    }
}

impl FromStr for RouteType {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                RouteError::InvalidParameter(format!(
                    "route_type must be one of {}, got '{}'",
                    join_names(RouteType::ALL.iter().map(RouteType::as_str)),
                    s
                ))
            })
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Errors raised while handling a route request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    /// A required parameter was not supplied.
    #[error("Parameter '{0}' is required")]
    MissingParameter(String),

    /// A parameter is present but malformed or out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No provider is registered under the requested name.
    #[error("Unknown service '{0}'")]
    UnknownService(String),

    /// No formatter is registered under the requested name.
    #[error("Unsupported format '{0}'")]
    UnsupportedFormat(String),

    /// The provider refused the request as invalid.
    #[error("Provider '{provider}' rejected the request: {message}")]
    UpstreamRejected { provider: String, message: String },

    /// The provider could not be reached or did not answer in time.
    #[error("Provider '{provider}' is unavailable: {message}")]
    UpstreamUnavailable { provider: String, message: String },

    /// The provider answered without the expected structure.
    #[error("Provider '{provider}' returned a malformed response: {reason}")]
    UpstreamMalformedResponse { provider: String, reason: String },

    /// The result could not be serialized.
    #[error("Failed to format route: {0}")]
    Formatting(String),
}

impl RouteError {
    pub(crate) fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        RouteError::UpstreamMalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::MissingParameter(_) => "missing_parameter",
            RouteError::InvalidParameter(_) => "invalid_parameter",
            RouteError::UnknownService(_) => "unknown_service",
            RouteError::UnsupportedFormat(_) => "unsupported_format",
            RouteError::UpstreamRejected { .. } => "upstream_rejected",
            RouteError::UpstreamUnavailable { .. } => "upstream_unavailable",
            RouteError::UpstreamMalformedResponse { .. } => "upstream_malformed",
            RouteError::Formatting(_) => "formatting",
        }
    }
}

/// Result type for routing operations.
pub type RouteOutcome<T> = Result<T, RouteError>;
