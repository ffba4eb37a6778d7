//! YOURS (gosmore) routing provider.
//!
//! Request: `gosmore.php?format=geojson&flat=..&flon=..&tlat=..&tlon=..&v=motorcar&fast=1`
//!
//! Response is a GeoJSON LineString with `[lon, lat]` (optionally `[lon, lat, alt]`)
//! coordinates:
//! ```json
//! {"type": "LineString",
//!  "properties": {"distance": "0.145438", "traveltime": "40", "description": "..."},
//!  "coordinates": [[172.6397, -43.5359], [172.6396, -43.534802]]}
//! ```
//!
//! Gosmore routes between two points only, so waypoints are not forwarded.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::providers::client::excerpt;
use crate::providers::{ensure_geographic, ProviderAdapter, UpstreamRequest};
use crate::routing::{
    LatLon, Mode, RouteError, RouteMetadata, RouteOutcome, RouteQuery, RouteResult, RouteType,
};

pub const NAME: &str = "yours";
pub const DEFAULT_BASE_URL: &str = "http://www.yournavigation.org/api/1.0/gosmore.php";

#[derive(Debug, Clone)]
pub struct YoursAdapter {
    base_url: Url,
    timeout: Duration,
}

impl YoursAdapter {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

/// Gosmore vehicle name for a transport mode.
pub fn vehicle(mode: Mode) -> &'static str {
    match mode {
        Mode::Car => "motorcar",
        Mode::Pedestrian => "foot",
        other => other.as_str(),
    }
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    distance: Option<Value>,
    traveltime: Option<Value>,
    description: Option<String>,
}

impl ProviderAdapter for YoursAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(&self, query: &RouteQuery) -> RouteOutcome<UpstreamRequest> {
        let origin = query.origin();
        let destination = query.destination();
        let fast = match query.route_type() {
            RouteType::Shortest => "0",
            RouteType::Fastest | RouteType::Safest => "1",
        };

        let params = [
            ("format", "geojson".to_string()),
            ("instructions", "1".to_string()),
            ("flat", format!("{:.6}", origin.lat)),
            ("flon", format!("{:.6}", origin.lon)),
            ("tlat", format!("{:.6}", destination.lat)),
            ("tlon", format!("{:.6}", destination.lon)),
            ("v", vehicle(query.mode()).to_string()),
            ("fast", fast.to_string()),
            ("layer", "mapnik".to_string()),
        ];

        if !query.waypoints().is_empty() {
            tracing::debug!(
                waypoints = query.waypoints().len(),
                "yours does not support via points; routing origin to destination"
            );
        }

        Ok(UpstreamRequest {
            url: self.base_url.clone(),
            query: params.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        })
    }

    fn parse_response(&self, body: &[u8]) -> RouteOutcome<RouteResult> {
        let line: LineString = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(provider = NAME, error = %e, body = %excerpt(body), "Unparseable upstream payload");
            RouteError::malformed(NAME, "response is not a GeoJSON LineString")
        })?;

        let Some(raw) = line.coordinates else {
            tracing::warn!(provider = NAME, body = %excerpt(body), "Upstream payload has no coordinates");
            return Err(RouteError::malformed(NAME, "missing 'coordinates'"));
        };

        let track = raw
            .iter()
            .enumerate()
            .map(|(i, point)| match point.as_slice() {
                [lon, lat, ..] => Ok(LatLon::new(*lat, *lon)),
                _ => Err(RouteError::malformed(
                    NAME,
                    format!("coordinate {} has {} components", i, point.len()),
                )),
            })
            .collect::<RouteOutcome<Vec<_>>>()?;

        ensure_geographic(NAME, &track)?;

        let properties = line.properties.unwrap_or_default();
        let metadata = RouteMetadata {
            distance_km: properties.distance.as_ref().and_then(number),
            travel_time_secs: properties.traveltime.as_ref().and_then(number),
            instructions: properties
                .description
                .as_deref()
                .map(split_instructions)
                .unwrap_or_default(),
        };

        Ok(RouteResult::new(NAME, track)?.with_metadata(metadata))
    }
}

/// Gosmore sends numbers as strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn split_instructions(description: &str) -> Vec<String> {
    description
        .split("<br>")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
