//! JSON output.
//!
//! ```json
//! {"type": "LineString", "coordinates": [[lat, lon], ...], "waypoints": [[lat, lon], ...],
//!  "distance_km": 0.14, "travel_time_secs": 40.0, "instructions": ["..."]}
//! ```
//! `route` is only present when the provider tracked route points separately.

use serde::Serialize;

use crate::formats::ResponseFormatter;
use crate::routing::{LatLon, RouteError, RouteMetadata, RouteOutcome, RouteResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct RouteBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: &'a [LatLon],
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<&'a [LatLon]>,
    waypoints: &'a [LatLon],
    #[serde(flatten)]
    metadata: &'a RouteMetadata,
}

impl ResponseFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn format(&self, result: &RouteResult) -> RouteOutcome<String> {
        let body = RouteBody {
            kind: "LineString",
            coordinates: result.coordinates(),
            route: result.route(),
            waypoints: result.waypoints(),
            metadata: result.metadata(),
        };
        serde_json::to_string(&body).map_err(|e| RouteError::Formatting(e.to_string()))
    }
}
