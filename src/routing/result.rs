//! Canonical route result.

use serde::Serialize;

use crate::routing::types::{LatLon, RouteError, RouteOutcome};

/// Optional provider details carried alongside the geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
}

impl RouteMetadata {
    pub fn is_empty(&self) -> bool {
        self.distance_km.is_none() && self.travel_time_secs.is_none() && self.instructions.is_empty()
    }
}

/// A computed route, in `(lat, lon)` order along the direction of travel.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    coordinates: Vec<LatLon>,
    route: Option<Vec<LatLon>>,
    waypoints: Vec<LatLon>,
    metadata: RouteMetadata,
}

impl RouteResult {
    /// Create a result from track geometry. An empty track is an upstream failure.
    pub fn new(provider: &str, coordinates: Vec<LatLon>) -> RouteOutcome<Self> {
        if coordinates.is_empty() {
            return Err(RouteError::malformed(provider, "route contains no coordinates"));
        }
        Ok(Self {
            coordinates,
            route: None,
            waypoints: Vec::new(),
            metadata: RouteMetadata::default(),
        })
    }

    /// Attach a separately tracked route point sequence.
    pub fn with_route(mut self, route: Vec<LatLon>) -> Self {
        self.route = (!route.is_empty()).then_some(route);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<LatLon>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn with_metadata(mut self, metadata: RouteMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Track geometry.
    pub fn coordinates(&self) -> &[LatLon] {
        &self.coordinates
    }

    /// Route points, falling back to the track when none were given.
    pub fn route_points(&self) -> &[LatLon] {
        self.route.as_deref().unwrap_or(&self.coordinates)
    }

    pub fn route(&self) -> Option<&[LatLon]> {
        self.route.as_deref()
    }

    pub fn waypoints(&self) -> &[LatLon] {
        &self.waypoints
    }

    pub fn metadata(&self) -> &RouteMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_track_rejected() {
        let err = RouteResult::new("yours", Vec::new()).unwrap_err();
        assert!(matches!(err, RouteError::UpstreamMalformedResponse { .. }));
    }

    #[test]
    fn test_route_points_fallback() {
        let track = vec![LatLon::new(1.0, 2.0), LatLon::new(3.0, 4.0)];
        let result = RouteResult::new("test", track.clone()).unwrap();
        assert_eq!(result.route_points(), track.as_slice());
        assert!(result.route().is_none());

        let result = result.with_route(vec![LatLon::new(1.0, 2.0)]);
        assert_eq!(result.route_points().len(), 1);
        assert_eq!(result.coordinates().len(), 2);
    }
}
