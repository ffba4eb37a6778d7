//! Canonical route request.
//!
//! # Construction
//! - Query string: `origin=lat,lon&destination=lat,lon&waypoints=lat,lon,lat,lon`
//! - JSON body: `{"origin": [lat, lon], "destination": [lat, lon], "waypoints": [[lat, lon]]}`
//! - OSRM style: repeated `loc=lat,lon`, first is origin, last is destination
//!
//! Every path fills a [`RouteQueryDraft`] and validates it exactly once. A
//! [`RouteQuery`] therefore only exists in validated form and is read-only.

use serde::Deserialize;

use crate::routing::types::{LatLon, Mode, RouteError, RouteOutcome, RouteType};

/// Validated, immutable route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    origin: LatLon,
    destination: LatLon,
    waypoints: Vec<LatLon>,
    mode: Mode,
    route_type: RouteType,
}

impl RouteQuery {
    /// Build from decoded query-string pairs.
    pub fn from_params(params: &[(String, String)]) -> RouteOutcome<Self> {
        let mut draft = RouteQueryDraft::default();

        if let Some(origin) = first_param(params, "origin") {
            draft.origin = Some(parse_number_list("origin", origin)?);
        }
        if let Some(destination) = first_param(params, "destination") {
            draft.destination = Some(parse_number_list("destination", destination)?);
        }
        if let Some(waypoints) = first_param(params, "waypoints") {
            draft.waypoints = parse_flat_waypoints(waypoints)?;
        }
        draft.mode = first_param(params, "mode").map(str::to_string);
        draft.route_type = first_param(params, "route_type").map(str::to_string);

        draft.validate()
    }

    /// Build from a JSON request body.
    ///
    /// Fields are copied as given; a field of the wrong type is rejected rather
    /// than coerced.
    pub fn from_json(body: &[u8]) -> RouteOutcome<Self> {
        let body: JsonRouteBody = serde_json::from_slice(body)
            .map_err(|e| RouteError::InvalidParameter(format!("request body: {}", e)))?;

        RouteQueryDraft {
            origin: body.origin,
            destination: body.destination,
            waypoints: body.waypoints.unwrap_or_default(),
            mode: body.mode,
            route_type: body.route_type,
        }
        .validate()
    }

    /// Build from an ordered list of `lat,lon` locations.
    pub fn from_locations(locations: &[&str], mode: Option<&str>) -> RouteOutcome<Self> {
        let mut points = locations
            .iter()
            .map(|loc| parse_number_list("loc", loc))
            .collect::<RouteOutcome<Vec<_>>>()?;

        if points.len() < 2 {
            return Err(RouteError::MissingParameter(if points.is_empty() {
                "loc".to_string()
            } else {
                "destination".to_string()
            }));
        }

        let destination = points.pop();
        let origin = Some(points.remove(0));

        RouteQueryDraft {
            origin,
            destination,
            waypoints: points,
            mode: mode.map(str::to_string),
            route_type: None,
        }
        .validate()
    }

    pub fn origin(&self) -> LatLon {
        self.origin
    }

    pub fn destination(&self) -> LatLon {
        self.destination
    }

    pub fn waypoints(&self) -> &[LatLon] {
        &self.waypoints
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// Every point in visiting order: origin, waypoints, destination.
    pub fn stops(&self) -> impl Iterator<Item = LatLon> + '_ {
        std::iter::once(self.origin)
            .chain(self.waypoints.iter().copied())
            .chain(std::iter::once(self.destination))
    }
}

impl std::fmt::Display for RouteQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RouteQuery(origin={}, destination={}, waypoints={}, mode={}, route_type={})",
            self.origin,
            self.destination,
            self.waypoints.len(),
            self.mode.as_str(),
            self.route_type.as_str()
        )
    }
}

/// Unvalidated request fields, as received.
#[derive(Debug, Clone, Default)]
pub struct RouteQueryDraft {
    pub origin: Option<Vec<f64>>,
    pub destination: Option<Vec<f64>>,
    pub waypoints: Vec<Vec<f64>>,
    pub mode: Option<String>,
    pub route_type: Option<String>,
}

impl RouteQueryDraft {
    /// Check every field and produce the canonical request. Fails on the first problem found.
    pub fn validate(self) -> RouteOutcome<RouteQuery> {
        let origin = self
            .origin
            .ok_or_else(|| RouteError::MissingParameter("origin".into()))?;
        let destination = self
            .destination
            .ok_or_else(|| RouteError::MissingParameter("destination".into()))?;

        let mode = match self.mode.as_deref() {
            Some(m) => m.parse::<Mode>()?,
            None => Mode::default(),
        };
        let route_type = match self.route_type.as_deref() {
            Some(t) => t.parse::<RouteType>()?,
            None => RouteType::default(),
        };

        let origin = to_lat_lon("origin", &origin)?;
        let destination = to_lat_lon("destination", &destination)?;
        let waypoints = self
            .waypoints
            .iter()
            .enumerate()
            .map(|(i, wp)| to_lat_lon(&format!("waypoints[{}]", i), wp))
            .collect::<RouteOutcome<Vec<_>>>()?;

        // Shape problems anywhere are reported before range problems
        ensure_in_range("origin", origin)?;
        ensure_in_range("destination", destination)?;
        for (i, wp) in waypoints.iter().enumerate() {
            ensure_in_range(&format!("waypoints[{}]", i), *wp)?;
        }

        Ok(RouteQuery {
            origin,
            destination,
            waypoints,
            mode,
            route_type,
        })
    }
}

#[derive(Debug, Deserialize)]
struct JsonRouteBody {
    #[serde(default)]
    origin: Option<Vec<f64>>,
    #[serde(default)]
    destination: Option<Vec<f64>>,
    #[serde(default)]
    waypoints: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    route_type: Option<String>,
}

fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_number_list(name: &str, raw: &str) -> RouteOutcome<Vec<f64>> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>().map_err(|_| {
                RouteError::InvalidParameter(format!("{} contains a non-numeric value '{}'", name, part))
            })
        })
        .collect()
}

fn parse_flat_waypoints(raw: &str) -> RouteOutcome<Vec<Vec<f64>>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let values = parse_number_list("waypoints", raw)?;
    if values.len() % 2 != 0 {
        return Err(RouteError::InvalidParameter(format!(
            "waypoints must be lat,lon pairs, got {} values",
            values.len()
        )));
    }

    Ok(values.chunks_exact(2).map(|pair| pair.to_vec()).collect())
}

fn to_lat_lon(name: &str, values: &[f64]) -> RouteOutcome<LatLon> {
    let [lat, lon] = values else {
        return Err(RouteError::InvalidParameter(format!(
            "{} must have lat and lon, got {} values",
            name,
            values.len()
        )));
    };

    Ok(LatLon::new(*lat, *lon))
}

fn ensure_in_range(name: &str, point: LatLon) -> RouteOutcome<()> {
    if !point.is_geographic() {
        return Err(RouteError::InvalidParameter(format!(
            "{} is out of range: {}",
            name, point
        )));
    }
    Ok(())
}
