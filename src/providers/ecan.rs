//! ECan ArcGIS Network Analyst routing provider.
//!
//! Request: `NAServer/Route/solve?stops=lon,lat;lon,lat&f=json&...`
//!
//! The solve response carries the route polyline at
//! `routes.features[0].geometry.paths`, as `[x, y, m]` points in the layer's
//! spatial reference (Web Mercator, wkid 102100 / 3857 for the ECan service).
//! Points are reprojected to geographic degrees before they leave this module.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::providers::client::excerpt;
use crate::providers::projection::SpatialReference;
use crate::providers::{ensure_geographic, ProviderAdapter, UpstreamRequest};
use crate::routing::{LatLon, RouteError, RouteMetadata, RouteOutcome, RouteQuery, RouteResult};

pub const NAME: &str = "ecan";
pub const DEFAULT_BASE_URL: &str =
    "http://arcgisdev.ecan.govt.nz/arcgis/rest/services/OSM/OSMNetwork/NAServer/Route/solve";

/// Spatial reference assumed when the response does not state one.
const DEFAULT_WKID: u64 = 102100;

/// Fixed solve options. Stops are added per request.
const SOLVE_OPTIONS: &[(&str, &str)] = &[
    ("f", "json"),
    ("barriers", ""),
    ("polylineBarriers", ""),
    ("polygonBarriers", ""),
    ("outSR", ""),
    ("ignoreInvalidLocations", "true"),
    ("accumulateAttributeNames", ""),
    ("impedanceAttributeName", "Length"),
    ("restrictionAttributeNames", "Oneway"),
    ("attributeParameterValues", ""),
    ("restrictUTurns", "esriNFSBAllowBacktrack"),
    ("useHierarchy", "false"),
    ("returnDirections", "true"),
    ("returnRoutes", "true"),
    ("returnStops", "false"),
    ("returnBarriers", "false"),
    ("returnPolylineBarriers", "false"),
    ("returnPolygonBarriers", "false"),
    ("directionsLanguage", "en"),
    ("directionsStyleName", ""),
    ("outputLines", "esriNAOutputLineTrueShapeWithMeasure"),
    ("findBestSequence", "false"),
    ("preserveFirstStop", "false"),
    ("preserveLastStop", "false"),
    ("useTimeWindows", "false"),
    ("startTime", "0"),
    ("outputGeometryPrecision", ""),
    ("outputGeometryPrecisionUnits", "esriDecimalDegrees"),
    ("directionsOutputType", "esriDOTComplete"),
    ("directionsTimeAttributeName", ""),
    ("directionsLengthUnits", "esriNAUKilometers"),
    ("returnZ", "false"),
];

#[derive(Debug, Clone)]
pub struct EcanAdapter {
    base_url: Url,
    timeout: Duration,
}

impl EcanAdapter {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

#[derive(Debug, Deserialize)]
struct SolveResponse {
    routes: Option<FeatureSet>,
    #[serde(default)]
    directions: Vec<Directions>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct FeatureSet {
    features: Option<Vec<Feature>>,
    #[serde(rename = "spatialReference")]
    spatial_reference: Option<SpatialRef>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Polyline>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    paths: Option<Vec<Vec<Vec<Option<f64>>>>>,
}

#[derive(Debug, Deserialize)]
struct SpatialRef {
    wkid: Option<u64>,
    #[serde(rename = "latestWkid")]
    latest_wkid: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Directions {
    #[serde(default)]
    features: Vec<DirectionFeature>,
    summary: Option<DirectionSummary>,
}

#[derive(Debug, Deserialize)]
struct DirectionFeature {
    attributes: Option<DirectionAttributes>,
}

#[derive(Debug, Deserialize)]
struct DirectionAttributes {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionSummary {
    #[serde(rename = "totalLength")]
    total_length: Option<f64>,
    #[serde(rename = "totalTime")]
    total_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    code: Option<i64>,
    message: Option<String>,
    #[serde(default)]
    details: Vec<String>,
}

impl ProviderAdapter for EcanAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(&self, query: &RouteQuery) -> RouteOutcome<UpstreamRequest> {
        // ArcGIS stops are x,y i.e. lon,lat
        let stops = query
            .stops()
            .map(|p| format!("{:.6},{:.6}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(";");

        let mut params = Vec::with_capacity(SOLVE_OPTIONS.len() + 1);
        params.push(("stops".to_string(), stops));
        params.extend(
            SOLVE_OPTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        Ok(UpstreamRequest {
            url: self.base_url.clone(),
            query: params,
        })
    }

    fn parse_response(&self, body: &[u8]) -> RouteOutcome<RouteResult> {
        let response: SolveResponse = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(provider = NAME, error = %e, body = %excerpt(body), "Unparseable upstream payload");
            RouteError::malformed(NAME, "response is not a solve result")
        })?;

        if let Some(error) = response.error {
            return Err(service_error(error));
        }

        let missing = |what: &str| {
            tracing::warn!(provider = NAME, missing = what, body = %excerpt(body), "Incomplete solve result");
            RouteError::malformed(NAME, format!("missing '{}'", what))
        };

        let routes = response.routes.ok_or_else(|| missing("routes"))?;
        let feature = routes
            .features
            .and_then(|f| f.into_iter().next())
            .ok_or_else(|| missing("routes.features"))?;
        let paths = feature
            .geometry
            .and_then(|g| g.paths)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("routes.features[0].geometry.paths"))?;

        let wkid = routes
            .spatial_reference
            .and_then(|sr| sr.latest_wkid.or(sr.wkid))
            .unwrap_or(DEFAULT_WKID);
        let reference = SpatialReference::from_wkid(wkid).ok_or_else(|| {
            RouteError::malformed(NAME, format!("unsupported spatial reference wkid {}", wkid))
        })?;

        // Multipart polylines are joined in part order
        let track = paths
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, point)| match point.as_slice() {
                [Some(x), Some(y), ..] => Ok(reference.to_lat_lon(*x, *y)),
                _ => Err(RouteError::malformed(NAME, format!("path point {} lacks x/y", i))),
            })
            .collect::<RouteOutcome<Vec<LatLon>>>()?;

        ensure_geographic(NAME, &track)?;

        Ok(RouteResult::new(NAME, track)?.with_metadata(metadata(&response.directions)))
    }
}

fn metadata(directions: &[Directions]) -> RouteMetadata {
    let Some(first) = directions.first() else {
        return RouteMetadata::default();
    };
    let summary = first.summary.as_ref();

    RouteMetadata {
        distance_km: summary.and_then(|s| s.total_length),
        // totalTime is in minutes
        travel_time_secs: summary
            .and_then(|s| s.total_time)
            .filter(|t| *t > 0.0)
            .map(|t| t * 60.0),
        instructions: first
            .features
            .iter()
            .filter_map(|f| f.attributes.as_ref()?.text.clone())
            .collect(),
    }
}

fn service_error(error: ServiceError) -> RouteError {
    let mut message = error.message.unwrap_or_else(|| "unknown error".to_string());
    if !error.details.is_empty() {
        message = format!("{} ({})", message, error.details.join("; "));
    }

    match error.code {
        Some(code) if (400..500).contains(&code) => RouteError::UpstreamRejected {
            provider: NAME.to_string(),
            message,
        },
        code => {
            tracing::warn!(provider = NAME, code = ?code, message = %message, "Solve service error");
            RouteError::malformed(NAME, "service reported an internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVE_RESPONSE: &[u8] = br#"{
        "routes": {
            "hasM": true,
            "geometryType": "esriGeometryPolyline",
            "features": [{
                "geometry": {
                    "hasM": true,
                    "paths": [[
                        [19218163.123999998, -5393900.276900001, 0],
                        [19218163.0272, -5393812.175500002, 88.10149189157487],
                        [19218162.949199997, -5393731.697799999, 168.579187944293],
                        [19218162.934199996, -5393729.772700001, 170.50434538195134]
                    ]]
                },
                "attributes": {"Name": "Location 1 - Location 2", "Total_Length": 170.5043453819461}
            }],
            "spatialReference": {"wkid": 102100, "latestWkid": 3857}
        },
        "directions": [{
            "routeName": "Location 1 - Location 2",
            "features": [
                {"attributes": {"text": "Start at Location 1", "length": 0}},
                {"attributes": {"text": "Go north on Manchester Street", "length": 0.1705}},
                {"attributes": {"text": "Finish at Location 2, on the left", "length": 0}}
            ],
            "summary": {"totalTime": 0, "totalLength": 0.17050434538194612}
        }]
    }"#;

    fn adapter() -> EcanAdapter {
        EcanAdapter::new(DEFAULT_BASE_URL.parse().unwrap(), Duration::from_secs(5))
    }

    #[test]
    fn test_build_request_stops_in_visiting_order() {
        let query = RouteQuery::from_json(
            br#"{"origin":[-43.538,172.6396],"destination":[-43.5348,172.643],"waypoints":[[-43.5,172.5]]}"#,
        )
        .unwrap();

        let req = adapter().build_request(&query).unwrap();
        assert_eq!(
            req.param("stops"),
            Some("172.639600,-43.538000;172.500000,-43.500000;172.643000,-43.534800")
        );
        assert_eq!(req.param("f"), Some("json"));
        assert_eq!(req.param("ignoreInvalidLocations"), Some("true"));
        assert_eq!(req.param("accumulateAttributeNames"), Some(""));
    }

    #[test]
    fn test_projected_path_becomes_geographic() {
        let result = adapter().parse_response(SOLVE_RESPONSE).unwrap();
        let coords = result.coordinates();

        assert_eq!(coords.len(), 4);
        for p in coords {
            assert!(p.lat.abs() <= 90.0 && p.lon.abs() <= 180.0, "not geographic: {}", p);
        }
        assert!((coords[0].lat - -43.5359).abs() < 1e-3);
        assert!((coords[0].lon - 172.6397).abs() < 1e-3);
        // Travel order kept: the route heads north
        assert!(coords[3].lat > coords[0].lat);
    }

    #[test]
    fn test_metadata_from_directions() {
        let result = adapter().parse_response(SOLVE_RESPONSE).unwrap();
        let meta = result.metadata();
        assert_eq!(meta.distance_km, Some(0.17050434538194612));
        assert_eq!(meta.travel_time_secs, None);
        assert_eq!(meta.instructions.len(), 3);
    }

    #[test]
    fn test_geographic_reference_passes_through() {
        let body = br#"{"routes":{"features":[{"geometry":{"paths":[[[172.64,-43.54],[172.63,-43.53]]]}}],
                        "spatialReference":{"wkid":4326}}}"#;
        let result = adapter().parse_response(body).unwrap();
        assert_eq!(result.coordinates()[0], LatLon::new(-43.54, 172.64));
    }

    #[test]
    fn test_missing_structure() {
        for body in [
            &br#"{"messages":[]}"#[..],
            br#"{"routes":{}}"#,
            br#"{"routes":{"features":[]}}"#,
            br#"{"routes":{"features":[{"geometry":{"paths":[]}}]}}"#,
            br#"{"routes":{"features":[{"geometry":{"paths":[[]]}}]}}"#,
        ] {
            let err = adapter().parse_response(body).unwrap_err();
            assert!(
                matches!(err, RouteError::UpstreamMalformedResponse { .. }),
                "unexpected {:?}",
                err
            );
        }
    }

    #[test]
    fn test_unknown_spatial_reference() {
        let body = br#"{"routes":{"features":[{"geometry":{"paths":[[[1570000,5180000]]]}}],
                        "spatialReference":{"wkid":2193}}}"#;
        let err = adapter().parse_response(body).unwrap_err();
        assert!(matches!(err, RouteError::UpstreamMalformedResponse { ref reason, .. } if reason.contains("2193")));
    }

    #[test]
    fn test_service_error_classification() {
        let body = br#"{"error":{"code":400,"message":"Unable to complete operation.","details":["Need at least 2 valid stops."]}}"#;
        let err = adapter().parse_response(body).unwrap_err();
        assert!(matches!(err, RouteError::UpstreamRejected { ref message, .. } if message.contains("2 valid stops")));

        let body = br#"{"error":{"code":500,"message":"boom"}}"#;
        let err = adapter().parse_response(body).unwrap_err();
        assert!(matches!(err, RouteError::UpstreamMalformedResponse { .. }));
    }
}
