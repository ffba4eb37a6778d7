//! Spatial reference conversion for projected provider geometry.

use std::f64::consts::PI;

use crate::routing::LatLon;

/// WGS 84 semi-major axis, the sphere radius used by Web Mercator.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Spatial references a provider may report geometry in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialReference {
    /// Geographic WGS 84 (x = lon, y = lat).
    Wgs84,
    /// Spherical Web Mercator in metres.
    WebMercator,
}

impl SpatialReference {
    /// Resolve an Esri well-known ID.
    pub fn from_wkid(wkid: u64) -> Option<Self> {
        match wkid {
            4326 => Some(SpatialReference::Wgs84),
            102100 | 102113 | 3857 | 900913 => Some(SpatialReference::WebMercator),
            _ => None,
        }
    }

    /// Convert an `(x, y)` pair in this reference to geographic coordinates.
    pub fn to_lat_lon(&self, x: f64, y: f64) -> LatLon {
        match self {
            SpatialReference::Wgs84 => LatLon::new(y, x),
            SpatialReference::WebMercator => mercator_to_lat_lon(x, y),
        }
    }
}

/// Inverse spherical Web Mercator.
#[inline]
pub fn mercator_to_lat_lon(x: f64, y: f64) -> LatLon {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (y / EARTH_RADIUS_M).sinh().atan() * 180.0 / PI;
    LatLon::new(lat, normalize_lon(lon))
}

/// Wrap a longitude into [-180, 180].
fn normalize_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
