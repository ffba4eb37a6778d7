//! GPX 1.1 output.
//!
//! Elements follow the schema order `wpt`, `rte`, `trk`, `extensions`. Echoed
//! waypoints are standard top-level `<wpt>` entries, so any GPX reader sees
//! them. The `<extensions>` block always carries an `rf:waypoints` container
//! in the facade namespace, empty when there are no waypoints.
//! Coordinates are fixed-point with six decimals.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::formats::ResponseFormatter;
use crate::routing::{LatLon, RouteError, RouteOutcome, RouteResult};

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const GPX_SCHEMA: &str = "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Namespace of the facade's own extension elements.
pub const FACADE_NS: &str = "urn:route-facade:gpx:1";

#[derive(Debug, Clone)]
pub struct GpxFormatter {
    creator: String,
}

impl GpxFormatter {
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
        }
    }
}

impl Default for GpxFormatter {
    fn default() -> Self {
        Self::new("route-facade")
    }
}

impl ResponseFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn content_type(&self) -> &'static str {
        "application/gpx+xml"
    }

    fn format(&self, result: &RouteResult) -> RouteOutcome<String> {
        let bytes = render(&self.creator, result)
            .map_err(|e| RouteError::Formatting(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RouteError::Formatting(e.to_string()))
    }
}

fn render(creator: &str, result: &RouteResult) -> std::io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("version", "1.1"),
        ("creator", creator),
        ("xmlns", GPX_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", GPX_SCHEMA),
        ("xmlns:rf", FACADE_NS),
    ])))?;

    write_points(&mut writer, "wpt", result.waypoints())?;

    writer.write_event(Event::Start(BytesStart::new("rte")))?;
    write_points(&mut writer, "rtept", result.route_points())?;
    writer.write_event(Event::End(BytesEnd::new("rte")))?;

    writer.write_event(Event::Start(BytesStart::new("trk")))?;
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
    write_points(&mut writer, "trkpt", result.coordinates())?;
    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    writer.write_event(Event::End(BytesEnd::new("trk")))?;

    writer.write_event(Event::Start(BytesStart::new("extensions")))?;
    if result.waypoints().is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("rf:waypoints")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("rf:waypoints")))?;
        write_points(&mut writer, "rf:waypoint", result.waypoints())?;
        writer.write_event(Event::End(BytesEnd::new("rf:waypoints")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("extensions")))?;

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(writer.into_inner())
}

fn write_points(writer: &mut Writer<Vec<u8>>, tag: &str, points: &[LatLon]) -> std::io::Result<()> {
    for p in points {
        let lat = format!("{:.6}", p.lat);
        let lon = format!("{:.6}", p.lon);
        writer.write_event(Event::Empty(
            BytesStart::new(tag).with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]),
        ))?;
    }
    Ok(())
}
