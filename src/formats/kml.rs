//! KML 2.2 output: one LineString placemark for the track, one Point per waypoint.
//!
//! KML coordinate tuples are `lon,lat`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::formats::ResponseFormatter;
use crate::routing::{LatLon, RouteError, RouteOutcome, RouteResult};

const KML_NS: &str = "http://www.opengis.net/kml/2.2";

#[derive(Debug, Clone, Copy, Default)]
pub struct KmlFormatter;

impl ResponseFormatter for KmlFormatter {
    fn name(&self) -> &str {
        "kml"
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.google-earth.kml+xml"
    }

    fn format(&self, result: &RouteResult) -> RouteOutcome<String> {
        let bytes = render(result).map_err(|e| RouteError::Formatting(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RouteError::Formatting(e.to_string()))
    }
}

fn render(result: &RouteResult) -> std::io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;

    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
    text_element(&mut writer, "name", "Route")?;
    writer.write_event(Event::Start(BytesStart::new("LineString")))?;
    text_element(&mut writer, "tessellate", "1")?;
    let mut track = String::new();
    for (i, p) in result.coordinates().iter().enumerate() {
        if i > 0 {
            track.push(' ');
        }
        track.push_str(&lon_lat(p));
    }
    text_element(&mut writer, "coordinates", &track)?;
    writer.write_event(Event::End(BytesEnd::new("LineString")))?;
    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;

    for (i, wp) in result.waypoints().iter().enumerate() {
        writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
        text_element(&mut writer, "name", &format!("Waypoint {}", i + 1))?;
        writer.write_event(Event::Start(BytesStart::new("Point")))?;
        text_element(&mut writer, "coordinates", &lon_lat(wp))?;
        writer.write_event(Event::End(BytesEnd::new("Point")))?;
        writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;
    Ok(writer.into_inner())
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

fn lon_lat(p: &LatLon) -> String {
    format!("{:.6},{:.6}", p.lon, p.lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kml_axis_order() {
        let result = RouteResult::new(
            "yours",
            vec![LatLon::new(-43.54, 172.64), LatLon::new(-43.53, 172.63)],
        )
        .unwrap()
        .with_waypoints(vec![LatLon::new(-43.5, 172.6)]);

        let kml = KmlFormatter.format(&result).unwrap();
        assert!(kml.contains(
            "<coordinates>172.640000,-43.540000 172.630000,-43.530000</coordinates>"
        ));
        assert!(kml.contains("<name>Waypoint 1</name>"));
        assert!(kml.contains("<Point>"));
        assert!(kml.contains("<coordinates>172.600000,-43.500000</coordinates>"));
        assert!(kml.ends_with("</kml>"));
    }

    #[test]
    fn test_kml_without_waypoints() {
        let result = RouteResult::new("ecan", vec![LatLon::new(-43.54, 172.64)]).unwrap();
        let kml = KmlFormatter.format(&result).unwrap();
        assert!(kml.starts_with("<?xml"));
        assert!(kml.contains(r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#));
        assert_eq!(kml.matches("<Placemark>").count(), 1);
        assert!(!kml.contains("<Point>"));
    }
}
