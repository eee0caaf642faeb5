use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment};

use crate::error::RouteError;
use crate::models::{Coordinate, Distance, Waypoint};

const CREATOR: &str = "running_loops";

/// Package a generated loop for download to a watch or phone.
///
/// The routed path becomes the single track, named after the requested
/// distance. The shaping waypoints the loop was seeded with are written as
/// `<wpt>` markers so the runner can see where the loop turns.
pub fn encode_loop_as_gpx(
    path: &[Coordinate],
    waypoints: &[Waypoint],
    target: Distance,
) -> Result<String, RouteError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };

    gpx.waypoints = waypoints
        .iter()
        .enumerate()
        .map(|(index, waypoint)| {
            let mut marker = gpx_point(waypoint.location);
            marker.name = Some(format!("Turn {}", index + 1));
            marker
        })
        .collect();

    let mut segment = TrackSegment::new();
    segment.points = path.iter().copied().map(gpx_point).collect();
    gpx.tracks.push(Track {
        name: Some(track_name(target)),
        segments: vec![segment],
        ..Default::default()
    });

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn track_name(target: Distance) -> String {
    format!("{:.2} {} running loop", target.value, target.unit.label())
}

fn gpx_point(coord: Coordinate) -> gpx::Waypoint {
    gpx::Waypoint::new(Point::new(coord.lon, coord.lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(lat: f64, lon: f64) -> Waypoint {
        Waypoint {
            location: Coordinate::new(lat, lon),
            stopover: false,
        }
    }

    fn read(encoded: &str) -> Gpx {
        let bytes = BASE64.decode(encoded).expect("base64");
        gpx::read(bytes.as_slice()).expect("valid gpx")
    }

    #[test]
    fn names_the_track_after_the_requested_distance() {
        assert_eq!(track_name(Distance::imperial(2.0)), "2.00 mi running loop");
        assert_eq!(track_name(Distance::metric(5.25)), "5.25 km running loop");
    }

    #[test]
    fn writes_path_as_track_and_turns_as_markers() {
        let start = Coordinate::new(40.7128, -74.006);
        let path = [start, Coordinate::new(40.72, -74.0), Coordinate::new(40.71, -74.01), start];
        let turns = [turn(40.72, -74.0), turn(40.71, -74.01)];

        let encoded = encode_loop_as_gpx(&path, &turns, Distance::imperial(2.0)).expect("gpx");
        let parsed = read(&encoded);

        assert_eq!(parsed.creator.as_deref(), Some(CREATOR));
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.tracks[0].name.as_deref(), Some("2.00 mi running loop"));

        let points = &parsed.tracks[0].segments[0].points;
        assert_eq!(points.len(), 4);
        assert!((points[0].point().y() - 40.7128).abs() < 1e-9);
        assert!((points[0].point().x() + 74.006).abs() < 1e-9);
        assert_eq!(points.first().map(|p| p.point()), points.last().map(|p| p.point()));

        assert_eq!(parsed.waypoints.len(), 2);
        assert_eq!(parsed.waypoints[1].name.as_deref(), Some("Turn 2"));
        assert!((parsed.waypoints[1].point().y() - 40.71).abs() < 1e-9);
    }

    #[test]
    fn loop_without_turns_has_no_markers() {
        let path = [Coordinate::new(45.0, 5.0), Coordinate::new(45.0, 5.0)];
        let encoded = encode_loop_as_gpx(&path, &[], Distance::metric(1.0)).expect("gpx");
        let xml = String::from_utf8(BASE64.decode(encoded).expect("base64")).expect("utf8");

        assert_eq!(xml.matches("<trkpt").count(), 2);
        assert_eq!(xml.matches("<wpt").count(), 0);
    }
}
