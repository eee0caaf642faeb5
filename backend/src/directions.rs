use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    models::{Coordinate, RouteGeometry, RouteRequest, Waypoint},
    routing::{RoutingError, RoutingPort},
};

pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com";
pub const DIRECTIONS_API_PATH: &str = "/maps/api/directions/json";

const POLYLINE_PRECISION: f64 = 1e5;

#[derive(Debug, Error)]
pub enum DirectionsError {
    /// Stored without its URL, which carries the API key.
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("directions service answered {status}: {message}")]
    Status { status: String, message: String },

    #[error("directions service returned no route")]
    EmptyRoute,

    #[error("malformed encoded polyline at byte {0}")]
    Polyline(usize),
}

impl From<reqwest::Error> for DirectionsError {
    fn from(err: reqwest::Error) -> Self {
        DirectionsError::Request(err.without_url())
    }
}

impl From<DirectionsError> for RoutingError {
    fn from(err: DirectionsError) -> Self {
        match err {
            DirectionsError::Status { status, message } => RoutingError::with_status(status, message),
            other => RoutingError::new(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionsClientParams {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout. An expired request counts as a failed attempt.
    pub timeout: Duration,
}

/// Client for a Google-Directions-compatible JSON web service.
pub struct DirectionsClient {
    params: DirectionsClientParams,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    overview_polyline: EncodedPolyline,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

#[derive(Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Deserialize)]
struct DirectionsLeg {
    distance: Measure,
    duration: Measure,
}

#[derive(Deserialize)]
struct Measure {
    value: f64,
}

impl DirectionsClient {
    pub fn new(params: DirectionsClientParams) -> Result<Self, DirectionsError> {
        let client = reqwest::Client::builder().timeout(params.timeout).build()?;
        Ok(Self { params, client })
    }

    pub async fn fetch(&self, request: &RouteRequest) -> Result<RouteGeometry, DirectionsError> {
        let url = format!(
            "{}{}",
            self.params.base_url.trim_end_matches('/'),
            DIRECTIONS_API_PATH
        );

        let body: DirectionsResponse = self
            .client
            .get(url)
            .query(&self.query(request))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        into_geometry(body, &request.waypoints)
    }

    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", format_coordinate(request.origin)),
            ("destination", format_coordinate(request.destination)),
            ("mode", request.travel_mode.as_str().to_string()),
        ];
        if !request.waypoints.is_empty() {
            query.push((
                "waypoints",
                format_waypoints(&request.waypoints, request.optimize_waypoints),
            ));
        }
        if let Some(key) = &self.params.api_key {
            query.push(("key", key.clone()));
        }
        query
    }
}

impl RoutingPort for DirectionsClient {
    type Output = RouteGeometry;

    async fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError> {
        let route = self.fetch(request).await?;
        tracing::debug!(
            "Directions route: {} points, {:.0} m, {:.0} s",
            route.path.len(),
            route.distance_m,
            route.duration_s
        );
        Ok(route)
    }
}

fn into_geometry(
    body: DirectionsResponse,
    waypoints: &[Waypoint],
) -> Result<RouteGeometry, DirectionsError> {
    if body.status != "OK" {
        return Err(DirectionsError::Status {
            status: body.status,
            message: body.error_message.unwrap_or_default(),
        });
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or(DirectionsError::EmptyRoute)?;
    let path = decode_polyline(&route.overview_polyline.points)?;
    if path.is_empty() {
        return Err(DirectionsError::EmptyRoute);
    }

    Ok(RouteGeometry {
        path,
        distance_m: route.legs.iter().map(|leg| leg.distance.value).sum(),
        duration_s: route.legs.iter().map(|leg| leg.duration.value).sum(),
        waypoints: waypoints.to_vec(),
        waypoint_order: route.waypoint_order,
    })
}

fn format_coordinate(coord: Coordinate) -> String {
    format!("{:.6},{:.6}", coord.lat, coord.lon)
}

/// `optimize:true|via:lat,lon|lat,lon` — `via:` marks non-stopover points.
fn format_waypoints(waypoints: &[Waypoint], optimize: bool) -> String {
    let points = waypoints.iter().map(|waypoint| {
        let prefix = if waypoint.stopover { "" } else { "via:" };
        format!("{prefix}{}", format_coordinate(waypoint.location))
    });

    if optimize {
        std::iter::once("optimize:true".to_string())
            .chain(points)
            .collect::<Vec<_>>()
            .join("|")
    } else {
        points.collect::<Vec<_>>().join("|")
    }
}

/// Decode an encoded polyline (precision 1e5) into coordinates.
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinate>, DirectionsError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat = 0i64;
    let mut lon = 0i64;
    let mut path = Vec::new();

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lon += next_delta(bytes, &mut index)?;
        path.push(Coordinate {
            lat: lat as f64 / POLYLINE_PRECISION,
            lon: lon as f64 / POLYLINE_PRECISION,
        });
    }

    Ok(path)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, DirectionsError> {
    let mut result = 0i64;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or(DirectionsError::Polyline(*index))?;
        let chunk = i64::from(byte) - 63;
        if !(0..0x40).contains(&chunk) || shift > 30 {
            return Err(DirectionsError::Polyline(*index));
        }
        *index += 1;

        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DirectionsClient {
        DirectionsClient::new(DirectionsClientParams {
            base_url: "http://localhost:9".into(),
            api_key: Some("secret".into()),
            timeout: Duration::from_secs(1),
        })
        .expect("client")
    }

    fn loop_request() -> RouteRequest {
        let origin = Coordinate::new(40.7128, -74.006);
        RouteRequest::closed_loop(
            origin,
            vec![
                Waypoint {
                    location: Coordinate::new(40.71, -74.01),
                    stopover: false,
                },
                Waypoint {
                    location: Coordinate::new(40.72, -74.0),
                    stopover: false,
                },
            ],
        )
    }

    fn parse(json: &str) -> Result<RouteGeometry, DirectionsError> {
        let body: DirectionsResponse = serde_json::from_str(json).expect("json");
        into_geometry(body, &loop_request().waypoints)
    }

    #[test]
    fn decodes_reference_polyline() {
        let path = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").expect("polyline");
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];

        assert_eq!(path.len(), expected.len());
        for (point, (lat, lon)) in path.iter().zip(expected) {
            assert!((point.lat - lat).abs() < 1e-9);
            assert!((point.lon - lon).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_truncated_polyline() {
        assert!(matches!(
            decode_polyline("_p~iF~ps|"),
            Err(DirectionsError::Polyline(_))
        ));
        assert!(decode_polyline("").expect("empty").is_empty());
    }

    #[test]
    fn builds_walking_loop_query() {
        let query = client().query(&loop_request());
        let value = |name: &str| {
            query
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(value("origin"), Some("40.712800,-74.006000"));
        assert_eq!(value("destination"), value("origin"));
        assert_eq!(value("mode"), Some("walking"));
        assert_eq!(
            value("waypoints"),
            Some("optimize:true|via:40.710000,-74.010000|via:40.720000,-74.000000")
        );
        assert_eq!(value("key"), Some("secret"));
    }

    #[test]
    fn stopover_waypoints_have_no_via_prefix() {
        let waypoints = [Waypoint {
            location: Coordinate::new(1.0, 2.0),
            stopover: true,
        }];
        assert_eq!(format_waypoints(&waypoints, false), "1.000000,2.000000");
    }

    #[test]
    fn parses_successful_response() {
        let route = parse(
            r#"{
                "status": "OK",
                "routes": [{
                    "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"},
                    "legs": [
                        {"distance": {"value": 1200, "text": "1.2 km"}, "duration": {"value": 900, "text": "15 mins"}},
                        {"distance": {"value": 800, "text": "0.8 km"}, "duration": {"value": 600, "text": "10 mins"}}
                    ],
                    "waypoint_order": [1, 0]
                }]
            }"#,
        )
        .expect("route");

        assert_eq!(route.path.len(), 3);
        assert_eq!(route.distance_m, 2000.0);
        assert_eq!(route.duration_s, 1500.0);
        assert_eq!(route.waypoint_order, vec![1, 0]);
        assert_eq!(route.waypoints, loop_request().waypoints);
    }

    #[test]
    fn non_ok_status_becomes_routing_failure() {
        let err = parse(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap_err();
        let routing: RoutingError = err.into();
        assert_eq!(routing.status.as_deref(), Some("ZERO_RESULTS"));

        let err = parse(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "directions service answered REQUEST_DENIED: The provided API key is invalid."
        );
    }

    #[test]
    fn ok_status_without_routes_is_an_error() {
        assert!(matches!(
            parse(r#"{"status": "OK", "routes": []}"#),
            Err(DirectionsError::EmptyRoute)
        ));
    }
}
