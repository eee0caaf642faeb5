use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    /// Kilometres
    Metric,
    /// Miles
    #[default]
    Imperial,
}

impl DistanceUnit {
    pub fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Metric => 1000.0,
            DistanceUnit::Imperial => 1609.34,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Metric => "km",
            DistanceUnit::Imperial => "mi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub fn metric(km: f64) -> Self {
        Self::new(km, DistanceUnit::Metric)
    }

    pub fn imperial(miles: f64) -> Self {
        Self::new(miles, DistanceUnit::Imperial)
    }

    pub fn to_meters(self) -> f64 {
        self.value * self.unit.meters_per_unit()
    }
}

/// An intermediate point the route is guided through.
/// `stopover == false` makes it a shaping point only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Coordinate,
    pub stopover: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub travel_mode: TravelMode,
    #[serde(default = "default_optimize")]
    pub optimize_waypoints: bool,
}

impl RouteRequest {
    /// Walking request that starts and ends at `origin`.
    pub fn closed_loop(origin: Coordinate, waypoints: Vec<Waypoint>) -> Self {
        Self {
            origin,
            destination: origin,
            waypoints,
            travel_mode: TravelMode::Walking,
            optimize_waypoints: true,
        }
    }

    pub fn is_closed_loop(&self) -> bool {
        self.origin == self.destination
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopRouteRequest {
    pub start: Coordinate,
    pub distance: f64,
    #[serde(default)]
    pub unit: DistanceUnit,
}

impl LoopRouteRequest {
    pub fn target(&self) -> Distance {
        Distance::new(self.distance, self.unit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMetadata {
    pub point_count: usize,
    pub bounds: RouteBounds,
    pub start: Coordinate,
    pub end: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopRouteResponse {
    pub path: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_s: f64,
    /// Shaping points sent to the directions service for the winning attempt.
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub waypoint_order: Vec<usize>,
    pub gpx_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RouteMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    pub location: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub query: String,
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

pub fn default_optimize() -> bool {
    true
}
