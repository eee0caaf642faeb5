pub use shared::{
    ApiError, Coordinate, Distance, DistanceUnit, GeocodeResponse, LoopRouteRequest,
    LoopRouteResponse, Place, RouteBounds, RouteMetadata, RouteRequest, TravelMode, Waypoint,
};

/// Route returned by a directions service, already decoded into coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub path: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Shaping points the route was requested through.
    pub waypoints: Vec<Waypoint>,
    /// Order in which the service visits the submitted waypoints.
    pub waypoint_order: Vec<usize>,
}
