use std::{fmt, future::Future};

use crate::models::{Coordinate, RouteRequest};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Directions service the loop planner delegates path-finding to.
///
/// Implementations snap the request onto a walkable network and compute the
/// actual path. Any failure (bad status, transport error, timeout) is reported
/// as a [`RoutingError`]; callers treat all of them the same way.
pub trait RoutingPort: Send + Sync {
    /// Route produced on success. Opaque to the planner.
    type Output: Send;

    fn route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<Self::Output, RoutingError>> + Send;
}

/// Failure reported by a routing port, reduced to a diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingError {
    pub status: Option<String>,
    pub message: String,
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RoutingError {}

impl RoutingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            message: message.into(),
        }
    }
}

/// Length of a routed path, for services that report no leg distances.
pub fn path_length_km(path: &[Coordinate]) -> f64 {
    path.iter()
        .zip(path.iter().skip(1))
        .map(|(from, to)| great_circle_km(*from, *to))
        .sum()
}

/// Great-circle distance on a spherical Earth.
pub fn great_circle_km(from: Coordinate, to: Coordinate) -> f64 {
    let (lat_from, lat_to) = (from.lat.to_radians(), to.lat.to_radians());
    let half_dlat = (lat_to - lat_from) / 2.0;
    let half_dlon = (to.lon - from.lon).to_radians() / 2.0;

    let chord =
        half_dlat.sin().powi(2) + lat_from.cos() * lat_to.cos() * half_dlon.sin().powi(2);
    2.0 * EARTH_RADIUS_KM * chord.sqrt().atan2((1.0 - chord).max(0.0).sqrt())
}
