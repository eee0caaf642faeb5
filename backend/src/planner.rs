use std::f64::consts::{FRAC_PI_4, PI};

use rand::Rng;

use crate::{
    models::{Coordinate, Distance, RouteRequest, Waypoint},
    routing::{RoutingError, RoutingPort},
};

/// Routing attempts before giving up on a loop.
pub const MAX_ATTEMPTS: usize = 3;
/// Shaping points seeded per attempt.
pub const WAYPOINT_COUNT: usize = 2;
/// Meters per degree of latitude (equirectangular approximation).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
/// Upper bound (exclusive) of the random angular perturbation, in radians.
pub const MAX_JITTER_RAD: f64 = FRAC_PI_4;

#[derive(Debug, thiserror::Error)]
pub enum LoopPlanError {
    #[error("loop distance must be positive and finite in meters, got {0}")]
    InvalidDistance(f64),
    #[error("unable to generate a loop after {attempts} attempts: {source}")]
    RouteGenerationFailed {
        attempts: usize,
        #[source]
        source: RoutingError,
    },
}

/// Generate an approximate closed loop of `distance` starting and ending at `origin`.
///
/// # Algorithm: jittered radial seeding
///
/// Half of the requested distance is the outbound budget. Each attempt places
/// [`WAYPOINT_COUNT`] shaping points on a circle of radius
/// `budget / (WAYPOINT_COUNT + 1)` around the origin:
///
/// ```text
/// angle_j = 2π(j + 1) / (WAYPOINT_COUNT + 1) + jitter,   jitter ∈ [0, π/4)
/// ```
///
/// and asks `port` to route origin → waypoints → origin on foot. The first
/// successful answer is returned as-is; its real length depends entirely on
/// the network the routing service found and is not checked against the
/// target. A failed attempt is retried with freshly drawn jitter, so a retry
/// explores different geometry instead of resubmitting the same request.
///
/// Attempts run one after the other. `rng` is the only source of randomness,
/// so a seeded generator reproduces the exact request sequence.
///
/// # Errors
/// - [`LoopPlanError::InvalidDistance`] if the distance is not strictly
///   positive; the port is never called.
/// - [`LoopPlanError::RouteGenerationFailed`] once [`MAX_ATTEMPTS`] attempts
///   failed, carrying the last routing error.
pub async fn generate<P, R>(
    origin: Coordinate,
    distance: Distance,
    port: &P,
    rng: &mut R,
) -> Result<P::Output, LoopPlanError>
where
    P: RoutingPort,
    R: Rng,
{
    let meters = distance.to_meters();
    if !distance.value.is_finite() || distance.value <= 0.0 || !meters.is_finite() {
        return Err(LoopPlanError::InvalidDistance(distance.value));
    }

    let radius_budget = meters / 2.0;

    tracing::info!(
        "Generating loop from {:?}: {:.2} {} ({:.0} m outbound budget)",
        origin,
        distance.value,
        distance.unit.label(),
        radius_budget
    );

    let mut last_error = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let waypoints = seed_waypoints(origin, radius_budget, rng);
        tracing::debug!("Attempt {attempt}: seeded waypoints {:?}", waypoints);

        let request = RouteRequest::closed_loop(origin, waypoints);
        match port.route(&request).await {
            Ok(route) => {
                tracing::info!("✓ Loop generated on attempt {attempt}/{MAX_ATTEMPTS}");
                return Ok(route);
            }
            Err(err) => {
                tracing::warn!("Routing attempt {attempt}/{MAX_ATTEMPTS} failed: {err}");
                last_error = Some(err);
            }
        }
    }

    Err(LoopPlanError::RouteGenerationFailed {
        attempts: MAX_ATTEMPTS,
        source: last_error.unwrap_or_else(|| RoutingError::new("no routing attempt was made")),
    })
}

/// Seed one attempt's shaping points around `origin`.
pub fn seed_waypoints<R: Rng>(origin: Coordinate, radius_budget: f64, rng: &mut R) -> Vec<Waypoint> {
    let radius = radius_budget / (WAYPOINT_COUNT + 1) as f64;

    (0..WAYPOINT_COUNT)
        .map(|index| {
            let jitter = rng.random_range(0.0..MAX_JITTER_RAD);
            Waypoint {
                location: project(origin, radius, base_angle(index) + jitter),
                stopover: false,
            }
        })
        .collect()
}

/// Unjittered angle of waypoint `index`, measured from north towards east.
pub fn base_angle(index: usize) -> f64 {
    2.0 * PI * (index + 1) as f64 / (WAYPOINT_COUNT + 1) as f64
}

/// Distance from the origin at which waypoints are placed for `distance`.
pub fn waypoint_radius(distance: Distance) -> f64 {
    distance.to_meters() / 2.0 / (WAYPOINT_COUNT + 1) as f64
}

/// Move `meters` from `origin` along `angle` (0 = north, π/2 = east).
///
/// Equirectangular: longitude degrees shrink with `cos(latitude)`, so the
/// projection degenerates at the poles.
pub fn project(origin: Coordinate, meters: f64, angle: f64) -> Coordinate {
    let lat_delta = meters / METERS_PER_DEGREE_LAT * angle.cos();
    let lon_delta = meters / (METERS_PER_DEGREE_LAT * (origin.lat * PI / 180.0).cos()) * angle.sin();

    Coordinate {
        lat: origin.lat + lat_delta,
        lon: origin.lon + lon_delta,
    }
}
