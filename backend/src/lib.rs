pub mod config;
pub mod directions;
pub mod error;
pub mod geocoder;
pub mod gpx_export;
pub mod models;
pub mod planner;
pub mod routing;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rand::{SeedableRng, rngs::SmallRng};
use serde::Deserialize;

use crate::error::{RouteError, api_error};
use crate::geocoder::Geocoder;
use crate::gpx_export::encode_loop_as_gpx;
use crate::models::{
    ApiError, Coordinate, GeocodeResponse, LoopRouteRequest, LoopRouteResponse, RouteBounds,
    RouteGeometry, RouteMetadata,
};
use crate::routing::{RoutingPort, path_length_km};

pub struct AppState<P, G> {
    pub router: Arc<P>,
    pub geocoder: Arc<G>,
    /// When set, every request replays the same jitter sequence.
    pub seed: Option<u64>,
}

impl<P, G> Clone for AppState<P, G> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            geocoder: Arc::clone(&self.geocoder),
            seed: self.seed,
        }
    }
}

impl<P, G> AppState<P, G> {
    pub fn new(router: P, geocoder: G) -> Self {
        Self {
            router: Arc::new(router),
            geocoder: Arc::new(geocoder),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        }
    }
}

pub fn create_router<P, G>(state: AppState<P, G>) -> Router
where
    P: RoutingPort<Output = RouteGeometry> + 'static,
    G: Geocoder + 'static,
{
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/loop", post(loop_handler::<P, G>))
        .route("/api/geocode", get(geocode_handler::<P, G>))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn loop_handler<P, G>(
    State(state): State<AppState<P, G>>,
    Json(req): Json<LoopRouteRequest>,
) -> Result<Json<LoopRouteResponse>, (StatusCode, Json<ApiError>)>
where
    P: RoutingPort<Output = RouteGeometry>,
    G: Geocoder,
{
    tracing::info!(
        "Loop request from {:?}: {} {}",
        req.start,
        req.distance,
        req.unit.label()
    );

    if !req.start.is_valid() {
        return Err(api_error(RouteError::InvalidStart(req.start)));
    }

    let target = req.target();
    let mut rng = state.rng();
    let route = planner::generate(req.start, target, state.router.as_ref(), &mut rng)
        .await
        .map_err(|err| api_error(err.into()))?;

    let distance_km = if route.distance_m > 0.0 {
        route.distance_m / 1000.0
    } else {
        path_length_km(&route.path)
    };
    let gpx_base64 =
        encode_loop_as_gpx(&route.path, &route.waypoints, target).map_err(api_error)?;
    let metadata = build_metadata(&route.path);

    Ok(Json(LoopRouteResponse {
        path: route.path,
        distance_km,
        duration_s: route.duration_s,
        waypoints: route.waypoints,
        waypoint_order: route.waypoint_order,
        gpx_base64,
        metadata,
    }))
}

#[derive(Debug, Deserialize)]
struct GeocodeParams {
    #[serde(default)]
    q: String,
}

async fn geocode_handler<P, G>(
    State(state): State<AppState<P, G>>,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<GeocodeResponse>, (StatusCode, Json<ApiError>)>
where
    P: RoutingPort<Output = RouteGeometry>,
    G: Geocoder,
{
    let places = state
        .geocoder
        .search(&params.q)
        .await
        .map_err(|err| api_error(err.into()))?;

    Ok(Json(GeocodeResponse {
        query: params.q,
        places,
    }))
}

pub fn build_metadata(path: &[Coordinate]) -> Option<RouteMetadata> {
    let (start, end) = (*path.first()?, *path.last()?);

    let bounds = path.iter().fold(
        RouteBounds {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lon: f64::MAX,
            max_lon: f64::MIN,
        },
        |bounds, coord| RouteBounds {
            min_lat: bounds.min_lat.min(coord.lat),
            max_lat: bounds.max_lat.max(coord.lat),
            min_lon: bounds.min_lon.min(coord.lon),
            max_lon: bounds.max_lon.max(coord.lon),
        },
    );

    Some(RouteMetadata {
        point_count: path.len(),
        bounds,
        start,
        end,
    })
}
