use axum::{Json, http::StatusCode};
use thiserror::Error;

use crate::geocoder::GeocodeError;
use crate::models::{ApiError, Coordinate};
use crate::planner::LoopPlanError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("start coordinate {0:?} is outside valid latitude/longitude ranges")]
    InvalidStart(Coordinate),
    #[error(transparent)]
    Plan(#[from] LoopPlanError),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::InvalidStart(_)
            | RouteError::Plan(LoopPlanError::InvalidDistance(_))
            | RouteError::Geocode(GeocodeError::EmptyQuery) => StatusCode::BAD_REQUEST,
            RouteError::Plan(LoopPlanError::RouteGenerationFailed { .. })
            | RouteError::Geocode(_) => StatusCode::BAD_GATEWAY,
            RouteError::Gpx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn api_error(err: RouteError) -> (StatusCode, Json<ApiError>) {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!("{err}");
    }
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
