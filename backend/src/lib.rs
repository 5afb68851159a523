pub mod config;
pub mod corridor;
pub mod curvy;
pub mod database;
pub mod detour;
pub mod engine;
pub mod error;
pub mod models;
pub mod scoring;
pub mod selection;
pub mod waypoints;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    ApiError, CalculateRouteRequest, CalculateRouteResponse, CurvyRouteRequest,
    CurvyRouteResponse, RoutingHealthResponse,
};

use crate::corridor::CorridorSource;
use crate::curvy::CurvyRouteFinder;
use crate::engine::RoutingEngine;
use crate::error::{OptionsError, RoutingError, RoutingErrorKind};
use crate::models::{validate_options, validate_waypoint};

pub struct AppState<R, C> {
    pub finder: Arc<CurvyRouteFinder<R, C>>,
}

impl<R, C> Clone for AppState<R, C> {
    fn clone(&self) -> Self {
        Self {
            finder: Arc::clone(&self.finder),
        }
    }
}

impl<R, C> AppState<R, C>
where
    R: RoutingEngine,
    C: CorridorSource,
{
    pub fn new(engine: R, corridor: C) -> Self {
        Self {
            finder: Arc::new(CurvyRouteFinder::new(engine, corridor)),
        }
    }
}

pub fn create_router<R, C>(state: AppState<R, C>) -> Router
where
    R: RoutingEngine + 'static,
    C: CorridorSource + 'static,
{
    Router::new()
        .route("/api/routing/curvy", post(curvy_route_handler::<R, C>))
        .route("/api/routing/calculate", post(calculate_route_handler::<R, C>))
        .route("/api/routing/health", get(health_handler::<R, C>))
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// POST /api/routing/curvy - route from start to end through curvy segments
async fn curvy_route_handler<R, C>(
    State(state): State<AppState<R, C>>,
    Json(req): Json<CurvyRouteRequest>,
) -> ApiResult<CurvyRouteResponse>
where
    R: RoutingEngine + 'static,
    C: CorridorSource + 'static,
{
    validate_waypoint(&req.start).map_err(invalid_request)?;
    validate_waypoint(&req.end).map_err(invalid_request)?;
    validate_options(&req.options).map_err(invalid_request)?;

    tracing::info!("Curvy route request: {:?} -> {:?}", req.start, req.end);

    state
        .finder
        .find_curvy_route(req.start, req.end, &req.options)
        .await
        .map(|result| Json(result.into()))
        .map_err(routing_error_to_api_error)
}

/// POST /api/routing/calculate - plain route through the given waypoints
async fn calculate_route_handler<R, C>(
    State(state): State<AppState<R, C>>,
    Json(req): Json<CalculateRouteRequest>,
) -> ApiResult<CalculateRouteResponse>
where
    R: RoutingEngine + 'static,
    C: CorridorSource + 'static,
{
    if req.waypoints.len() < 2 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                message: OptionsError::TooFewWaypoints(req.waypoints.len()).to_string(),
                kind: None,
            }),
        ));
    }
    for waypoint in &req.waypoints {
        validate_waypoint(waypoint).map_err(invalid_request)?;
    }

    state
        .finder
        .engine()
        .route(&req.waypoints)
        .await
        .map(|route| Json(route.into()))
        .map_err(routing_error_to_api_error)
}

/// GET /api/routing/health - availability of the routing engine and the curvature database
async fn health_handler<R, C>(State(state): State<AppState<R, C>>) -> Json<RoutingHealthResponse>
where
    R: RoutingEngine + 'static,
    C: CorridorSource + 'static,
{
    let engine_available = state.finder.engine().health().await;
    let corridor_available = state.finder.corridor().health().await;
    Json(RoutingHealthResponse {
        engine_available,
        corridor_available,
    })
}

fn invalid_request(err: OptionsError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiError {
            message: err.to_string(),
            kind: None,
        }),
    )
}

/// Convert RoutingError to API error response
fn routing_error_to_api_error(err: RoutingError) -> (StatusCode, Json<ApiError>) {
    let status = match err.kind() {
        RoutingErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        RoutingErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        RoutingErrorKind::NoRoute => StatusCode::UNPROCESSABLE_ENTITY,
        RoutingErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!("routing failed ({}): {}", err.kind().as_str(), err);

    (
        status,
        Json(ApiError {
            message: err.to_string(),
            kind: Some(err.kind().as_str().to_string()),
        }),
    )
}
