use std::{future::Future, time::Duration};

use geo_types::LineString;
use serde::Deserialize;

use crate::{
    error::RoutingError,
    models::{RouteResult, Waypoint},
};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for turn-by-turn routing engines (Dependency Inversion Principle)
///
/// Abstracts the road-network router so the curvy route search can run
/// against:
/// - **Production**: [`OsrmEngine`], an HTTP client for an OSRM server
/// - **Testing**: scripted engines replaying a fixed sequence of answers
///
/// # Contract
/// - `route` snaps the ordered waypoints to the road network and returns the
///   full geometry, distance and duration of the route through all of them
/// - failures carry a [`RoutingError`] whose kind tells callers whether the
///   engine was unreachable, slow, unable to route, or misbehaving
pub trait RoutingEngine: Send + Sync {
    fn route(
        &self,
        waypoints: &[Waypoint],
    ) -> impl Future<Output = Result<RouteResult, RoutingError>> + Send;

    /// Whether the engine currently answers requests.
    fn health(&self) -> impl Future<Output = bool> + Send;
}

/// Async client for an OSRM `route/v1/driving` endpoint.
#[derive(Clone)]
pub struct OsrmEngine {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OsrmEngine {
    /// Per-call `timeout` bounds every routing request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RoutingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RoutingError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn route_url(&self, waypoints: &[Waypoint]) -> String {
        format!("{}/route/v1/driving/{}", self.base_url, coordinate_path(waypoints))
    }

    fn classify(&self, err: reqwest::Error) -> RoutingError {
        if err.is_timeout() {
            RoutingError::Timeout(self.timeout)
        } else if err.is_connect() {
            RoutingError::Unavailable("routing service is unreachable".to_string())
        } else if err.is_decode() {
            RoutingError::Upstream {
                status: err.status().map(|s| s.as_u16()).unwrap_or(200),
                message: format!("malformed response: {err}"),
            }
        } else {
            RoutingError::Unavailable(err.to_string())
        }
    }
}

impl RoutingEngine for OsrmEngine {
    async fn route(&self, waypoints: &[Waypoint]) -> Result<RouteResult, RoutingError> {
        let url = self.route_url(waypoints);
        tracing::debug!("OSRM request with {} waypoints", waypoints.len());

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson"), ("steps", "false")])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_client_error() {
            // OSRM answers NoRoute / NoSegment with 400 and a JSON body
            let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
            return match serde_json::from_slice::<OsrmResponse>(&bytes) {
                Ok(body) if body.code != "Ok" => parse_route(body),
                _ => {
                    tracing::warn!("OSRM returned status {}", status);
                    Err(upstream(status))
                }
            };
        }
        if !status.is_success() {
            tracing::warn!("OSRM returned status {}", status);
            return Err(upstream(status));
        }

        let body: OsrmResponse = response.json().await.map_err(|e| self.classify(e))?;
        parse_route(body)
    }

    async fn health(&self) -> bool {
        let url = format!("{}/route/v1/driving/-80.8,35.2;-80.7,35.3", self.base_url);
        match self
            .client
            .get(&url)
            .query(&[("overview", "false")])
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(err) => {
                tracing::debug!("OSRM health probe failed: {}", err);
                false
            }
        }
    }
}

fn upstream(status: reqwest::StatusCode) -> RoutingError {
    RoutingError::Upstream {
        status: status.as_u16(),
        message: format!("routing service returned status {}", status.as_u16()),
    }
}

/// `lng,lat;lng,lat;...` as OSRM expects in the URL path.
pub fn coordinate_path(waypoints: &[Waypoint]) -> String {
    waypoints
        .iter()
        .map(|wp| format!("{},{}", wp.lng, wp.lat))
        .collect::<Vec<_>>()
        .join(";")
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    location: [f64; 2],
}

fn parse_route(body: OsrmResponse) -> Result<RouteResult, RoutingError> {
    if body.code != "Ok" {
        let message = body
            .message
            .unwrap_or_else(|| "Unknown routing error".to_string());
        return Err(RoutingError::NoRoute(format!("{}: {}", body.code, message)));
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::NoRoute("response contained no routes".to_string()))?;

    Ok(RouteResult {
        geometry: LineString::from(route.geometry.coordinates),
        distance_m: route.distance,
        duration_s: route.duration,
        snapped: body
            .waypoints
            .into_iter()
            .map(|wp| Waypoint::new(wp.location[0], wp.location[1]))
            .collect(),
    })
}
