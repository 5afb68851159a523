use serde::{Deserialize, Serialize};

/// A point to route through, in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lng: f64,
    pub lat: f64,
}

impl Waypoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// GeoJSON LineString as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    #[serde(rename = "type", default = "line_string_type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    pub fn line_string(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            kind: line_string_type(),
            coordinates,
        }
    }
}

fn line_string_type() -> String {
    "LineString".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRouteRequest {
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRouteResponse {
    pub geometry: RouteGeometry,
    /// meters
    pub distance: f64,
    /// seconds
    pub duration: f64,
    pub waypoints: Vec<Waypoint>,
}

/// Tuning parameters for the curvy route search.
///
/// Every field is optional on the wire and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvyRouteOptions {
    #[serde(default = "default_corridor_width")]
    pub corridor_width_m: u32,
    #[serde(default = "default_min_curvature")]
    pub min_curvature: u32,
    #[serde(default = "default_min_segment_length")]
    pub min_segment_length_m: u32,
    #[serde(default = "default_max_waypoints")]
    pub max_waypoints: usize,
    #[serde(default = "default_max_detour_ratio")]
    pub max_detour_ratio: f64,
}

impl CurvyRouteOptions {
    pub const CORRIDOR_WIDTH_RANGE: (u32, u32) = (1_000, 50_000);
    pub const MIN_CURVATURE_RANGE: (u32, u32) = (300, 5_000);
    pub const MAX_WAYPOINTS_RANGE: (usize, usize) = (5, 25);
    pub const MAX_DETOUR_RATIO_RANGE: (f64, f64) = (1.1, 5.0);
}

impl Default for CurvyRouteOptions {
    fn default() -> Self {
        Self {
            corridor_width_m: default_corridor_width(),
            min_curvature: default_min_curvature(),
            min_segment_length_m: default_min_segment_length(),
            max_waypoints: default_max_waypoints(),
            max_detour_ratio: default_max_detour_ratio(),
        }
    }
}

fn default_corridor_width() -> u32 {
    15_000
}

fn default_min_curvature() -> u32 {
    500
}

fn default_min_segment_length() -> u32 {
    500
}

fn default_max_waypoints() -> usize {
    20
}

fn default_max_detour_ratio() -> f64 {
    2.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurvyRouteRequest {
    pub start: Waypoint,
    pub end: Waypoint,
    #[serde(default)]
    pub options: CurvyRouteOptions,
}

/// A curvy segment the final route was steered through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvySegmentInfo {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub curvature: u32,
    /// meters
    pub length: u32,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvyRouteResponse {
    pub geometry: RouteGeometry,
    pub distance: f64,
    pub duration: f64,
    pub baseline_distance: f64,
    pub baseline_duration: f64,
    pub detour_ratio: f64,
    pub curvy_segments: Vec<CurvySegmentInfo>,
    pub total_curvature_score: u64,
    pub waypoints_used: usize,
    pub corridor_width: u32,
    /// start + segment centroids + end, ready to be edited as plain waypoints
    pub generated_waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingHealthResponse {
    pub engine_available: bool,
    pub corridor_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
