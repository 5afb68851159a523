use geo_types::LineString;

pub use shared::{CurvyRouteOptions, Waypoint};

use crate::error::OptionsError;

/// One routing-engine answer. Never mutated after the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// (lng, lat) polyline
    pub geometry: LineString<f64>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub snapped: Vec<Waypoint>,
}

/// A curvature segment found inside the search corridor.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorCandidate {
    pub id: i64,
    pub name: Option<String>,
    pub curvature: u32,
    pub length_m: f64,
    pub is_paved: bool,
    /// Position along the baseline route, 0 at start and 1 at end.
    pub route_fraction: f64,
    pub distance_from_route_m: f64,
    pub centroid: Waypoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: CorridorCandidate,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn route_fraction(&self) -> f64 {
        self.candidate.route_fraction
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurvySegmentSummary {
    pub id: i64,
    pub name: Option<String>,
    pub curvature: u32,
    pub length_m: u32,
    pub score: f64,
}

impl From<&ScoredCandidate> for CurvySegmentSummary {
    fn from(scored: &ScoredCandidate) -> Self {
        let candidate = &scored.candidate;
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            curvature: candidate.curvature,
            length_m: candidate.length_m.max(0.0) as u32,
            score: round_to(scored.score, 3),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurvyRouteResult {
    pub route: RouteResult,
    pub baseline_distance_m: f64,
    pub baseline_duration_s: f64,
    /// Rounded to 2 decimals.
    pub detour_ratio: f64,
    pub segments: Vec<CurvySegmentSummary>,
    pub total_curvature: u64,
    pub waypoints_used: usize,
    pub corridor_width_m: u32,
    /// start + segment centroids + end
    pub waypoints: Vec<Waypoint>,
}

impl From<CurvyRouteResult> for shared::CurvyRouteResponse {
    fn from(result: CurvyRouteResult) -> Self {
        Self {
            geometry: geometry_to_wire(&result.route.geometry),
            distance: result.route.distance_m,
            duration: result.route.duration_s,
            baseline_distance: result.baseline_distance_m,
            baseline_duration: result.baseline_duration_s,
            detour_ratio: result.detour_ratio,
            curvy_segments: result
                .segments
                .into_iter()
                .map(|segment| shared::CurvySegmentInfo {
                    id: segment.id,
                    name: segment.name,
                    curvature: segment.curvature,
                    length: segment.length_m,
                    score: segment.score,
                })
                .collect(),
            total_curvature_score: result.total_curvature,
            waypoints_used: result.waypoints_used,
            corridor_width: result.corridor_width_m,
            generated_waypoints: result.waypoints,
        }
    }
}

impl From<RouteResult> for shared::CalculateRouteResponse {
    fn from(route: RouteResult) -> Self {
        Self {
            geometry: geometry_to_wire(&route.geometry),
            distance: route.distance_m,
            duration: route.duration_s,
            waypoints: route.snapped,
        }
    }
}

pub fn geometry_to_wire(line: &LineString<f64>) -> shared::RouteGeometry {
    shared::RouteGeometry::line_string(line.coords().map(|c| [c.x, c.y]).collect())
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn validate_waypoint(point: &Waypoint) -> Result<(), OptionsError> {
    let valid = point.lng.is_finite()
        && point.lat.is_finite()
        && (-180.0..=180.0).contains(&point.lng)
        && (-90.0..=90.0).contains(&point.lat);
    if valid {
        Ok(())
    } else {
        Err(OptionsError::InvalidCoordinate {
            lng: point.lng,
            lat: point.lat,
        })
    }
}

/// Checks every option against its documented bounds.
pub fn validate_options(options: &CurvyRouteOptions) -> Result<(), OptionsError> {
    let (min, max) = CurvyRouteOptions::CORRIDOR_WIDTH_RANGE;
    check_range("corridor_width_m", options.corridor_width_m as f64, min as f64, max as f64)?;

    let (min, max) = CurvyRouteOptions::MIN_CURVATURE_RANGE;
    check_range("min_curvature", options.min_curvature as f64, min as f64, max as f64)?;

    let (min, max) = CurvyRouteOptions::MAX_WAYPOINTS_RANGE;
    check_range("max_waypoints", options.max_waypoints as f64, min as f64, max as f64)?;

    let (min, max) = CurvyRouteOptions::MAX_DETOUR_RATIO_RANGE;
    check_range("max_detour_ratio", options.max_detour_ratio, min, max)
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), OptionsError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(OptionsError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}
