use crate::{
    corridor::{CorridorQuery, CorridorSource},
    detour::{detour_ratio, DetourController},
    engine::RoutingEngine,
    error::RoutingError,
    models::{
        round_to, CurvyRouteOptions, CurvyRouteResult, CurvySegmentSummary, RouteResult,
        ScoredCandidate, Waypoint,
    },
    scoring::score_candidates,
    selection::select_candidates,
    waypoints::sequence_waypoints,
};

/// Baselines shorter than this get a tighter search.
pub const SHORT_ROUTE_THRESHOLD_M: f64 = 5_000.0;
pub const SHORT_ROUTE_MAX_CORRIDOR_M: u32 = 5_000;
pub const SHORT_ROUTE_MAX_WAYPOINTS: usize = 10;
/// Cap on segments pulled from the corridor query.
pub const CORRIDOR_CANDIDATE_LIMIT: usize = 100;

/// Corridor width and waypoint cap actually applied for a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub corridor_width_m: u32,
    pub max_waypoints: usize,
}

impl SearchLimits {
    pub fn for_baseline(baseline_distance_m: f64, options: &CurvyRouteOptions) -> Self {
        if baseline_distance_m < SHORT_ROUTE_THRESHOLD_M {
            Self {
                corridor_width_m: options.corridor_width_m.min(SHORT_ROUTE_MAX_CORRIDOR_M),
                max_waypoints: options.max_waypoints.min(SHORT_ROUTE_MAX_WAYPOINTS),
            }
        } else {
            Self {
                corridor_width_m: options.corridor_width_m,
                max_waypoints: options.max_waypoints,
            }
        }
    }
}

/// Finds routes that maximize time on curvy roads via waypoint injection
///
/// # Algorithm: Corridor Waypoint Injection
///
/// 1. Route `[start, end]` directly: the baseline
/// 2. Search curvature segments in a corridor around the baseline geometry
/// 3. Score them (curvature 50%, length 30%, proximity 20%)
/// 4. Greedily select well-spaced top segments
/// 5. Route through their centroids in travel order
/// 6. Trim the weakest segments while the detour exceeds the budget
///
/// Routing calls are strictly sequential; each depends on the previous one.
pub struct CurvyRouteFinder<R, C> {
    engine: R,
    corridor: C,
}

impl<R: RoutingEngine, C: CorridorSource> CurvyRouteFinder<R, C> {
    pub fn new(engine: R, corridor: C) -> Self {
        Self { engine, corridor }
    }

    pub fn engine(&self) -> &R {
        &self.engine
    }

    pub fn corridor(&self) -> &C {
        &self.corridor
    }

    /// Only routing-engine failures are returned as errors. An empty or
    /// failing corridor search degrades to the baseline route.
    pub async fn find_curvy_route(
        &self,
        start: Waypoint,
        end: Waypoint,
        options: &CurvyRouteOptions,
    ) -> Result<CurvyRouteResult, RoutingError> {
        let baseline = self.engine.route(&[start, end]).await?;
        let limits = SearchLimits::for_baseline(baseline.distance_m, options);
        tracing::info!(
            "baseline {:.0} m, corridor {} m, up to {} waypoints",
            baseline.distance_m,
            limits.corridor_width_m,
            limits.max_waypoints
        );

        let query = CorridorQuery {
            geometry: &baseline.geometry,
            buffer_m: limits.corridor_width_m as f64,
            min_curvature: options.min_curvature,
            min_length_m: options.min_segment_length_m as f64,
            limit: CORRIDOR_CANDIDATE_LIMIT,
        };
        let candidates = match self.corridor.candidates(&query).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!("corridor search failed, using baseline route: {}", err);
                Vec::new()
            }
        };
        if candidates.is_empty() {
            tracing::info!("no curvy segments in corridor");
            return Ok(baseline_result(start, end, baseline, limits));
        }

        let scored = score_candidates(&candidates, limits.corridor_width_m as f64);
        let selected = select_candidates(&scored, limits.max_waypoints);
        if selected.is_empty() {
            return Ok(baseline_result(start, end, baseline, limits));
        }
        tracing::debug!(
            "selected {} of {} corridor segments",
            selected.len(),
            candidates.len()
        );

        let controller = DetourController::new(
            &self.engine,
            start,
            end,
            baseline.distance_m,
            options.max_detour_ratio,
        );
        let resolution = controller.resolve(selected).await?;
        tracing::info!(
            "curvy route {:.0} m through {} segments ({:?}, ratio {:.2})",
            resolution.route.distance_m,
            resolution.selection.len(),
            resolution.outcome,
            resolution.detour_ratio
        );

        Ok(assemble(
            resolution.route,
            &baseline,
            &resolution.selection,
            resolution.waypoints,
            limits,
        ))
    }
}

fn baseline_result(
    start: Waypoint,
    end: Waypoint,
    baseline: RouteResult,
    limits: SearchLimits,
) -> CurvyRouteResult {
    let waypoints = sequence_waypoints(start, &[], end);
    let reference = baseline.clone();
    assemble(baseline, &reference, &[], waypoints, limits)
}

fn assemble(
    route: RouteResult,
    baseline: &RouteResult,
    selection: &[ScoredCandidate],
    waypoints: Vec<Waypoint>,
    limits: SearchLimits,
) -> CurvyRouteResult {
    let segments: Vec<CurvySegmentSummary> =
        selection.iter().map(CurvySegmentSummary::from).collect();
    let total_curvature = segments.iter().map(|s| u64::from(s.curvature)).sum();

    CurvyRouteResult {
        detour_ratio: round_to(detour_ratio(route.distance_m, baseline.distance_m), 2),
        route,
        baseline_distance_m: baseline.distance_m,
        baseline_duration_s: baseline.duration_s,
        waypoints_used: segments.len(),
        segments,
        total_curvature,
        corridor_width_m: limits.corridor_width_m,
        waypoints,
    }
}
