use crate::{
    engine::RoutingEngine,
    error::{RoutingError, RoutingErrorKind},
    models::{RouteResult, ScoredCandidate, Waypoint},
    waypoints::{order_by_route_fraction, sequence_waypoints},
};

/// Re-routing attempts after the first candidate route.
pub const MAX_TRIM_RETRIES: usize = 3;

/// Candidate route distance over baseline distance; 1.0 for a zero-length baseline.
pub fn detour_ratio(distance_m: f64, baseline_distance_m: f64) -> f64 {
    if baseline_distance_m > 0.0 {
        distance_m / baseline_distance_m
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetourOutcome {
    /// The returned route is within the detour budget.
    Accepted,
    /// Trimming stopped before the budget was met; the last computed route is returned.
    Exhausted,
}

/// A routed selection: the route together with the waypoints and segments it went through.
#[derive(Debug, Clone)]
pub struct DetourResolution {
    pub outcome: DetourOutcome,
    pub route: RouteResult,
    /// Ordered by route fraction.
    pub selection: Vec<ScoredCandidate>,
    pub waypoints: Vec<Waypoint>,
    pub detour_ratio: f64,
    pub trim_retries: usize,
}

/// Routes a selection and trims it until the detour fits the budget
///
/// # State machine
/// ```text
/// INITIAL ──route──▶ ROUTED ──ratio ≤ max──▶ ACCEPTED
///                      │
///                      └─ratio > max──▶ TRIMMING ──route──▶ ROUTED
///                                          │
///                                          └─retries spent or < 2 left──▶ EXHAUSTED
/// ```
///
/// TRIMMING drops the single lowest-scoring segment, re-sorts the rest by
/// route fraction and re-routes. At most [`MAX_TRIM_RETRIES`] re-routes are
/// made. EXHAUSTED returns the last successfully computed route, whatever its
/// ratio.
///
/// A timeout while re-routing a trimmed selection counts as a failed attempt.
/// Any other engine error, and any error on the first route, is returned.
pub struct DetourController<'a, R> {
    engine: &'a R,
    start: Waypoint,
    end: Waypoint,
    baseline_distance_m: f64,
    max_detour_ratio: f64,
}

impl<'a, R: RoutingEngine> DetourController<'a, R> {
    pub fn new(
        engine: &'a R,
        start: Waypoint,
        end: Waypoint,
        baseline_distance_m: f64,
        max_detour_ratio: f64,
    ) -> Self {
        Self {
            engine,
            start,
            end,
            baseline_distance_m,
            max_detour_ratio,
        }
    }

    pub async fn resolve(
        &self,
        mut selection: Vec<ScoredCandidate>,
    ) -> Result<DetourResolution, RoutingError> {
        order_by_route_fraction(&mut selection);
        let waypoints = sequence_waypoints(self.start, &selection, self.end);
        let route = self.engine.route(&waypoints).await?;
        let ratio = detour_ratio(route.distance_m, self.baseline_distance_m);

        let mut last = DetourResolution {
            outcome: DetourOutcome::Accepted,
            route,
            selection: selection.clone(),
            waypoints,
            detour_ratio: ratio,
            trim_retries: 0,
        };
        if self.within_budget(ratio) {
            tracing::debug!("detour ratio {:.2} accepted without trimming", ratio);
            return Ok(last);
        }

        let mut remaining = selection;
        let mut retries = 0;
        while retries < MAX_TRIM_RETRIES && remaining.len() >= 2 {
            retries += 1;
            if let Some(dropped) = remove_weakest(&mut remaining) {
                tracing::debug!(
                    "detour ratio {:.2} > {:.2}: dropping segment {} (score {:.3})",
                    last.detour_ratio,
                    self.max_detour_ratio,
                    dropped.candidate.id,
                    dropped.score
                );
            }
            order_by_route_fraction(&mut remaining);
            let waypoints = sequence_waypoints(self.start, &remaining, self.end);

            let route = match self.engine.route(&waypoints).await {
                Ok(route) => route,
                Err(err) if err.kind() == RoutingErrorKind::Timeout => {
                    tracing::warn!("trim attempt {} timed out: {}", retries, err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let ratio = detour_ratio(route.distance_m, self.baseline_distance_m);
            last = DetourResolution {
                outcome: DetourOutcome::Exhausted,
                route,
                selection: remaining.clone(),
                waypoints,
                detour_ratio: ratio,
                trim_retries: retries,
            };
            if self.within_budget(ratio) {
                tracing::debug!(
                    "detour ratio {:.2} accepted after {} trim(s), {} segments left",
                    ratio,
                    retries,
                    remaining.len()
                );
                last.outcome = DetourOutcome::Accepted;
                return Ok(last);
            }
        }

        tracing::info!(
            "detour budget {:.2} not met after {} trim(s), returning ratio {:.2}",
            self.max_detour_ratio,
            retries,
            last.detour_ratio
        );
        last.outcome = DetourOutcome::Exhausted;
        last.trim_retries = retries;
        Ok(last)
    }

    fn within_budget(&self, ratio: f64) -> bool {
        ratio <= self.max_detour_ratio
    }
}

/// Remove the lowest-scoring entry; on ties the earliest one goes.
fn remove_weakest(selection: &mut Vec<ScoredCandidate>) -> Option<ScoredCandidate> {
    let index = selection
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.score.total_cmp(&b.score))
        .map(|(index, _)| index)?;
    Some(selection.remove(index))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::Mutex,
        time::Duration,
    };

    use geo_types::LineString;

    use super::*;
    use crate::models::CorridorCandidate;

    /// Replays scripted answers and records every waypoint list it receives.
    struct ScriptedEngine {
        answers: Mutex<VecDeque<Result<RouteResult, RoutingError>>>,
        calls: Mutex<Vec<Vec<Waypoint>>>,
    }

    impl ScriptedEngine {
        fn new(answers: Vec<Result<RouteResult, RoutingError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<Waypoint>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RoutingEngine for ScriptedEngine {
        async fn route(&self, waypoints: &[Waypoint]) -> Result<RouteResult, RoutingError> {
            self.calls.lock().unwrap().push(waypoints.to_vec());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected routing call")
        }

        async fn health(&self) -> bool {
            true
        }
    }

    fn route(distance_m: f64) -> Result<RouteResult, RoutingError> {
        Ok(RouteResult {
            geometry: LineString::from(vec![[-72.5, 44.2], [-72.8, 43.9]]),
            distance_m,
            duration_s: distance_m / 15.0,
            snapped: Vec::new(),
        })
    }

    fn timeout() -> Result<RouteResult, RoutingError> {
        Err(RoutingError::Timeout(Duration::from_secs(30)))
    }

    fn scored(id: i64, score: f64, fraction: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: CorridorCandidate {
                id,
                name: None,
                curvature: 1000,
                length_m: 1000.0,
                is_paved: true,
                route_fraction: fraction,
                distance_from_route_m: 0.0,
                centroid: Waypoint::new(fraction, fraction),
            },
            score,
        }
    }

    fn selection() -> Vec<ScoredCandidate> {
        vec![
            scored(1, 0.9, 0.6),
            scored(2, 0.4, 0.2),
            scored(3, 0.7, 0.4),
            scored(4, 0.8, 0.8),
        ]
    }

    const START: Waypoint = Waypoint { lng: -1.0, lat: -1.0 };
    const END: Waypoint = Waypoint { lng: 2.0, lat: 2.0 };

    fn ids(selection: &[ScoredCandidate]) -> Vec<i64> {
        selection.iter().map(|s| s.candidate.id).collect()
    }

    #[test]
    fn ratio_guards_zero_baseline() {
        assert_eq!(detour_ratio(65_000.0, 50_000.0), 1.3);
        assert_eq!(detour_ratio(10_000.0, 0.0), 1.0);
    }

    #[tokio::test]
    async fn accepts_without_trimming() {
        let engine = ScriptedEngine::new(vec![route(65_000.0)]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller.resolve(selection()).await.unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Accepted);
        assert_eq!(resolved.trim_retries, 0);
        assert_eq!(ids(&resolved.selection), vec![2, 3, 1, 4]);
        assert_eq!(engine.calls().len(), 1);
        assert_eq!(engine.calls()[0], resolved.waypoints);
    }

    #[tokio::test]
    async fn trims_lowest_score_first() {
        let engine = ScriptedEngine::new(vec![route(150_000.0), route(100_000.0)]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller.resolve(selection()).await.unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Accepted);
        assert_eq!(resolved.trim_retries, 1);
        assert_eq!(resolved.detour_ratio, 2.0);
        assert_eq!(ids(&resolved.selection), vec![3, 1, 4]);
        assert_eq!(resolved.waypoints.len(), 5);
        assert_eq!(resolved.waypoints[0], START);
        assert_eq!(resolved.waypoints[4], END);
    }

    #[tokio::test]
    async fn stops_after_three_retries() {
        let mut many = selection();
        many.push(scored(5, 0.95, 0.9));
        many.push(scored(6, 0.1, 0.05));
        let engine = ScriptedEngine::new(vec![
            route(200_000.0),
            route(190_000.0),
            route(180_000.0),
            route(170_000.0),
        ]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller.resolve(many).await.unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Exhausted);
        assert_eq!(resolved.trim_retries, MAX_TRIM_RETRIES);
        assert_eq!(engine.calls().len(), 1 + MAX_TRIM_RETRIES);
        assert_eq!(resolved.route.distance_m, 170_000.0);
        assert_eq!(resolved.selection.len(), 3);
    }

    #[tokio::test]
    async fn stops_trimming_at_one_segment() {
        let engine = ScriptedEngine::new(vec![route(400_000.0), route(300_000.0)]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller
            .resolve(vec![scored(1, 0.9, 0.3), scored(2, 0.5, 0.7)])
            .await
            .unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Exhausted);
        assert_eq!(resolved.trim_retries, 1);
        assert_eq!(ids(&resolved.selection), vec![1]);
        assert_eq!(engine.calls().len(), 2);
    }

    #[tokio::test]
    async fn single_segment_is_never_trimmed() {
        let engine = ScriptedEngine::new(vec![route(400_000.0)]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller.resolve(vec![scored(1, 0.9, 0.3)]).await.unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Exhausted);
        assert_eq!(resolved.trim_retries, 0);
        assert_eq!(resolved.detour_ratio, 8.0);
        assert_eq!(engine.calls().len(), 1);
    }

    #[tokio::test]
    async fn timeout_while_trimming_consumes_a_retry() {
        let engine = ScriptedEngine::new(vec![route(150_000.0), timeout(), route(110_000.0)]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller.resolve(selection()).await.unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Accepted);
        assert_eq!(resolved.trim_retries, 2);
        // segment 2 dropped on the timed-out attempt, segment 3 on the next
        assert_eq!(ids(&resolved.selection), vec![1, 4]);
    }

    #[tokio::test]
    async fn timeouts_fall_back_to_last_computed_route() {
        let engine = ScriptedEngine::new(vec![route(150_000.0), timeout(), timeout(), timeout()]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let resolved = controller.resolve(selection()).await.unwrap();

        assert_eq!(resolved.outcome, DetourOutcome::Exhausted);
        assert_eq!(resolved.trim_retries, 3);
        assert_eq!(resolved.route.distance_m, 150_000.0);
        assert_eq!(resolved.selection.len(), 4);
        assert_eq!(resolved.waypoints.len(), 6);
    }

    #[tokio::test]
    async fn no_route_while_trimming_propagates() {
        let engine = ScriptedEngine::new(vec![
            route(150_000.0),
            Err(RoutingError::NoRoute("NoSegment".into())),
        ]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let err = controller.resolve(selection()).await.unwrap_err();
        assert_eq!(err.kind(), RoutingErrorKind::NoRoute);
    }

    #[tokio::test]
    async fn first_route_timeout_propagates() {
        let engine = ScriptedEngine::new(vec![timeout()]);
        let controller = DetourController::new(&engine, START, END, 50_000.0, 2.5);
        let err = controller.resolve(selection()).await.unwrap_err();
        assert_eq!(err.kind(), RoutingErrorKind::Timeout);
    }

    #[test]
    fn remove_weakest_prefers_earliest_tie() {
        let mut entries = vec![scored(1, 0.3, 0.1), scored(2, 0.3, 0.5), scored(3, 0.9, 0.9)];
        let dropped = remove_weakest(&mut entries).unwrap();
        assert_eq!(dropped.candidate.id, 1);
        assert_eq!(ids(&entries), vec![2, 3]);
        assert!(remove_weakest(&mut Vec::new()).is_none());
    }
}
