#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::Mutex,
    time::Duration,
};

use curvy_backend::{
    corridor::{CorridorQuery, CorridorSource},
    engine::RoutingEngine,
    error::{CorridorError, RoutingError},
    models::{CorridorCandidate, RouteResult, Waypoint},
};
use geo_types::LineString;

pub const START: Waypoint = Waypoint { lng: -72.5, lat: 44.2 };
pub const END: Waypoint = Waypoint { lng: -72.8, lat: 43.9 };

/// Replays scripted answers in order and records every waypoint list it is asked for.
pub struct ScriptedEngine {
    answers: Mutex<VecDeque<Result<RouteResult, RoutingError>>>,
    calls: Mutex<Vec<Vec<Waypoint>>>,
    healthy: bool,
}

impl ScriptedEngine {
    pub fn new(answers: Vec<Result<RouteResult, RoutingError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<Vec<Waypoint>> {
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
            .unwrap_or_else(|| Err(RoutingError::NoRoute("script exhausted".to_string())))
    }

    async fn health(&self) -> bool {
        self.healthy
    }
}

/// What a corridor search was asked for, without the borrowed geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub points: usize,
    pub buffer_m: f64,
    pub min_curvature: u32,
    pub min_length_m: f64,
    pub limit: usize,
}

pub enum CorridorScript {
    Candidates(Vec<CorridorCandidate>),
    TimesOut(Duration),
}

/// Corridor double returning the same answer to every query.
pub struct StaticCorridor {
    script: CorridorScript,
    queries: Mutex<Vec<RecordedQuery>>,
    healthy: bool,
}

impl StaticCorridor {
    pub fn with(candidates: Vec<CorridorCandidate>) -> Self {
        Self::scripted(CorridorScript::Candidates(candidates))
    }

    pub fn empty() -> Self {
        Self::with(Vec::new())
    }

    pub fn timing_out() -> Self {
        Self::scripted(CorridorScript::TimesOut(Duration::from_secs(10)))
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::empty()
        }
    }

    fn scripted(script: CorridorScript) -> Self {
        Self {
            script,
            queries: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl CorridorSource for StaticCorridor {
    async fn candidates(
        &self,
        query: &CorridorQuery<'_>,
    ) -> Result<Vec<CorridorCandidate>, CorridorError> {
        self.queries.lock().unwrap().push(RecordedQuery {
            points: query.geometry.0.len(),
            buffer_m: query.buffer_m,
            min_curvature: query.min_curvature,
            min_length_m: query.min_length_m,
            limit: query.limit,
        });
        match &self.script {
            CorridorScript::Candidates(candidates) => Ok(candidates.clone()),
            CorridorScript::TimesOut(after) => Err(CorridorError::Timeout(*after)),
        }
    }

    async fn health(&self) -> bool {
        self.healthy
    }
}

pub fn route(distance_m: f64) -> Result<RouteResult, RoutingError> {
    Ok(RouteResult {
        geometry: LineString::from(vec![(START.lng, START.lat), (-72.65, 44.05), (END.lng, END.lat)]),
        distance_m,
        duration_s: distance_m / 20.0,
        snapped: vec![START, END],
    })
}

pub fn candidate(
    id: i64,
    curvature: u32,
    length_m: f64,
    distance_from_route_m: f64,
    route_fraction: f64,
    centroid: Waypoint,
) -> CorridorCandidate {
    CorridorCandidate {
        id,
        name: Some(format!("Segment {id}")),
        curvature,
        length_m,
        is_paved: true,
        route_fraction,
        distance_from_route_m,
        centroid,
    }
}

/// Three paved Vermont segments around the START -> END baseline.
///
/// With a 15 km corridor they score 4 > 3 > 1.
pub fn vermont_corridor() -> Vec<CorridorCandidate> {
    vec![
        candidate(1, 2500, 15_000.0, 2_000.0, 0.2, Waypoint::new(-72.59, 44.265)),
        candidate(3, 3200, 18_000.0, 5_000.0, 0.6, Waypoint::new(-72.91, 44.06)),
        candidate(4, 4500, 20_000.0, 12_000.0, 0.1, Waypoint::new(-72.785, 44.545)),
    ]
}
