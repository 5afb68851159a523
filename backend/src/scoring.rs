use crate::models::{CorridorCandidate, ScoredCandidate};

pub const CURVATURE_WEIGHT: f64 = 0.5;
pub const LENGTH_WEIGHT: f64 = 0.3;
pub const PROXIMITY_WEIGHT: f64 = 0.2;

/// Score corridor candidates by curvature, length and proximity to the route
///
/// Each dimension is normalized to `[0, 1]` before weighting:
///
/// ```text
/// curv_norm = curvature / max(curvature)
/// len_norm  = length / max(length)
/// prox_norm = max(0, 1 - distance_from_route / corridor_width)
///
/// score = 0.5 * curv_norm + 0.3 * len_norm + 0.2 * prox_norm
/// ```
///
/// A zero maximum (or a non-positive corridor width) zeroes the matching term
/// instead of dividing by zero. Output keeps the input order.
pub fn score_candidates(
    candidates: &[CorridorCandidate],
    corridor_width_m: f64,
) -> Vec<ScoredCandidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let max_curvature = candidates
        .iter()
        .map(|c| c.curvature)
        .max()
        .unwrap_or(0);
    let max_length = candidates
        .iter()
        .map(|c| c.length_m.max(0.0))
        .fold(0.0, f64::max);

    candidates
        .iter()
        .map(|candidate| {
            let curv_norm = ratio(candidate.curvature as f64, max_curvature as f64);
            let len_norm = ratio(candidate.length_m.max(0.0), max_length);
            let prox_norm = proximity(candidate.distance_from_route_m, corridor_width_m);

            let score =
                CURVATURE_WEIGHT * curv_norm + LENGTH_WEIGHT * len_norm + PROXIMITY_WEIGHT * prox_norm;

            ScoredCandidate {
                candidate: candidate.clone(),
                score: score.clamp(0.0, 1.0),
            }
        })
        .collect()
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// 1.0 on the route, 0.0 at (or beyond) the corridor edge.
fn proximity(distance_m: f64, corridor_width_m: f64) -> f64 {
    if corridor_width_m > 0.0 && distance_m.is_finite() {
        (1.0 - distance_m.max(0.0) / corridor_width_m).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
