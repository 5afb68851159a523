use crate::models::ScoredCandidate;

/// Minimum distance between two selected candidates, as a fraction of route length.
pub const MIN_ROUTE_SPACING: f64 = 0.03;

/// Greedy top-score selection with a spacing constraint.
///
/// Candidates are visited by descending score (ties keep their input order)
/// and accepted unless their `route_fraction` lies within
/// [`MIN_ROUTE_SPACING`] of one already accepted. Stops at `max_waypoints`.
/// The result is ordered by descending score.
pub fn select_candidates(
    scored: &[ScoredCandidate],
    max_waypoints: usize,
) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<&ScoredCandidate> = scored.iter().collect();
    // stable: equal scores keep input order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut selected: Vec<ScoredCandidate> = Vec::with_capacity(max_waypoints.min(scored.len()));
    for candidate in ranked {
        if selected.len() >= max_waypoints {
            break;
        }
        let too_close = selected
            .iter()
            .any(|s| (s.route_fraction() - candidate.route_fraction()).abs() < MIN_ROUTE_SPACING);
        if too_close {
            tracing::trace!(
                "skipping segment {} at {:.3}: too close to a selected segment",
                candidate.candidate.id,
                candidate.route_fraction()
            );
            continue;
        }
        selected.push(candidate.clone());
    }

    selected
}
