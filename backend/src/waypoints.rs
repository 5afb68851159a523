use crate::models::{ScoredCandidate, Waypoint};

/// Sort a selection by position along the route (travel direction).
pub fn order_by_route_fraction(selection: &mut [ScoredCandidate]) {
    selection.sort_by(|a, b| a.route_fraction().total_cmp(&b.route_fraction()));
}

/// Build the waypoint list handed to the routing engine:
/// `[start, centroid_1, ..., centroid_k, end]`, centroids in travel order.
pub fn sequence_waypoints(
    start: Waypoint,
    selection: &[ScoredCandidate],
    end: Waypoint,
) -> Vec<Waypoint> {
    let mut ordered: Vec<&ScoredCandidate> = selection.iter().collect();
    ordered.sort_by(|a, b| a.route_fraction().total_cmp(&b.route_fraction()));

    let mut waypoints = Vec::with_capacity(selection.len() + 2);
    waypoints.push(start);
    waypoints.extend(ordered.into_iter().map(|s| s.candidate.centroid));
    waypoints.push(end);
    waypoints
}
