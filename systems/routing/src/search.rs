//! Best-first path search over single-move hops.

use std::collections::{BTreeSet, HashMap, HashSet};

use paintball_core::GridPoint;

use crate::RouteResolver;

/// Reach of the fastest posture, used to keep the estimate admissible.
const FASTEST_STEP: f64 = 3.0;

impl RouteResolver<'_> {
    /// Shortest hop sequence from `start` to `goal`, both endpoints included.
    ///
    /// A hop reaches any cell within `step_distance` whose straight line from
    /// the current cell is empty after the first cell. Every hop costs one and
    /// the estimate is `ceil(distance / 3)`. Among equal estimates the
    /// lexicographically smallest point is expanded first.
    #[must_use]
    pub fn route_to(
        &self,
        start: GridPoint,
        goal: GridPoint,
        step_distance: u32,
    ) -> Option<Vec<GridPoint>> {
        let mut open: BTreeSet<(u32, GridPoint)> = BTreeSet::new();
        let mut estimates: HashMap<GridPoint, u32> = HashMap::new();
        let mut costs: HashMap<GridPoint, u32> = HashMap::new();
        let mut came_from: HashMap<GridPoint, GridPoint> = HashMap::new();
        let mut closed: HashSet<GridPoint> = HashSet::new();

        let initial = remaining_hops(start, goal);
        let _ = costs.insert(start, 0);
        let _ = estimates.insert(start, initial);
        let _ = open.insert((initial, start));

        while let Some((_, current)) = open.pop_first() {
            let _ = estimates.remove(&current);
            if current == goal {
                return Some(reconstruct(&came_from, goal));
            }
            let _ = closed.insert(current);

            let next_cost = costs.get(&current).copied().unwrap_or(0) + 1;
            for neighbour in self.hops_from(current, step_distance) {
                if closed.contains(&neighbour) {
                    continue;
                }

                let queued = estimates.get(&neighbour).copied();
                let improves = match (queued, costs.get(&neighbour)) {
                    (Some(_), Some(&known)) => next_cost < known,
                    _ => true,
                };
                if !improves {
                    continue;
                }

                if let Some(previous) = queued {
                    let _ = open.remove(&(previous, neighbour));
                }
                let estimate = next_cost + remaining_hops(neighbour, goal);
                let _ = came_from.insert(neighbour, current);
                let _ = costs.insert(neighbour, next_cost);
                let _ = estimates.insert(neighbour, estimate);
                let _ = open.insert((estimate, neighbour));
            }
        }

        None
    }

    /// Cell a unit at `start` should move to this turn to approach `goal`.
    ///
    /// Returns `None` when no route exists or `start` already is the goal.
    #[must_use]
    pub fn first_move(&self, start: GridPoint, goal: GridPoint, step_distance: u32) -> Option<GridPoint> {
        self.route_to(start, goal, step_distance)
            .and_then(|route| route.get(1).copied())
    }

    fn hops_from(&self, node: GridPoint, step_distance: u32) -> Vec<GridPoint> {
        node.points_within(f64::from(step_distance))
            .into_iter()
            .filter(|candidate| self.is_open_path(node, *candidate))
            .collect()
    }
}

fn remaining_hops(from: GridPoint, goal: GridPoint) -> u32 {
    (from.distance(goal) / FASTEST_STEP).ceil() as u32
}

fn reconstruct(came_from: &HashMap<GridPoint, GridPoint>, goal: GridPoint) -> Vec<GridPoint> {
    let mut route = vec![goal];
    let mut node = goal;
    while let Some(&previous) = came_from.get(&node) {
        route.push(previous);
        node = previous;
    }
    route.reverse();
    route
}
