#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Route resolver that answers adjacency, line, ballistic and path queries.
//!
//! Every query reads the world through an explicit [`RouteResolver`] borrow so
//! results always reflect the emptiness and reservation state visible at the
//! moment the question is asked.

mod ballistics;
mod search;

use paintball_core::GridPoint;
use paintball_world::{query, World};

/// Radius that covers a cell's eight neighbours.
const ADJACENT_RADIUS: f64 = 1.5;

/// Read-only resolver bound to the world state of the current decision.
#[derive(Clone, Copy, Debug)]
pub struct RouteResolver<'w> {
    world: &'w World,
}

impl<'w> RouteResolver<'w> {
    /// Creates a resolver that reads the provided world.
    #[must_use]
    pub const fn new(world: &'w World) -> Self {
        Self { world }
    }

    /// Nearest point next to `target` that `origin` could stand on.
    ///
    /// Candidates are the on-field cells within 1.5 of `target`; a candidate
    /// qualifies when it is `origin` itself or currently empty. Ties keep the
    /// first candidate in scan order.
    #[must_use]
    pub fn closest_point_next_to(&self, origin: GridPoint, target: GridPoint) -> Option<GridPoint> {
        let mut closest = None;
        let mut shortest = f64::MAX;

        for candidate in target.points_within(ADJACENT_RADIUS) {
            let qualifies = candidate == origin || query::is_empty_at(self.world, candidate);
            let distance = origin.distance(candidate);
            if qualifies && distance < shortest {
                shortest = distance;
                closest = Some(candidate);
            }
        }

        closest
    }

    /// Reports whether every cell after `from` on the straight line to `to` is empty.
    #[must_use]
    pub fn is_open_path(&self, from: GridPoint, to: GridPoint) -> bool {
        straight_route(from, to)
            .into_iter()
            .skip(1)
            .all(|point| query::is_empty_at(self.world, point))
    }
}

/// Rasterises the segment from `from` to `to` into `max(|dx|, |dy|) + 1` cells.
///
/// Each step interpolates proportionally and rounds half away from zero, so the
/// first cell is always `from` and the last is always `to`.
#[must_use]
pub fn straight_route(from: GridPoint, to: GridPoint) -> Vec<GridPoint> {
    let dx = to.x() - from.x();
    let dy = to.y() - from.y();
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return vec![from];
    }

    let denominator = f64::from(steps);
    (0..=steps)
        .map(|t| {
            let x = round_away_from_zero(f64::from(t * dx) / denominator);
            let y = round_away_from_zero(f64::from(t * dy) / denominator);
            from.offset(x, y)
        })
        .collect()
}

fn round_away_from_zero(value: f64) -> i32 {
    value.round() as i32
}
