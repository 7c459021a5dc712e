//! Paintball flight model and aim search.

use paintball_core::{GridPoint, MAX_LAUNCH_DISTANCE};
use paintball_world::query;

use crate::{straight_route, RouteResolver};

/// Height of a paintball over the first half of its flight.
const APEX_HEIGHT: f64 = 9.0;

/// Scale of the linear descent over the second half of the flight.
const DESCENT_SCALE: f64 = 18.0;

impl RouteResolver<'_> {
    /// First cell a paintball launched from `start` toward `aim` strikes.
    ///
    /// The ball flies at constant height over the first half of the route and
    /// then descends linearly. It strikes the first cell whose occupant or
    /// terrain is at least as tall as the ball. Leaving the field, or reaching
    /// the ground first, yields `None`.
    #[must_use]
    pub fn hit_point(&self, start: GridPoint, aim: GridPoint) -> Option<GridPoint> {
        let route = straight_route(start, aim);
        let length = route.len() as f64;

        for (index, point) in route.into_iter().enumerate().skip(1) {
            if !point.exists() {
                return None;
            }

            let travelled = index as f64;
            let ball_height = if travelled <= 0.5 * length {
                APEX_HEIGHT
            } else {
                DESCENT_SCALE * (1.0 - travelled / length)
            };
            if ball_height <= 0.0 {
                return None;
            }

            if ball_height <= f64::from(query::height(self.world, point)) {
                return Some(point);
            }
        }

        None
    }

    /// Aim point that makes a launch from `start` strike `target`, if any.
    ///
    /// Launch powers are tried from the maximum range down to the distance to
    /// the target; the first power whose aim point stays in range and whose
    /// flight ends on `target` wins.
    #[must_use]
    pub fn shoot_at(&self, start: GridPoint, target: GridPoint) -> Option<GridPoint> {
        if start == target {
            return None;
        }

        let minimum_power = start.distance(target).ceil() as i32;
        (minimum_power..=MAX_LAUNCH_DISTANCE)
            .rev()
            .map(|power| aim_point(start, target, power))
            .filter(|aim| start.distance(*aim) <= f64::from(MAX_LAUNCH_DISTANCE))
            .find(|aim| self.hit_point(start, *aim) == Some(target))
    }
}

/// Point `power` cells from `start` along the line through `target`.
fn aim_point(start: GridPoint, target: GridPoint, power: i32) -> GridPoint {
    let dx = target.x() - start.x();
    let dy = target.y() - start.y();
    if dx == 0 {
        return start.offset(0, power * dy.signum());
    }

    let slope = f64::from(dy) / f64::from(dx);
    let run = f64::from(power) / (slope * slope + 1.0).sqrt() * f64::from(dx.signum());
    let aim_dx = run.round() as i32;
    let aim_dy = (slope * f64::from(aim_dx)).round() as i32;
    start.offset(aim_dx, aim_dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paintball_core::{CellState, Command, FieldGrid, UnitId, UnitObservation};
    use paintball_world::{apply, World};

    fn world_with(cells: &[(GridPoint, CellState)]) -> World {
        let mut world = World::new();
        let mut grid = FieldGrid::filled(CellState::Empty);
        for &(point, state) in cells {
            grid.set(point, state);
        }
        let mut events = Vec::new();
        apply(&mut world, Command::ObserveField { cells: grid }, &mut events);
        world
    }

    #[test]
    fn aim_points_follow_the_line_to_the_target() {
        let start = GridPoint::new(0, 0);
        assert_eq!(aim_point(start, GridPoint::new(3, 0), 24), GridPoint::new(24, 0));
        assert_eq!(aim_point(start, GridPoint::new(0, 5), 24), GridPoint::new(0, 24));
        assert_eq!(
            aim_point(GridPoint::new(20, 20), GridPoint::new(20, 10), 12),
            GridPoint::new(20, 8)
        );
        assert_eq!(aim_point(start, GridPoint::new(4, 4), 10), GridPoint::new(7, 7));
    }

    #[test]
    fn a_ball_over_open_ground_lands_nowhere() {
        let world = world_with(&[]);
        let resolver = RouteResolver::new(&world);
        assert_eq!(resolver.hit_point(GridPoint::new(0, 0), GridPoint::new(20, 0)), None);
    }

    #[test]
    fn a_high_wall_stops_the_ball_on_the_descent() {
        let wall = GridPoint::new(15, 0);
        let world = world_with(&[(wall, CellState::HighWall)]);
        let resolver = RouteResolver::new(&world);

        // Route length 21; at index 15 the ball is 18 * (1 - 15/21) ~ 5.1 tall.
        assert_eq!(resolver.hit_point(GridPoint::new(0, 0), GridPoint::new(20, 0)), Some(wall));
    }

    #[test]
    fn trees_catch_the_ball_at_apex_height() {
        let tree = GridPoint::new(2, 0);
        let world = world_with(&[(tree, CellState::Tree)]);
        let resolver = RouteResolver::new(&world);
        assert_eq!(resolver.hit_point(GridPoint::new(0, 0), GridPoint::new(20, 0)), Some(tree));
    }

    #[test]
    fn leaving_the_field_loses_the_ball() {
        let world = world_with(&[]);
        let resolver = RouteResolver::new(&world);
        assert_eq!(resolver.hit_point(GridPoint::new(28, 0), GridPoint::new(40, 0)), None);
    }

    #[test]
    fn a_standing_unit_in_the_open_can_be_shot() {
        let mut world = world_with(&[]);
        let target = GridPoint::new(20, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ObserveUnit {
                unit: UnitId::new(4),
                observation: UnitObservation {
                    position: target,
                    ..UnitObservation::unseen()
                },
            },
            &mut events,
        );
        let resolver = RouteResolver::new(&world);

        let aim = resolver.shoot_at(GridPoint::new(0, 0), target);

        assert_eq!(aim, Some(GridPoint::new(24, 0)));
    }

    #[test]
    fn shooting_oneself_has_no_solution() {
        let world = world_with(&[]);
        let resolver = RouteResolver::new(&world);
        let point = GridPoint::new(3, 3);
        assert_eq!(resolver.shoot_at(point, point), None);
    }

    #[test]
    fn targets_beyond_range_have_no_solution() {
        let world = world_with(&[]);
        let resolver = RouteResolver::new(&world);
        assert_eq!(resolver.shoot_at(GridPoint::new(0, 0), GridPoint::new(30, 30)), None);
    }
}
