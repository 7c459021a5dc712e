//! Candidate objectives and their base scores.

use std::fmt;

use paintball_core::{
    Action, CellState, GridPoint, Team, MARKER_PLANT_HORIZON, MARKER_SITES, PLANT_AMMO_COST,
};
use paintball_system_routing::RouteResolver;
use paintball_world::{query, Unit, World};

use crate::role::RoleCoefficients;

/// Ammo level at which equipment and marker scores saturate.
const FULL_LOAD: f64 = PLANT_AMMO_COST as f64;

/// Scale applied to the shoot score before the role multiplier.
const SHOOT_SCALE: f64 = 3.0;

/// What an objective tries to achieve; carried for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObjectiveKind {
    AmmoPile,
    Shield,
    Adapter,
    Shoot,
    Approach,
    Explore,
    Plant,
    Hold,
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AmmoPile => "ammo-pile",
            Self::Shield => "shield",
            Self::Adapter => "adapter",
            Self::Shoot => "shoot",
            Self::Approach => "approach",
            Self::Explore => "explore",
            Self::Plant => "plant",
            Self::Hold => "hold",
        };
        f.write_str(label)
    }
}

/// A stand point paired with the action to perform once the unit is there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Objective {
    pub(crate) kind: ObjectiveKind,
    pub(crate) stand: GridPoint,
    pub(crate) action: Action,
    pub(crate) score: f64,
}

impl Objective {
    /// Stay put and do nothing; the last resort when nothing else can be committed.
    pub(crate) fn hold(position: GridPoint) -> Self {
        Self {
            kind: ObjectiveKind::Hold,
            stand: position,
            action: Action::Idle,
            score: 0.0,
        }
    }

    /// Reports whether the objective survives ranking for a unit carrying `ammo`.
    pub(crate) fn is_viable(&self, ammo: u32) -> bool {
        self.score > 0.0 && self.action.ammo_cost() <= ammo
    }
}

/// Enumerates and scores the objectives available to one unit this turn.
pub(crate) struct Planner<'w> {
    world: &'w World,
    resolver: RouteResolver<'w>,
    unit: &'w Unit,
    coefficients: RoleCoefficients,
}

impl<'w> Planner<'w> {
    pub(crate) fn new(world: &'w World, unit: &'w Unit, coefficients: RoleCoefficients) -> Self {
        Self {
            world,
            resolver: RouteResolver::new(world),
            unit,
            coefficients,
        }
    }

    /// Every scored candidate in tie-break order.
    pub(crate) fn candidates(&self, exploration: Option<GridPoint>) -> Vec<Objective> {
        let mut candidates = Vec::new();
        self.ammo_piles(&mut candidates);
        candidates.extend(self.shield());
        candidates.extend(self.adapter());
        candidates.extend(self.shoot());
        candidates.extend(self.approach());
        candidates.extend(exploration.map(|target| self.explore(target)));
        candidates.extend(self.plant());
        candidates
    }

    /// Inverse of the number of hops needed to reach `target`; infinite once there.
    fn move_quality(&self, target: GridPoint) -> f64 {
        let step = f64::from(self.unit.step_distance());
        let hops = (self.unit.position().distance(target) / step).ceil();
        1.0 / hops
    }

    fn ammo(&self) -> f64 {
        f64::from(self.unit.ammo())
    }

    fn ammo_piles(&self, out: &mut Vec<Objective>) {
        let position = self.unit.position();
        let carried = f64::from(self.unit.ammo().max(1));

        for (item, state) in query::field(self.world).iter() {
            let Some(count) = state.ammo_count() else {
                continue;
            };
            if query::is_unit_picking_up(self.world, item) {
                continue;
            }
            let Some(stand) = self.resolver.closest_point_next_to(position, item) else {
                continue;
            };

            let score = self.move_quality(stand) * f64::from(count) / carried;
            out.push(Objective {
                kind: ObjectiveKind::AmmoPile,
                stand,
                action: Action::PickupItem { item },
                score: score * self.coefficients.ammo,
            });
        }
    }

    fn shield(&self) -> Option<Objective> {
        let (item, stand) = self.nearest_item(CellState::Shield)?;
        let score = if self.unit.observation().loadout.holds_shield() {
            0.0
        } else {
            self.move_quality(stand)
        };

        Some(Objective {
            kind: ObjectiveKind::Shield,
            stand,
            action: Action::PickupItem { item },
            score: score * self.coefficients.shield,
        })
    }

    fn adapter(&self) -> Option<Objective> {
        let (item, stand) = self.nearest_item(CellState::Adapter)?;
        let score = if self.unit.observation().loadout.holds_rapid_fire() {
            0.0
        } else {
            self.move_quality(stand) * (self.ammo() + 1.0) / FULL_LOAD
        };

        Some(Objective {
            kind: ObjectiveKind::Adapter,
            stand,
            action: Action::PickupItem { item },
            score: score * self.coefficients.adapter,
        })
    }

    /// Nearest unclaimed item of the provided kind and the point to pick it up from.
    fn nearest_item(&self, kind: CellState) -> Option<(GridPoint, GridPoint)> {
        let position = self.unit.position();
        let item = query::field(self.world)
            .iter()
            .filter(|&(point, state)| state == kind && !query::is_unit_picking_up(self.world, point))
            .map(|(point, _)| point)
            .fold(None, |nearest: Option<GridPoint>, point| match nearest {
                Some(best) if position.distance(best) <= position.distance(point) => Some(best),
                _ => Some(point),
            })?;
        let stand = self.resolver.closest_point_next_to(position, item)?;
        Some((item, stand))
    }

    fn shoot(&self) -> Option<Objective> {
        let position = self.unit.position();
        let (enemy, aim) = query::enemies(self.world, self.unit.team())
            .filter(|enemy| enemy.is_on_field() && !enemy.is_defending())
            .filter_map(|enemy| {
                self.resolver
                    .shoot_at(position, enemy.position())
                    .map(|aim| (enemy.position(), aim))
            })
            .fold(None, |nearest: Option<(GridPoint, GridPoint)>, candidate| {
                match nearest {
                    Some(best) if position.distance(best.0) <= position.distance(candidate.0) => {
                        Some(best)
                    }
                    _ => Some(candidate),
                }
            })?;

        let action = Action::launch(aim, self.unit.observation().loadout.holds_rapid_fire());
        let cost = f64::from(action.ammo_cost());
        let score = SHOOT_SCALE * self.ammo() / (cost * position.distance(enemy));
        Some(Objective {
            kind: ObjectiveKind::Shoot,
            stand: position,
            action,
            score: score * self.coefficients.shoot,
        })
    }

    fn approach(&self) -> Option<Objective> {
        let position = self.unit.position();
        let enemy = query::enemies(self.world, self.unit.team())
            .filter(|enemy| enemy.is_on_field() && enemy.is_standing() && !enemy.is_defending())
            .map(Unit::position)
            .fold(None, |nearest: Option<GridPoint>, point| match nearest {
                Some(best) if position.distance(best) <= position.distance(point) => Some(best),
                _ => Some(point),
            })?;
        let stand = self.resolver.closest_point_next_to(position, enemy)?;

        let score = self.move_quality(enemy) * self.ammo() / FULL_LOAD;
        Some(Objective {
            kind: ObjectiveKind::Approach,
            stand,
            action: Action::launch(enemy, self.unit.observation().loadout.holds_rapid_fire()),
            score: score * self.coefficients.enemy_approach,
        })
    }

    fn explore(&self, target: GridPoint) -> Objective {
        Objective {
            kind: ObjectiveKind::Explore,
            stand: target,
            action: Action::Idle,
            score: self.move_quality(target) * self.coefficients.exploration,
        }
    }

    /// Nearest marker site the team does not hold yet.
    ///
    /// An occupied site is claimed by planting on the closest free cell next to
    /// it, which [`query::holds_marker_near`] then counts as holding the site.
    fn plant(&self) -> Option<Objective> {
        let position = self.unit.position();
        let site = MARKER_SITES
            .into_iter()
            .filter(|&site| !query::holds_marker_near(self.world, Team::CONTROLLED, site))
            .fold(None, |nearest: Option<GridPoint>, site| match nearest {
                Some(best) if position.distance(best) <= position.distance(site) => Some(best),
                _ => Some(site),
            })?;

        let next_to_site = self.resolver.closest_point_next_to(position, site)?;
        let (stand, target) = if query::is_empty_at(self.world, site) {
            (next_to_site, site)
        } else {
            let stand = self.resolver.closest_point_next_to(position, next_to_site)?;
            (stand, next_to_site)
        };

        let remaining = f64::from(MARKER_PLANT_HORIZON - query::turn(self.world));
        let score = self.move_quality(stand) * self.ammo() / FULL_LOAD * remaining / 100.0;
        Some(Objective {
            kind: ObjectiveKind::Plant,
            stand,
            action: Action::PlantMarker { site: target },
            score: score * self.coefficients.plant,
        })
    }
}

/// Picks or keeps the cell the unit wanders toward when nothing better is on offer.
///
/// A cached target survives while its cell is still unknown. Fresh targets are
/// drawn from unknown cells out of enemy sight, then any unknown cell, then any
/// empty cell.
pub(crate) fn exploration_target<R: rand::Rng>(
    world: &World,
    cached: Option<GridPoint>,
    rng: &mut R,
) -> Option<GridPoint> {
    use rand::seq::SliceRandom;

    if let Some(target) = cached {
        if query::cell(world, target) == CellState::Unknown {
            return Some(target);
        }
    }

    let unknown: Vec<GridPoint> = query::field(world)
        .iter()
        .filter(|&(_, state)| state == CellState::Unknown)
        .map(|(point, _)| point)
        .collect();
    let hidden: Vec<GridPoint> = unknown
        .iter()
        .copied()
        .filter(|&point| !query::can_enemy_see(world, point))
        .collect();

    if let Some(&target) = hidden.choose(rng) {
        return Some(target);
    }
    if let Some(&target) = unknown.choose(rng) {
        return Some(target);
    }

    let empty: Vec<GridPoint> = query::field(world)
        .iter()
        .map(|(point, _)| point)
        .filter(|&point| query::is_empty_at(world, point))
        .collect();
    empty.choose(rng).copied()
}
