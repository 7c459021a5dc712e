#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Utility-driven decision engine for the controlled paintball squad.
//!
//! Each [`UnitAgent`] enumerates candidate objectives, scores them with its
//! role's coefficients, applies posture overrides and converts the winner into
//! a single action. The [`Squad`] runs every controlled agent in roster order,
//! committing each decision to the world before the next unit looks at it.

mod objective;
mod posture;
mod role;
mod squad;

use paintball_core::{Action, GridPoint, UnitId};
use paintball_system_routing::{straight_route, RouteResolver};
use paintball_world::{query, Unit, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::objective::{exploration_target, Objective, Planner};

pub use role::{Role, RoleCoefficients};
pub use squad::{Squad, SquadConfig};

/// Reasons a unit could not reach a decision this turn.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecisionError {
    /// The world holds no unit for the agent's roster slot.
    #[error("{0} is not on the roster")]
    UnknownUnit(UnitId),
    /// The unit was not observed on the field this turn.
    #[error("{0} is not on the field")]
    OffField(UnitId),
}

/// Action chosen for a unit together with the cells its move will traverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Action to send to the engine.
    pub action: Action,
    /// Cells teammates must treat as occupied for the rest of the turn.
    pub reserved: Vec<GridPoint>,
}

impl Decision {
    fn in_place(action: Action) -> Self {
        Self {
            action,
            reserved: Vec::new(),
        }
    }
}

/// Decision maker for one controlled unit.
#[derive(Debug)]
pub struct UnitAgent {
    unit: UnitId,
    role: Role,
    coefficients: RoleCoefficients,
    exploration: Option<GridPoint>,
    rng: ChaCha8Rng,
}

impl UnitAgent {
    /// Creates an agent for `unit` with the provided role multipliers.
    ///
    /// `seed` drives exploration target selection.
    #[must_use]
    pub fn new(unit: UnitId, role: Role, coefficients: RoleCoefficients, seed: u64) -> Self {
        Self {
            unit,
            role,
            coefficients,
            exploration: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Roster slot controlled by the agent.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        self.unit
    }

    /// Role the agent plays.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Cell the agent is currently exploring toward, if any.
    #[must_use]
    pub const fn exploration_target(&self) -> Option<GridPoint> {
        self.exploration
    }

    /// Chooses this turn's action from the current world state.
    ///
    /// Objectives are ranked by descending score; the first one that can be
    /// committed wins. When none can, the unit holds its position.
    pub fn decide(&mut self, world: &World) -> Result<Decision, DecisionError> {
        let unit = query::unit(world, self.unit).ok_or(DecisionError::UnknownUnit(self.unit))?;
        if !unit.is_on_field() {
            return Err(DecisionError::OffField(self.unit));
        }

        self.exploration = exploration_target(world, self.exploration, &mut self.rng);
        let planner = Planner::new(world, unit, self.coefficients);
        let mut ranked: Vec<Objective> = planner
            .candidates(self.exploration)
            .into_iter()
            .filter(|objective| objective.is_viable(unit.ammo()))
            .collect();
        ranked.sort_by(|left, right| right.score.total_cmp(&left.score));

        let resolver = RouteResolver::new(world);
        for objective in ranked {
            let adjusted = posture::adjust(world, unit, objective);
            if let Some(decision) = commit(&resolver, unit, &adjusted) {
                tracing::debug!(
                    unit = %self.unit,
                    role = %self.role,
                    objective = %objective.kind,
                    score = objective.score,
                    action = %decision.action,
                    "committed objective"
                );
                return Ok(decision);
            }
            tracing::trace!(
                unit = %self.unit,
                objective = %objective.kind,
                stand = %objective.stand,
                "objective unreachable"
            );
        }

        let hold = posture::adjust(world, unit, Objective::hold(unit.position()));
        tracing::debug!(unit = %self.unit, action = %hold.action, "holding position");
        Ok(Decision::in_place(hold.action))
    }
}

/// Turns an objective into this turn's action: act in place or take the first hop toward it.
fn commit(resolver: &RouteResolver<'_>, unit: &Unit, objective: &Objective) -> Option<Decision> {
    let position = unit.position();
    if objective.stand == position {
        return Some(Decision::in_place(objective.action));
    }

    let next = resolver.first_move(position, objective.stand, unit.step_distance())?;
    Some(Decision {
        action: Action::Move { target: next },
        reserved: straight_route(position, next),
    })
}
