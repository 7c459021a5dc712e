//! Per-turn cycle that lets every controlled unit decide in roster order.

use std::panic::{self, AssertUnwindSafe};

use paintball_core::{Action, Command, Event, UnitId};
use paintball_world::{self as world, World};

use crate::{Decision, DecisionError, Role, RoleCoefficients, UnitAgent};

/// Settings shared by every agent of the squad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquadConfig {
    /// Base seed for exploration; each unit derives its own stream from it.
    pub seed: u64,
    /// Multipliers for aggressive units.
    pub aggressive: RoleCoefficients,
    /// Multipliers for support units.
    pub support: RoleCoefficients,
}

impl SquadConfig {
    /// Multipliers configured for the provided role.
    #[must_use]
    pub const fn coefficients(&self, role: Role) -> RoleCoefficients {
        match role {
            Role::Aggressive => self.aggressive,
            Role::Support => self.support,
        }
    }
}

impl Default for SquadConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            aggressive: Role::Aggressive.default_coefficients(),
            support: Role::Support.default_coefficients(),
        }
    }
}

/// Agents for every controlled unit, run strictly in roster order.
#[derive(Debug)]
pub struct Squad {
    agents: Vec<UnitAgent>,
    events: Vec<Event>,
}

impl Squad {
    /// Builds one agent per controlled unit.
    #[must_use]
    pub fn new(config: &SquadConfig) -> Self {
        let agents = UnitId::controlled()
            .map(|unit| {
                let role = Role::for_unit(unit);
                let seed = config.seed.wrapping_add(u64::from(unit.get()));
                UnitAgent::new(unit, role, config.coefficients(role), seed)
            })
            .collect();
        Self {
            agents,
            events: Vec::new(),
        }
    }

    /// Agents in roster order.
    #[must_use]
    pub fn agents(&self) -> &[UnitAgent] {
        &self.agents
    }

    /// Decides and commits one action per controlled unit.
    ///
    /// Each decision is applied to the world before the next unit decides so
    /// its reservations and pickup claims are visible to later teammates. A unit
    /// whose decision fails or panics idles. The output buffer is cleared before
    /// the actions are appended in roster order.
    pub fn handle(&mut self, world: &mut World, out: &mut Vec<Action>) {
        out.clear();

        for agent in &mut self.agents {
            let unit = agent.unit();
            let decision = decide_contained(agent, world);

            self.events.clear();
            world::apply(
                world,
                Command::CommitAction {
                    unit,
                    action: decision.action,
                    reserved: decision.reserved,
                },
                &mut self.events,
            );
            out.push(decision.action);
        }
    }
}

fn decide_contained(agent: &mut UnitAgent, world: &World) -> Decision {
    let unit = agent.unit();
    contain(unit, || agent.decide(world))
}

/// Runs one decision, turning errors and panics into an idle turn.
fn contain(unit: UnitId, decide: impl FnOnce() -> Result<Decision, DecisionError>) -> Decision {
    match panic::catch_unwind(AssertUnwindSafe(decide)) {
        Ok(Ok(decision)) => decision,
        Ok(Err(DecisionError::OffField(_))) => {
            tracing::debug!(unit = %unit, "unit off the field; idling");
            Decision::in_place(Action::Idle)
        }
        Ok(Err(error)) => {
            tracing::warn!(unit = %unit, %error, "decision failed; idling");
            Decision::in_place(Action::Idle)
        }
        Err(_) => {
            tracing::warn!(unit = %unit, "decision panicked; idling");
            Decision::in_place(Action::Idle)
        }
    }
}
