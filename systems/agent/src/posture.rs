//! Posture overrides layered on top of the winning objective.

use paintball_core::Action;
use paintball_world::{query, Unit, World};

use crate::objective::Objective;

/// Replaces the objective with an in-place posture change when one is due.
///
/// Launching requires a standing, undefended unit. Units in enemy view take
/// cover (shield first, then crouching) unless they are about to plant; out
/// of view they stand back up and lower the shield.
pub(crate) fn adjust(world: &World, unit: &Unit, objective: Objective) -> Objective {
    match override_for(world, unit, &objective) {
        Some(action) => Objective {
            stand: unit.position(),
            action,
            ..objective
        },
        None => objective,
    }
}

fn override_for(world: &World, unit: &Unit, objective: &Objective) -> Option<Action> {
    let standing = unit.is_standing();
    let defending = unit.is_defending();

    if objective.action.is_launch() {
        return if !standing {
            Some(Action::Stand)
        } else if defending {
            Some(Action::Undefend)
        } else {
            None
        };
    }

    if query::can_enemy_see(world, unit.position()) {
        if defending {
            return (!standing).then_some(Action::Stand);
        }

        let planting_here = objective.action.is_plant() && objective.stand == unit.position();
        return if unit.observation().loadout.holds_shield() {
            Some(Action::Defend)
        } else if standing && !objective.action.is_plant() {
            Some(Action::Crouch)
        } else if !standing && planting_here {
            Some(Action::Stand)
        } else {
            None
        };
    }

    if !standing {
        Some(Action::Stand)
    } else if defending {
        Some(Action::Undefend)
    } else {
        None
    }
}
