//! Behavioural specialisations expressed as scoring multipliers.

use std::fmt;

use paintball_core::{UnitId, TEAM_SIZE};

/// Specialisation assigned to a controlled unit for the whole game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Hunts enemies and collects weapons.
    Aggressive,
    /// Hangs back, stockpiles ammo and plants objective markers.
    Support,
}

impl Role {
    /// Role played by the provided roster slot: the first unit of a team supports.
    #[must_use]
    pub const fn for_unit(unit: UnitId) -> Self {
        if unit.index() % TEAM_SIZE == 0 {
            Self::Support
        } else {
            Self::Aggressive
        }
    }

    /// Built-in multipliers for the role.
    #[must_use]
    pub const fn default_coefficients(self) -> RoleCoefficients {
        match self {
            Self::Aggressive => RoleCoefficients {
                shoot: 3.0,
                shield: 2.0,
                ammo: 1.0,
                exploration: 0.02,
                enemy_approach: 2.0,
                plant: 0.5,
                adapter: 4.0,
            },
            Self::Support => RoleCoefficients {
                shoot: 0.5,
                shield: 4.0,
                ammo: 2.0,
                exploration: 0.05,
                enemy_approach: 0.5,
                plant: 4.0,
                adapter: 2.0,
            },
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggressive => f.write_str("aggressive"),
            Self::Support => f.write_str("support"),
        }
    }
}

/// Multipliers applied to each base objective score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoleCoefficients {
    /// Weight of shooting at a visible enemy.
    pub shoot: f64,
    /// Weight of fetching a shield.
    pub shield: f64,
    /// Weight of collecting ammo piles.
    pub ammo: f64,
    /// Weight of scouting unknown cells.
    pub exploration: f64,
    /// Weight of closing in on an enemy.
    pub enemy_approach: f64,
    /// Weight of planting an objective marker.
    pub plant: f64,
    /// Weight of fetching a rapid-fire adapter.
    pub adapter: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_unit_of_each_team_supports() {
        assert_eq!(Role::for_unit(UnitId::new(0)), Role::Support);
        assert_eq!(Role::for_unit(UnitId::new(1)), Role::Aggressive);
        assert_eq!(Role::for_unit(UnitId::new(3)), Role::Aggressive);
        assert_eq!(Role::for_unit(UnitId::new(4)), Role::Support);
    }

    #[test]
    fn support_out_values_aggressive_on_markers_and_shields() {
        let aggressive = Role::Aggressive.default_coefficients();
        let support = Role::Support.default_coefficients();
        assert!(support.plant > aggressive.plant);
        assert!(support.shield > aggressive.shield);
        assert!(support.shoot < aggressive.shoot);
        assert!(support.exploration > aggressive.exploration);
    }
}
