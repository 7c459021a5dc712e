#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world model for the paintball squad engine.
//!
//! The world owns the reconciled field memory, the per-turn state of every unit
//! on the roster, and the turn counter. It is mutated exclusively through
//! [`apply`] and read through the [`query`] module.

mod memory;

use paintball_core::{Action, Command, Event, GridPoint, Team, UnitId, UnitObservation};

use crate::memory::FieldMemory;

const STANDING_UNIT_HEIGHT: u32 = 9;
const CROUCHING_UNIT_HEIGHT: u32 = 3;

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    memory: FieldMemory,
    units: Vec<Unit>,
    turn: i32,
}

impl World {
    /// Creates a world where nothing has been observed yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: FieldMemory::new(),
            units: UnitId::roster().map(Unit::unseen).collect(),
            turn: -1,
        }
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.index())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one unit on the roster for the current turn.
#[derive(Clone, Debug)]
pub struct Unit {
    id: UnitId,
    observation: UnitObservation,
    reserved: Vec<GridPoint>,
    action: Option<Action>,
}

impl Unit {
    fn unseen(id: UnitId) -> Self {
        Self {
            id,
            observation: UnitObservation::unseen(),
            reserved: Vec::new(),
            action: None,
        }
    }

    fn observe(&mut self, observation: UnitObservation) {
        self.observation = observation;
        self.reserved.clear();
        self.action = None;
    }

    /// Roster slot of the unit.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Team the unit plays for.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.id.team()
    }

    /// Last observed position, or [`GridPoint::OFF_FIELD`].
    #[must_use]
    pub const fn position(&self) -> GridPoint {
        self.observation.position
    }

    /// Reports whether the unit was seen on the field this turn.
    #[must_use]
    pub fn is_on_field(&self) -> bool {
        self.observation.position.exists()
    }

    /// Reports whether the unit is standing.
    #[must_use]
    pub const fn is_standing(&self) -> bool {
        self.observation.standing
    }

    /// Reports whether the unit is defending.
    #[must_use]
    pub const fn is_defending(&self) -> bool {
        self.observation.defending
    }

    /// Full observed record for the unit.
    #[must_use]
    pub const fn observation(&self) -> &UnitObservation {
        &self.observation
    }

    /// Paintballs carried by the unit.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.observation.ammo
    }

    /// Maximum reach of a single move given the unit's posture.
    #[must_use]
    pub const fn step_distance(&self) -> u32 {
        match (self.observation.standing, self.observation.defending) {
            (true, false) => 3,
            (true, true) => 2,
            (false, _) => 1,
        }
    }

    /// Cells reserved by the unit's committed move this turn.
    #[must_use]
    pub fn reserved(&self) -> &[GridPoint] {
        &self.reserved
    }

    /// Action committed by the unit this turn, if it already decided.
    #[must_use]
    pub const fn current_action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// Reports whether the unit stands on or has reserved the provided cell.
    #[must_use]
    pub fn occupies(&self, point: GridPoint) -> bool {
        self.observation.position == point || self.reserved.contains(&point)
    }

    fn height(&self) -> u32 {
        if self.observation.standing {
            STANDING_UNIT_HEIGHT
        } else {
            CROUCHING_UNIT_HEIGHT
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ObserveUnit { unit, observation } => {
            if let Some(target) = world.unit_mut(unit) {
                target.observe(observation);
                out_events.push(Event::UnitObserved {
                    unit,
                    position: observation.position,
                });
            }
        }
        Command::ObserveField { cells } => {
            let stats = world.memory.merge(cells);
            world.turn = world.turn.saturating_add(1);
            tracing::trace!(
                turn = world.turn,
                restored = stats.restored,
                reflected = stats.reflected,
                confirmed_empty = stats.confirmed_empty,
                "merged field observation"
            );
            out_events.push(Event::TurnAdvanced { turn: world.turn });
        }
        Command::CommitAction {
            unit,
            action,
            reserved,
        } => {
            if let Some(target) = world.unit_mut(unit) {
                target.action = Some(action);
                target.reserved = reserved;
                out_events.push(Event::ActionCommitted { unit, action });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use paintball_core::{
        Action, CellState, FieldGrid, GridPoint, Team, UnitId, ENEMY_SIGHT_RADIUS,
    };

    use super::{Unit, World};

    /// Best-known field after the latest merge.
    #[must_use]
    pub fn field(world: &World) -> &FieldGrid {
        world.memory.cells()
    }

    /// Best-known state of the provided cell; off-field points read as unknown.
    #[must_use]
    pub fn cell(world: &World, point: GridPoint) -> CellState {
        world.memory.cells().cell(point)
    }

    /// Number of merged observations minus one; `-1` before the first turn.
    #[must_use]
    pub fn turn(world: &World) -> i32 {
        world.turn
    }

    /// Looks up a unit by roster slot.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<&Unit> {
        world.units.get(id.index())
    }

    /// Every unit on the roster in engine order.
    #[must_use]
    pub fn units(world: &World) -> &[Unit] {
        &world.units
    }

    /// Units playing against the provided team.
    pub fn enemies(world: &World, team: Team) -> impl Iterator<Item = &Unit> {
        world
            .units
            .iter()
            .filter(move |unit| unit.team() == team.opponent())
    }

    /// Height of whatever occupies the cell; units take priority over terrain.
    #[must_use]
    pub fn height(world: &World, point: GridPoint) -> u32 {
        if let Some(unit) = world.units.iter().find(|unit| unit.occupies(point)) {
            return unit.height();
        }
        cell(world, point).terrain_height()
    }

    /// Reports whether a unit could enter the cell this turn.
    ///
    /// The cell must exist, hold passable terrain, and be neither occupied nor
    /// reserved by any unit.
    #[must_use]
    pub fn is_empty_at(world: &World, point: GridPoint) -> bool {
        if !point.exists() || !cell(world, point).is_passable() {
            return false;
        }
        !world.units.iter().any(|unit| unit.occupies(point))
    }

    /// Reports whether the opponents of the controlled team are likely to see the cell.
    #[must_use]
    pub fn can_enemy_see(world: &World, point: GridPoint) -> bool {
        let enemy = Team::CONTROLLED.opponent();
        let near_marker = field(world).iter().any(|(candidate, state)| {
            state == enemy.own_marker() && point.distance(candidate) < ENEMY_SIGHT_RADIUS
        });
        if near_marker {
            return true;
        }

        enemies(world, Team::CONTROLLED)
            .filter(|unit| !unit.position().is_off_field())
            .any(|unit| point.distance(unit.position()) < ENEMY_SIGHT_RADIUS)
    }

    /// Reports whether some unit already committed to picking up the item on the cell.
    #[must_use]
    pub fn is_unit_picking_up(world: &World, item: GridPoint) -> bool {
        let pickup = Action::PickupItem { item };
        world
            .units
            .iter()
            .any(|unit| unit.current_action() == Some(&pickup))
    }

    /// Reports whether the team's marker already stands on or next to the site.
    #[must_use]
    pub fn holds_marker_near(world: &World, team: Team, site: GridPoint) -> bool {
        let marker = team.own_marker();
        cell(world, site) == marker
            || site
                .points_within(1.5)
                .into_iter()
                .any(|point| cell(world, point) == marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paintball_core::{CellState, FieldGrid, Loadout};

    fn observe(world: &mut World, unit: u8, position: GridPoint, standing: bool) {
        let mut events = Vec::new();
        apply(
            world,
            Command::ObserveUnit {
                unit: UnitId::new(unit),
                observation: UnitObservation {
                    position,
                    standing,
                    defending: false,
                    loadout: Loadout::Nothing,
                    ammo: 0,
                },
            },
            &mut events,
        );
    }

    fn observe_field(world: &mut World, cells: &[(GridPoint, CellState)]) -> Vec<Event> {
        let mut grid = FieldGrid::filled(CellState::Empty);
        for &(point, state) in cells {
            grid.set(point, state);
        }
        let mut events = Vec::new();
        apply(world, Command::ObserveField { cells: grid }, &mut events);
        events
    }

    #[test]
    fn new_world_has_not_started() {
        let world = World::new();
        assert_eq!(query::turn(&world), -1);
        assert_eq!(query::units(&world).len(), paintball_core::UNIT_COUNT);
        assert!(query::units(&world).iter().all(|unit| !unit.is_on_field()));
    }

    #[test]
    fn observing_the_field_advances_the_turn() {
        let mut world = World::new();
        let events = observe_field(&mut world, &[]);
        assert_eq!(events, vec![Event::TurnAdvanced { turn: 0 }]);
        let events = observe_field(&mut world, &[]);
        assert_eq!(events, vec![Event::TurnAdvanced { turn: 1 }]);
    }

    #[test]
    fn heights_prefer_units_over_terrain() {
        let mut world = World::new();
        let wall = GridPoint::new(4, 4);
        let _ = observe_field(
            &mut world,
            &[(wall, CellState::LowWall), (GridPoint::new(6, 6), CellState::Tree)],
        );
        assert_eq!(query::height(&world, wall), 3);
        assert_eq!(query::height(&world, GridPoint::new(6, 6)), 20);
        assert_eq!(query::height(&world, GridPoint::new(1, 1)), 0);

        observe(&mut world, 1, GridPoint::new(1, 1), true);
        observe(&mut world, 5, GridPoint::new(2, 1), false);
        assert_eq!(query::height(&world, GridPoint::new(1, 1)), 9);
        assert_eq!(query::height(&world, GridPoint::new(2, 1)), 3);
    }

    #[test]
    fn emptiness_excludes_units_and_reservations() {
        let mut world = World::new();
        let _ = observe_field(&mut world, &[(GridPoint::new(3, 3), CellState::Shield)]);
        observe(&mut world, 0, GridPoint::new(0, 0), true);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CommitAction {
                unit: UnitId::new(0),
                action: Action::Move {
                    target: GridPoint::new(2, 0),
                },
                reserved: vec![GridPoint::new(0, 0), GridPoint::new(1, 0), GridPoint::new(2, 0)],
            },
            &mut events,
        );

        assert!(!query::is_empty_at(&world, GridPoint::new(0, 0)));
        assert!(!query::is_empty_at(&world, GridPoint::new(1, 0)));
        assert!(!query::is_empty_at(&world, GridPoint::new(3, 3)));
        assert!(!query::is_empty_at(&world, GridPoint::new(-1, 0)));
        assert!(query::is_empty_at(&world, GridPoint::new(0, 1)));
    }

    #[test]
    fn reobserving_a_unit_clears_its_commitment() {
        let mut world = World::new();
        let item = GridPoint::new(5, 5);
        observe(&mut world, 2, GridPoint::new(4, 4), true);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CommitAction {
                unit: UnitId::new(2),
                action: Action::PickupItem { item },
                reserved: vec![GridPoint::new(4, 4)],
            },
            &mut events,
        );
        assert!(query::is_unit_picking_up(&world, item));

        observe(&mut world, 2, GridPoint::new(4, 4), true);

        assert!(!query::is_unit_picking_up(&world, item));
        let unit = query::unit(&world, UnitId::new(2)).expect("unit exists");
        assert!(unit.reserved().is_empty());
    }

    #[test]
    fn enemy_sight_uses_units_and_enemy_markers() {
        let mut world = World::new();
        let _ = observe_field(
            &mut world,
            &[(GridPoint::new(25, 25), CellState::BlueObjectiveMarker)],
        );
        observe(&mut world, 4, GridPoint::new(10, 10), true);

        assert!(query::can_enemy_see(&world, GridPoint::new(10, 17)));
        assert!(!query::can_enemy_see(&world, GridPoint::new(10, 18)));
        assert!(query::can_enemy_see(&world, GridPoint::new(20, 25)));
        assert!(!query::can_enemy_see(&world, GridPoint::new(0, 0)));
    }

    #[test]
    fn teammates_never_count_as_spotters() {
        let mut world = World::new();
        let _ = observe_field(&mut world, &[]);
        observe(&mut world, 1, GridPoint::new(10, 10), true);

        assert!(!query::can_enemy_see(&world, GridPoint::new(10, 11)));
    }

    #[test]
    fn marker_sites_count_as_held_when_adjacent() {
        let mut world = World::new();
        let site = GridPoint::new(15, 15);
        let _ = observe_field(
            &mut world,
            &[(GridPoint::new(16, 14), CellState::RedObjectiveMarker)],
        );

        assert!(query::holds_marker_near(&world, Team::Red, site));
        assert!(!query::holds_marker_near(&world, Team::Blue, site));
        assert!(!query::holds_marker_near(&world, Team::Red, GridPoint::new(5, 5)));
    }

    #[test]
    fn unknown_units_are_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ObserveUnit {
                unit: UnitId::new(42),
                observation: UnitObservation::unseen(),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
