use paintball_core::{
    Action, CellState, Command, FieldGrid, GridPoint, Loadout, UnitId, UnitObservation,
    FIELD_DIMENSION,
};
use paintball_system_agent::{Squad, SquadConfig};
use paintball_world::{self as world, World};

const TURNS: usize = 6;

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(11);
    let second = replay(11);

    assert_eq!(first.len(), TURNS);
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn every_turn_yields_one_action_per_controlled_unit() {
    for actions in replay(3) {
        assert_eq!(actions.len(), 4);
    }
}

fn replay(seed: u64) -> Vec<Vec<Action>> {
    let mut world = World::new();
    let mut squad = Squad::new(&SquadConfig {
        seed,
        ..SquadConfig::default()
    });
    let mut positions = [
        GridPoint::new(2, 2),
        GridPoint::new(3, 2),
        GridPoint::new(2, 3),
        GridPoint::new(4, 4),
    ];
    let mut log = Vec::new();

    for turn in 0..TURNS {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ObserveField {
                cells: field_snapshot(turn),
            },
            &mut events,
        );
        for (index, position) in positions.iter().enumerate() {
            world::apply(
                &mut world,
                Command::ObserveUnit {
                    unit: UnitId::new(index as u8),
                    observation: UnitObservation {
                        position: *position,
                        standing: true,
                        defending: false,
                        loadout: Loadout::BasicLauncher,
                        ammo: 4,
                    },
                },
                &mut events,
            );
        }
        world::apply(
            &mut world,
            Command::ObserveUnit {
                unit: UnitId::new(5),
                observation: UnitObservation {
                    position: GridPoint::new(26, 24 - turn as i32),
                    ..UnitObservation::unseen()
                },
            },
            &mut events,
        );

        let mut actions = Vec::new();
        squad.handle(&mut world, &mut actions);
        for (position, action) in positions.iter_mut().zip(&actions) {
            if let Action::Move { target } = action {
                *position = *target;
            }
        }
        log.push(actions);
    }

    log
}

/// Lower-left quadrant visible with a few obstacles; the rest of the field is unknown.
fn field_snapshot(turn: usize) -> FieldGrid {
    let mut grid = FieldGrid::unknown();
    let visible = 12 + turn as i32;
    for x in 0..visible.min(FIELD_DIMENSION) {
        for y in 0..visible.min(FIELD_DIMENSION) {
            grid.set(GridPoint::new(x, y), CellState::Empty);
        }
    }
    grid.set(GridPoint::new(6, 6), CellState::AmmoPile(6));
    grid.set(GridPoint::new(8, 3), CellState::Shield);
    grid.set(GridPoint::new(5, 7), CellState::LowWall);
    grid.set(GridPoint::new(9, 9), CellState::Tree);
    grid
}
