use paintball_core::{CellState, Command, FieldGrid, GridPoint, FIELD_DIMENSION};
use paintball_world::{self as world, query, World};
use proptest::prelude::*;

fn cell_state() -> impl Strategy<Value = CellState> {
    prop_oneof![
        Just(CellState::Empty),
        Just(CellState::Tree),
        Just(CellState::LowWall),
        Just(CellState::HighWall),
        Just(CellState::RedObjectiveMarker),
        Just(CellState::BlueObjectiveMarker),
        Just(CellState::Adapter),
        Just(CellState::Shield),
        Just(CellState::BasicLauncher),
        Just(CellState::RapidFireLauncher),
        (1u32..40).prop_map(CellState::AmmoPile),
    ]
}

fn observation() -> impl Strategy<Value = FieldGrid> {
    let point = (0..FIELD_DIMENSION, 0..FIELD_DIMENSION).prop_map(|(x, y)| GridPoint::new(x, y));
    prop::collection::vec((point, cell_state()), 0..120).prop_map(|cells| {
        let mut grid = FieldGrid::unknown();
        for (point, state) in cells {
            grid.set(point, state);
        }
        grid
    })
}

fn merge(world: &mut World, cells: FieldGrid) {
    let mut events = Vec::new();
    world::apply(world, Command::ObserveField { cells }, &mut events);
}

proptest! {
    #[test]
    fn merging_the_same_observation_twice_changes_nothing(cells in observation()) {
        let mut world = World::new();
        merge(&mut world, cells.clone());
        let first = query::field(&world).clone();

        merge(&mut world, cells);

        prop_assert_eq!(query::field(&world), &first);
    }

    #[test]
    fn observed_cells_are_never_overwritten(cells in observation()) {
        let mut world = World::new();
        merge(&mut world, cells.clone());

        for (point, state) in cells.iter() {
            if state != CellState::Unknown {
                prop_assert_eq!(query::cell(&world, point), state);
            }
        }
    }

    #[test]
    fn inferred_cells_mirror_a_reflectable_cell(cells in observation()) {
        let mut world = World::new();
        merge(&mut world, cells.clone());

        for (point, state) in cells.iter() {
            let merged = query::cell(&world, point);
            if state == CellState::Unknown && merged != CellState::Unknown {
                prop_assert!(merged.is_worth_reflecting());
                prop_assert_eq!(cells.cell(point.reflected()), merged);
            }
        }
    }
}

#[test]
fn remembered_obstacles_survive_fog_and_reflect() {
    let mut world = World::new();
    let wall = GridPoint::new(2, 4);
    let mut cells = FieldGrid::unknown();
    cells.set(wall, CellState::HighWall);
    merge(&mut world, cells);

    merge(&mut world, FieldGrid::unknown());

    assert_eq!(query::cell(&world, wall), CellState::HighWall);
    assert_eq!(query::cell(&world, wall.reflected()), CellState::HighWall);
    assert_eq!(query::turn(&world), 1);
}
