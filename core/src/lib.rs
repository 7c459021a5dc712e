#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the paintball squad engine.
//!
//! This crate defines the message surface that connects the protocol adapter,
//! the authoritative world model, and the decision systems. The adapter decodes
//! each turn into [`Command`] values, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values, and the agent system
//! reads immutable world queries before answering with [`Action`] values that
//! are committed back to the world one unit at a time.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along either edge of the square field.
pub const FIELD_DIMENSION: i32 = 31;

/// Maximum Euclidean distance a paintball can travel when launched.
pub const MAX_LAUNCH_DISTANCE: i32 = 24;

/// Number of units fielded by each team.
pub const TEAM_SIZE: usize = 4;

/// Number of units reported by the game engine every turn.
pub const UNIT_COUNT: usize = TEAM_SIZE * 2;

/// Paintballs consumed by a single shot from a basic launcher.
pub const BASIC_LAUNCH_AMMO_COST: u32 = 1;

/// Paintballs consumed by a rapid-fire volley.
pub const RAPID_FIRE_AMMO_COST: u32 = 3;

/// Paintballs consumed when planting an objective marker.
pub const PLANT_AMMO_COST: u32 = 25;

/// Turn at which planting an objective marker stops paying off.
pub const MARKER_PLANT_HORIZON: i32 = 150;

/// Distance below which an enemy (or an enemy marker) is assumed to see a cell.
pub const ENEMY_SIGHT_RADIUS: f64 = 8.0;

/// Fixed board positions where objective markers are worth planting.
pub const MARKER_SITES: [GridPoint; 5] = [
    GridPoint::new(5, 5),
    GridPoint::new(5, 25),
    GridPoint::new(15, 15),
    GridPoint::new(25, 5),
    GridPoint::new(25, 25),
];

/// Errors raised while converting legacy integer codes into typed values.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The integer does not encode any known cell state.
    #[error("unknown cell code {0}")]
    UnknownCellCode(i32),
    /// The integer does not encode any known loadout.
    #[error("unknown loadout code {0}")]
    UnknownLoadoutCode(u8),
}

/// Location of a single field cell expressed as x and y coordinates.
///
/// Points outside the field are representable so that rays and offsets can
/// leave the board; [`GridPoint::exists`] tells them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    /// Sentinel used for units that were not observed this turn.
    pub const OFF_FIELD: Self = Self::new(-1, -1);

    /// Creates a new grid point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether the point lies on the field.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.x >= 0 && self.x < FIELD_DIMENSION && self.y >= 0 && self.y < FIELD_DIMENSION
    }

    /// Reports whether the point is the off-field sentinel.
    #[must_use]
    pub fn is_off_field(&self) -> bool {
        *self == Self::OFF_FIELD
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: GridPoint) -> f64 {
        let run = f64::from(other.x - self.x);
        let rise = f64::from(other.y - self.y);
        (run * run + rise * rise).sqrt()
    }

    /// Translates the point by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Point mirrored through the field centre (180 degree rotation).
    #[must_use]
    pub const fn reflected(self) -> Self {
        Self::new(FIELD_DIMENSION - 1 - self.x, FIELD_DIMENSION - 1 - self.y)
    }

    /// Enumerates every on-field point within `radius` of this point, excluding the point itself.
    ///
    /// The scan order is fixed (x offset ascending, then y offset ascending) so
    /// callers that break ties by first occurrence stay deterministic.
    #[must_use]
    pub fn points_within(self, radius: f64) -> Vec<GridPoint> {
        if radius < 0.0 {
            return Vec::new();
        }

        let reach = radius.floor() as i32;
        let mut points = Vec::with_capacity(((2 * reach + 1) * (2 * reach + 1)) as usize);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if (dx == 0 && dy == 0) || f64::from(dx * dx + dy * dy).sqrt() > radius {
                    continue;
                }

                let point = self.offset(dx, dy);
                if point.exists() {
                    points.push(point);
                }
            }
        }
        points
    }
}

impl Default for GridPoint {
    fn default() -> Self {
        Self::OFF_FIELD
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Contents of a single field cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Open ground.
    Empty,
    /// Tree; blocks movement and almost every shot.
    Tree,
    /// Low wall that crouching units hide behind.
    LowWall,
    /// High wall.
    HighWall,
    /// Objective marker planted by the red team.
    RedObjectiveMarker,
    /// Objective marker planted by the blue team.
    BlueObjectiveMarker,
    /// Adapter that converts a launcher to rapid fire.
    Adapter,
    /// Shield item.
    Shield,
    /// Basic launcher item.
    BasicLauncher,
    /// Rapid-fire launcher item.
    RapidFireLauncher,
    /// Cell outside the observed area.
    Unknown,
    /// Pile holding the given number of paintballs.
    AmmoPile(u32),
}

impl CellState {
    /// Decodes the legacy integer encoding, where ammo piles are negative magnitudes.
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        let state = match code {
            0 => Self::Empty,
            1 => Self::Tree,
            2 => Self::LowWall,
            3 => Self::HighWall,
            4 => Self::RedObjectiveMarker,
            5 => Self::BlueObjectiveMarker,
            6 => Self::Adapter,
            7 => Self::Shield,
            8 => Self::BasicLauncher,
            9 => Self::RapidFireLauncher,
            10 => Self::Unknown,
            negative if negative < 0 => Self::AmmoPile(negative.unsigned_abs()),
            other => return Err(CoreError::UnknownCellCode(other)),
        };
        Ok(state)
    }

    /// Legacy integer encoding of the state.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Empty => 0,
            Self::Tree => 1,
            Self::LowWall => 2,
            Self::HighWall => 3,
            Self::RedObjectiveMarker => 4,
            Self::BlueObjectiveMarker => 5,
            Self::Adapter => 6,
            Self::Shield => 7,
            Self::BasicLauncher => 8,
            Self::RapidFireLauncher => 9,
            Self::Unknown => 10,
            Self::AmmoPile(count) => -i32::try_from(count).unwrap_or(i32::MAX),
        }
    }

    /// Categories remembered across turns when a fresh observation reports them as unknown.
    #[must_use]
    pub const fn is_worth_tracking(self) -> bool {
        matches!(
            self,
            Self::Adapter
                | Self::BlueObjectiveMarker
                | Self::HighWall
                | Self::LowWall
                | Self::Shield
                | Self::Tree
                | Self::AmmoPile(_)
        )
    }

    /// Categories that may be inferred from the point-reflected cell.
    #[must_use]
    pub const fn is_worth_reflecting(self) -> bool {
        matches!(
            self,
            Self::Adapter
                | Self::HighWall
                | Self::LowWall
                | Self::Shield
                | Self::Tree
                | Self::AmmoPile(_)
        )
    }

    /// Reports whether units may stand on or move through the cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Empty | Self::Unknown)
    }

    /// Height of the static terrain occupying the cell.
    #[must_use]
    pub const fn terrain_height(self) -> u32 {
        match self {
            Self::Tree => 20,
            Self::HighWall | Self::RedObjectiveMarker | Self::BlueObjectiveMarker => 7,
            Self::LowWall => 3,
            _ => 0,
        }
    }

    /// Number of paintballs stored in the cell, if it is an ammo pile.
    #[must_use]
    pub const fn ammo_count(self) -> Option<u32> {
        match self {
            Self::AmmoPile(count) => Some(count),
            _ => None,
        }
    }
}

/// Dense D×D grid of cell states indexed by x, then y.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGrid {
    cells: Vec<CellState>,
}

impl FieldGrid {
    /// Creates a grid with every cell set to `state`.
    #[must_use]
    pub fn filled(state: CellState) -> Self {
        let side = FIELD_DIMENSION as usize;
        Self {
            cells: vec![state; side * side],
        }
    }

    /// Creates a grid where nothing has been observed.
    #[must_use]
    pub fn unknown() -> Self {
        Self::filled(CellState::Unknown)
    }

    /// State of the provided cell; points off the field read as unknown.
    #[must_use]
    pub fn cell(&self, point: GridPoint) -> CellState {
        index(point)
            .and_then(|offset| self.cells.get(offset).copied())
            .unwrap_or(CellState::Unknown)
    }

    /// Overwrites the provided cell. Points off the field are ignored.
    pub fn set(&mut self, point: GridPoint, state: CellState) {
        if let Some(slot) = index(point).and_then(|offset| self.cells.get_mut(offset)) {
            *slot = state;
        }
    }

    /// Iterates every field point in scan order (x ascending, then y ascending).
    pub fn points() -> impl Iterator<Item = GridPoint> {
        (0..FIELD_DIMENSION).flat_map(|x| (0..FIELD_DIMENSION).map(move |y| GridPoint::new(x, y)))
    }

    /// Iterates every point together with its state in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, CellState)> + '_ {
        Self::points().map(move |point| (point, self.cell(point)))
    }
}

fn index(point: GridPoint) -> Option<usize> {
    if !point.exists() {
        return None;
    }
    let x = usize::try_from(point.x()).ok()?;
    let y = usize::try_from(point.y()).ok()?;
    Some(x * FIELD_DIMENSION as usize + y)
}

/// Side a unit plays for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The controlled team.
    Red,
    /// The opposing team.
    Blue,
}

impl Team {
    /// Team the agent controls.
    pub const CONTROLLED: Self = Self::Red;

    /// Opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Objective marker planted by this team.
    #[must_use]
    pub const fn own_marker(self) -> CellState {
        match self {
            Self::Red => CellState::RedObjectiveMarker,
            Self::Blue => CellState::BlueObjectiveMarker,
        }
    }
}

/// Index of a unit within the per-turn roster reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u8);

impl UnitId {
    /// Creates a new unit identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Roster slot of the unit.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Team the unit belongs to; the first [`TEAM_SIZE`] slots are red.
    #[must_use]
    pub const fn team(&self) -> Team {
        if self.index() < TEAM_SIZE {
            Team::Red
        } else {
            Team::Blue
        }
    }

    /// Every roster slot in engine order.
    pub fn roster() -> impl Iterator<Item = UnitId> {
        (0..UNIT_COUNT as u8).map(UnitId::new)
    }

    /// Roster slots of the controlled team in decision order.
    pub fn controlled() -> impl Iterator<Item = UnitId> {
        (0..TEAM_SIZE as u8).map(UnitId::new)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Equipment combinations a unit can carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loadout {
    /// Empty handed.
    #[default]
    Nothing,
    /// A single basic launcher.
    BasicLauncher,
    /// A single shield.
    Shield,
    /// Shield together with a basic launcher.
    ShieldAndBasicLauncher,
    /// A single rapid-fire launcher.
    RapidFireLauncher,
    /// Shield together with a rapid-fire launcher.
    ShieldAndRapidFireLauncher,
}

impl Loadout {
    /// Decodes the loadout code (0 through 5) used by the game engine.
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        let loadout = match code {
            0 => Self::Nothing,
            1 => Self::BasicLauncher,
            2 => Self::Shield,
            3 => Self::ShieldAndBasicLauncher,
            4 => Self::RapidFireLauncher,
            5 => Self::ShieldAndRapidFireLauncher,
            other => return Err(CoreError::UnknownLoadoutCode(other)),
        };
        Ok(loadout)
    }

    /// Numeric code used by the game engine.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Nothing => 0,
            Self::BasicLauncher => 1,
            Self::Shield => 2,
            Self::ShieldAndBasicLauncher => 3,
            Self::RapidFireLauncher => 4,
            Self::ShieldAndRapidFireLauncher => 5,
        }
    }

    /// Reports whether the loadout includes a shield.
    #[must_use]
    pub const fn holds_shield(self) -> bool {
        matches!(
            self,
            Self::Shield | Self::ShieldAndBasicLauncher | Self::ShieldAndRapidFireLauncher
        )
    }

    /// Reports whether the loadout includes a rapid-fire launcher.
    #[must_use]
    pub const fn holds_rapid_fire(self) -> bool {
        matches!(
            self,
            Self::RapidFireLauncher | Self::ShieldAndRapidFireLauncher
        )
    }
}

/// Decoded per-turn record describing one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitObservation {
    /// Cell occupied by the unit, or [`GridPoint::OFF_FIELD`] when unseen.
    pub position: GridPoint,
    /// Indicates whether the unit is standing rather than crouching.
    pub standing: bool,
    /// Indicates whether the unit is defending behind a shield.
    pub defending: bool,
    /// Equipment carried by the unit.
    pub loadout: Loadout,
    /// Paintballs carried by the unit.
    pub ammo: u32,
}

impl UnitObservation {
    /// Record used for units that were not visible this turn.
    #[must_use]
    pub const fn unseen() -> Self {
        Self {
            position: GridPoint::OFF_FIELD,
            standing: true,
            defending: false,
            loadout: Loadout::Nothing,
            ammo: 0,
        }
    }
}

impl Default for UnitObservation {
    fn default() -> Self {
        Self::unseen()
    }
}

/// Command issued for a single unit during one turn.
///
/// Two actions are equal when they render to the same command line, so a
/// basic and a rapid-fire launch at the same point compare equal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Action {
    /// Do nothing this turn.
    Idle,
    /// Move to the provided cell.
    Move {
        /// Destination of the move.
        target: GridPoint,
    },
    /// Pick up the item lying on the provided cell.
    PickupItem {
        /// Cell holding the item.
        item: GridPoint,
    },
    /// Launch a single paintball (or a rapid-fire volley) at the provided cell.
    Launch {
        /// Aim point of the shot.
        target: GridPoint,
        /// Indicates whether the shot is fired from a rapid-fire launcher.
        rapid_fire: bool,
    },
    /// Sweep a rapid-fire volley from `start` to `end`.
    LaunchArc {
        /// First aim point of the sweep.
        start: GridPoint,
        /// Last aim point of the sweep.
        end: GridPoint,
    },
    /// Raise the shield.
    Defend,
    /// Lower the shield.
    Undefend,
    /// Crouch down.
    Crouch,
    /// Stand up.
    Stand,
    /// Plant an objective marker on the provided cell.
    PlantMarker {
        /// Cell receiving the marker.
        site: GridPoint,
    },
    /// Drop paintballs on the provided cell.
    DropAmmo {
        /// Cell receiving the paintballs.
        target: GridPoint,
        /// Number of paintballs to drop.
        count: u32,
    },
}

impl Action {
    /// Launch aimed at `target`, priced by the launcher in use.
    #[must_use]
    pub const fn launch(target: GridPoint, rapid_fire: bool) -> Self {
        Self::Launch { target, rapid_fire }
    }

    /// Paintballs the unit must carry to perform the action.
    #[must_use]
    pub const fn ammo_cost(&self) -> u32 {
        match self {
            Self::Launch { rapid_fire: true, .. } | Self::LaunchArc { .. } => RAPID_FIRE_AMMO_COST,
            Self::Launch { .. } => BASIC_LAUNCH_AMMO_COST,
            Self::PlantMarker { .. } => PLANT_AMMO_COST,
            Self::DropAmmo { count, .. } => *count,
            _ => 0,
        }
    }

    /// Cell the action refers to, if any.
    #[must_use]
    pub const fn target(&self) -> Option<GridPoint> {
        match self {
            Self::Move { target }
            | Self::Launch { target, .. }
            | Self::DropAmmo { target, .. }
            | Self::LaunchArc { start: target, .. } => Some(*target),
            Self::PickupItem { item } => Some(*item),
            Self::PlantMarker { site } => Some(*site),
            _ => None,
        }
    }

    /// Reports whether the action fires paintballs.
    #[must_use]
    pub const fn is_launch(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::LaunchArc { .. })
    }

    /// Reports whether the action plants an objective marker.
    #[must_use]
    pub const fn is_plant(&self) -> bool {
        matches!(self, Self::PlantMarker { .. })
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle)
            | (Self::Defend, Self::Defend)
            | (Self::Undefend, Self::Undefend)
            | (Self::Crouch, Self::Crouch)
            | (Self::Stand, Self::Stand) => true,
            (Self::Move { target: left }, Self::Move { target: right })
            | (Self::Launch { target: left, .. }, Self::Launch { target: right, .. })
            | (Self::PickupItem { item: left }, Self::PickupItem { item: right })
            | (Self::PlantMarker { site: left }, Self::PlantMarker { site: right }) => {
                left == right
            }
            (
                Self::LaunchArc {
                    start: left_start,
                    end: left_end,
                },
                Self::LaunchArc {
                    start: right_start,
                    end: right_end,
                },
            ) => left_start == right_start && left_end == right_end,
            (
                Self::DropAmmo {
                    target: left,
                    count: left_count,
                },
                Self::DropAmmo {
                    target: right,
                    count: right_count,
                },
            ) => left == right && left_count == right_count,
            _ => false,
        }
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Move { target } => write!(f, "move {} {}", target.x(), target.y()),
            Self::PickupItem { item } => write!(f, "pickup {} {}", item.x(), item.y()),
            Self::Launch { target, .. } => write!(f, "launch {} {}", target.x(), target.y()),
            Self::LaunchArc { start, end } => write!(
                f,
                "launch {} {} {} {}",
                start.x(),
                start.y(),
                end.x(),
                end.y()
            ),
            Self::Defend => f.write_str("defend"),
            Self::Undefend => f.write_str("undefend"),
            Self::Crouch => f.write_str("crouch"),
            Self::Stand => f.write_str("stand"),
            Self::PlantMarker { site } => write!(f, "plant {} {}", site.x(), site.y()),
            Self::DropAmmo { target, count } => {
                write!(f, "drop {} {} {}", target.x(), target.y(), count)
            }
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Overwrites a unit's state with the record decoded for this turn.
    ObserveUnit {
        /// Roster slot being updated.
        unit: UnitId,
        /// Freshly decoded state of the unit.
        observation: UnitObservation,
    },
    /// Merges a freshly decoded field snapshot into memory and advances the turn.
    ObserveField {
        /// Snapshot where unseen cells are [`CellState::Unknown`].
        cells: FieldGrid,
    },
    /// Records the action a controlled unit chose for this turn.
    CommitAction {
        /// Unit that decided.
        unit: UnitId,
        /// Action chosen by the unit.
        action: Action,
        /// Cells the unit will traverse, hidden from teammates' emptiness checks.
        reserved: Vec<GridPoint>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a unit's state was replaced by a fresh observation.
    UnitObserved {
        /// Unit that was observed.
        unit: UnitId,
        /// Position reported for the unit.
        position: GridPoint,
    },
    /// Announces that the merged field memory advanced to a new turn.
    TurnAdvanced {
        /// Turn counter after the merge.
        turn: i32,
    },
    /// Confirms that a unit committed its action for the turn.
    ActionCommitted {
        /// Unit that committed.
        unit: UnitId,
        /// Action committed by the unit.
        action: Action,
    },
}
