//! Persistent field memory that reconciles noisy per-turn observations.

use paintball_core::{CellState, FieldGrid};

/// Best-known field state together with the last trusted snapshot.
///
/// `current` is what queries read during a turn. `trusted` is the result of the
/// previous merge and is the only input besides the fresh observation that a
/// merge may consult, which keeps repeated merges of the same observation
/// stable.
#[derive(Clone, Debug)]
pub(crate) struct FieldMemory {
    current: FieldGrid,
    trusted: FieldGrid,
}

/// Counts of cells touched by each inference step of a merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct MergeStats {
    pub(crate) restored: usize,
    pub(crate) reflected: usize,
    pub(crate) confirmed_empty: usize,
}

impl FieldMemory {
    pub(crate) fn new() -> Self {
        Self {
            current: FieldGrid::unknown(),
            trusted: FieldGrid::unknown(),
        }
    }

    /// Best-known field after the latest merge.
    pub(crate) fn cells(&self) -> &FieldGrid {
        &self.current
    }

    /// Merges a fresh observation with memory and symmetry inference.
    pub(crate) fn merge(&mut self, observation: FieldGrid) -> MergeStats {
        let mut stats = MergeStats::default();
        let mut merged = observation;

        for point in FieldGrid::points() {
            let remembered = self.trusted.cell(point);
            if merged.cell(point) == CellState::Unknown && remembered.is_worth_tracking() {
                merged.set(point, remembered);
                stats.restored += 1;
            }
        }

        // Reflection reads from the pass-two result; a cell filled here can never
        // be the mirror of another cell filled here, so scan order does not matter.
        let restored = merged.clone();
        for point in FieldGrid::points() {
            if restored.cell(point) != CellState::Unknown {
                continue;
            }

            let mirror = restored.cell(point.reflected());
            if !mirror.is_worth_reflecting() {
                continue;
            }

            match self.trusted.cell(point) {
                CellState::Unknown => {
                    merged.set(point, mirror);
                    stats.reflected += 1;
                }
                CellState::Empty => {
                    merged.set(point, CellState::Empty);
                    stats.confirmed_empty += 1;
                }
                _ => {}
            }
        }

        self.trusted = merged.clone();
        self.current = merged;
        stats
    }
}
