#![no_std]

extern crate alloc;

use alloc::collections::BTreeMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod types;

/// Validated pair assignment for one level: a row-major grid of pair
/// identifiers in which every value present occupies exactly two cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairLayout {
    values: Array2<PairId>,
}

impl PairLayout {
    pub fn from_values(values: Array2<PairId>) -> Result<Self> {
        if values.is_empty() {
            return Err(GameError::InvalidCellCount);
        }

        let mut occurrences: BTreeMap<PairId, CellCount> = BTreeMap::new();
        for &value in values.iter() {
            *occurrences.entry(value).or_insert(0) += 1;
        }
        if occurrences.values().any(|&count| count != 2) {
            return Err(GameError::UnbalancedPairs);
        }

        Ok(Self { values })
    }

    /// Board dimensions as `(column_count, row_count)`.
    pub fn size(&self) -> Coord2 {
        let dim = self.values.dim();
        (dim.1.try_into().unwrap(), dim.0.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.values.len().try_into().unwrap()
    }

    pub fn pair_count(&self) -> CellCount {
        self.total_cells() / 2
    }

    pub fn value_at(&self, coords: Coord2) -> PairId {
        self.values[coords.to_nd_index()]
    }

    pub(crate) fn into_board(self, status: CellStatus) -> Array2<Cell> {
        self.values.mapv(|value| Cell::new(value, status))
    }
}

/// Outcome of submitting a cell selection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GuessOutcome {
    NoChange,
    Opened,
    Matched,
    Mismatched,
    Won,
}

impl GuessOutcome {
    /// Whether this outcome could have caused an update to the board.
    pub const fn has_update(self) -> bool {
        use GuessOutcome::*;
        match self {
            NoChange => false,
            Opened => true,
            Matched => true,
            Mismatched => true,
            Won => true,
        }
    }

    pub const fn is_match(self) -> bool {
        matches!(self, Self::Matched | Self::Won)
    }
}
