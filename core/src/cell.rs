use serde::{Deserialize, Serialize};

use crate::PairId;

/// Player-visible state of a single board cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellStatus {
    /// Face down, value hidden from the UI.
    Closed,
    /// Face up, awaiting resolution.
    Opened,
    /// Face up permanently, excluded from further play.
    Match,
}

impl CellStatus {
    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Match)
    }

    pub const fn is_face_up(self) -> bool {
        matches!(self, Self::Opened | Self::Match)
    }
}

impl Default for CellStatus {
    fn default() -> Self {
        Self::Closed
    }
}

/// One board slot: the pair identifier plus its visible status.
///
/// Coordinates are implicit in the slot's position within the grid; a status
/// change writes a fresh value into the slot rather than mutating in place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: PairId,
    pub status: CellStatus,
}

impl Cell {
    pub const fn new(value: PairId, status: CellStatus) -> Self {
        Self { value, status }
    }

    pub(crate) const fn with_status(self, status: CellStatus) -> Self {
        Self {
            value: self.value,
            status,
        }
    }
}
