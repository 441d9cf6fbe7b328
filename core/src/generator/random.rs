use alloc::vec::Vec;
use ndarray::Array2;

use super::*;

/// Purely random assignment: every identifier dealt twice into a flat list,
/// uniformly shuffled, then laid row-major onto the most-square grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShuffledBoardGenerator {
    seed: u64,
}

impl ShuffledBoardGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for ShuffledBoardGenerator {
    fn generate(self, cell_count: CellCount) -> Result<PairLayout> {
        use rand::prelude::*;

        if cell_count < 2 || cell_count % 2 != 0 {
            return Err(GameError::InvalidCellCount);
        }

        let (columns, rows) = closest_factors(cell_count)?;
        let pair_count = cell_count / 2;

        let mut values: Vec<PairId> = Vec::with_capacity(cell_count.into());
        for id in 0..pair_count {
            values.push(id);
            values.push(id);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        values.shuffle(&mut rng);

        let shape = (usize::from(rows), usize::from(columns));
        let values =
            Array2::from_shape_vec(shape, values).map_err(|_| GameError::InvalidBoardShape)?;

        log::debug!(
            "generated {}x{} board with {} pairs",
            columns,
            rows,
            pair_count
        );
        PairLayout::from_values(values)
    }
}
