use crate::*;
pub use random::*;

mod random;

/// Generation strategy producing the pair assignment for a level.
pub trait BoardGenerator {
    fn generate(self, cell_count: CellCount) -> Result<PairLayout>;
}

/// Most-square factorization of `cell_count` as `(column_count, row_count)`,
/// searching divisors downward from the integer square root. Guarantees
/// `column_count <= row_count`.
pub fn closest_factors(cell_count: CellCount) -> Result<Coord2> {
    if cell_count < 1 {
        return Err(GameError::InvalidCellCount);
    }

    for x in (1..=cell_count.isqrt()).rev() {
        if cell_count % x == 0 {
            let columns = x.try_into().map_err(|_| GameError::InvalidCellCount)?;
            let rows = (cell_count / x)
                .try_into()
                .map_err(|_| GameError::InvalidCellCount)?;
            return Ok((columns, rows));
        }
    }

    // 1 divides everything, the loop cannot fall through for positive input
    Err(GameError::InvalidCellCount)
}
