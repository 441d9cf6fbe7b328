/// Single coordinate axis used for board columns, rows, and positions.
pub type Coord = u8;

/// Count type used for pair counts and total-cell counts.
pub type CellCount = u16;

/// Identifier shared by the two cells of a pair.
pub type PairId = u16;

/// Two-dimensional coordinates `(column, row)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    // board arrays are row-major, so the row axis comes first
    fn to_nd_index(self) -> Self::Output {
        [self.1.into(), self.0.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_convert_row_first() {
        assert_eq!((1, 2).to_nd_index(), [2, 1]);
        assert_eq!((0, 0).to_nd_index(), [0, 0]);
    }

    #[test]
    fn mult_saturates_instead_of_overflowing() {
        assert_eq!(mult(2, 3), 6);
        assert_eq!(mult(255, 255), 65025);
    }
}
