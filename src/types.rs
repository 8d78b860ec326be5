/// Single coordinate axis used for board rows, columns, and grid positions.
pub type Coord = u8;

/// Count type used for hazard counts and total-cell counts.
pub type CellCount = u16;

/// Flat, row-major index into the board.
pub type CellIndex = u16;

/// Grid dimensions or position `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Converts a flat index to `(row, col)` on a board with the given size.
/// The caller is responsible for `index < mult(size.0, size.1)`.
pub const fn index_to_coords(index: CellIndex, size: Coord2) -> Coord2 {
    let cols = size.1 as CellIndex;
    ((index / cols) as Coord, (index % cols) as Coord)
}

pub const fn coords_to_index((row, col): Coord2, size: Coord2) -> CellIndex {
    let cols = size.1 as CellIndex;
    (row as CellIndex) * cols + (col as CellIndex)
}

pub(crate) const fn index_to_nd(index: CellIndex, size: Coord2) -> [usize; 2] {
    let cols = size.1 as usize;
    let index = index as usize;
    [index / cols, index % cols]
}
