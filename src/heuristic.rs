use crate::grid::Cell;

/// [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) between two cells.
/// Admissible and consistent on a 4-connected grid with unit edge costs.
pub fn manhattan(a: Cell, b: Cell) -> u32 {
    (a.row.abs_diff(b.row) + a.col.abs_diff(b.col)) as u32
}
