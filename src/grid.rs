use crate::error::{Error, InvalidCellReason, Result};
use crate::search::{Search, SearchResult};
use core::fmt;
use grid_util::point::Point;
use itertools::{iproduct, Itertools};
use log::{debug, info, warn};
use petgraph::unionfind::UnionFind;

/// A grid position, addressed by row and column. Two cells are the same cell exactly when
/// their coordinates are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Cell {
        Cell::new(row, col)
    }
}

/// Rows map onto `x` and columns onto `y`, matching [Grid::pixel_origin].
impl From<Cell> for Point {
    fn from(cell: Cell) -> Point {
        Point::new(cell.row as i32, cell.col as i32)
    }
}

/// Structural role of a cell. Search annotations (open, closed, path) are not stored here,
/// they are read from a running [Search].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Free,
    Obstacle,
    Start,
    Goal,
}

impl CellState {
    pub fn is_traversable(self) -> bool {
        self != CellState::Obstacle
    }
    fn symbol(self) -> char {
        match self {
            CellState::Free => '.',
            CellState::Obstacle => '#',
            CellState::Start => 'S',
            CellState::Goal => 'G',
        }
    }
}

/// Square grid of `size × size` cells stored row-major in a flat vector. Besides the per-cell
/// [CellState] it keeps at most one start and one goal, and a [UnionFind] over 4-connected
/// traversable cells used for cheap reachability queries.
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    cell_extent: u32,
    states: Vec<CellState>,
    start: Option<Cell>,
    goal: Option<Cell>,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

/// Builds a `rows × rows` grid laid out over a square canvas `width` pixels wide. Each cell
/// covers `width / rows` pixels, which must be at least one.
pub fn build_grid(rows: usize, width: u32) -> Result<Grid> {
    let extent = match u32::try_from(rows) {
        Ok(r) if r > 0 => width / r,
        _ => 0,
    };
    if extent == 0 {
        return Err(Error::InvalidDimensions { rows, width });
    }
    let mut grid = Grid::new(rows)?;
    grid.cell_extent = extent;
    Ok(grid)
}

impl Grid {
    /// Creates an obstacle-free grid with a cell extent of one pixel.
    pub fn new(size: usize) -> Result<Grid> {
        if size == 0 {
            return Err(Error::InvalidDimensions { rows: 0, width: 0 });
        }
        let mut grid = Grid {
            size,
            cell_extent: 1,
            states: vec![CellState::Free; size * size],
            start: None,
            goal: None,
            components: UnionFind::new(size * size),
            components_dirty: false,
        };
        grid.generate_components();
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }
    pub fn cell_extent(&self) -> u32 {
        self.cell_extent
    }
    pub fn start(&self) -> Option<Cell> {
        self.start
    }
    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }
    fn index(&self, cell: Cell) -> usize {
        cell.row * self.size + cell.col
    }
    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(Error::InvalidCell {
                row: cell.row,
                col: cell.col,
                reason: InvalidCellReason::OutOfBounds,
            })
        }
    }

    /// Looks up the cell at the given coordinates.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell> {
        let cell = Cell::new(row, col);
        self.check_bounds(cell)?;
        Ok(cell)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(0..self.size, 0..self.size).map(|(row, col)| Cell::new(row, col))
    }

    pub fn state(&self, cell: Cell) -> Result<CellState> {
        self.check_bounds(cell)?;
        Ok(self.states[self.index(cell)])
    }

    pub fn is_traversable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.states[self.index(cell)].is_traversable()
    }

    /// The orthogonally adjacent, in-bounds, traversable cells of `cell`, in the order down,
    /// up, right, left. Derived from the current obstacle layout on every call.
    pub fn neighbors_of(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        let Cell { row, col } = cell;
        [
            (row.checked_add(1), Some(col)),
            (row.checked_sub(1), Some(col)),
            (Some(row), col.checked_add(1)),
            (Some(row), col.checked_sub(1)),
        ]
        .into_iter()
        .filter_map(|(r, c)| Some(Cell::new(r?, c?)))
        .filter(move |n| self.is_traversable(*n))
    }

    /// Rejects edits that would overwrite the start or goal designation.
    fn check_editable(&self, cell: Cell) -> Result<()> {
        self.check_bounds(cell)?;
        let reason = if self.start == Some(cell) {
            InvalidCellReason::IsStart
        } else if self.goal == Some(cell) {
            InvalidCellReason::IsGoal
        } else {
            return Ok(());
        };
        warn!("Rejected edit of {cell}: {reason}");
        Err(Error::InvalidCell {
            row: cell.row,
            col: cell.col,
            reason,
        })
    }

    /// Writes a state and keeps the components consistent. Freeing a cell joins it with its
    /// neighbours, blocking one flags the components as dirty since they may split.
    fn write_state(&mut self, cell: Cell, state: CellState) {
        let ix = self.index(cell);
        let was_traversable = self.states[ix].is_traversable();
        self.states[ix] = state;
        match (was_traversable, state.is_traversable()) {
            (true, false) => self.components_dirty = true,
            (false, true) => {
                let joined = self.neighbors_of(cell).map(|n| self.index(n)).collect_vec();
                for n_ix in joined {
                    self.components.union(ix, n_ix);
                }
            }
            _ => {}
        }
    }

    /// Marks or unmarks `(row, col)` as an obstacle. The start and goal cannot be blocked.
    pub fn set_obstacle(&mut self, row: usize, col: usize, blocked: bool) -> Result<()> {
        let cell = Cell::new(row, col);
        self.check_editable(cell)?;
        let state = if blocked {
            CellState::Obstacle
        } else {
            CellState::Free
        };
        debug!("Setting {cell} to {state:?}");
        self.write_state(cell, state);
        Ok(())
    }

    /// Designates `(row, col)` as the start, replacing an obstacle there and freeing the
    /// previous start.
    pub fn set_start(&mut self, row: usize, col: usize) -> Result<()> {
        let cell = Cell::new(row, col);
        self.check_editable(cell)?;
        if let Some(old) = self.start.take() {
            self.write_state(old, CellState::Free);
        }
        self.write_state(cell, CellState::Start);
        self.start = Some(cell);
        debug!("Start set to {cell}");
        Ok(())
    }

    /// Designates `(row, col)` as the goal, replacing an obstacle there and freeing the
    /// previous goal.
    pub fn set_goal(&mut self, row: usize, col: usize) -> Result<()> {
        let cell = Cell::new(row, col);
        self.check_editable(cell)?;
        if let Some(old) = self.goal.take() {
            self.write_state(old, CellState::Free);
        }
        self.write_state(cell, CellState::Goal);
        self.goal = Some(cell);
        debug!("Goal set to {cell}");
        Ok(())
    }

    pub fn clear_start(&mut self) {
        if let Some(old) = self.start.take() {
            self.write_state(old, CellState::Free);
        }
    }

    pub fn clear_goal(&mut self) {
        if let Some(old) = self.goal.take() {
            self.write_state(old, CellState::Free);
        }
    }

    /// Returns `(row, col)` to [CellState::Free], dropping a start or goal designation.
    pub fn reset(&mut self, row: usize, col: usize) -> Result<()> {
        let cell = Cell::new(row, col);
        self.check_bounds(cell)?;
        if self.start == Some(cell) {
            self.start = None;
        }
        if self.goal == Some(cell) {
            self.goal = None;
        }
        self.write_state(cell, CellState::Free);
        Ok(())
    }

    /// Resets every cell and both designations.
    pub fn clear(&mut self) {
        info!("Clearing {0}x{0} grid", self.size);
        self.states.fill(CellState::Free);
        self.start = None;
        self.goal = None;
        self.generate_components();
    }

    /// Maps a canvas position to the cell under it. The horizontal coordinate selects the
    /// row, the vertical one the column.
    pub fn cell_at_pixel(&self, x: u32, y: u32) -> Result<Cell> {
        let cell = Cell::new(
            (x / self.cell_extent) as usize,
            (y / self.cell_extent) as usize,
        );
        self.check_bounds(cell)?;
        Ok(cell)
    }

    /// Top-left canvas corner of the square covering `cell`.
    pub fn pixel_origin(&self, cell: Cell) -> Result<(u32, u32)> {
        self.check_bounds(cell)?;
        Ok((
            cell.row as u32 * self.cell_extent,
            cell.col as u32 * self.cell_extent,
        ))
    }

    /// Checks if `a` and `b` are on the same connected component. Components must be up to
    /// date, see [Grid::update].
    pub fn reachable(&self, a: Cell, b: Cell) -> bool {
        self.is_traversable(a)
            && self.is_traversable(b)
            && self.components.equiv(self.index(a), self.index(b))
    }

    pub fn unreachable(&self, a: Cell, b: Cell) -> bool {
        !self.reachable(a, b)
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up traversable neighbours.
    pub fn generate_components(&mut self) {
        let n = self.size;
        self.components = UnionFind::new(n * n);
        self.components_dirty = false;
        for cell in self.cells() {
            if !self.is_traversable(cell) {
                continue;
            }
            let ix = self.index(cell);
            for next in [Cell::new(cell.row + 1, cell.col), Cell::new(cell.row, cell.col + 1)] {
                if self.is_traversable(next) {
                    let next_ix = self.index(next);
                    self.components.union(ix, next_ix);
                }
            }
        }
    }

    /// Searches from the designated start to the designated goal, see [search](crate::search::search).
    pub fn run_search<F>(&self, on_step: F) -> Result<SearchResult>
    where
        F: FnMut(&Search<'_>),
    {
        match (self.start, self.goal) {
            (Some(start), Some(goal)) => crate::search::search(self, start, goal, on_step),
            _ => Err(Error::MissingEndpoint),
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.states.chunks(self.size) {
            writeln!(f, "{}", row.iter().map(|s| s.symbol()).join(""))?;
        }
        Ok(())
    }
}
