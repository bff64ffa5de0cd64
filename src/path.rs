use crate::grid::Cell;
use fxhash::FxHashMap;
use itertools::Itertools;

/// Walks a predecessor map backwards from a cell. Yields the starting cell and each of its
/// ancestors except the last one, the root without a predecessor. The map is only read, so
/// reconstructing the same chain twice gives the same cells.
#[derive(Clone, Debug)]
pub struct PathReconstructor<'a> {
    came_from: &'a FxHashMap<Cell, Cell>,
    current: Option<Cell>,
}

impl<'a> PathReconstructor<'a> {
    pub fn new(came_from: &'a FxHashMap<Cell, Cell>, goal: Cell) -> PathReconstructor<'a> {
        PathReconstructor {
            came_from,
            current: Some(goal),
        }
    }
}

impl Iterator for PathReconstructor<'_> {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let cell = self.current?;
        self.current = self.came_from.get(&cell).copied();
        self.current.map(|_| cell)
    }
}

/// A path on the grid from its first to its last cell, both included. Consecutive cells are
/// orthogonal neighbours, so the [length](Path::length) in moves is one less than the number
/// of cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    cells: Vec<Cell>,
}

impl Path {
    /// Builds the path ending in `goal` from a predecessor map whose chain ends in `start`.
    pub fn from_predecessors(came_from: &FxHashMap<Cell, Cell>, start: Cell, goal: Cell) -> Path {
        let mut cells = PathReconstructor::new(came_from, goal).collect_vec();
        cells.push(start);
        cells.reverse();
        Path { cells }
    }

    /// Number of moves, which is also the cost under unit edge costs.
    pub fn length(&self) -> usize {
        self.cells.len() - 1
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    pub fn goal(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl IntoIterator for Path {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
