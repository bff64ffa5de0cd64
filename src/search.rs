use crate::error::{Error, InvalidCellReason, Result};
use crate::frontier::Frontier;
use crate::grid::{Cell, Grid};
use crate::heuristic::manhattan;
use crate::path::Path;
use crate::EDGE_COST;
use fxhash::{FxBuildHasher, FxHashMap, FxHashSet};
use indexmap::IndexSet;
use log::{debug, info, trace, warn};

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Running,
    Succeeded,
    Failed,
}

/// Outcome of a finished search. An unreachable goal is a regular outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    Found(Path),
    NotFound,
}

impl SearchResult {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            SearchResult::NotFound => None,
        }
    }
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }
}

/// A single A* search over a borrowed [Grid], advanced one expansion at a time with
/// [step](Search::step). Holding the grid borrow keeps its obstacles frozen for as long as the
/// search exists. Dropping the search between steps cancels it.
///
/// Missing g- and f-scores stand for infinity. A cell is queued at most once while it is
/// pending: when a queued cell gets a cheaper score its g- and f-score and predecessor are
/// updated, but it keeps its place in the frontier under the priority it was queued with.
#[derive(Clone, Debug)]
pub struct Search<'g> {
    grid: &'g Grid,
    start: Cell,
    goal: Cell,
    frontier: Frontier,
    open_set: FxHashSet<Cell>,
    g_score: FxHashMap<Cell, u32>,
    f_score: FxHashMap<Cell, u32>,
    came_from: FxHashMap<Cell, Cell>,
    closed: FxIndexSet<Cell>,
    status: SearchStatus,
    iterations: usize,
}

impl<'g> Search<'g> {
    /// Seeds a search with `start` queued at g-score 0. Both endpoints must be in bounds and
    /// traversable.
    pub fn new(grid: &'g Grid, start: Cell, goal: Cell) -> Result<Search<'g>> {
        for cell in [start, goal] {
            let reason = if !grid.in_bounds(cell) {
                InvalidCellReason::OutOfBounds
            } else if !grid.is_traversable(cell) {
                InvalidCellReason::Obstacle
            } else {
                continue;
            };
            return Err(Error::InvalidCell {
                row: cell.row,
                col: cell.col,
                reason,
            });
        }
        let mut search = Search {
            grid,
            start,
            goal,
            frontier: Frontier::new(),
            open_set: FxHashSet::default(),
            g_score: FxHashMap::default(),
            f_score: FxHashMap::default(),
            came_from: FxHashMap::default(),
            closed: FxIndexSet::default(),
            status: SearchStatus::Running,
            iterations: 0,
        };
        let h = manhattan(start, goal);
        search.g_score.insert(start, 0);
        search.f_score.insert(start, h);
        search.frontier.push(h, start);
        search.open_set.insert(start);
        Ok(search)
    }

    /// Performs one iteration: pops the most promising cell and either finishes on the goal
    /// or relaxes its neighbours. Returns the status after the iteration. Once the search
    /// has finished, further calls do nothing.
    pub fn step(&mut self) -> Result<SearchStatus> {
        if self.status != SearchStatus::Running {
            return Ok(self.status);
        }
        let current = loop {
            if self.frontier.is_empty() {
                info!(
                    "{} is not reachable from {} after {} iterations",
                    self.goal, self.start, self.iterations
                );
                self.status = SearchStatus::Failed;
                return Ok(self.status);
            }
            let (priority, cell) = self.frontier.pop_min()?;
            if self.open_set.contains(&cell) {
                break cell;
            }
            trace!("Discarding entry for finalized {cell} at priority {priority}");
        };
        self.iterations += 1;
        self.open_set.remove(&current);

        if current == self.goal {
            info!(
                "Reached {} from {} in {} iterations",
                self.goal, self.start, self.iterations
            );
            self.status = SearchStatus::Succeeded;
            return Ok(self.status);
        }

        // Every queued cell has a g-score
        let tentative = self.g_score[&current] + EDGE_COST;
        let grid = self.grid;
        for neighbor in grid.neighbors_of(current) {
            if tentative >= self.g_score(neighbor).unwrap_or(u32::MAX) {
                continue;
            }
            let f = tentative + manhattan(neighbor, self.goal);
            self.came_from.insert(neighbor, current);
            self.g_score.insert(neighbor, tentative);
            self.f_score.insert(neighbor, f);
            if self.open_set.insert(neighbor) {
                self.frontier.push(f, neighbor);
            }
        }

        if current != self.start {
            self.closed.insert(current);
        }
        debug!(
            "Iteration {}: expanded {current}, {} queued",
            self.iterations,
            self.open_set.len()
        );
        Ok(self.status)
    }

    /// Steps until the search finishes, calling `on_step` after every iteration that leaves
    /// it running.
    pub fn run<F>(&mut self, on_step: F) -> Result<SearchResult>
    where
        F: FnMut(&Search<'_>),
    {
        self.drive(None, on_step)
    }

    /// Like [run](Search::run), but gives up with [Error::IterationLimit] once `limit`
    /// iterations have passed without finishing. [iteration_bound](Search::iteration_bound)
    /// is a limit no successful search exceeds.
    pub fn run_bounded<F>(&mut self, limit: usize, on_step: F) -> Result<SearchResult>
    where
        F: FnMut(&Search<'_>),
    {
        self.drive(Some(limit), on_step)
    }

    fn drive<F>(&mut self, limit: Option<usize>, mut on_step: F) -> Result<SearchResult>
    where
        F: FnMut(&Search<'_>),
    {
        info!("Searching for a path from {} to {}", self.start, self.goal);
        loop {
            if let Some(limit) = limit {
                if self.status == SearchStatus::Running && self.iterations >= limit {
                    warn!(
                        "Search from {} to {} exceeded {limit} iterations",
                        self.start, self.goal
                    );
                    return Err(Error::IterationLimit { limit });
                }
            }
            match self.step()? {
                SearchStatus::Running => on_step(&*self),
                SearchStatus::Succeeded => {
                    let path = Path::from_predecessors(&self.came_from, self.start, self.goal);
                    return Ok(SearchResult::Found(path));
                }
                SearchStatus::Failed => return Ok(SearchResult::NotFound),
            }
        }
    }

    /// The path to the goal, once the search has succeeded.
    pub fn path(&self) -> Option<Path> {
        (self.status == SearchStatus::Succeeded)
            .then(|| Path::from_predecessors(&self.came_from, self.start, self.goal))
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }
    pub fn start(&self) -> Cell {
        self.start
    }
    pub fn goal(&self) -> Cell {
        self.goal
    }
    /// Number of cells expanded so far, the goal included.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    /// Every cell is expanded at most once, so no search takes more iterations than there
    /// are cells.
    pub fn iteration_bound(&self) -> usize {
        self.grid.size() * self.grid.size()
    }

    /// Cost of the cheapest known path from the start, [None] if `cell` was never reached.
    pub fn g_score(&self, cell: Cell) -> Option<u32> {
        self.g_score.get(&cell).copied()
    }
    pub fn f_score(&self, cell: Cell) -> Option<u32> {
        self.f_score.get(&cell).copied()
    }
    pub fn came_from(&self, cell: Cell) -> Option<Cell> {
        self.came_from.get(&cell).copied()
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.open_set.contains(&cell)
    }
    pub fn is_closed(&self, cell: Cell) -> bool {
        self.closed.contains(&cell)
    }
    /// Cells awaiting expansion, in no particular order.
    pub fn open_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.open_set.iter().copied()
    }
    /// Expanded cells other than the start, in the order they were expanded.
    pub fn closed(&self) -> impl Iterator<Item = Cell> + '_ {
        self.closed.iter().copied()
    }
}

/// Computes a shortest path from `start` to `goal` with A* using the Manhattan distance
/// heuristic. `on_step` is called after every iteration that does not finish the search and
/// can be used to render progress; the search does not depend on what it does.
pub fn search<F>(grid: &Grid, start: Cell, goal: Cell, on_step: F) -> Result<SearchResult>
where
    F: FnMut(&Search<'_>),
{
    Search::new(grid, start, goal)?.run(on_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn grid_5x5() -> Grid {
        Grid::new(5).unwrap()
    }

    fn find(grid: &Grid, start: Cell, goal: Cell) -> SearchResult {
        search(grid, start, goal, |_| {}).unwrap()
    }

    fn is_connected(path: &Path) -> bool {
        path.cells()
            .windows(2)
            .all(|w| manhattan(w[0], w[1]) == 1)
    }

    #[test]
    fn open_grid_corner_to_corner() {
        let grid = grid_5x5();
        let result = find(&grid, Cell::new(0, 0), Cell::new(4, 4));
        let path = result.path().unwrap();
        assert_eq!(path.length(), 8);
        assert_eq!(path.start(), Cell::new(0, 0));
        assert_eq!(path.goal(), Cell::new(4, 4));
        assert!(is_connected(path));
    }

    #[test]
    fn open_grid_paths_have_manhattan_length() {
        let grid = grid_5x5();
        for start in grid.cells() {
            for goal in grid.cells().filter(|g| *g != start) {
                let result = find(&grid, start, goal);
                let path = result.path().unwrap();
                assert_eq!(path.length() as u32, manhattan(start, goal));
            }
        }
    }

    #[test]
    fn adjacent_cells_take_one_step() {
        let grid = grid_5x5();
        let result = find(&grid, Cell::new(2, 2), Cell::new(2, 3));
        assert_eq!(result.path().unwrap().length(), 1);
    }

    /// Column 2 blocked except its bottom cell forces a detour through (4, 2).
    #[test]
    fn detours_through_gap() {
        //  S.#..
        //  ..#..
        //  ..#..
        //  ..#..
        //  ....G
        let mut grid = grid_5x5();
        for row in 0..4 {
            grid.set_obstacle(row, 2, true).unwrap();
        }
        let path = find(&grid, Cell::new(0, 0), Cell::new(4, 4))
            .path()
            .cloned()
            .unwrap();
        assert!(path.contains(&Cell::new(4, 2)));
        assert_eq!(path.length(), 8);
        assert!(path.iter().all(|c| grid.is_traversable(*c)));
        assert!(is_connected(&path));
    }

    #[test]
    fn fully_blocked_column_is_not_found() {
        let mut grid = grid_5x5();
        for row in 0..5 {
            grid.set_obstacle(row, 2, true).unwrap();
        }
        assert_eq!(find(&grid, Cell::new(0, 0), Cell::new(4, 4)), SearchResult::NotFound);
    }

    #[test]
    fn walled_goal_is_not_found() {
        let mut grid = grid_5x5();
        grid.set_obstacle(1, 2, true).unwrap();
        grid.set_obstacle(3, 2, true).unwrap();
        grid.set_obstacle(2, 1, true).unwrap();
        grid.set_obstacle(2, 3, true).unwrap();
        let mut steps = 0;
        let result = search(&grid, Cell::new(0, 0), Cell::new(2, 2), |_| steps += 1).unwrap();
        assert_eq!(result, SearchResult::NotFound);
        // Every other free cell is expanded before giving up
        assert_eq!(steps, 25 - 4 - 1);
    }

    #[test]
    fn repeated_search_is_identical() {
        let mut grid = Grid::new(8).unwrap();
        for (row, col) in [(1, 1), (2, 1), (3, 1), (5, 5), (5, 6), (6, 5), (0, 4)] {
            grid.set_obstacle(row, col, true).unwrap();
        }
        let first = find(&grid, Cell::new(0, 0), Cell::new(7, 7));
        let second = find(&grid, Cell::new(0, 0), Cell::new(7, 7));
        assert!(first.is_found());
        assert_eq!(first, second);
    }

    #[test]
    fn path_length_matches_goal_g_score() {
        let mut grid = Grid::new(6).unwrap();
        for row in 0..5 {
            grid.set_obstacle(row, 3, true).unwrap();
        }
        let goal = Cell::new(0, 5);
        let mut search = Search::new(&grid, Cell::new(0, 0), goal).unwrap();
        let result = search.run(|_| {}).unwrap();
        let path = result.path().unwrap();
        assert_eq!(search.g_score(goal), Some(path.length() as u32));
        assert_eq!(search.path().as_ref(), Some(path));
    }

    #[test]
    fn equal_start_goal() {
        let grid = grid_5x5();
        let cell = Cell::new(3, 1);
        let path = find(&grid, cell, cell).path().cloned().unwrap();
        assert_eq!(path.length(), 0);
        assert_eq!(path.cells(), &[cell]);
    }

    #[test]
    fn stepwise_bookkeeping() {
        let grid = grid_5x5();
        let start = Cell::new(2, 2);
        let goal = Cell::new(2, 4);
        let mut search = Search::new(&grid, start, goal).unwrap();
        assert_eq!(search.g_score(start), Some(0));
        assert_eq!(search.f_score(start), Some(2));
        assert_eq!(search.g_score(goal), None);
        assert!(search.is_open(start));

        assert_eq!(search.step().unwrap(), SearchStatus::Running);
        assert!(!search.is_open(start));
        // The start is never marked closed
        assert!(!search.is_closed(start));
        assert_eq!(search.open_cells().count(), 4);
        let right = Cell::new(2, 3);
        assert_eq!(search.g_score(right), Some(1));
        assert_eq!(search.f_score(right), Some(2));
        assert_eq!(search.came_from(right), Some(start));

        assert_eq!(search.step().unwrap(), SearchStatus::Running);
        assert!(search.is_closed(right));
        assert_eq!(search.closed().collect::<Vec<_>>(), vec![right]);

        assert_eq!(search.step().unwrap(), SearchStatus::Succeeded);
        assert_eq!(search.iterations(), 3);
        // Finished searches stay finished
        assert_eq!(search.step().unwrap(), SearchStatus::Succeeded);
        assert_eq!(search.path().unwrap().length(), 2);
    }

    /// Pending cells are queued exactly once, so the frontier and the open set stay in step.
    #[test]
    fn frontier_matches_open_set() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..300 {
            let mut grid = Grid::new(10).unwrap();
            for cell in grid.cells().collect::<Vec<_>>() {
                grid.set_obstacle(cell.row, cell.col, rng.gen_bool(0.3))
                    .unwrap();
            }
            let (start, goal) = (Cell::new(0, 0), Cell::new(9, 9));
            grid.set_obstacle(0, 0, false).unwrap();
            grid.set_obstacle(9, 9, false).unwrap();
            let mut search = Search::new(&grid, start, goal).unwrap();
            assert_eq!(search.frontier.len(), search.open_set.len());
            while search.step().unwrap() == SearchStatus::Running {
                assert_eq!(search.frontier.len(), search.open_set.len());
                assert!(search.open_cells().all(|c| !search.is_closed(c)));
            }
        }
    }

    #[test]
    fn on_step_sees_progress() {
        let grid = grid_5x5();
        let mut closed_counts = Vec::new();
        let result = search(&grid, Cell::new(0, 0), Cell::new(0, 3), |s| {
            closed_counts.push(s.closed().count());
            assert_eq!(s.status(), SearchStatus::Running);
            assert_eq!(s.grid().size(), 5);
        })
        .unwrap();
        assert!(result.is_found());
        // The first iteration expands the start, which is never closed
        assert_eq!(closed_counts, vec![0, 1, 2]);
    }

    #[test]
    fn rejects_invalid_endpoints() {
        let mut grid = grid_5x5();
        grid.set_obstacle(1, 1, true).unwrap();
        assert!(matches!(
            Search::new(&grid, Cell::new(0, 0), Cell::new(5, 0)),
            Err(Error::InvalidCell {
                reason: InvalidCellReason::OutOfBounds,
                ..
            })
        ));
        assert!(matches!(
            search(&grid, Cell::new(1, 1), Cell::new(0, 0), |_| {}),
            Err(Error::InvalidCell {
                reason: InvalidCellReason::Obstacle,
                ..
            })
        ));
    }

    #[test]
    fn iteration_limit_aborts() {
        let grid = Grid::new(10).unwrap();
        let mut search = Search::new(&grid, Cell::new(0, 0), Cell::new(9, 9)).unwrap();
        assert_eq!(
            search.run_bounded(3, |_| {}),
            Err(Error::IterationLimit { limit: 3 })
        );
        assert_eq!(search.iterations(), 3);
        let bound = search.iteration_bound();
        assert!(search.run_bounded(bound, |_| {}).unwrap().is_found());
    }

    #[test]
    fn uses_designated_endpoints() {
        let mut grid = grid_5x5();
        grid.set_start(4, 0).unwrap();
        grid.set_goal(0, 4).unwrap();
        let result = grid.run_search(|_| {}).unwrap();
        let path = result.path().unwrap();
        assert_eq!(path.start(), Cell::new(4, 0));
        assert_eq!(path.length(), 8);
    }
}
