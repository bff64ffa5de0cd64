//! # grid_astar
//!
//! Shortest paths on a square, 4-connected grid using
//! [A* search](https://en.wikipedia.org/wiki/A*_search_algorithm) with the
//! [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) as heuristic. All moves
//! cost the same. The search can be advanced one expansion at a time, which lets a caller draw
//! the open and closed cells in between iterations.
//!
//! Equal priorities in the frontier are resolved by insertion order, so repeated searches on
//! the same grid return the same path.
//!
//! ```
//! use grid_astar::{build_grid, SearchResult};
//!
//! let mut grid = build_grid(5, 500).unwrap();
//! grid.set_start(0, 0).unwrap();
//! grid.set_goal(4, 4).unwrap();
//! for row in 0..4 {
//!     grid.set_obstacle(row, 2, true).unwrap();
//! }
//! let result = grid.run_search(|_| {}).unwrap();
//! match result {
//!     SearchResult::Found(path) => assert_eq!(path.length(), 8),
//!     SearchResult::NotFound => unreachable!(),
//! }
//! ```
pub mod error;
pub mod frontier;
pub mod grid;
pub mod heuristic;
pub mod path;
pub mod search;

pub use error::{Error, InvalidCellReason, Result};
pub use grid::{build_grid, Cell, CellState, Grid};
pub use path::{Path, PathReconstructor};
pub use search::{search, Search, SearchResult, SearchStatus};

/// Cost of moving between two orthogonally adjacent cells.
pub const EDGE_COST: u32 = 1;
