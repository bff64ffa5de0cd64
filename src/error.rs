use thiserror::Error;

/// Why a coordinate was rejected by the grid or the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidCellReason {
    OutOfBounds,
    IsStart,
    IsGoal,
    Obstacle,
}

impl std::fmt::Display for InvalidCellReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            InvalidCellReason::OutOfBounds => "out of bounds",
            InvalidCellReason::IsStart => "already the start",
            InvalidCellReason::IsGoal => "already the goal",
            InvalidCellReason::Obstacle => "an obstacle",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cell ({row}, {col}) is {reason}")]
    InvalidCell {
        row: usize,
        col: usize,
        reason: InvalidCellReason,
    },
    #[error("cannot build a grid of {rows} rows over a width of {width}")]
    InvalidDimensions { rows: usize, width: u32 },
    /// Popping an empty frontier. The engine checks emptiness first, so this indicates a bug.
    #[error("popped from an empty frontier")]
    EmptyFrontier,
    #[error("grid has no designated start and goal")]
    MissingEndpoint,
    #[error("search aborted after {limit} iterations")]
    IterationLimit { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
