use crate::Position;
use thiserror::Error;

/// Caller-input errors. All of them are detected before any search work starts;
/// an unreachable goal set is not an error but an empty [SearchResult](crate::SearchResult).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("position {position} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },
    #[error("start {0} is a wall")]
    InvalidStart(Position),
    #[error("goal {0} is a wall")]
    InvalidGoal(Position),
    #[error("goal set is empty")]
    NoGoals,
    #[error("cell {0} is a wall and has no value")]
    Impassable(Position),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

pub type Result<T> = std::result::Result<T, RouteError>;
