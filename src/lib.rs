//! # evac_route
//!
//! Evacuation routing on a weighted 4-connected grid. A search starts at one cell and
//! ends at the nearest of several goal cells (exits, shelters), avoiding walls.
//!
//! Three strategies are provided, all behind the [RouteSolver] trait:
//! - [BfsSolver]: [breadth-first search](https://en.wikipedia.org/wiki/Breadth-first_search),
//!   minimal number of moves, cell costs are ignored during the search.
//! - [DfsSolver]: depth-first search, any route at all, no optimality guarantee.
//! - [AntColonySolver]: [ant colony optimization](https://en.wikipedia.org/wiki/Ant_colony_optimization_algorithms)
//!   biased by a multi-source Dijkstra [DistanceTable]. Best effort, bounded by a fixed iteration budget.
//!
//! Costs follow an entering-cost model: a route pays the cost of every cell it occupies,
//! including the start cell.
pub mod cost_grid;
pub mod distance;
pub mod error;
pub mod pheromone;
pub mod route;
pub mod solver;

pub use cost_grid::{CostGrid, GoalSet, WALL};
pub use distance::DistanceTable;
pub use error::{Result, RouteError};
pub use pheromone::PheromoneField;
pub use route::{Path, Route, SearchResult};
pub use solver::aco::{AntColonyConfig, AntColonySolver, ColonyOutcome, ColonyState, IterationReport};
pub use solver::bfs::BfsSolver;
pub use solver::dfs::{DfsSolver, NeighborOrder};
pub use solver::RouteSolver;

use core::fmt;

/// A `(row, col)` cell coordinate, 0-indexed. Signed so that positions just off the grid
/// can be represented and rejected with [RouteError::OutOfBounds].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Position {
        Position { row, col }
    }
    pub fn step(&self, dir: Direction) -> Position {
        let (dr, dc) = dir.offset();
        Position::new(self.row + dr, self.col + dc)
    }
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
    /// True for the four orthogonal neighbours only.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Position::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal move directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// The canonical expansion order: up, right, down, left.
    pub const CANONICAL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// `(delta_row, delta_col)` of a single move.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_offsets() {
        let origin = Position::new(1, 1);
        let stepped = Direction::CANONICAL
            .iter()
            .map(|&d| origin.step(d))
            .collect::<Vec<_>>();
        assert_eq!(
            stepped,
            vec![
                Position::new(0, 1),
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(1, 0)
            ]
        );
    }

    #[test]
    fn adjacency_is_orthogonal() {
        let p = Position::new(2, 2);
        assert!(p.is_adjacent(&Position::new(1, 2)));
        assert!(!p.is_adjacent(&Position::new(1, 1)));
        assert!(!p.is_adjacent(&p));
    }
}
