use crate::cost_grid::CostGrid;
use crate::error::Result;
use crate::Position;
use itertools::Itertools;
use std::ops::Deref;

/// An ordered sequence of cells from start to goal, both inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<Position>);

impl Path {
    pub fn new(positions: Vec<Position>) -> Path {
        Path(positions)
    }
    pub fn positions(&self) -> &[Position] {
        &self.0
    }
    pub fn into_inner(self) -> Vec<Position> {
        self.0
    }
    /// Number of moves, one less than the number of cells.
    pub fn hop_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
    pub fn start(&self) -> Option<Position> {
        self.0.first().copied()
    }
    pub fn end(&self) -> Option<Position> {
        self.0.last().copied()
    }

    /// Sum of the costs of every cell on the path, the start cell included.
    pub fn cost(&self, grid: &CostGrid) -> Result<u64> {
        self.0
            .iter()
            .map(|&p| grid.cost(p).map(u64::from))
            .sum()
    }

    /// Checks that the path is non-empty, passable, 4-connected and visits no cell twice.
    pub fn is_valid(&self, grid: &CostGrid) -> bool {
        !self.0.is_empty()
            && self.0.iter().all(|&p| grid.is_passable(p))
            && self.0.iter().tuple_windows().all(|(a, b)| a.is_adjacent(b))
            && self.0.iter().all_unique()
    }
}

impl Deref for Path {
    type Target = [Position];
    fn deref(&self) -> &[Position] {
        &self.0
    }
}

impl From<Vec<Position>> for Path {
    fn from(positions: Vec<Position>) -> Self {
        Path(positions)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A completed route: the path, which goal it reached and its entering-cost total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: Path,
    pub goal: Position,
    pub cost: u64,
}

impl Route {
    /// Builds a route to `goal`, costing `path` on `grid`.
    pub(crate) fn costed(path: Path, goal: Position, grid: &CostGrid) -> Result<Route> {
        let cost = path.cost(grid)?;
        Ok(Route { path, goal, cost })
    }
}

/// The outcome of one search: `None` when no goal can be reached.
pub type SearchResult = Option<Route>;
