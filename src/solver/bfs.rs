use crate::cost_grid::CostGrid;
use crate::error::Result;
use crate::route::SearchResult;
use crate::solver::{traverse, RouteSolver};
use crate::{Direction, Position};
use std::collections::VecDeque;

/// Breadth-first search. Finds a route with the fewest moves, expanding neighbours in the
/// canonical order; cell costs only matter for the reported route cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct BfsSolver;

impl BfsSolver {
    pub fn new() -> BfsSolver {
        BfsSolver
    }
}

impl RouteSolver for BfsSolver {
    fn name(&self) -> &'static str {
        "BFS"
    }

    fn solve(
        &mut self,
        grid: &CostGrid,
        start: Position,
        goals: &[Position],
    ) -> Result<SearchResult> {
        traverse::<VecDeque<usize>, _>(self.name(), grid, start, goals, || Direction::CANONICAL)
    }
}
