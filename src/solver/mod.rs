use crate::cost_grid::{CostGrid, GoalSet};
use crate::error::Result;
use crate::route::{Path, Route, SearchResult};
use crate::{Direction, Position};
use log::{info, warn};
use std::collections::VecDeque;

pub mod aco;
pub mod bfs;
pub mod dfs;

/// Marks the search root in a predecessor table.
pub(crate) const NO_PARENT: usize = usize::MAX;

/// A routing strategy. Every call validates its inputs eagerly: the start must be an in-bounds
/// passable cell and the goal set must be non-empty with only passable cells. Reaching no goal
/// is `Ok(None)`.
pub trait RouteSolver {
    fn name(&self) -> &'static str;

    fn solve(
        &mut self,
        grid: &CostGrid,
        start: Position,
        goals: &[Position],
    ) -> Result<SearchResult>;
}

/// Walks a predecessor table back from `end` and returns the path from the root to `end`.
pub(crate) fn reverse_path(grid: &CostGrid, parents: &[usize], end: usize) -> Path {
    let mut path: Vec<Position> = std::iter::successors(Some(end), |&ix| {
        Some(parents[ix]).filter(|&parent| parent != NO_PARENT)
    })
    .map(|ix| grid.position_of(ix))
    .collect();
    path.reverse();
    Path::new(path)
}

/// Storage discipline of an uninformed search.
pub(crate) trait Frontier: Default {
    fn push(&mut self, ix: usize);
    fn pop(&mut self) -> Option<usize>;
}

/// First in, first out: breadth-first.
impl Frontier for VecDeque<usize> {
    fn push(&mut self, ix: usize) {
        self.push_back(ix);
    }
    fn pop(&mut self) -> Option<usize> {
        self.pop_front()
    }
}

/// Last in, first out: depth-first.
impl Frontier for Vec<usize> {
    fn push(&mut self, ix: usize) {
        Vec::push(self, ix);
    }
    fn pop(&mut self) -> Option<usize> {
        Vec::pop(self)
    }
}

/// Uninformed search from `start` that stops as soon as a cell taken off the frontier is a
/// goal. Cells are marked visited when they are pushed, so each one enters the frontier once.
/// `order` yields the direction order used to expand each cell.
fn frontier_search<F, O>(
    grid: &CostGrid,
    start: Position,
    goals: &GoalSet,
    mut order: O,
) -> Option<(Path, Position)>
where
    F: Frontier,
    O: FnMut() -> [Direction; 4],
{
    let mut frontier = F::default();
    let mut visited = vec![false; grid.len()];
    let mut parents = vec![NO_PARENT; grid.len()];
    let start_ix = grid.ix(start);
    visited[start_ix] = true;
    frontier.push(start_ix);
    while let Some(ix) = frontier.pop() {
        let pos = grid.position_of(ix);
        if goals.contains(&pos) {
            return Some((reverse_path(grid, &parents, ix), pos));
        }
        for n in grid.passable_neighbors_in(pos, &order()) {
            let n_ix = grid.ix(n);
            if !visited[n_ix] {
                visited[n_ix] = true;
                parents[n_ix] = ix;
                frontier.push(n_ix);
            }
        }
    }
    None
}

/// Shared driver for BFS and DFS: validation, the connected-component shortcut, the search
/// itself and costing of the found path.
pub(crate) fn traverse<F, O>(
    name: &str,
    grid: &CostGrid,
    start: Position,
    goals: &[Position],
    order: O,
) -> Result<SearchResult>
where
    F: Frontier,
    O: FnMut() -> [Direction; 4],
{
    grid.check_start(start)?;
    let goal_set = grid.goal_set(goals)?;
    if !grid.any_reachable(start, &goal_set) {
        info!("{}: no goal is reachable from {}", name, start);
        return Ok(None);
    }
    info!(
        "{}: a goal is reachable from {}, computing path",
        name, start
    );
    match frontier_search::<F, O>(grid, start, &goal_set, order) {
        Some((path, goal)) => {
            let route = Route::costed(path, goal, grid)?;
            debug_assert!(route.path.is_valid(grid));
            info!(
                "{}: reached {} in {} moves at cost {}",
                name,
                goal,
                route.path.hop_count(),
                route.cost
            );
            Ok(Some(route))
        }
        None => {
            warn!(
                "{}: reachable goal could not be pathed to from {}, are the components correct?",
                name, start
            );
            Ok(None)
        }
    }
}
