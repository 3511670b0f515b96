use crate::cost_grid::CostGrid;
use crate::error::Result;
use crate::route::SearchResult;
use crate::solver::{traverse, RouteSolver};
use crate::{Direction, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Direction order in which the depth-first search pushes neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NeighborOrder {
    /// Up, right, down, left for every cell. Because the frontier is a stack the last pushed
    /// neighbour (left) is explored first.
    #[default]
    Canonical,
    /// A fresh random permutation per expanded cell, drawn from the solver's generator.
    Shuffled,
}

/// Depth-first search. Returns some valid route if one exists; neither the number of moves nor
/// the cost is minimised. Which route comes out depends on the configured [NeighborOrder].
#[derive(Clone, Debug)]
pub struct DfsSolver<R = StdRng> {
    order: NeighborOrder,
    rng: R,
}

impl DfsSolver<StdRng> {
    /// Canonical neighbour order.
    pub fn new() -> DfsSolver<StdRng> {
        DfsSolver {
            order: NeighborOrder::Canonical,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Default for DfsSolver<StdRng> {
    fn default() -> Self {
        DfsSolver::new()
    }
}

impl<R: Rng> DfsSolver<R> {
    /// Shuffled neighbour order drawn from `rng`.
    pub fn shuffled(rng: R) -> DfsSolver<R> {
        DfsSolver {
            order: NeighborOrder::Shuffled,
            rng,
        }
    }
    pub fn with_order(order: NeighborOrder, rng: R) -> DfsSolver<R> {
        DfsSolver { order, rng }
    }
    pub fn order(&self) -> NeighborOrder {
        self.order
    }
}

impl<R: Rng> RouteSolver for DfsSolver<R> {
    fn name(&self) -> &'static str {
        "DFS"
    }

    fn solve(
        &mut self,
        grid: &CostGrid,
        start: Position,
        goals: &[Position],
    ) -> Result<SearchResult> {
        let name = self.name();
        let DfsSolver { order, rng } = self;
        let order = *order;
        traverse::<Vec<usize>, _>(name, grid, start, goals, || {
            let mut dirs = Direction::CANONICAL;
            if order == NeighborOrder::Shuffled {
                dirs.shuffle(&mut *rng);
            }
            dirs
        })
    }
}
