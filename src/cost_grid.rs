use crate::error::{Result, RouteError};
use crate::{Direction, Position};
use core::fmt;
use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use log::info;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Cost value that marks an impassable cell.
pub const WALL: i32 = -1;

/// Deduplicated goal cells, kept in the order the caller listed them.
pub type GoalSet = IndexSet<Position, FxBuildHasher>;

/// [CostGrid] is the read-only evacuation map: a row-major matrix of non-negative traversal
/// costs where [WALL] marks a blocked cell. Connected components of passable cells are
/// computed once on construction using a [UnionFind] structure, so unreachable goal sets
/// can be detected without flood-filling.
#[derive(Clone, Debug)]
pub struct CostGrid {
    rows: usize,
    cols: usize,
    cells: Vec<i32>,
    components: UnionFind<usize>,
}

/// Positions are `i32` pairs, so each side must fit in an `i32`.
fn check_dimensions(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(RouteError::InvalidGrid("grid has no cells".to_owned()));
    }
    if i32::try_from(rows).is_err() || i32::try_from(cols).is_err() {
        return Err(RouteError::InvalidGrid(format!(
            "{}x{} grid exceeds the addressable size",
            rows, cols
        )));
    }
    Ok(())
}

impl CostGrid {
    /// Builds a grid from rows of cell values. Every row must have the same length, every
    /// value must be either a non-negative cost or [WALL], and at least one cell must be
    /// passable.
    pub fn new(rows: Vec<Vec<i32>>) -> Result<CostGrid> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        check_dimensions(n_rows, n_cols)?;
        let mut cells = Vec::with_capacity(n_rows * n_cols);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(RouteError::InvalidGrid(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    n_cols
                )));
            }
            for (c, value) in row.into_iter().enumerate() {
                if value < 0 && value != WALL {
                    return Err(RouteError::InvalidGrid(format!(
                        "cell ({}, {}) has cost {}",
                        r, c, value
                    )));
                }
                cells.push(value);
            }
        }
        if cells.iter().all(|&v| v == WALL) {
            return Err(RouteError::InvalidGrid("no passable cell".to_owned()));
        }
        let mut grid = CostGrid {
            rows: n_rows,
            cols: n_cols,
            cells,
            components: UnionFind::new(n_rows * n_cols),
        };
        grid.generate_components();
        Ok(grid)
    }

    /// A wall-free grid where every cell costs `cost`.
    pub fn filled(rows: usize, cols: usize, cost: u32) -> Result<CostGrid> {
        let value = i32::try_from(cost)
            .map_err(|_| RouteError::InvalidGrid(format!("cost {} does not fit", cost)))?;
        CostGrid::new(vec![vec![value; cols]; rows])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    /// Number of cells, walls included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols
    }
    /// False for walls and for positions outside the grid.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.ix(pos)] != WALL
    }
    pub fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(RouteError::OutOfBounds {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Cost of entering `pos`. Only defined for passable cells.
    pub fn cost(&self, pos: Position) -> Result<u32> {
        self.check_bounds(pos)?;
        match self.cells[self.ix(pos)] {
            WALL => Err(RouteError::Impassable(pos)),
            v => Ok(v as u32),
        }
    }

    /// In-bounds neighbours of `pos` in canonical order (up, right, down, left), walls included.
    pub fn neighbors(&self, pos: Position) -> Result<SmallVec<[Position; 4]>> {
        self.check_bounds(pos)?;
        Ok(Direction::CANONICAL
            .iter()
            .map(|&d| pos.step(d))
            .filter(|&p| self.in_bounds(p))
            .collect())
    }

    /// Neighbours of `pos` that can be moved into, in canonical order.
    pub fn passable_neighbors(&self, pos: Position) -> Result<SmallVec<[Position; 4]>> {
        self.check_bounds(pos)?;
        Ok(self.passable_neighbors_in(pos, &Direction::CANONICAL))
    }

    /// Passable neighbours of an in-bounds `pos`, expanded in the given direction order.
    pub(crate) fn passable_neighbors_in(
        &self,
        pos: Position,
        order: &[Direction],
    ) -> SmallVec<[Position; 4]> {
        order
            .iter()
            .map(|&d| pos.step(d))
            .filter(|&p| self.is_passable(p))
            .collect()
    }

    /// Row-major index of an in-bounds position.
    #[inline]
    pub(crate) fn ix(&self, pos: Position) -> usize {
        debug_assert!(self.in_bounds(pos));
        pos.row as usize * self.cols + pos.col as usize
    }
    #[inline]
    pub(crate) fn position_of(&self, ix: usize) -> Position {
        Position::new((ix / self.cols) as i32, (ix % self.cols) as i32)
    }
    /// Cost at a row-major index known to be passable.
    #[inline]
    pub(crate) fn cost_at(&self, ix: usize) -> u32 {
        debug_assert!(self.cells[ix] != WALL);
        self.cells[ix] as u32
    }

    /// Validates a search start: in bounds and not a wall.
    pub fn check_start(&self, start: Position) -> Result<()> {
        self.check_bounds(start)?;
        if self.is_passable(start) {
            Ok(())
        } else {
            Err(RouteError::InvalidStart(start))
        }
    }

    /// Validates and deduplicates a goal set. It must be non-empty and every goal must be an
    /// in-bounds, passable cell.
    pub fn goal_set(&self, goals: &[Position]) -> Result<GoalSet> {
        if goals.is_empty() {
            return Err(RouteError::NoGoals);
        }
        let mut set = GoalSet::with_capacity_and_hasher(goals.len(), FxBuildHasher::default());
        for &goal in goals {
            self.check_bounds(goal)?;
            if !self.is_passable(goal) {
                return Err(RouteError::InvalidGoal(goal));
            }
            set.insert(goal);
        }
        Ok(set)
    }

    /// Checks if `a` and `b` are passable and on the same connected component.
    pub fn reachable(&self, a: Position, b: Position) -> bool {
        self.is_passable(a)
            && self.is_passable(b)
            && self.components.equiv(self.ix(a), self.ix(b))
    }

    /// Checks if any of the goals is on the same connected component as the start.
    pub fn any_reachable<'a, I>(&self, start: Position, goals: I) -> bool
    where
        I: IntoIterator<Item = &'a Position>,
    {
        goals.into_iter().any(|g| self.reachable(start, *g))
    }

    /// Links up passable 4-neighbours into the same components.
    fn generate_components(&mut self) {
        info!(
            "Generating connected components for {}x{} grid",
            self.rows, self.cols
        );
        for ix in 0..self.cells.len() {
            if self.cells[ix] == WALL {
                continue;
            }
            let point = self.position_of(ix);
            for dir in [Direction::Right, Direction::Down] {
                let n = point.step(dir);
                if self.is_passable(n) {
                    let n_ix = self.ix(n);
                    self.components.union(ix, n_ix);
                }
            }
        }
    }
}

impl fmt::Display for CostGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line = row
                .iter()
                .map(|v| format!("{:>3}", v))
                .collect::<Vec<_>>()
                .join("");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
