use crate::cost_grid::CostGrid;
use crate::error::{Result, RouteError};
use crate::Position;

const INITIAL_PHEROMONE: f64 = 1.0;

/// Per-cell desirability used by the ant colony. Every passable cell starts at 1, walls hold 0
/// and are never read. Reinforcement goes to cells, not to transitions between them.
#[derive(Clone, Debug, PartialEq)]
pub struct PheromoneField {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
    passable: Vec<bool>,
}

impl PheromoneField {
    pub fn new(grid: &CostGrid) -> PheromoneField {
        let passable = (0..grid.len())
            .map(|ix| grid.is_passable(grid.position_of(ix)))
            .collect::<Vec<_>>();
        let values = passable
            .iter()
            .map(|&open| if open { INITIAL_PHEROMONE } else { 0.0 })
            .collect();
        PheromoneField {
            rows: grid.rows(),
            cols: grid.cols(),
            values,
            passable,
        }
    }

    fn checked_ix(&self, pos: Position) -> Result<usize> {
        if pos.row < 0
            || pos.col < 0
            || pos.row as usize >= self.rows
            || pos.col as usize >= self.cols
        {
            return Err(RouteError::OutOfBounds {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let ix = pos.row as usize * self.cols + pos.col as usize;
        if self.passable[ix] {
            Ok(ix)
        } else {
            Err(RouteError::Impassable(pos))
        }
    }

    pub fn value(&self, pos: Position) -> Result<f64> {
        self.checked_ix(pos).map(|ix| self.values[ix])
    }

    #[inline]
    pub(crate) fn value_at(&self, ix: usize) -> f64 {
        self.values[ix]
    }

    /// Multiplies every value by `1 - rate`. `rate` must lie strictly between 0 and 1.
    pub fn evaporate(&mut self, rate: f64) -> Result<()> {
        if !(rate > 0.0 && rate < 1.0) {
            return Err(RouteError::InvalidConfiguration(format!(
                "evaporation rate {} is outside (0, 1)",
                rate
            )));
        }
        let keep = 1.0 - rate;
        self.values.iter_mut().for_each(|v| *v *= keep);
        Ok(())
    }

    /// Adds `amount` to every cell of `path`. Nothing is applied if any cell is invalid.
    pub fn deposit(&mut self, path: &[Position], amount: f64) -> Result<()> {
        if !(amount >= 0.0 && amount.is_finite()) {
            return Err(RouteError::InvalidConfiguration(format!(
                "deposit amount {} must be finite and non-negative",
                amount
            )));
        }
        let indices = path
            .iter()
            .map(|&p| self.checked_ix(p))
            .collect::<Result<Vec<_>>>()?;
        for ix in indices {
            self.values[ix] += amount;
        }
        Ok(())
    }
}
