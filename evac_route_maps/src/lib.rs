//! Loading and drawing of evacuation maps for [evac_route].
//!
//! A map file holds one grid row per line as whitespace-separated integers. Non-negative values
//! are traversal costs and `-1` marks a wall:
//!
//! ```text
//! 1 1 2 -1
//! 1 -1 1 1
//! ```
use evac_route::{CostGrid, Position, Route, RouteError};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("could not read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: `{token}` is not an integer cost")]
    Parse { line: usize, token: String },
    #[error(transparent)]
    Grid(#[from] RouteError),
}

/// Parses map text into a validated [CostGrid]. Blank lines are skipped.
pub fn parse_maze(text: &str) -> Result<CostGrid, MazeError> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<i32>().map_err(|_| MazeError::Parse {
                    line: i + 1,
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<i32>, MazeError>>()?;
        rows.push(row);
    }
    Ok(CostGrid::new(rows)?)
}

pub fn load_maze<P: AsRef<Path>>(path: P) -> Result<CostGrid, MazeError> {
    let text = fs::read_to_string(path)?;
    parse_maze(&text)
}

/// Draws the grid with a route on top: `#` wall, `.` open cell, `*` route, `S` start,
/// `G` the goal that was reached and `g` every other goal.
pub fn render_ascii(
    grid: &CostGrid,
    route: Option<&Route>,
    start: Position,
    goals: &[Position],
) -> String {
    let mut out = String::with_capacity((grid.cols() + 1) * grid.rows());
    for r in 0..grid.rows() as i32 {
        for c in 0..grid.cols() as i32 {
            let p = Position::new(r, c);
            let symbol = if p == start {
                'S'
            } else if route.is_some_and(|route| route.goal == p) {
                'G'
            } else if goals.contains(&p) {
                'g'
            } else if route.is_some_and(|route| route.path.contains(&p)) {
                '*'
            } else if grid.is_passable(p) {
                '.'
            } else {
                '#'
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}
