//! [Ant colony optimization](https://en.wikipedia.org/wiki/Ant_colony_optimization_algorithms)
//! over the cost grid.
//!
//! Every iteration releases a fixed number of ants from the start. Each ant walks without
//! revisiting cells, choosing the next cell with probability proportional to
//! `pheromone^alpha * eta^beta`, where `eta` is the inverse of the multi-source Dijkstra
//! distance to the nearest goal. Ants that get stuck die. Once all ants are done the pheromone
//! evaporates and every successful ant deposits `Q / cost` on each cell of its path.
//!
//! Walks within one iteration only read the grid, the distance table and the pheromone field,
//! so with the `parallel` feature they run on the rayon thread pool. Each ant draws from its own
//! generator seeded from the solver's generator in ant order, which keeps parallel and
//! sequential runs identical.
use crate::cost_grid::{CostGrid, GoalSet};
use crate::distance::DistanceTable;
use crate::error::{Result, RouteError};
use crate::pheromone::PheromoneField;
use crate::route::{Path, Route, SearchResult};
use crate::solver::RouteSolver;
use crate::{Direction, Position};
use fxhash::FxHashSet;
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use smallvec::SmallVec;

/// Heuristic weight given to a candidate cell that is itself at distance zero from a goal.
pub const GOAL_ADJACENT_ETA: f64 = 1e6;

/// Parameters of a colony run. The defaults are tuned for city-block sized evacuation maps.
#[derive(Clone, Debug, PartialEq)]
pub struct AntColonyConfig {
    /// Ants released per iteration
    pub ant_count: usize,
    /// Fixed iteration budget, there is no early stop
    pub iteration_count: usize,
    /// Pheromone exponent
    pub alpha: f64,
    /// Heuristic exponent
    pub beta: f64,
    /// Fraction of pheromone lost per iteration, in (0, 1)
    pub evaporation_rate: f64,
    /// Deposit constant Q
    pub deposit: f64,
}

impl Default for AntColonyConfig {
    fn default() -> Self {
        AntColonyConfig {
            ant_count: 100,
            iteration_count: 200,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.3,
            deposit: 100.0,
        }
    }
}

impl AntColonyConfig {
    #[must_use]
    pub fn with_ant_count(mut self, ant_count: usize) -> Self {
        self.ant_count = ant_count;
        self
    }
    #[must_use]
    pub fn with_iteration_count(mut self, iteration_count: usize) -> Self {
        self.iteration_count = iteration_count;
        self
    }
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }
    #[must_use]
    pub fn with_evaporation_rate(mut self, evaporation_rate: f64) -> Self {
        self.evaporation_rate = evaporation_rate;
        self
    }
    #[must_use]
    pub fn with_deposit(mut self, deposit: f64) -> Self {
        self.deposit = deposit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RouteError::InvalidConfiguration(msg));
        if self.ant_count == 0 {
            return invalid("ant count must be positive".to_owned());
        }
        if self.iteration_count == 0 {
            return invalid("iteration count must be positive".to_owned());
        }
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate < 1.0) {
            return invalid(format!(
                "evaporation rate {} is outside (0, 1)",
                self.evaporation_rate
            ));
        }
        for (name, exponent) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !(exponent >= 0.0 && exponent.is_finite()) {
                return invalid(format!("{} must be finite and non-negative, got {}", name, exponent));
            }
        }
        if !(self.deposit > 0.0 && self.deposit.is_finite()) {
            return invalid(format!(
                "deposit constant must be finite and positive, got {}",
                self.deposit
            ));
        }
        Ok(())
    }
}

/// Lifecycle of a colony run: `Initializing -> Iterating -> Converged | Exhausted`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColonyState {
    Initializing,
    Iterating,
    /// The budget was spent and at least one ant reached a goal.
    Converged,
    /// No ant ever reached a goal, or the start cannot reach any goal at all.
    Exhausted,
}

/// Progress passed to the observer after every iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
    /// 1-based
    pub iteration: usize,
    pub iteration_count: usize,
    pub best_cost: Option<u64>,
    pub best_goal: Option<Position>,
    /// Ants that reached a goal during this iteration
    pub successful_ants: usize,
}

/// Full result of [AntColonySolver::run].
#[derive(Clone, Debug, PartialEq)]
pub struct ColonyOutcome {
    pub route: SearchResult,
    pub state: ColonyState,
    pub iterations_run: usize,
}

type Observer = Box<dyn FnMut(&IterationReport)>;

/// The ant colony optimizer. Randomness comes from the injected generator `R`, so a seeded
/// generator reproduces the same best route.
pub struct AntColonySolver<R = StdRng> {
    config: AntColonyConfig,
    rng: R,
    observer: Option<Observer>,
    state: ColonyState,
}

impl AntColonySolver<StdRng> {
    /// Seeds the generator from OS entropy.
    pub fn new(config: AntColonyConfig) -> AntColonySolver<StdRng> {
        AntColonySolver::with_rng(config, StdRng::from_entropy())
    }
    pub fn seeded(config: AntColonyConfig, seed: u64) -> AntColonySolver<StdRng> {
        AntColonySolver::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AntColonySolver<R> {
    pub fn with_rng(config: AntColonyConfig, rng: R) -> AntColonySolver<R> {
        AntColonySolver {
            config,
            rng,
            observer: None,
            state: ColonyState::Initializing,
        }
    }

    /// Registers a callback invoked once per iteration. Observation only, it has no influence
    /// on the search.
    #[must_use]
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&IterationReport) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &AntColonyConfig {
        &self.config
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> ColonyState {
        self.state
    }

    /// Runs the colony for the configured number of iterations and returns the cheapest route
    /// any ant found. If the start cannot reach a goal no ant is released.
    pub fn run(
        &mut self,
        grid: &CostGrid,
        start: Position,
        goals: &[Position],
    ) -> Result<ColonyOutcome> {
        self.state = ColonyState::Initializing;
        self.config.validate()?;
        grid.check_start(start)?;
        let goal_set = grid.goal_set(goals)?;

        let heuristic = DistanceTable::compute(grid, goals)?;
        if heuristic.distance_at(grid.ix(start)).is_none() {
            info!("No goal is reachable from {}, skipping colony", start);
            self.state = ColonyState::Exhausted;
            return Ok(ColonyOutcome {
                route: None,
                state: self.state,
                iterations_run: 0,
            });
        }

        let AntColonyConfig {
            ant_count,
            iteration_count,
            alpha,
            beta,
            evaporation_rate,
            deposit,
        } = self.config;
        let colony = Colony {
            grid,
            goals: &goal_set,
            heuristic: &heuristic,
            alpha,
            beta,
        };
        let mut pheromone = PheromoneField::new(grid);
        let mut best: Option<Route> = None;
        info!(
            "Releasing {} ants for {} iterations from {}",
            ant_count, iteration_count, start
        );
        self.state = ColonyState::Iterating;

        for iteration in 1..=iteration_count {
            let seeds = (0..ant_count)
                .map(|_| self.rng.gen::<u64>())
                .collect::<Vec<_>>();
            let walks = colony
                .walk_all(&pheromone, start, &seeds)
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            let successful_ants = walks.len();
            reinforce(&mut pheromone, &walks, evaporation_rate, deposit)?;

            for walk in walks {
                if best.as_ref().map_or(true, |b| walk.cost < b.cost) {
                    best = Some(Route {
                        path: Path::new(walk.path),
                        goal: walk.goal,
                        cost: walk.cost,
                    });
                }
            }

            let report = IterationReport {
                iteration,
                iteration_count,
                best_cost: best.as_ref().map(|r| r.cost),
                best_goal: best.as_ref().map(|r| r.goal),
                successful_ants,
            };
            debug!(
                "Iteration {}/{}: {} successful ants, best cost {:?}",
                iteration, iteration_count, successful_ants, report.best_cost
            );
            if let Some(observer) = self.observer.as_mut() {
                observer(&report);
            }
        }

        self.state = match best {
            Some(ref route) => {
                debug_assert!(route.path.is_valid(grid));
                info!(
                    "Colony converged on {} with cost {} in {} moves",
                    route.goal,
                    route.cost,
                    route.path.hop_count()
                );
                ColonyState::Converged
            }
            None => {
                info!("No ant reached a goal in {} iterations", iteration_count);
                ColonyState::Exhausted
            }
        };
        Ok(ColonyOutcome {
            route: best,
            state: self.state,
            iterations_run: iteration_count,
        })
    }
}

impl<R: Rng> RouteSolver for AntColonySolver<R> {
    fn name(&self) -> &'static str {
        "ACO"
    }

    fn solve(
        &mut self,
        grid: &CostGrid,
        start: Position,
        goals: &[Position],
    ) -> Result<SearchResult> {
        self.run(grid, start, goals).map(|outcome| outcome.route)
    }
}

/// End of iteration update: evaporates the whole field once, then every successful walk adds
/// `deposit / cost` to each of its cells. A zero-cost walk deposits as if it cost 1.
fn reinforce(
    pheromone: &mut PheromoneField,
    walks: &[Walk],
    evaporation_rate: f64,
    deposit: f64,
) -> Result<()> {
    pheromone.evaporate(evaporation_rate)?;
    for walk in walks {
        pheromone.deposit(&walk.path, deposit / walk.cost.max(1) as f64)?;
    }
    Ok(())
}

/// A walk that reached a goal.
struct Walk {
    path: Vec<Position>,
    cost: u64,
    goal: Position,
}

/// Read-only inputs shared by every ant of a run.
struct Colony<'a> {
    grid: &'a CostGrid,
    goals: &'a GoalSet,
    heuristic: &'a DistanceTable,
    alpha: f64,
    beta: f64,
}

impl<'a> Colony<'a> {
    #[cfg(not(feature = "parallel"))]
    fn walk_all(&self, pheromone: &PheromoneField, start: Position, seeds: &[u64]) -> Vec<Option<Walk>> {
        seeds
            .iter()
            .map(|&seed| self.walk(pheromone, start, &mut StdRng::seed_from_u64(seed)))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn walk_all(&self, pheromone: &PheromoneField, start: Position, seeds: &[u64]) -> Vec<Option<Walk>> {
        seeds
            .par_iter()
            .map(|&seed| self.walk(pheromone, start, &mut StdRng::seed_from_u64(seed)))
            .collect()
    }

    /// Unnormalized probability of stepping into the cell at `ix`.
    fn desirability(&self, pheromone: &PheromoneField, ix: usize) -> f64 {
        let eta = match self.heuristic.distance_at(ix) {
            None => 0.0,
            Some(0) => GOAL_ADJACENT_ETA,
            Some(d) => (d as f64).recip().powf(self.beta),
        };
        pheromone.value_at(ix).powf(self.alpha) * eta
    }

    /// One ant from `start`. Returns `None` if the ant gets stuck before reaching a goal.
    fn walk<W: Rng>(&self, pheromone: &PheromoneField, start: Position, rng: &mut W) -> Option<Walk> {
        let grid = self.grid;
        let start_ix = grid.ix(start);
        let mut visited = FxHashSet::default();
        visited.insert(start_ix);
        let mut path = vec![start];
        let mut cost = u64::from(grid.cost_at(start_ix));
        let mut current = start;

        while !self.goals.contains(&current) {
            let mut order = Direction::CANONICAL;
            order.shuffle(rng);
            let candidates = grid
                .passable_neighbors_in(current, &order)
                .into_iter()
                .map(|n| grid.ix(n))
                .filter(|ix| !visited.contains(ix))
                .collect::<SmallVec<[usize; 4]>>();
            if candidates.is_empty() {
                return None;
            }
            let weights = candidates
                .iter()
                .map(|&ix| self.desirability(pheromone, ix))
                .collect::<SmallVec<[f64; 4]>>();
            let total: f64 = weights.iter().sum();
            if total == 0.0 || !total.is_finite() {
                return None;
            }
            let Ok(choice) = WeightedIndex::new(&weights) else {
                return None;
            };
            let next = candidates[choice.sample(rng)];
            visited.insert(next);
            cost += u64::from(grid.cost_at(next));
            current = grid.position_of(next);
            path.push(current);
        }
        Some(Walk {
            path,
            cost,
            goal: current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WALL;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    fn small_config() -> AntColonyConfig {
        AntColonyConfig::default()
            .with_ant_count(20)
            .with_iteration_count(15)
    }

    #[test]
    fn default_config_values() {
        let config = AntColonyConfig::default();
        assert_eq!(config.ant_count, 100);
        assert_eq!(config.iteration_count, 200);
        assert!((config.alpha - 1.0).abs() < 1e-12);
        assert!((config.beta - 2.0).abs() < 1e-12);
        assert!((config.evaporation_rate - 0.3).abs() < 1e-12);
        assert!((config.deposit - 100.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let grid = CostGrid::filled(2, 2, 1).unwrap();
        for config in [
            small_config().with_ant_count(0),
            small_config().with_iteration_count(0),
            small_config().with_evaporation_rate(0.0),
            small_config().with_evaporation_rate(1.0),
            small_config().with_alpha(-1.0),
            small_config().with_beta(f64::NAN),
            small_config().with_deposit(0.0),
        ] {
            let mut solver = AntColonySolver::seeded(config, 1);
            assert!(matches!(
                solver.run(&grid, p(0, 0), &[p(1, 1)]),
                Err(RouteError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn desirability_handles_zero_and_unreachable_distances() {
        // |G 1 # 1|
        let grid = CostGrid::new(vec![vec![1, 1, WALL, 1]]).unwrap();
        let goals = grid.goal_set(&[p(0, 0)]).unwrap();
        let heuristic = DistanceTable::compute(&grid, &[p(0, 0)]).unwrap();
        let colony = Colony {
            grid: &grid,
            goals: &goals,
            heuristic: &heuristic,
            alpha: 1.0,
            beta: 2.0,
        };
        let pheromone = PheromoneField::new(&grid);
        assert_eq!(colony.desirability(&pheromone, 0), GOAL_ADJACENT_ETA);
        assert!((colony.desirability(&pheromone, 1) - 1.0).abs() < 1e-12);
        assert_eq!(colony.desirability(&pheromone, 3), 0.0);
    }

    #[test]
    fn stuck_ant_dies() {
        // A dead-end corridor next to the start, the goal is across a wall.
        // |S 1 # G|
        let grid = CostGrid::new(vec![vec![1, 1, WALL, 1]]).unwrap();
        let goals = grid.goal_set(&[p(0, 3)]).unwrap();
        let heuristic = DistanceTable::compute(&grid, &[p(0, 3)]).unwrap();
        let colony = Colony {
            grid: &grid,
            goals: &goals,
            heuristic: &heuristic,
            alpha: 1.0,
            beta: 2.0,
        };
        let pheromone = PheromoneField::new(&grid);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(colony.walk(&pheromone, p(0, 0), &mut rng).is_none());
    }

    #[test]
    fn open_three_by_three() {
        let grid = CostGrid::filled(3, 3, 1).unwrap();
        let mut solver = AntColonySolver::seeded(small_config(), 42);
        let outcome = solver.run(&grid, p(0, 0), &[p(2, 2)]).unwrap();
        assert_eq!(outcome.state, ColonyState::Converged);
        assert_eq!(outcome.iterations_run, 15);
        let route = outcome.route.unwrap();
        assert_eq!(route.path.hop_count(), 4);
        assert_eq!(route.cost, 5);
        assert_eq!(route.goal, p(2, 2));
        assert!(route.path.is_valid(&grid));
    }

    #[test]
    fn start_on_goal() {
        let grid = CostGrid::filled(2, 2, 4).unwrap();
        let route = AntColonySolver::seeded(small_config(), 0)
            .solve(&grid, p(1, 1), &[p(1, 1)])
            .unwrap()
            .unwrap();
        assert_eq!(route.path.positions(), &[p(1, 1)]);
        assert_eq!(route.cost, 4);
    }

    #[test]
    fn zero_cost_grid_still_converges() {
        let grid = CostGrid::filled(3, 3, 0).unwrap();
        let route = AntColonySolver::seeded(small_config(), 9)
            .solve(&grid, p(0, 0), &[p(2, 2)])
            .unwrap()
            .unwrap();
        assert_eq!(route.cost, 0);
        assert!(route.path.is_valid(&grid));
    }

    #[test]
    fn unreachable_start_skips_iterations() {
        let grid = CostGrid::new(vec![vec![1, WALL, 1]]).unwrap();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut solver = AntColonySolver::seeded(small_config(), 5)
            .with_observer(move |_| *counter.borrow_mut() += 1);
        let outcome = solver.run(&grid, p(0, 0), &[p(0, 2)]).unwrap();
        assert_eq!(outcome.route, None);
        assert_eq!(outcome.state, ColonyState::Exhausted);
        assert_eq!(outcome.iterations_run, 0);
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(solver.state(), ColonyState::Exhausted);
    }

    #[test]
    fn observer_sees_every_iteration() {
        let grid = CostGrid::filled(4, 4, 2).unwrap();
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        let mut solver = AntColonySolver::seeded(small_config(), 11)
            .with_observer(move |r| sink.borrow_mut().push(r.clone()));
        let route = solver.solve(&grid, p(0, 0), &[p(3, 3)]).unwrap().unwrap();
        let reports = reports.borrow();
        assert_eq!(reports.len(), 15);
        assert_eq!(
            reports.iter().map(|r| r.iteration).collect::<Vec<_>>(),
            (1..=15).collect::<Vec<_>>()
        );
        // Best cost never gets worse
        let costs = reports.iter().filter_map(|r| r.best_cost).collect::<Vec<_>>();
        assert!(costs.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(reports.last().and_then(|r| r.best_cost), Some(route.cost));
    }

    #[test]
    fn reinforce_evaporates_then_sums_deposits() {
        let grid = CostGrid::filled(1, 3, 1).unwrap();
        let mut pheromone = PheromoneField::new(&grid);
        let walks = [
            Walk {
                path: vec![p(0, 0), p(0, 1)],
                cost: 2,
                goal: p(0, 1),
            },
            Walk {
                path: vec![p(0, 1), p(0, 2)],
                cost: 4,
                goal: p(0, 2),
            },
        ];
        reinforce(&mut pheromone, &walks, 0.5, 8.0).unwrap();
        // (1 - 0.5) * 1 + 8 / 2 + 8 / 4 on the shared cell
        assert_eq!(pheromone.value(p(0, 1)), Ok(6.5));
        assert_eq!(pheromone.value(p(0, 0)), Ok(4.5));
        assert_eq!(pheromone.value(p(0, 2)), Ok(2.5));

        let free = [Walk {
            path: vec![p(0, 2)],
            cost: 0,
            goal: p(0, 2),
        }];
        reinforce(&mut pheromone, &free, 0.5, 8.0).unwrap();
        assert_eq!(pheromone.value(p(0, 2)), Ok(9.25));
        assert_eq!(pheromone.value(p(0, 0)), Ok(2.25));
    }

    #[test]
    fn desirability_weights_pheromone_by_alpha() {
        // |G 1 1 # 1|
        let grid = CostGrid::new(vec![vec![1, 1, 1, WALL, 1]]).unwrap();
        let goals = grid.goal_set(&[p(0, 0)]).unwrap();
        let heuristic = DistanceTable::compute(&grid, &[p(0, 0)]).unwrap();
        let colony = Colony {
            grid: &grid,
            goals: &goals,
            heuristic: &heuristic,
            alpha: 0.5,
            beta: 2.0,
        };
        let mut pheromone = PheromoneField::new(&grid);
        pheromone.deposit(&[p(0, 1)], 3.0).unwrap();
        pheromone.deposit(&[p(0, 2)], 15.0).unwrap();
        // tau = 4^0.5, eta = (1/1)^2
        assert!((colony.desirability(&pheromone, 1) - 2.0).abs() < 1e-12);
        // tau = 16^0.5, eta = (1/2)^2
        assert!((colony.desirability(&pheromone, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn failed_run_resets_state() {
        let grid = CostGrid::filled(2, 2, 1).unwrap();
        let mut solver = AntColonySolver::seeded(small_config(), 4);
        solver.run(&grid, p(0, 0), &[p(1, 1)]).unwrap();
        assert_eq!(solver.state(), ColonyState::Converged);
        assert!(solver.run(&grid, p(0, 0), &[p(2, 2)]).is_err());
        assert_eq!(solver.state(), ColonyState::Initializing);
        assert_eq!(solver.config(), &small_config());
    }
}
