//! Multi-source [Dijkstra](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm) expansion.
//!
//! All goals are seeded at cost zero and the search expands outward until the queue is empty,
//! so every reachable cell ends up with its cost-to-nearest-goal. Expanding outward into a cell
//! charges that cell's cost, so the distance at `p` is the cheapest sum of cell costs along a
//! route from `p` to a goal, counting `p` itself and leaving out the goal cell.
use crate::cost_grid::CostGrid;
use crate::error::{Result, RouteError};
use crate::{Direction, Position};
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use log::info;
use num_traits::Zero;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

struct SmallestCostHolder<K> {
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest node first
        other.cost.cmp(&self.cost)
    }
}

/// Expands from every source at once and returns the smallest known cost of each node reached.
/// Nodes are stored in discovery order, sources first.
pub fn dijkstra_multi_source<N, C, IS, FN, IN>(sources: IS, mut successors: FN) -> FxIndexMap<N, C>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    IS: IntoIterator<Item = N>,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
{
    let mut to_see = BinaryHeap::new();
    let mut costs: FxIndexMap<N, C> = FxIndexMap::default();
    for source in sources {
        let (index, _) = costs.insert_full(source, Zero::zero());
        to_see.push(SmallestCostHolder {
            cost: Zero::zero(),
            index,
        });
    }
    while let Some(SmallestCostHolder { cost, index }) = to_see.pop() {
        let successors = {
            let Some((node, &c)) = costs.get_index(index) else {
                continue;
            };
            // Stale heap entry, a cheaper route to this node was already expanded.
            if cost > c {
                continue;
            }
            successors(node)
        };
        for (successor, move_cost) in successors {
            let new_cost = cost + move_cost;
            let n;
            match costs.entry(successor) {
                Vacant(e) => {
                    n = e.index();
                    e.insert(new_cost);
                }
                Occupied(mut e) => {
                    if new_cost < *e.get() {
                        n = e.index();
                        e.insert(new_cost);
                    } else {
                        continue;
                    }
                }
            }
            to_see.push(SmallestCostHolder {
                cost: new_cost,
                index: n,
            });
        }
    }
    costs
}

/// Cost from every cell to its nearest goal. `None` marks a cell that cannot reach any goal
/// (walls included). Read-only once computed; one table per grid and goal set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceTable {
    rows: usize,
    cols: usize,
    distances: Vec<Option<u64>>,
}

impl DistanceTable {
    /// Runs the multi-source expansion from `goals`. Fails if the goal set is empty or any
    /// goal is out of bounds or a wall.
    pub fn compute(grid: &CostGrid, goals: &[Position]) -> Result<DistanceTable> {
        let goal_set = grid.goal_set(goals)?;
        let costs = dijkstra_multi_source(
            goal_set.iter().map(|&g| grid.ix(g)),
            |&ix| -> SmallVec<[(usize, u64); 4]> {
                grid.passable_neighbors_in(grid.position_of(ix), &Direction::CANONICAL)
                    .into_iter()
                    .map(|n| {
                        let n_ix = grid.ix(n);
                        (n_ix, u64::from(grid.cost_at(n_ix)))
                    })
                    .collect()
            },
        );
        let mut distances = vec![None; grid.len()];
        for (&ix, &cost) in &costs {
            distances[ix] = Some(cost);
        }
        info!(
            "Distance table from {} goal(s) covers {} of {} cells",
            goal_set.len(),
            costs.len(),
            grid.len()
        );
        Ok(DistanceTable {
            rows: grid.rows(),
            cols: grid.cols(),
            distances,
        })
    }

    /// Distance to the nearest goal, `None` if no goal can be reached from `pos`.
    pub fn distance(&self, pos: Position) -> Result<Option<u64>> {
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
        Ok(self.distances[pos.row as usize * self.cols + pos.col as usize])
    }

    #[inline]
    pub(crate) fn distance_at(&self, ix: usize) -> Option<u64> {
        self.distances[ix]
    }

    pub fn is_reachable(&self, pos: Position) -> bool {
        matches!(self.distance(pos), Ok(Some(_)))
    }

    /// Number of cells with a finite distance.
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WALL;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn generic_expansion_over_small_graph() {
        // 0 -> 1 (1), 0 -> 2 (4), 1 -> 2 (1), 2 -> 3 (1)
        let edges: Vec<Vec<(u8, u32)>> = vec![
            vec![(1, 1), (2, 4)],
            vec![(2, 1)],
            vec![(3, 1)],
            vec![],
        ];
        let costs = dijkstra_multi_source(vec![0u8], |&n| edges[n as usize].clone());
        assert_eq!(costs.get(&0u8), Some(&0));
        assert_eq!(costs.get(&1u8), Some(&1));
        assert_eq!(costs.get(&2u8), Some(&2));
        assert_eq!(costs.get(&3u8), Some(&3));

        let costs = dijkstra_multi_source(vec![0u8, 2], |&n| edges[n as usize].clone());
        assert_eq!(costs.get(&2u8), Some(&0));
        assert_eq!(costs.get(&3u8), Some(&1));
    }

    #[test]
    fn goals_have_zero_distance() {
        let grid = CostGrid::filled(4, 4, 3).unwrap();
        let goals = [p(0, 0), p(3, 3)];
        let table = DistanceTable::compute(&grid, &goals).unwrap();
        for g in goals {
            assert_eq!(table.distance(g), Ok(Some(0)));
        }
        assert_eq!(table.reachable_count(), 16);
    }

    #[test]
    fn charges_own_cost_but_not_goal() {
        // |1 5 1|
        // |1 # 1|
        // |1 1 G|
        let grid =
            CostGrid::new(vec![vec![1, 5, 1], vec![1, WALL, 1], vec![1, 1, 1]]).unwrap();
        let table = DistanceTable::compute(&grid, &[p(2, 2)]).unwrap();
        assert_eq!(table.distance(p(2, 1)), Ok(Some(1)));
        assert_eq!(table.distance(p(0, 0)), Ok(Some(4)));
        // (0,1) itself, then (0,2) and (1,2); the goal is free
        assert_eq!(table.distance(p(0, 1)), Ok(Some(7)));
        assert_eq!(table.distance(p(1, 1)), Ok(None));
    }

    #[test]
    fn line_distances_count_the_cell_itself() {
        // |1 5 G|
        let grid = CostGrid::new(vec![vec![1, 5, 1]]).unwrap();
        let table = DistanceTable::compute(&grid, &[p(0, 2)]).unwrap();
        assert_eq!(table.distance(p(0, 1)), Ok(Some(5)));
        assert_eq!(table.distance(p(0, 0)), Ok(Some(6)));
        assert_eq!(table.distance(p(0, 2)), Ok(Some(0)));
    }

    #[test]
    fn nearest_goal_wins() {
        let grid = CostGrid::filled(1, 7, 1).unwrap();
        let table = DistanceTable::compute(&grid, &[p(0, 0), p(0, 6)]).unwrap();
        let row = (0..7)
            .map(|c| table.distance(p(0, c)).unwrap().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(row, vec![0, 1, 2, 3, 2, 1, 0]);
    }

    #[test]
    fn separated_cells_are_unreachable() {
        let grid = CostGrid::new(vec![vec![1, WALL, 1]]).unwrap();
        let table = DistanceTable::compute(&grid, &[p(0, 2)]).unwrap();
        assert!(!table.is_reachable(p(0, 0)));
        assert!(table.is_reachable(p(0, 2)));
        assert!(table.distance(p(0, 3)).is_err());
    }

    #[test]
    fn rejects_invalid_goals() {
        let grid = CostGrid::new(vec![vec![1, WALL, 1]]).unwrap();
        assert_eq!(
            DistanceTable::compute(&grid, &[p(0, 1)]),
            Err(RouteError::InvalidGoal(p(0, 1)))
        );
        assert_eq!(
            DistanceTable::compute(&grid, &[]),
            Err(RouteError::NoGoals)
        );
    }
}
