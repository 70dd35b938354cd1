// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A* search over the occupancy grid
//!
//! 8-connected movement. A cell blocks only when it is a wall and not a
//! door. With [`DiagonalCost::Uniform`] (the default) every move costs 1 and
//! the heuristic is Manhattan distance; diagonal moves are therefore not
//! penalized, and since Manhattan distance can overestimate the remaining
//! cost under that metric, returned paths are short but not guaranteed
//! minimal. [`DiagonalCost::Euclidean`] charges √2 per diagonal move and uses
//! the octile heuristic, which is admissible and yields optimal paths.

use crate::grid::Grid;
use floorgrid_core::Point2;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Grid cell key `(row, col)`
pub type CellKey = (usize, usize);

/// Cost charged for diagonal moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalCost {
    /// Every move costs 1; Manhattan heuristic
    #[default]
    Uniform,
    /// Diagonal moves cost √2; octile heuristic
    Euclidean,
}

/// A* configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AStarConfig {
    pub diagonal_cost: DiagonalCost,
    /// Allow a diagonal step past one blocked orthogonal neighbour. A step
    /// between two blocked orthogonal neighbours is never taken.
    pub allow_corner_cutting: bool,
    /// Give up after expanding this many nodes; `None` searches the whole grid
    pub max_iterations: Option<usize>,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            diagonal_cost: DiagonalCost::Uniform,
            allow_corner_cutting: true,
            max_iterations: None,
        }
    }
}

/// A found path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Cells from start to goal, both inclusive
    pub cells: Vec<CellKey>,
    /// Sum of move costs
    pub cost: f64,
    /// Nodes expanded by the search
    pub nodes_explored: usize,
}

impl PathResult {
    /// Number of cells on the path
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell centers in world units
    pub fn world_points(&self, grid: &Grid) -> Vec<Point2> {
        self.cells
            .iter()
            .filter_map(|&(r, c)| grid.cell(r, c).map(|cell| cell.world_center))
            .collect()
    }
}

/// Reason a search produced no path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathFailure {
    /// Start or goal lies outside the grid
    OutOfBounds,
    /// Start cell is a wall
    StartBlocked,
    /// Goal cell is a wall
    GoalBlocked,
    /// Open set emptied without reaching the goal
    NoPath,
    /// Node budget exhausted
    MaxIterationsExceeded,
}

/// Search result with failure diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub path: Option<PathResult>,
    pub failure: Option<PathFailure>,
    pub nodes_explored: usize,
}

impl SearchOutcome {
    fn failed(reason: PathFailure, nodes_explored: usize) -> Self {
        Self {
            path: None,
            failure: Some(reason),
            nodes_explored,
        }
    }

    pub fn into_path(self) -> Option<PathResult> {
        self.path
    }
}

#[derive(Debug, Clone)]
struct Node {
    cell: CellKey,
    g_cost: f64,
    f_cost: f64,
}

impl Eq for Node {}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other.f_cost.total_cmp(&self.f_cost)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* planner bound to one grid
pub struct AStarPlanner<'a> {
    grid: &'a Grid,
    config: AStarConfig,
}

impl<'a> AStarPlanner<'a> {
    pub fn new(grid: &'a Grid, config: AStarConfig) -> Self {
        Self { grid, config }
    }

    pub fn with_defaults(grid: &'a Grid) -> Self {
        Self::new(grid, AStarConfig::default())
    }

    /// Search from `start` to `goal`
    pub fn search(&self, start: CellKey, goal: CellKey) -> SearchOutcome {
        let grid = self.grid;

        if grid.cell(start.0, start.1).is_none() || grid.cell(goal.0, goal.1).is_none() {
            debug!(?start, ?goal, "path search failed: out of bounds");
            return SearchOutcome::failed(PathFailure::OutOfBounds, 0);
        }
        if !grid.is_traversable(start.0, start.1) {
            debug!(?start, "path search failed: start blocked");
            return SearchOutcome::failed(PathFailure::StartBlocked, 0);
        }
        if !grid.is_traversable(goal.0, goal.1) {
            debug!(?goal, "path search failed: goal blocked");
            return SearchOutcome::failed(PathFailure::GoalBlocked, 0);
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set: FxHashSet<CellKey> = FxHashSet::default();
        let mut came_from: FxHashMap<CellKey, CellKey> = FxHashMap::default();
        let mut g_scores: FxHashMap<CellKey, f64> = FxHashMap::default();

        open_set.push(Node {
            cell: start,
            g_cost: 0.0,
            f_cost: self.heuristic(start, goal),
        });
        g_scores.insert(start, 0.0);

        let mut nodes_explored = 0;

        while let Some(current) = open_set.pop() {
            if current.cell == goal {
                let path = reconstruct_path(&came_from, goal);
                debug!(
                    cells = path.len(),
                    cost = current.g_cost,
                    nodes_explored,
                    "path found"
                );
                return SearchOutcome {
                    path: Some(PathResult {
                        cells: path,
                        cost: current.g_cost,
                        nodes_explored,
                    }),
                    failure: None,
                    nodes_explored,
                };
            }

            if !closed_set.insert(current.cell) {
                continue;
            }

            nodes_explored += 1;
            if self.config.max_iterations.is_some_and(|max| nodes_explored > max) {
                debug!(nodes_explored, "path search failed: iteration budget exhausted");
                return SearchOutcome::failed(PathFailure::MaxIterationsExceeded, nodes_explored);
            }

            for (neighbor, move_cost) in self.neighbors(current.cell) {
                if closed_set.contains(&neighbor) {
                    continue;
                }

                let tentative_g = current.g_cost + move_cost;
                let known_g = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < known_g {
                    came_from.insert(neighbor, current.cell);
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(Node {
                        cell: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + self.heuristic(neighbor, goal),
                    });
                }
            }
        }

        debug!(?start, ?goal, nodes_explored, "no path found");
        SearchOutcome::failed(PathFailure::NoPath, nodes_explored)
    }

    /// Search between the cells containing two world points
    pub fn search_world(&self, start: Point2, goal: Point2) -> SearchOutcome {
        match (self.grid.world_to_cell(start), self.grid.world_to_cell(goal)) {
            (Some(s), Some(g)) => self.search(s, g),
            _ => SearchOutcome::failed(PathFailure::OutOfBounds, 0),
        }
    }

    /// Traversable 8-neighbours with their move costs
    fn neighbors(&self, (row, col): CellKey) -> SmallVec<[(CellKey, f64); 8]> {
        const DIRECTIONS: [(i64, i64); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1),
        ];

        let grid = self.grid;
        let open = |r: i64, c: i64| {
            grid.in_bounds(r, c)
                .is_some_and(|(r, c)| grid.is_traversable(r, c))
        };

        let (r, c) = (row as i64, col as i64);
        let mut out = SmallVec::new();

        for (i, (dr, dc)) in DIRECTIONS.iter().enumerate() {
            let Some(next) = grid.in_bounds(r + dr, c + dc) else {
                continue;
            };
            if !grid.is_traversable(next.0, next.1) {
                continue;
            }

            let diagonal = i >= 4;
            if diagonal {
                let side_a = open(r + dr, c);
                let side_b = open(r, c + dc);
                // Two blocked orthogonals form a closed 8-connected seam
                let squeezed = !side_a && !side_b;
                if squeezed || (!self.config.allow_corner_cutting && !(side_a && side_b)) {
                    trace!(from = ?(row, col), to = ?next, squeezed, "corner cut rejected");
                    continue;
                }
            }

            let cost = match (diagonal, self.config.diagonal_cost) {
                (true, DiagonalCost::Euclidean) => std::f64::consts::SQRT_2,
                _ => 1.0,
            };
            out.push((next, cost));
        }

        out
    }

    fn heuristic(&self, from: CellKey, to: CellKey) -> f64 {
        let dr = from.0.abs_diff(to.0) as f64;
        let dc = from.1.abs_diff(to.1) as f64;

        match self.config.diagonal_cost {
            DiagonalCost::Uniform => dr + dc,
            DiagonalCost::Euclidean => {
                let (lo, hi) = if dr < dc { (dr, dc) } else { (dc, dr) };
                lo * std::f64::consts::SQRT_2 + (hi - lo)
            }
        }
    }
}

fn reconstruct_path(came_from: &FxHashMap<CellKey, CellKey>, goal: CellKey) -> Vec<CellKey> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

/// Find a path with the default configuration
pub fn find_path(grid: &Grid, start: CellKey, goal: CellKey) -> Option<PathResult> {
    AStarPlanner::with_defaults(grid).search(start, goal).into_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn open_grid(n: usize) -> Grid {
        Grid::empty(Point2::new(0.0, 0.0), n, n, 1.0, 1.0)
    }

    #[test]
    fn test_diagonal_path_on_open_grid() {
        let grid = open_grid(10);
        let path = find_path(&grid, (0, 0), (9, 9)).unwrap();

        assert_eq!(path.len(), 10);
        assert_relative_eq!(path.cost, 9.0);
        assert_eq!(path.cells.first(), Some(&(0, 0)));
        assert_eq!(path.cells.last(), Some(&(9, 9)));
        assert!(path.nodes_explored >= 9);
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = open_grid(3);
        let path = find_path(&grid, (1, 1), (1, 1)).unwrap();
        assert_eq!(path.cells, vec![(1, 1)]);
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn test_euclidean_cost() {
        let grid = open_grid(10);
        let config = AStarConfig {
            diagonal_cost: DiagonalCost::Euclidean,
            ..AStarConfig::default()
        };
        let path = AStarPlanner::new(&grid, config).search((0, 0), (3, 5)).into_path().unwrap();

        assert_relative_eq!(path.cost, 3.0 * std::f64::consts::SQRT_2 + 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_failure_reasons() {
        let mut grid = open_grid(5);
        grid.set_wall(0, 0);
        grid.set_wall(4, 4);
        let planner = AStarPlanner::with_defaults(&grid);

        assert_eq!(planner.search((0, 0), (2, 2)).failure, Some(PathFailure::StartBlocked));
        assert_eq!(planner.search((2, 2), (4, 4)).failure, Some(PathFailure::GoalBlocked));
        assert_eq!(planner.search((2, 2), (5, 0)).failure, Some(PathFailure::OutOfBounds));

        let limited = AStarPlanner::new(
            &grid,
            AStarConfig {
                max_iterations: Some(1),
                ..AStarConfig::default()
            },
        );
        assert_eq!(
            limited.search((1, 1), (3, 3)).failure,
            Some(PathFailure::MaxIterationsExceeded)
        );
    }

    #[test]
    fn test_door_cells_are_passable() {
        let mut grid = open_grid(5);
        for row in 0..5 {
            grid.set_wall(row, 2);
        }
        assert!(find_path(&grid, (2, 0), (2, 4)).is_none());

        grid.set_door(4, 2, floorgrid_core::DoorOrientation::Vertical);
        let path = find_path(&grid, (2, 0), (2, 4)).unwrap();
        assert!(path.cells.contains(&(4, 2)));
    }

    #[test]
    fn test_corner_cutting() {
        // One wall at (0,1) beside the diagonal (0,0)->(1,1)
        let mut grid = open_grid(3);
        grid.set_wall(0, 1);

        assert_eq!(find_path(&grid, (0, 0), (1, 1)).unwrap().len(), 2);

        let strict = AStarPlanner::new(
            &grid,
            AStarConfig {
                allow_corner_cutting: false,
                ..AStarConfig::default()
            },
        );
        let path = strict.search((0, 0), (1, 1)).into_path().unwrap();
        assert_eq!(path.cells, vec![(0, 0), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_diagonal_between_two_walls_is_never_taken() {
        let mut grid = open_grid(3);
        grid.set_wall(0, 1);
        grid.set_wall(1, 0);

        let outcome = AStarPlanner::with_defaults(&grid).search((0, 0), (1, 1));
        assert!(outcome.path.is_none());
        assert_eq!(outcome.failure, Some(PathFailure::NoPath));
    }
}
