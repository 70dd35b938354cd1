// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Occupancy grid
//!
//! A [`Grid`] discretizes a [`FloorPlan`] over its padded bounds. Building
//! runs four steps in order: bounds, resolution, wall rasterization and
//! door overlay. The result is rebuilt wholesale whenever the plan or the
//! resolution policy changes.

pub mod doors;
pub mod raster;
pub mod resolution;

pub use doors::{overlay_door, overlay_doors, DoorMatch};
pub use raster::{line_cells, rasterize_wall};
pub use resolution::{plan_bounds, select_resolution, Resolution, ResolutionSource};

use floorgrid_core::{Aabb, DoorOrientation, FloorPlan, Point2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the grid's row and column counts are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Door-calibrated when the plan has usable doors, aspect-ratio otherwise
    #[default]
    Adaptive,
    /// Explicit dimensions
    Fixed { rows: usize, cols: usize },
}

/// Grid builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World units added on every side of the plan extent
    pub padding: f64,
    pub resolution: ResolutionPolicy,
    /// Cells an average door should span
    pub target_door_cells: usize,
    /// Lower clamp for adaptive row/column counts
    pub min_cells: usize,
    /// Upper clamp for adaptive row/column counts
    pub max_cells: usize,
    /// Cells added on each side of a door window when nothing matched
    pub fallback_window: usize,
    /// Fallback radius as a multiple of the door's larger bbox side
    pub fallback_distance_factor: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            padding: 1.0,
            resolution: ResolutionPolicy::Adaptive,
            target_door_cells: 5,
            min_cells: 20,
            max_cells: 200,
            fallback_window: 2,
            fallback_distance_factor: 1.5,
        }
    }
}

/// One grid cell
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub is_wall: bool,
    pub is_door: bool,
    pub door_orientation: Option<DoorOrientation>,
    pub world_center: Point2,
}

impl GridCell {
    /// Doors are always passable, walls never
    #[inline]
    pub fn is_traversable(&self) -> bool {
        !self.is_wall || self.is_door
    }
}

/// Grid plus the per-door overlay report
#[derive(Debug, Clone)]
pub struct GridBuild {
    pub grid: Grid,
    pub resolution: Resolution,
    pub door_matches: Vec<DoorMatch>,
}

impl GridBuild {
    /// Doors that converted no cell even after the fallback search
    pub fn unmatched_doors(&self) -> impl Iterator<Item = &DoorMatch> + '_ {
        self.door_matches.iter().filter(|m| !m.is_matched())
    }
}

/// Row-major occupancy grid over a world-space rectangle
#[derive(Debug, Clone, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    origin: Point2,
    cell_w: f64,
    cell_h: f64,
    cells: Vec<Vec<GridCell>>,
}

impl Grid {
    /// Build the grid for a plan
    pub fn build(plan: &FloorPlan, config: &GridConfig) -> GridBuild {
        let bounds = plan_bounds(plan, config.padding);
        let resolution = select_resolution(&bounds, &plan.doors, config);

        let mut grid = Grid::empty(
            bounds.min,
            resolution.rows,
            resolution.cols,
            bounds.width() / resolution.cols as f64,
            bounds.height() / resolution.rows as f64,
        );

        let wall_cells: usize = plan
            .walls
            .iter()
            .map(|wall| rasterize_wall(&mut grid, wall))
            .sum();

        let door_matches = overlay_doors(&mut grid, &plan.doors, config);

        debug!(
            rows = grid.rows,
            cols = grid.cols,
            cell_w = grid.cell_w,
            cell_h = grid.cell_h,
            source = ?resolution.source,
            wall_cells,
            door_cells = grid.door_cell_count(),
            "built grid"
        );

        GridBuild {
            grid,
            resolution,
            door_matches,
        }
    }

    /// All-open grid with `rows x cols` cells of `cell_w x cell_h` starting at `origin`
    ///
    /// Zero dimensions are raised to one cell; non-positive cell sizes to one unit.
    pub fn empty(origin: Point2, rows: usize, cols: usize, cell_w: f64, cell_h: f64) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let cell_w = if cell_w > 0.0 && cell_w.is_finite() { cell_w } else { 1.0 };
        let cell_h = if cell_h > 0.0 && cell_h.is_finite() { cell_h } else { 1.0 };

        let cells = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| GridCell {
                        row,
                        col,
                        is_wall: false,
                        is_door: false,
                        door_orientation: None,
                        world_center: Point2::new(
                            origin.x + (col as f64 + 0.5) * cell_w,
                            origin.y + (row as f64 + 0.5) * cell_h,
                        ),
                    })
                    .collect()
            })
            .collect();

        Self {
            rows,
            cols,
            origin,
            cell_w,
            cell_h,
            cells,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn origin(&self) -> Point2 {
        self.origin
    }

    #[inline]
    pub fn cell_w(&self) -> f64 {
        self.cell_w
    }

    #[inline]
    pub fn cell_h(&self) -> f64 {
        self.cell_h
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.cells.get(row)?.get(col)
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut GridCell> {
        self.cells.get_mut(row)?.get_mut(col)
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells.iter().flatten()
    }

    /// Whether `(row, col)` exists and can be walked through
    #[inline]
    pub fn is_traversable(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(GridCell::is_traversable)
    }

    /// World-space rectangle covered by the grid
    pub fn world_bounds(&self) -> Aabb {
        Aabb::new(
            self.origin,
            Point2::new(
                self.origin.x + self.cols as f64 * self.cell_w,
                self.origin.y + self.rows as f64 * self.cell_h,
            ),
        )
    }

    /// Unclamped `(row, col)` of the cell containing `p`
    ///
    /// A point on the grid's far edge maps to the last row or column.
    pub fn cell_coords(&self, p: Point2) -> (i64, i64) {
        let fc = (p.x - self.origin.x) / self.cell_w;
        let fr = (p.y - self.origin.y) / self.cell_h;

        let snap = |f: f64, n: usize| -> i64 {
            let i = f.floor() as i64;
            if i == n as i64 && f <= n as f64 {
                i - 1
            } else {
                i
            }
        };

        (snap(fr, self.rows), snap(fc, self.cols))
    }

    /// Cell containing `p`, or `None` outside the grid
    pub fn world_to_cell(&self, p: Point2) -> Option<(usize, usize)> {
        if !p.is_finite() {
            return None;
        }
        let (row, col) = self.cell_coords(p);
        self.in_bounds(row, col)
    }

    /// Convert signed coordinates to an index pair if they lie inside the grid
    #[inline]
    pub fn in_bounds(&self, row: i64, col: i64) -> Option<(usize, usize)> {
        if row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols {
            Some((row as usize, col as usize))
        } else {
            None
        }
    }

    /// Mark a cell as wall, returning whether the cell exists
    pub fn set_wall(&mut self, row: usize, col: usize) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                cell.is_wall = true;
                true
            }
            None => false,
        }
    }

    /// Turn a cell into a door cell, returning whether the cell exists
    pub fn set_door(&mut self, row: usize, col: usize, orientation: DoorOrientation) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                cell.is_wall = false;
                cell.is_door = true;
                cell.door_orientation = Some(orientation);
                true
            }
            None => false,
        }
    }

    pub fn wall_cell_count(&self) -> usize {
        self.iter().filter(|c| c.is_wall).count()
    }

    pub fn door_cell_count(&self) -> usize {
        self.iter().filter(|c| c.is_door).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorgrid_core::{DoorOpening, WallSegment};

    #[test]
    fn test_empty_grid_centers() {
        let grid = Grid::empty(Point2::new(-1.0, 2.0), 3, 4, 0.5, 2.0);

        assert_eq!(grid.iter().count(), 12);
        let cell = grid.cell(2, 3).unwrap();
        assert_eq!(cell.world_center, Point2::new(-1.0 + 3.5 * 0.5, 2.0 + 2.5 * 2.0));
        assert!(grid.cell(3, 0).is_none());
    }

    #[test]
    fn test_world_to_cell() {
        let grid = Grid::empty(Point2::new(0.0, 0.0), 10, 10, 1.0, 1.0);

        assert_eq!(grid.world_to_cell(Point2::new(0.5, 3.2)), Some((3, 0)));
        assert_eq!(grid.world_to_cell(Point2::new(10.0, 10.0)), Some((9, 9)));
        assert_eq!(grid.world_to_cell(Point2::new(-0.1, 3.0)), None);
        assert_eq!(grid.world_to_cell(Point2::new(10.5, 3.0)), None);
    }

    #[test]
    fn test_build_carves_door_out_of_wall() {
        let plan = FloorPlan::new(
            vec![WallSegment::new(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)).unwrap()],
            vec![DoorOpening::from_corners([
                Point2::new(40.0, -1.0),
                Point2::new(50.0, -1.0),
                Point2::new(50.0, 1.0),
                Point2::new(40.0, 1.0),
            ])
            .unwrap()],
            vec![],
        );

        let build = Grid::build(&plan, &GridConfig::default());
        let grid = &build.grid;

        assert_eq!(build.resolution.source, ResolutionSource::DoorCalibrated);
        assert!(grid.door_cell_count() > 0);
        assert!(grid.wall_cell_count() > 0);
        assert!(build.door_matches[0].is_matched());
        assert_eq!(build.unmatched_doors().count(), 0);

        for cell in grid.iter().filter(|c| c.is_door) {
            assert_eq!(cell.door_orientation, Some(DoorOrientation::Horizontal));
        }
    }

    #[test]
    fn test_world_bounds_match_padded_extent() {
        let plan = FloorPlan::new(
            vec![WallSegment::new(Point2::new(3.0, 4.0), Point2::new(53.0, 29.0)).unwrap()],
            vec![],
            vec![],
        );
        let grid = Grid::build(&plan, &GridConfig::default()).grid;
        let bounds = grid.world_bounds();

        assert_relative_eq!(bounds.min.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.x, 54.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.y, 30.0, epsilon = 1e-9);
    }
}
