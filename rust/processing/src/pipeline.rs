// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline facade
//!
//! Runs the stages in order: grid build (bounds, resolution, walls, doors),
//! wall–door reconciliation, then solid reconstruction. Path search and
//! visibility are on-demand queries against the built grid or plan.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::grid::{DoorMatch, Grid, GridBuild, Resolution};
use crate::pathfinding::{AStarPlanner, CellKey, PathResult, SearchOutcome};
use crate::reconcile::subtract_doors;
use crate::reconstruction::{reconstruct, sandbox_heightmap, HeightMap, SolidModel};
use crate::visibility::{visibility_for_plan, VisibilityPolygon};
use floorgrid_core::{parse_floor_plan, FloorPlan, ParsedPlan, Point2, WallSegment};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Non-fatal problem found while processing a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A door touched no wall cell, even after the fallback search
    NoWallOverlap { door_index: usize },
}

/// Everything a full run produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub grid: Grid,
    pub resolution: Resolution,
    pub door_matches: Vec<DoorMatch>,
    /// Walls with door spans removed, used for line of sight
    pub open_walls: Vec<WallSegment>,
    pub solids: SolidModel,
    pub warnings: Vec<PipelineWarning>,
}

/// Configured floor plan processor
#[derive(Debug, Clone)]
pub struct FloorPlanPipeline {
    config: PipelineConfig,
}

impl FloorPlanPipeline {
    /// Create a pipeline, rejecting inconsistent configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read a plan document with this pipeline's input settings
    pub fn parse(&self, json: &str) -> Result<ParsedPlan> {
        Ok(parse_floor_plan(json, &self.config.input)?)
    }

    pub fn build_grid(&self, plan: &FloorPlan) -> GridBuild {
        Grid::build(plan, &self.config.grid)
    }

    /// Walls with every door span cut out
    pub fn open_walls(&self, plan: &FloorPlan) -> Vec<WallSegment> {
        subtract_doors(&plan.walls, &plan.doors)
    }

    /// Visible region around `observer`
    pub fn visibility(&self, plan: &FloorPlan, observer: Point2) -> VisibilityPolygon {
        visibility_for_plan(plan, observer, &self.config.visibility)
    }

    /// Search between two cells
    pub fn find_path(&self, grid: &Grid, start: CellKey, goal: CellKey) -> SearchOutcome {
        AStarPlanner::new(grid, self.config.search.clone()).search(start, goal)
    }

    /// Search between the cells containing two world points
    pub fn find_path_world(&self, grid: &Grid, start: Point2, goal: Point2) -> SearchOutcome {
        AStarPlanner::new(grid, self.config.search.clone()).search_world(start, goal)
    }

    pub fn reconstruct(&self, grid: &Grid, plan: &FloorPlan) -> SolidModel {
        reconstruct(grid, plan, &self.config.reconstruction)
    }

    /// Per-cell block heights, optionally raising a path
    pub fn sandbox(&self, grid: &Grid, path: Option<&PathResult>) -> HeightMap {
        sandbox_heightmap(grid, path, &self.config.reconstruction)
    }

    /// Build the grid, reconcile walls and reconstruct solids
    pub fn run(&self, plan: &FloorPlan) -> PipelineOutput {
        let GridBuild {
            grid,
            resolution,
            door_matches,
        } = self.build_grid(plan);

        let warnings: Vec<PipelineWarning> = door_matches
            .iter()
            .filter(|m| !m.is_matched())
            .map(|m| PipelineWarning::NoWallOverlap {
                door_index: m.door_index,
            })
            .collect();
        if !warnings.is_empty() {
            warn!(unmatched = warnings.len(), doors = plan.doors.len(), "doors without wall overlap");
        }

        let open_walls = self.open_walls(plan);
        let solids = self.reconstruct(&grid, plan);

        debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            open_walls = open_walls.len(),
            wall_blocks = solids.wall_blocks.len(),
            doors = solids.doors.len(),
            "pipeline run complete"
        );

        PipelineOutput {
            grid,
            resolution,
            door_matches,
            open_walls,
            solids,
            warnings,
        }
    }

    /// Run independent plans in parallel
    pub fn process_batch(&self, plans: &[FloorPlan]) -> Vec<PipelineOutput> {
        info!(plans = plans.len(), "processing batch");
        plans.par_iter().map(|plan| self.run(plan)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorgrid_core::DoorOpening;

    fn corridor() -> FloorPlan {
        let wall = |x0, y0, x1, y1| WallSegment::new(Point2::new(x0, y0), Point2::new(x1, y1)).unwrap();
        FloorPlan::new(
            vec![wall(0.0, 0.0, 60.0, 0.0), wall(0.0, 20.0, 60.0, 20.0), wall(30.0, 0.0, 30.0, 20.0)],
            vec![DoorOpening::from_corners([
                Point2::new(29.0, 8.0),
                Point2::new(31.0, 8.0),
                Point2::new(31.0, 12.0),
                Point2::new(29.0, 12.0),
            ])
            .unwrap()],
            vec![],
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.grid.max_cells = 1;
        assert!(FloorPlanPipeline::new(config).is_err());
    }

    #[test]
    fn test_run_matches_door_and_splits_wall() {
        let pipeline = FloorPlanPipeline::new(PipelineConfig::default()).unwrap();
        let plan = corridor();

        let output = pipeline.run(&plan);

        assert!(output.warnings.is_empty());
        assert!(output.door_matches[0].is_matched());
        assert_eq!(output.open_walls.len(), 4);
        assert_eq!(output.solids.doors.len(), 1);
        assert!(output.grid.door_cell_count() > 0);
    }

    #[test]
    fn test_run_reports_stray_door() {
        let pipeline = FloorPlanPipeline::new(PipelineConfig::default()).unwrap();
        let mut plan = corridor();
        plan.doors.push(
            DoorOpening::from_corners([
                Point2::new(10.0, 9.0),
                Point2::new(12.0, 9.0),
                Point2::new(12.0, 11.0),
                Point2::new(10.0, 11.0),
            ])
            .unwrap(),
        );

        let output = pipeline.run(&plan);
        assert_eq!(output.warnings, vec![PipelineWarning::NoWallOverlap { door_index: 1 }]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let pipeline = FloorPlanPipeline::new(PipelineConfig::default()).unwrap();
        let plans = vec![corridor(), FloorPlan::default(), corridor()];

        let outputs = pipeline.process_batch(&plans);

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].grid.rows(), outputs[2].grid.rows());
        assert_eq!(outputs[1].grid.wall_cell_count(), 0);
    }

    #[test]
    fn test_path_through_door() {
        let pipeline = FloorPlanPipeline::new(PipelineConfig::default()).unwrap();
        let plan = corridor();
        let grid = pipeline.build_grid(&plan).grid;

        let outcome = pipeline.find_path_world(&grid, Point2::new(10.0, 10.0), Point2::new(50.0, 10.0));
        let path = outcome.path.expect("door keeps the rooms connected");
        assert!(path.cells.iter().any(|&(r, c)| grid.cell(r, c).unwrap().is_door));
    }
}
