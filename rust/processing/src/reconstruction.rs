// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door-aware solid reconstruction
//!
//! Turns a grid into extrudable solids: one box per remaining wall cell, one
//! box per door group, and a floor slab per room. Also exports the grid as a
//! per-cell height map for block previews.
//!
//! Meshes use plan X/Y with height along +Z.

use crate::door_groups::{
    build_door_groups_with, place_door, wall_extrusion_hole_set, DoorPlacement, OrientationSource,
};
use crate::error::Result;
use crate::grid::Grid;
use crate::pathfinding::{CellKey, PathResult};
use floorgrid_core::{FloorPlan, Point2, RoomPolygon};
use floorgrid_geometry::{box_mesh, extrude_polygon, Mesh, Point3};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Block heights for the sandbox height map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxHeights {
    pub wall: f64,
    pub door: f64,
    pub path: f64,
}

impl Default for SandboxHeights {
    fn default() -> Self {
        Self {
            wall: 50.0,
            door: 50.0,
            path: 30.0,
        }
    }
}

/// Solid reconstruction configuration, in world units
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub wall_height: f64,
    /// Door height as a fraction of `wall_height`
    pub door_height_ratio: f64,
    /// Door thickness as a fraction of one cell
    pub door_depth_ratio: f64,
    pub orientation_source: OrientationSource,
    /// Door groups with fewer cells are filled back in as wall
    pub min_group_cells: usize,
    /// Floor slab thickness, extruded downward from z = 0
    pub floor_thickness: f64,
    /// Margin around the plan for the single floor used when no rooms are given
    pub default_floor_margin: f64,
    pub sandbox: SandboxHeights,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            wall_height: 120.0,
            door_height_ratio: 0.98,
            door_depth_ratio: 0.8,
            orientation_source: OrientationSource::Bbox,
            min_group_cells: 1,
            floor_thickness: 1.0,
            default_floor_margin: 50.0,
            sandbox: SandboxHeights::default(),
        }
    }
}

/// Extrudable solids for one floor plan
#[derive(Debug, Clone, Serialize)]
pub struct SolidModel {
    /// Cells extruded as full-height wall boxes
    pub wall_blocks: Vec<CellKey>,
    pub doors: Vec<DoorPlacement>,
    /// Door cells excluded from wall extrusion
    #[serde(skip)]
    pub hole_set: FxHashSet<CellKey>,
    pub floors: Vec<RoomPolygon>,
    origin: Point2,
    cell_w: f64,
    cell_h: f64,
}

/// Meshes of a [`SolidModel`], split by element kind
#[derive(Debug, Clone, Default)]
pub struct SolidMeshes {
    pub walls: Mesh,
    pub doors: Mesh,
    pub floors: Mesh,
}

impl SolidMeshes {
    /// Everything in one mesh
    pub fn combined(&self) -> Mesh {
        let mut mesh = Mesh::with_capacity(
            self.walls.vertex_count() + self.doors.vertex_count() + self.floors.vertex_count(),
            self.walls.indices.len() + self.doors.indices.len() + self.floors.indices.len(),
        );
        mesh.merge(&self.walls);
        mesh.merge(&self.doors);
        mesh.merge(&self.floors);
        mesh
    }
}

impl SolidModel {
    /// World-space min corner of a wall block's footprint
    fn block_min(&self, (row, col): CellKey) -> Point2 {
        Point2::new(
            self.origin.x + col as f64 * self.cell_w,
            self.origin.y + row as f64 * self.cell_h,
        )
    }

    /// Extrude every solid, keeping walls, doors and floors apart
    ///
    /// A floor outline that cannot be triangulated is skipped with a warning.
    pub fn to_meshes(&self, config: &ReconstructionConfig) -> Result<SolidMeshes> {
        let mut meshes = SolidMeshes {
            walls: Mesh::with_capacity(self.wall_blocks.len() * 24, self.wall_blocks.len() * 36),
            doors: Mesh::with_capacity(self.doors.len() * 24, self.doors.len() * 36),
            floors: Mesh::new(),
        };

        for &key in &self.wall_blocks {
            let min = self.block_min(key);
            let block = box_mesh(
                Point3::new(min.x, min.y, 0.0),
                Point3::new(min.x + self.cell_w, min.y + self.cell_h, config.wall_height),
            )?;
            meshes.walls.merge(&block);
        }

        for door in &self.doors {
            let fp = door.footprint();
            let block = box_mesh(
                Point3::new(fp.min.x, fp.min.y, 0.0),
                Point3::new(fp.max.x, fp.max.y, door.height),
            )?;
            meshes.doors.merge(&block);
        }

        for (i, floor) in self.floors.iter().enumerate() {
            match extrude_polygon(floor.points(), -config.floor_thickness, config.floor_thickness) {
                Ok(slab) => meshes.floors.merge(&slab),
                Err(e) => warn!(floor = i, error = %e, "skipping floor slab"),
            }
        }

        Ok(meshes)
    }

    /// Extrude every solid into one mesh
    pub fn to_mesh(&self, config: &ReconstructionConfig) -> Result<Mesh> {
        Ok(self.to_meshes(config)?.combined())
    }
}

/// Build the solid model for a grid built from `plan`
///
/// Wall blocks are wall cells plus door cells left out of every kept group,
/// so undersized door groups are closed back up.
pub fn reconstruct(grid: &Grid, plan: &FloorPlan, config: &ReconstructionConfig) -> SolidModel {
    let groups = build_door_groups_with(grid, config.orientation_source, config.min_group_cells.max(1));
    let doors: Vec<DoorPlacement> = groups.iter().map(|g| place_door(g, grid, config)).collect();
    let hole_set = wall_extrusion_hole_set(&groups);

    let wall_blocks: Vec<CellKey> = grid
        .iter()
        .filter(|cell| cell.is_wall || cell.is_door)
        .map(|cell| (cell.row, cell.col))
        .filter(|key| !hole_set.contains(key))
        .collect();

    let floors = if plan.rooms.is_empty() {
        default_floor(plan, config.default_floor_margin)
            .into_iter()
            .collect()
    } else {
        plan.rooms.clone()
    };

    debug!(
        wall_blocks = wall_blocks.len(),
        doors = doors.len(),
        holes = hole_set.len(),
        floors = floors.len(),
        "reconstructed solids"
    );

    SolidModel {
        wall_blocks,
        doors,
        hole_set,
        floors,
        origin: grid.origin(),
        cell_w: grid.cell_w(),
        cell_h: grid.cell_h(),
    }
}

/// Rectangle around the plan extent, for plans without rooms
fn default_floor(plan: &FloorPlan, margin: f64) -> Option<RoomPolygon> {
    let extent = plan.extent();
    if !extent.is_valid() {
        return None;
    }
    let b = extent.padded(margin.max(0.0));
    RoomPolygon::new(vec![
        b.min,
        Point2::new(b.max.x, b.min.y),
        b.max,
        Point2::new(b.min.x, b.max.y),
    ])
}

/// What a sandbox cell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxKind {
    Wall,
    Door,
    Path,
    Empty,
}

/// One height map entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SandboxCell {
    pub row: usize,
    pub col: usize,
    pub kind: SandboxKind,
    pub height: f64,
}

/// Row-major per-cell heights
#[derive(Debug, Clone, Serialize)]
pub struct HeightMap {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<SandboxCell>,
}

impl HeightMap {
    pub fn get(&self, row: usize, col: usize) -> Option<&SandboxCell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }
}

/// Per-cell block heights: walls first, then doors, then path cells
pub fn sandbox_heightmap(
    grid: &Grid,
    path: Option<&PathResult>,
    config: &ReconstructionConfig,
) -> HeightMap {
    let on_path: FxHashSet<CellKey> = path
        .map(|p| p.cells.iter().copied().collect())
        .unwrap_or_default();
    let heights = &config.sandbox;

    let cells = grid
        .iter()
        .map(|cell| {
            let (kind, height) = if cell.is_wall {
                (SandboxKind::Wall, heights.wall)
            } else if cell.is_door {
                (SandboxKind::Door, heights.door)
            } else if on_path.contains(&(cell.row, cell.col)) {
                (SandboxKind::Path, heights.path)
            } else {
                (SandboxKind::Empty, 0.0)
            };
            SandboxCell {
                row: cell.row,
                col: cell.col,
                kind,
                height,
            }
        })
        .collect();

    HeightMap {
        rows: grid.rows(),
        cols: grid.cols(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::find_path;
    use approx::assert_relative_eq;
    use floorgrid_core::DoorOrientation;

    fn sample_grid() -> Grid {
        // Row 2 is a wall with a 3-cell door in the middle and a lone door cell at the end
        let mut grid = Grid::empty(Point2::new(0.0, 0.0), 5, 8, 1.0, 1.0);
        for col in 0..8 {
            grid.set_wall(2, col);
        }
        for col in 3..6 {
            grid.set_door(2, col, DoorOrientation::Horizontal);
        }
        grid.set_door(2, 7, DoorOrientation::Horizontal);
        grid
    }

    #[test]
    fn test_hole_set_excluded_from_walls() {
        let grid = sample_grid();
        let model = reconstruct(&grid, &FloorPlan::default(), &ReconstructionConfig::default());

        assert_eq!(model.doors.len(), 2);
        assert_eq!(model.hole_set.len(), 4);
        assert_eq!(model.wall_blocks.len(), 4);
        assert!(model.wall_blocks.iter().all(|k| !model.hole_set.contains(k)));
        assert!(model.floors.is_empty());
    }

    #[test]
    fn test_small_groups_are_walled_in() {
        let grid = sample_grid();
        let config = ReconstructionConfig {
            min_group_cells: 2,
            ..ReconstructionConfig::default()
        };
        let model = reconstruct(&grid, &FloorPlan::default(), &config);

        assert_eq!(model.doors.len(), 1);
        assert!(model.wall_blocks.contains(&(2, 7)));
        assert_eq!(model.wall_blocks.len(), 5);
    }

    #[test]
    fn test_mesh_counts() {
        let grid = sample_grid();
        let plan = FloorPlan::new(
            vec![],
            vec![],
            vec![RoomPolygon::new(vec![
                Point2::new(0.0, 0.0),
                Point2::new(8.0, 0.0),
                Point2::new(8.0, 2.0),
                Point2::new(0.0, 2.0),
            ])
            .unwrap()],
        );
        let config = ReconstructionConfig::default();
        let model = reconstruct(&grid, &plan, &config);
        let meshes = model.to_meshes(&config).unwrap();

        assert_eq!(meshes.walls.triangle_count(), 4 * 12);
        assert_eq!(meshes.doors.triangle_count(), 2 * 12);
        assert_eq!(meshes.floors.triangle_count(), 12);

        let (min, max) = meshes.walls.bounds();
        assert_relative_eq!(max.z, 120.0);
        assert_relative_eq!(min.y, 2.0);

        let combined = model.to_mesh(&config).unwrap();
        assert_eq!(combined.triangle_count(), 4 * 12 + 2 * 12 + 12);
        assert_relative_eq!(combined.bounds().0.z, -1.0);
    }

    #[test]
    fn test_default_floor_without_rooms() {
        let plan = FloorPlan::new(
            vec![floorgrid_core::WallSegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap()],
            vec![],
            vec![],
        );
        let grid = Grid::build(&plan, &Default::default()).grid;
        let model = reconstruct(&grid, &plan, &ReconstructionConfig::default());

        assert_eq!(model.floors.len(), 1);
        assert_relative_eq!(model.floors[0].area(), 110.0 * 100.0);
    }

    #[test]
    fn test_sandbox_heights() {
        let grid = sample_grid();
        let path = find_path(&grid, (0, 4), (4, 4)).unwrap();
        let map = sandbox_heightmap(&grid, Some(&path), &ReconstructionConfig::default());

        assert_eq!(map.cells.len(), 40);
        assert_eq!(map.get(2, 0).unwrap().kind, SandboxKind::Wall);
        assert_relative_eq!(map.get(2, 0).unwrap().height, 50.0);
        assert_eq!(map.get(2, 4).unwrap().kind, SandboxKind::Door);
        assert_eq!(map.get(0, 4).unwrap().kind, SandboxKind::Path);
        assert_relative_eq!(map.get(0, 4).unwrap().height, 30.0);
        assert_eq!(map.get(0, 0).unwrap().kind, SandboxKind::Empty);
        assert!(map.get(5, 0).is_none());

        let bare = sandbox_heightmap(&grid, None, &ReconstructionConfig::default());
        assert_eq!(bare.get(0, 4).unwrap().kind, SandboxKind::Empty);
    }
}
