// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door group assembly
//!
//! Flood-fills 4-connected door cells of equal orientation into groups,
//! places one 3D door box per group and collects the hole set that wall
//! extrusion must skip.

use crate::grid::Grid;
use crate::pathfinding::CellKey;
use crate::reconstruction::ReconstructionConfig;
use floorgrid_core::{Aabb, DoorOrientation, Point2};
use floorgrid_geometry::Point3;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a door cell's orientation is read from during grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrientationSource {
    /// Orientation stored on the cell by the door overlay
    #[default]
    Bbox,
    /// Re-derived from adjacent door cells, see [`infer_door_orientation`]
    NeighbourVote,
    /// Re-derived from the wall cells framing the door, see
    /// [`infer_orientation_from_walls`]
    WallVote,
}

/// Inclusive cell range covered by a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSpan {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl CellSpan {
    #[inline]
    pub fn rows(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.max_col - self.min_col + 1
    }
}

/// Connected door cells sharing one orientation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorGroup {
    /// Cells in discovery order, seed first
    pub cells: Vec<CellKey>,
    pub orientation: DoorOrientation,
}

impl DoorGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn span(&self) -> CellSpan {
        let mut span = CellSpan {
            min_row: usize::MAX,
            max_row: 0,
            min_col: usize::MAX,
            max_col: 0,
        };
        for &(r, c) in &self.cells {
            span.min_row = span.min_row.min(r);
            span.max_row = span.max_row.max(r);
            span.min_col = span.min_col.min(c);
            span.max_col = span.max_col.max(c);
        }
        span
    }
}

/// 3D box standing on the floor for one door group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorPlacement {
    /// Plan-space center
    pub center: Point2,
    /// Extent along the opening
    pub width: f64,
    /// Extent across the wall
    pub depth: f64,
    pub height: f64,
    pub orientation: DoorOrientation,
    pub cell_span: CellSpan,
}

impl DoorPlacement {
    /// Box center in 3D, plan X/Y with height along Z
    pub fn center_3d(&self) -> Point3<f64> {
        Point3::new(self.center.x, self.center.y, self.height / 2.0)
    }

    /// Plan footprint of the box
    pub fn footprint(&self) -> Aabb {
        let (half_x, half_y) = match self.orientation {
            DoorOrientation::Horizontal => (self.width / 2.0, self.depth / 2.0),
            DoorOrientation::Vertical => (self.depth / 2.0, self.width / 2.0),
        };
        Aabb::new(
            Point2::new(self.center.x - half_x, self.center.y - half_y),
            Point2::new(self.center.x + half_x, self.center.y + half_y),
        )
    }
}

/// Group door cells using their stored orientation
///
/// Cells without an orientation read as horizontal.
pub fn build_door_groups(grid: &Grid) -> Vec<DoorGroup> {
    build_door_groups_with(grid, OrientationSource::Bbox, 1)
}

/// Group door cells, dropping groups smaller than `min_cells`
pub fn build_door_groups_with(
    grid: &Grid,
    source: OrientationSource,
    min_cells: usize,
) -> Vec<DoorGroup> {
    let orientation_of = |r: usize, c: usize| -> DoorOrientation {
        match source {
            OrientationSource::Bbox => grid
                .cell(r, c)
                .and_then(|cell| cell.door_orientation)
                .unwrap_or(DoorOrientation::Horizontal),
            OrientationSource::NeighbourVote => infer_door_orientation(grid, r, c),
            OrientationSource::WallVote => infer_orientation_from_walls(grid, r, c),
        }
    };
    let is_door = |r: i64, c: i64| -> Option<CellKey> {
        grid.in_bounds(r, c)
            .filter(|&(r, c)| grid.cell(r, c).is_some_and(|cell| cell.is_door))
    };

    let mut visited = vec![vec![false; grid.cols()]; grid.rows()];
    let mut groups = Vec::new();
    let mut dropped = 0usize;

    for cell in grid.iter().filter(|cell| cell.is_door) {
        let seed = (cell.row, cell.col);
        if visited[seed.0][seed.1] {
            continue;
        }
        visited[seed.0][seed.1] = true;

        let orientation = orientation_of(seed.0, seed.1);
        let mut cells = vec![seed];
        let mut stack = vec![seed];

        while let Some((r, c)) = stack.pop() {
            let (r, c) = (r as i64, c as i64);
            for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let Some(next) = is_door(r + dr, c + dc) else {
                    continue;
                };
                if visited[next.0][next.1] || orientation_of(next.0, next.1) != orientation {
                    continue;
                }
                visited[next.0][next.1] = true;
                cells.push(next);
                stack.push(next);
            }
        }

        if cells.len() >= min_cells {
            groups.push(DoorGroup { cells, orientation });
        } else {
            dropped += 1;
        }
    }

    debug!(groups = groups.len(), dropped, ?source, "grouped door cells");
    groups
}

/// Vote on a door cell's orientation from its 4-neighbours
///
/// Counts door cells to the left and right against door cells above and
/// below. Horizontal wins only with a strictly larger count; ties, including
/// an isolated cell, resolve to vertical.
pub fn infer_door_orientation(grid: &Grid, row: usize, col: usize) -> DoorOrientation {
    let is_door = |r: Option<usize>, c: Option<usize>| -> usize {
        match (r, c) {
            (Some(r), Some(c)) => grid.cell(r, c).is_some_and(|cell| cell.is_door) as usize,
            _ => 0,
        }
    };

    let horizontal = is_door(Some(row), col.checked_sub(1)) + is_door(Some(row), col.checked_add(1));
    let vertical = is_door(row.checked_sub(1), Some(col)) + is_door(row.checked_add(1), Some(col));

    if horizontal > vertical {
        DoorOrientation::Horizontal
    } else {
        DoorOrientation::Vertical
    }
}

/// Vote on a door cell's orientation from the wall that frames it
///
/// Walks outward in each of the four directions across door cells and
/// counts a vote when the first non-door cell is a wall. Walls left and
/// right mean the door sits in a horizontal wall. Horizontal wins only with
/// a strictly larger count; ties resolve to vertical.
pub fn infer_orientation_from_walls(grid: &Grid, row: usize, col: usize) -> DoorOrientation {
    let framed_by_wall = |dr: i64, dc: i64| -> usize {
        let (mut r, mut c) = (row as i64, col as i64);
        loop {
            r += dr;
            c += dc;
            match grid.in_bounds(r, c).and_then(|(r, c)| grid.cell(r, c)) {
                Some(cell) if cell.is_door => continue,
                Some(cell) => return cell.is_wall as usize,
                None => return 0,
            }
        }
    };

    let horizontal = framed_by_wall(0, -1) + framed_by_wall(0, 1);
    let vertical = framed_by_wall(-1, 0) + framed_by_wall(1, 0);

    if horizontal > vertical {
        DoorOrientation::Horizontal
    } else {
        DoorOrientation::Vertical
    }
}

/// Size and position the door box for a group
///
/// The center is the midpoint of the group's corner cells. Along the
/// opening the box spans every covered cell; across it the box is
/// `door_depth_ratio` of one cell. Height is `wall_height * door_height_ratio`.
pub fn place_door(group: &DoorGroup, grid: &Grid, config: &ReconstructionConfig) -> DoorPlacement {
    let span = group.span();
    let origin = grid.origin();
    let (cw, ch) = (grid.cell_w(), grid.cell_h());

    let center = Point2::new(
        origin.x + ((span.min_col + span.max_col) as f64 / 2.0 + 0.5) * cw,
        origin.y + ((span.min_row + span.max_row) as f64 / 2.0 + 0.5) * ch,
    );

    let (width, depth) = match group.orientation {
        DoorOrientation::Horizontal => (span.cols() as f64 * cw, config.door_depth_ratio * ch),
        DoorOrientation::Vertical => (span.rows() as f64 * ch, config.door_depth_ratio * cw),
    };

    DoorPlacement {
        center,
        width,
        depth,
        height: config.wall_height * config.door_height_ratio,
        orientation: group.orientation,
        cell_span: span,
    }
}

/// Exact cells of every group; wall extrusion skips these
pub fn wall_extrusion_hole_set(groups: &[DoorGroup]) -> FxHashSet<CellKey> {
    groups
        .iter()
        .flat_map(|group| group.cells.iter().copied())
        .collect()
}
