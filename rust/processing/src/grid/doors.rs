// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door overlay
//!
//! Converts rasterized wall cells under each door's bounding box into door
//! cells. Doors that miss every wall (slightly misaligned vector data) get a
//! second, wider search around the door center. A door that still matches
//! nothing is reported, never dropped silently.

use super::{Grid, GridConfig};
use floorgrid_core::{Aabb, DoorOpening};
use serde::Serialize;
use tracing::{debug, warn};

/// Overlay outcome for one door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoorMatch {
    /// Index into the plan's door list
    pub door_index: usize,
    /// Wall cells turned into door cells by this door
    pub cells_converted: usize,
    /// Cells inside the bbox that an earlier door had already converted
    pub cells_shared: usize,
    /// Whether the widened fallback search ran
    pub used_fallback: bool,
}

impl DoorMatch {
    /// The door touched at least one wall or door cell
    #[inline]
    pub fn is_matched(&self) -> bool {
        self.cells_converted + self.cells_shared > 0
    }
}

/// Overlay every door in order
pub fn overlay_doors(grid: &mut Grid, doors: &[DoorOpening], config: &GridConfig) -> Vec<DoorMatch> {
    doors
        .iter()
        .enumerate()
        .map(|(i, door)| overlay_door(grid, i, door, config))
        .collect()
}

/// Overlay one door
pub fn overlay_door(
    grid: &mut Grid,
    door_index: usize,
    door: &DoorOpening,
    config: &GridConfig,
) -> DoorMatch {
    let bbox = door.bbox();
    let orientation = door.orientation();
    let (row_range, col_range) = cell_window(grid, &bbox);

    let mut result = DoorMatch {
        door_index,
        cells_converted: 0,
        cells_shared: 0,
        used_fallback: false,
    };

    for row in row_range.0..=row_range.1 {
        for col in col_range.0..=col_range.1 {
            let Some(cell) = grid.cell(row, col) else {
                continue;
            };
            if !bbox.contains(cell.world_center) {
                continue;
            }
            if cell.is_door {
                result.cells_shared += 1;
            } else if cell.is_wall {
                grid.set_door(row, col, orientation);
                result.cells_converted += 1;
            }
        }
    }

    if result.is_matched() {
        debug!(door = door_index, converted = result.cells_converted, ?orientation, "door overlaid");
        return result;
    }

    // Nothing under the bbox: widen the window and take nearby wall cells
    result.used_fallback = true;
    let window = config.fallback_window;
    let max_row = grid.rows() - 1;
    let max_col = grid.cols() - 1;
    let rows = (row_range.0.saturating_sub(window), (row_range.1 + window).min(max_row));
    let cols = (col_range.0.saturating_sub(window), (col_range.1 + window).min(max_col));

    let center = bbox.center();
    let max_distance = bbox.width().max(bbox.height()) * config.fallback_distance_factor;

    for row in rows.0..=rows.1 {
        for col in cols.0..=cols.1 {
            let Some(cell) = grid.cell(row, col) else {
                continue;
            };
            if cell.is_wall && !cell.is_door && cell.world_center.distance_to(&center) <= max_distance {
                grid.set_door(row, col, orientation);
                result.cells_converted += 1;
            }
        }
    }

    if result.is_matched() {
        debug!(door = door_index, converted = result.cells_converted, "door matched by fallback search");
    } else {
        warn!(
            door = door_index,
            center_x = center.x,
            center_y = center.y,
            "door could not be matched to a wall"
        );
    }

    result
}

/// Inclusive `(start, end)` row and column ranges covered by `bbox`, clamped to the grid
fn cell_window(grid: &Grid, bbox: &Aabb) -> ((usize, usize), (usize, usize)) {
    let (r0, c0) = grid.cell_coords(bbox.min);
    let (r1, c1) = grid.cell_coords(bbox.max);

    let clamp = |v: i64, n: usize| v.clamp(0, n as i64 - 1) as usize;

    (
        (clamp(r0, grid.rows()), clamp(r1, grid.rows())),
        (clamp(c0, grid.cols()), clamp(c1, grid.cols())),
    )
}
