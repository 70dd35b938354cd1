// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid bounds and resolution selection

use super::{GridConfig, ResolutionPolicy};
use floorgrid_core::{Aabb, DoorOpening, FloorPlan, Point2};
use serde::Serialize;
use tracing::debug;

/// Extent used for a plan with no walls and no doors
pub const FALLBACK_EXTENT: Aabb = Aabb::new(Point2::new(0.0, 0.0), Point2::new(100.0, 100.0));

/// Which policy produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    DoorCalibrated,
    AspectRatio,
    Fixed,
}

/// Chosen grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub rows: usize,
    pub cols: usize,
    pub source: ResolutionSource,
}

/// Plan extent padded on every side
///
/// Empty plans fall back to [`FALLBACK_EXTENT`]. A zero-width or zero-height
/// extent is widened to one unit so cells never collapse.
pub fn plan_bounds(plan: &FloorPlan, padding: f64) -> Aabb {
    let extent = plan.extent();
    let extent = if extent.is_valid() {
        extent
    } else {
        FALLBACK_EXTENT
    };
    let mut bounds = extent.padded(padding.max(0.0));

    if bounds.width() <= 0.0 {
        bounds.min.x -= 0.5;
        bounds.max.x += 0.5;
    }
    if bounds.height() <= 0.0 {
        bounds.min.y -= 0.5;
        bounds.max.y += 0.5;
    }

    bounds
}

/// Pick rows and columns for `bounds`
///
/// Door-calibrated when any door has a positive effective width: the average
/// width divided by `target_door_cells` gives the cell size, and each axis is
/// clamped to `min_cells..=max_cells`. Otherwise the longer axis gets
/// `max_cells` and the shorter follows the aspect ratio, floored at
/// `min_cells`.
pub fn select_resolution(bounds: &Aabb, doors: &[DoorOpening], config: &GridConfig) -> Resolution {
    if let ResolutionPolicy::Fixed { rows, cols } = config.resolution {
        return Resolution {
            rows: rows.max(1),
            cols: cols.max(1),
            source: ResolutionSource::Fixed,
        };
    }

    let min_cells = config.min_cells.max(1);
    let max_cells = config.max_cells.max(min_cells);
    let width = bounds.width();
    let height = bounds.height();

    if let Some(avg_width) = average_door_width(doors) {
        let cell = avg_width / config.target_door_cells.max(1) as f64;
        let fit = |span: f64| ((span / cell).round() as usize).clamp(min_cells, max_cells);

        let resolution = Resolution {
            rows: fit(height),
            cols: fit(width),
            source: ResolutionSource::DoorCalibrated,
        };
        debug!(avg_width, cell, rows = resolution.rows, cols = resolution.cols, "door-calibrated resolution");
        return resolution;
    }

    let aspect = width / height;
    let (rows, cols) = if aspect >= 1.0 {
        (((max_cells as f64 / aspect).floor() as usize).max(min_cells), max_cells)
    } else {
        (max_cells, ((max_cells as f64 * aspect).floor() as usize).max(min_cells))
    };

    Resolution {
        rows,
        cols,
        source: ResolutionSource::AspectRatio,
    }
}

/// Mean effective width over doors whose width is positive
fn average_door_width(doors: &[DoorOpening]) -> Option<f64> {
    let widths: Vec<f64> = doors
        .iter()
        .map(DoorOpening::effective_width)
        .filter(|w| *w > 0.0 && w.is_finite())
        .collect();

    if widths.is_empty() {
        None
    } else {
        Some(widths.iter().sum::<f64>() / widths.len() as f64)
    }
}
