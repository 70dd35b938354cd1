// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration
//!
//! Every stage's settings in one serde document. Missing keys fall back to
//! their defaults, so `{}` is a valid configuration.

use crate::error::{Error, Result};
use crate::grid::{GridConfig, ResolutionPolicy};
use crate::pathfinding::AStarConfig;
use crate::reconstruction::ReconstructionConfig;
use crate::visibility::VisibilityConfig;
use floorgrid_core::InputConfig;
use serde::{Deserialize, Serialize};

/// Settings for all pipeline stages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub grid: GridConfig,
    pub search: AStarConfig,
    pub visibility: VisibilityConfig,
    pub reconstruction: ReconstructionConfig,
}

impl PipelineConfig {
    /// Parse from JSON, then validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(floorgrid_core::Error::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the stages cannot work with
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if !(grid.padding >= 0.0 && grid.padding.is_finite()) {
            return Err(invalid(format!("grid.padding must be >= 0, got {}", grid.padding)));
        }
        if grid.target_door_cells == 0 {
            return Err(invalid("grid.target_door_cells must be at least 1"));
        }
        if grid.min_cells == 0 {
            return Err(invalid("grid.min_cells must be at least 1"));
        }
        if grid.min_cells > grid.max_cells {
            return Err(invalid(format!(
                "grid.min_cells ({}) exceeds grid.max_cells ({})",
                grid.min_cells, grid.max_cells
            )));
        }
        if let ResolutionPolicy::Fixed { rows, cols } = grid.resolution {
            if rows == 0 || cols == 0 {
                return Err(invalid(format!("fixed resolution {rows}x{cols} has no cells")));
            }
        }
        if !(grid.fallback_distance_factor >= 0.0) {
            return Err(invalid("grid.fallback_distance_factor must be >= 0"));
        }

        if self.search.max_iterations == Some(0) {
            return Err(invalid("search.max_iterations must be at least 1 when set"));
        }

        if !(self.visibility.radius > 0.0) {
            return Err(invalid(format!(
                "visibility.radius must be positive, got {}",
                self.visibility.radius
            )));
        }

        if !(self.input.legacy_door_depth > 0.0) {
            return Err(invalid("input.legacy_door_depth must be positive"));
        }

        let r = &self.reconstruction;
        for (name, value) in [
            ("wall_height", r.wall_height),
            ("door_height_ratio", r.door_height_ratio),
            ("door_depth_ratio", r.door_depth_ratio),
            ("floor_thickness", r.floor_thickness),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(format!("reconstruction.{name} must be positive, got {value}")));
            }
        }
        if !(r.default_floor_margin >= 0.0) {
            return Err(invalid("reconstruction.default_floor_margin must be >= 0"));
        }
        for (name, value) in [
            ("wall", r.sandbox.wall),
            ("door", r.sandbox.door),
            ("path", r.sandbox.path),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(format!("reconstruction.sandbox.{name} must be >= 0")));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}
