// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # floorgrid Processing
//!
//! Occupancy grid, A* search, visibility and door-aware solid reconstruction
//! for 2D floor plans.
//!
//! ## Overview
//!
//! - [`grid`]: rasterizes walls and overlays doors onto a resolution-adaptive grid
//! - [`pathfinding`]: 8-connected A* over the grid
//! - [`reconcile`] and [`visibility`]: door-aware line of sight by ray casting
//! - [`door_groups`] and [`reconstruction`]: door boxes, wall blocks and floor slabs
//! - [`pipeline`]: configured facade running the stages in order
//!
//! ## Quick Start
//!
//! ```rust
//! use floorgrid_processing::{FloorPlanPipeline, PipelineConfig};
//!
//! let pipeline = FloorPlanPipeline::new(PipelineConfig::default())?;
//! let parsed = pipeline.parse(r#"{
//!     "walls": [{ "position": [[0, 0], [40, 0], [40, 30], [0, 30], [0, 0]] }],
//!     "doors": [{ "bbox": [[18, -1], [22, -1], [22, 1], [18, 1]] }]
//! }"#)?;
//!
//! let output = pipeline.run(&parsed.plan);
//! assert!(output.warnings.is_empty());
//! assert_eq!(output.solids.doors.len(), 1);
//! # Ok::<(), floorgrid_processing::Error>(())
//! ```

pub mod config;
pub mod door_groups;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod pipeline;
pub mod reconcile;
pub mod reconstruction;
pub mod visibility;

pub use config::PipelineConfig;
pub use door_groups::{
    build_door_groups, build_door_groups_with, infer_door_orientation,
    infer_orientation_from_walls, place_door, wall_extrusion_hole_set, CellSpan, DoorGroup, DoorPlacement, OrientationSource,
};
pub use error::{Error, Result};
pub use grid::{
    DoorMatch, Grid, GridBuild, GridCell, GridConfig, Resolution, ResolutionPolicy,
    ResolutionSource,
};
pub use pathfinding::{
    find_path, AStarConfig, AStarPlanner, CellKey, DiagonalCost, PathFailure, PathResult,
    SearchOutcome,
};
pub use pipeline::{FloorPlanPipeline, PipelineOutput, PipelineWarning};
pub use reconcile::subtract_doors;
pub use reconstruction::{
    reconstruct, sandbox_heightmap, HeightMap, ReconstructionConfig, SandboxCell,
    SandboxHeights, SandboxKind, SolidMeshes, SolidModel,
};
pub use visibility::{compute_visibility, visibility_for_plan, VisibilityConfig, VisibilityPolygon};

// Re-export the data model so callers need only this crate
pub use floorgrid_core::{
    Aabb, DoorOpening, DoorOrientation, FloorPlan, InputConfig, ParsedPlan, Point2, RoomPolygon,
    WallSegment,
};
pub use floorgrid_geometry::Mesh;
