// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # floorgrid Core
//!
//! Floor plan data model and lenient JSON input.
//!
//! ## Overview
//!
//! A [`FloorPlan`] holds straight [`WallSegment`]s, quadrilateral
//! [`DoorOpening`]s and [`RoomPolygon`]s in world units. Constructors reject
//! degenerate geometry, so every value reaching the grid, path and
//! visibility stages is well-formed.
//!
//! ## Quick Start
//!
//! ```rust
//! use floorgrid_core::{parse_floor_plan, InputConfig};
//!
//! let json = r#"{ "walls": [{ "position": [[0, 0], [10, 0]] }] }"#;
//! let parsed = parse_floor_plan(json, &InputConfig::default())?;
//! assert_eq!(parsed.plan.walls.len(), 1);
//! # Ok::<(), floorgrid_core::Error>(())
//! ```

pub mod bounds;
pub mod error;
pub mod input;
pub mod types;

pub use bounds::Aabb;
pub use error::{Error, Result};
pub use floorgrid_geometry::Point2;
pub use input::{
    floor_plan_from_value, parse_floor_plan, EntityKind, InputConfig, InputIssue, IssueKind,
    ParsedPlan,
};
pub use types::{DoorOpening, DoorOrientation, FloorPlan, RoomPolygon, WallSegment, MIN_DOOR_AREA};
