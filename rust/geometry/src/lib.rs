// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! floorgrid Geometry
//!
//! 2D segment/polygon kernel for floor plans, plus box and slab mesh
//! generation using earcutr triangulation and nalgebra points.

pub mod error;
pub mod extrusion;
pub mod kernel;
pub mod mesh;
pub mod point;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use error::{Error, Result};
pub use extrusion::{box_mesh, extrude_polygon};
pub use kernel::{
    closest_point_on_segment, dedup_points, point_in_polygon, point_segment_distance,
    polygon_area, segment_intersection, split_segment_at_points, PARALLEL_EPSILON,
    POINT_MERGE_EPSILON,
};
pub use mesh::Mesh;
pub use point::Point2;
pub use triangulation::triangulate_polygon;
