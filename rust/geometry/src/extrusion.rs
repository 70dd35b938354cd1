// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting plan outlines to 3D meshes
//!
//! Outlines live in the X/Y plane and are extruded upward along +Z.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::triangulate_polygon;
use crate::Point2;
use nalgebra::{Point3, Vector3};

/// Extrude a closed plan outline from `base_z` up by `height`
///
/// The outline may be given in either winding; it is normalised to
/// counter-clockwise so side normals point outward.
pub fn extrude_polygon(outline: &[Point2], base_z: f64, height: f64) -> Result<Mesh> {
    if !(height > 0.0) || !height.is_finite() {
        return Err(Error::InvalidExtrusion(format!(
            "Height must be positive, got {}",
            height
        )));
    }
    if outline.len() < 3 {
        return Err(Error::InvalidExtrusion(format!(
            "Outline needs at least 3 points, got {}",
            outline.len()
        )));
    }

    let mut ring = outline.to_vec();
    if signed_area(&ring) < 0.0 {
        ring.reverse();
    }

    let indices = triangulate_polygon(&ring)?;

    let n = ring.len();
    let mut mesh = Mesh::with_capacity(n * 6, indices.len() * 2 + n * 6);

    create_cap(&ring, &indices, base_z, false, &mut mesh);
    create_cap(&ring, &indices, base_z + height, true, &mut mesh);
    create_side_walls(&ring, base_z, height, &mut mesh);

    Ok(mesh)
}

/// Axis-aligned box spanning `min`..`max`
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> Result<Mesh> {
    if !(max.x > min.x && max.y > min.y) {
        return Err(Error::InvalidExtrusion(format!(
            "Degenerate box footprint {:?}..{:?}",
            min, max
        )));
    }

    let footprint = [
        Point2::new(min.x, min.y),
        Point2::new(max.x, min.y),
        Point2::new(max.x, max.y),
        Point2::new(min.x, max.y),
    ];
    extrude_polygon(&footprint, min.z, max.z - min.z)
}

/// Twice the signed area; positive for counter-clockwise rings
fn signed_area(ring: &[Point2]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            ring[i].x * ring[j].y - ring[j].x * ring[i].y
        })
        .sum()
}

fn create_cap(ring: &[Point2], indices: &[usize], z: f64, top: bool, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let normal = Vector3::new(0.0, 0.0, if top { 1.0 } else { -1.0 });

    for p in ring {
        mesh.add_vertex(Point3::new(p.x, p.y, z), normal);
    }

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (ring[tri[0]], ring[tri[1]], ring[tri[2]]);
        let ccw = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) > 0.0;

        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // Top faces wind counter-clockwise seen from above, bottom faces the reverse
        if ccw == top {
            mesh.add_triangle(i0, i1, i2);
        } else {
            mesh.add_triangle(i0, i2, i1);
        }
    }
}

fn create_side_walls(ring: &[Point2], base_z: f64, height: f64, mesh: &mut Mesh) {
    let top_z = base_z + height;

    for i in 0..ring.len() {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % ring.len()];

        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let idx = mesh.add_vertex(Point3::new(p0.x, p0.y, base_z), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, base_z), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, top_z), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, top_z), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_mesh_counts_and_bounds() {
        let mesh = box_mesh(Point3::new(1.0, 2.0, 0.0), Point3::new(3.0, 5.0, 10.0)).unwrap();

        // 2 caps of 4 vertices, 4 side quads of 4 vertices
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.x, 1.0);
        assert_relative_eq!(min.y, 2.0);
        assert_relative_eq!(max.y, 5.0);
        assert_relative_eq!(max.z, 10.0);
    }

    #[test]
    fn test_clockwise_outline_gets_outward_normals() {
        let cw = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let mesh = extrude_polygon(&cw, 0.0, 1.0).unwrap();

        // Reversed ring starts with edge (1,0)->(1,1), which faces +X
        let first_side = 8 * 3;
        assert_relative_eq!(mesh.normals[first_side], 1.0);
        assert_relative_eq!(mesh.normals[first_side + 1], 0.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let tri = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        assert!(extrude_polygon(&tri, 0.0, 0.0).is_err());
        assert!(extrude_polygon(&tri[..2], 0.0, 1.0).is_err());
        assert!(box_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0)).is_err());
    }
}
