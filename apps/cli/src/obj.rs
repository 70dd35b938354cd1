// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ output
//!
//! One object per element kind. Coordinates are written as stored: plan X/Y
//! with height along +Z.

use floorgrid_processing::reconstruction::SolidMeshes;
use floorgrid_processing::Mesh;
use std::io::{self, Write};

/// Write walls, doors and floors as separate OBJ objects
pub fn write_obj<W: Write>(out: &mut W, meshes: &SolidMeshes) -> io::Result<()> {
    writeln!(out, "# floorgrid solids, Z up")?;

    let mut base = 1u32;
    for (name, mesh) in [
        ("walls", &meshes.walls),
        ("doors", &meshes.doors),
        ("floors", &meshes.floors),
    ] {
        if mesh.is_empty() {
            continue;
        }
        writeln!(out, "o {name}")?;
        write_mesh(out, mesh, base)?;
        base += mesh.vertex_count() as u32;
    }

    Ok(())
}

/// Vertices, normals and faces; OBJ indices start at `base`
fn write_mesh<W: Write>(out: &mut W, mesh: &Mesh, base: u32) -> io::Result<()> {
    for p in mesh.positions.chunks_exact(3) {
        writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for n in mesh.normals.chunks_exact(3) {
        writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + base, tri[1] + base, tri[2] + base);
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }
    Ok(())
}
