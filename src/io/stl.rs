// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL export

use crate::geometry::{MArena, Mesh};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Export mesh to binary STL; polygons are fan-split.
pub fn export_stl(mesh: &Mesh, arena: &MArena, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    write_stl(mesh, arena, &mut file)
}

/// Write binary STL to any writer.
pub fn write_stl<W: Write>(mesh: &Mesh, arena: &MArena, writer: &mut W) -> Result<()> {
    let triangles = stl_triangles(mesh, arena);
    stl_io::write_stl(writer, triangles.iter()).context("Failed to write STL file")?;
    Ok(())
}

fn stl_triangles(mesh: &Mesh, arena: &MArena) -> Vec<StlTriangle> {
    let mut triangles = Vec::new();
    for &f in mesh.faces() {
        let face = arena.face(f);
        let p0 = arena.vert(face.vert[0]).co;
        for i in 1..face.len().saturating_sub(1) {
            let p1 = arena.vert(face.vert[i]).co;
            let p2 = arena.vert(face.vert[i + 1]).co;
            let n = (p1 - p0).cross(&(p2 - p0));
            let n = if n.norm() > 0.0 { n.normalize() } else { n };
            triangles.push(StlTriangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [stl_vertex(&p0), stl_vertex(&p1), stl_vertex(&p2)],
            });
        }
    }
    triangles
}

fn stl_vertex(p: &Point3<f64>) -> StlVertex {
    StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
}
