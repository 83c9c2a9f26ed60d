// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ export of polygon meshes

use crate::geometry::{MArena, Mesh};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export mesh to OBJ, one `f` line per polygon.
pub fn export_obj(mesh: &Mesh, arena: &MArena, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create OBJ file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, arena, &mut writer)?;
    writer.flush().context("Failed to write OBJ file")?;
    Ok(())
}

/// Write OBJ text; vertices appear in first-seen order over the faces.
pub fn write_obj<W: Write>(mesh: &Mesh, arena: &MArena, writer: &mut W) -> Result<()> {
    let mut mesh = mesh.clone();
    mesh.populate_vert(arena);

    for &v in mesh.verts() {
        let co = arena.vert(v).co;
        writeln!(writer, "v {} {} {}", co.x, co.y, co.z).context("Failed to write OBJ vertex")?;
    }
    for &f in mesh.faces() {
        let indices: Vec<String> = arena
            .face(f)
            .vert
            .iter()
            .filter_map(|&v| mesh.lookup_vert(v))
            .map(|i| (i + 1).to_string())
            .collect();
        writeln!(writer, "f {}", indices.join(" ")).context("Failed to write OBJ face")?;
    }
    Ok(())
}
