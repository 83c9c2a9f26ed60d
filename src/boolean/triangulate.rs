// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon front end: triangulation and arrangement splitting seams

use crate::error::BooleanError;
use crate::geometry::{FaceId, MArena, Mesh};

/// Splits one polygon of more than four sides into triangles.
///
/// Implementations stand in for an external constrained triangulation
/// service. Every produced triangle must have `orig = Some(face_index)`, and
/// edges that are not sides of the polygon must carry `None` provenance.
pub trait PolygonTriangulator: Send + Sync {
    fn triangulate(&self, face: FaceId, face_index: usize, arena: &mut MArena) -> Result<Vec<FaceId>, BooleanError>;
}

/// Fan from the first vertex; correct for convex polygons only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanTriangulator;

impl PolygonTriangulator for FanTriangulator {
    fn triangulate(&self, face: FaceId, face_index: usize, arena: &mut MArena) -> Result<Vec<FaceId>, BooleanError> {
        let f = arena.face(face);
        let n = f.len();
        if n < 3 {
            return Err(BooleanError::InvalidFace(format!("face {} has {} vertices", face_index, n)));
        }
        let (vert, edge_orig) = (f.vert.clone(), f.edge_orig.clone());
        let mut tris = Vec::with_capacity(n - 2);
        for i in 1..n - 1 {
            let e_first = if i == 1 { edge_orig[0] } else { None };
            let e_last = if i == n - 2 { edge_orig[n - 1] } else { None };
            tris.push(arena.add_face(
                vec![vert[0], vert[i], vert[i + 1]],
                Some(face_index),
                vec![e_first, edge_orig[i], e_last],
            ));
        }
        Ok(tris)
    }
}

/// Turns a triangulated multi-shape mesh into a non-self-intersecting arrangement.
///
/// Output triangles keep the `orig` of the triangle they were cut from and
/// edge provenance wherever they lie on an input edge.
pub trait ArrangementSplitter: Send + Sync {
    fn split(&self, tm: &Mesh, arena: &mut MArena) -> Result<Mesh, BooleanError>;
}

/// Splitter for input already known to be a conforming arrangement.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreSplit;

impl ArrangementSplitter for PreSplit {
    fn split(&self, tm: &Mesh, _arena: &mut MArena) -> Result<Mesh, BooleanError> {
        Ok(tm.clone())
    }
}

/// Triangulate every face of `pm`, tagging triangles with their polygon index.
///
/// Quads split on the diagonal from position 0 to 2, which is synthetic.
/// Larger polygons are handed to `triangulator`.
pub fn triangulate_polymesh(
    pm: &Mesh,
    triangulator: &dyn PolygonTriangulator,
    arena: &mut MArena,
) -> Result<Mesh, BooleanError> {
    let mut faces = Vec::with_capacity(2 * pm.face_count());
    for (index, &f) in pm.faces().iter().enumerate() {
        let face = arena.face(f);
        match face.len() {
            3 if face.orig == Some(index) => faces.push(f),
            3 => {
                let (vert, edge_orig) = (face.vert.clone(), face.edge_orig.clone());
                faces.push(arena.add_face(vert, Some(index), edge_orig));
            }
            4 => {
                let v = face.vert.clone();
                let e = face.edge_orig.clone();
                faces.push(arena.add_face(vec![v[0], v[1], v[2]], Some(index), vec![e[0], e[1], None]));
                faces.push(arena.add_face(vec![v[0], v[2], v[3]], Some(index), vec![None, e[2], e[3]]));
            }
            n if n > 4 => faces.extend(triangulator.triangulate(f, index, arena)?),
            n => {
                return Err(BooleanError::InvalidFace(format!("face {} has {} vertices", index, n)));
            }
        }
    }
    Ok(Mesh::new(faces))
}
