// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact boolean operations on triangle arrangements
//!
//! The pipeline runs leaves first: topology, patches, cells around witness
//! edges, the ambient cell, winding propagation, extraction and finally
//! re-polygonization. Every sidedness decision uses exact rational
//! arithmetic.

pub mod ambient;
pub mod cell;
pub mod extract;
pub mod parallel;
pub mod patch;
pub mod repolygonize;
pub mod sort;
pub mod topology;
pub mod triangulate;
pub mod winding;

pub use parallel::{run_batch, BatchJob};
pub use repolygonize::repolygonize;
pub use triangulate::{triangulate_polymesh, ArrangementSplitter, FanTriangulator, PolygonTriangulator, PreSplit};
pub use winding::apply_bool_op;

use crate::error::{BooleanError, BooleanFailure, ParseBoolOpError};
use crate::geometry::{Arrangement, MArena, Mesh};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Set operation applied to the shapes of an arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoolOp {
    /// Leave the arrangement untouched
    #[default]
    None,
    Union,
    Intersection,
    /// Shape 0 minus every other shape
    Difference,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::None => "none",
            BoolOp::Union => "union",
            BoolOp::Intersection => "intersection",
            BoolOp::Difference => "difference",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoolOp {
    type Err = ParseBoolOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(BoolOp::None),
            "union" => Ok(BoolOp::Union),
            "intersection" | "intersect" => Ok(BoolOp::Intersection),
            "difference" | "diff" => Ok(BoolOp::Difference),
            _ => Err(ParseBoolOpError(s.to_string())),
        }
    }
}

/// Counts and per-cell state gathered during one boolean call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanReport {
    pub op: BoolOp,
    pub nshapes: usize,
    pub input_triangles: usize,
    pub patches: usize,
    /// Adjacent patch pairs, each with one witness edge.
    pub witness_edges: usize,
    pub cells: usize,
    pub ambient_cell: Option<usize>,
    pub cell_windings: Vec<Vec<i32>>,
    pub cell_flags: Vec<bool>,
    pub output_faces: usize,
}

/// Boolean of the shapes in a non-self-intersecting triangle arrangement.
///
/// `shape_fn` maps a triangle index of `tm` to its shape in `[0, nshapes)`.
/// Empty input and [`BoolOp::None`] return `tm` unchanged. On failure the
/// returned [`BooleanFailure`] carries `tm` as the fallback mesh.
pub fn boolean_trimesh<F>(
    tm: &Mesh,
    op: BoolOp,
    nshapes: usize,
    shape_fn: F,
    arena: &mut MArena,
) -> Result<Mesh, BooleanFailure>
where
    F: Fn(usize) -> usize,
{
    boolean_trimesh_with_report(tm, op, nshapes, shape_fn, arena).map(|(mesh, _)| mesh)
}

/// [`boolean_trimesh`], also returning what the pipeline found.
pub fn boolean_trimesh_with_report<F>(
    tm: &Mesh,
    op: BoolOp,
    nshapes: usize,
    shape_fn: F,
    arena: &mut MArena,
) -> Result<(Mesh, BooleanReport), BooleanFailure>
where
    F: Fn(usize) -> usize,
{
    let mut report = BooleanReport {
        op,
        nshapes,
        input_triangles: tm.face_count(),
        ..Default::default()
    };
    debug!("boolean {} of {} shapes over {} triangles", op, nshapes, tm.face_count());
    if tm.is_empty() || op == BoolOp::None {
        report.output_faces = tm.face_count();
        return Ok((tm.clone(), report));
    }

    match run_pipeline(tm, op, nshapes, &shape_fn, arena, &mut report) {
        Ok(out) => {
            report.output_faces = out.face_count();
            Ok((out, report))
        }
        Err(error) => {
            warn!("boolean {} failed: {}; returning input", op, error);
            Err(BooleanFailure::new(error, tm.clone()))
        }
    }
}

fn run_pipeline<F>(
    tm: &Mesh,
    op: BoolOp,
    nshapes: usize,
    shape_fn: &F,
    arena: &mut MArena,
    report: &mut BooleanReport,
) -> Result<Mesh, BooleanError>
where
    F: Fn(usize) -> usize,
{
    if let Some(t) = tm.faces().iter().position(|&f| !arena.face(f).is_tri()) {
        return Err(BooleanError::InvalidFace(format!("face {} is not a triangle", t)));
    }

    let tmtopo = topology::TriMeshTopology::new(tm, arena);
    let mut pinfo = patch::find_patches(tm, &tmtopo, arena);
    report.patches = pinfo.patch_count();
    report.witness_edges = pinfo.witness_count();
    debug!(
        "{} patches, {} witness edges, {} distinct edges",
        pinfo.patch_count(),
        pinfo.witness_count(),
        tmtopo.edge_count()
    );

    let mut cinfo = cell::find_cells(tm, &tmtopo, arena, &mut pinfo)?;
    report.cells = cinfo.cell_count();
    cell::patch_cell_graph_ok(&cinfo, &pinfo)?;

    let c_ambient = ambient::find_ambient_cell(tm, &tmtopo, &pinfo, arena)?;
    report.ambient_cell = Some(c_ambient);

    winding::propagate_windings_and_flag(&pinfo, &mut cinfo, c_ambient, op, nshapes, shape_fn)?;
    report.cell_windings = cinfo.cells().iter().map(|c| c.winding().to_vec()).collect();
    report.cell_flags = cinfo.cells().iter().map(|c| c.flag()).collect();

    Ok(extract::extract_from_flag_diffs(tm, &pinfo, &cinfo, arena))
}

/// Re-anchor a triangle-level failure on the caller's polygon input.
///
/// An unlocatable ambient cell falls back to the arrangement, every other
/// failure to the original polygons.
fn polygon_failure(failure: BooleanFailure, pm: &Mesh) -> BooleanFailure {
    match failure.error {
        BooleanError::AmbientCell(_) => failure,
        error => BooleanFailure::new(error, pm.clone()),
    }
}

/// Boolean of a polygon mesh holding `nshapes` closed shapes.
///
/// `shape_fn` maps a face index of `pm` to its shape. Polygons are
/// triangulated, split into an arrangement by `splitter`, combined, and
/// turned back into polygons.
pub fn boolean_mesh<F>(
    pm: &Mesh,
    op: BoolOp,
    nshapes: usize,
    shape_fn: F,
    triangulator: &dyn PolygonTriangulator,
    splitter: &dyn ArrangementSplitter,
    arena: &mut MArena,
) -> Result<Mesh, BooleanFailure>
where
    F: Fn(usize) -> usize,
{
    if pm.is_empty() {
        return Ok(pm.clone());
    }
    let tm = triangulate_polymesh(pm, triangulator, arena).map_err(|e| BooleanFailure::new(e, pm.clone()))?;
    let tm_si = splitter.split(&tm, arena).map_err(|e| BooleanFailure::new(e, pm.clone()))?;

    // Shapes are resolved up front so the arena stays free for the pipeline
    let mut tri_shape = Vec::with_capacity(tm_si.face_count());
    for (t, &f) in tm_si.faces().iter().enumerate() {
        match arena.face(f).orig {
            Some(orig) if orig < pm.face_count() => tri_shape.push(shape_fn(orig)),
            _ => {
                let error = BooleanError::InvalidFace(format!("triangle {} has no source polygon", t));
                return Err(BooleanFailure::new(error, pm.clone()));
            }
        }
    }

    let out = boolean_trimesh(&tm_si, op, nshapes, |t| tri_shape[t], arena).map_err(|f| polygon_failure(f, pm))?;
    Ok(repolygonize(&out, pm, arena))
}

/// Boolean of a prepared [`Arrangement`], re-polygonized against its polygons.
pub fn boolean_arrangement(arrangement: &Arrangement, op: BoolOp, arena: &mut MArena) -> Result<Mesh, BooleanFailure> {
    let out = boolean_trimesh(&arrangement.tris, op, arrangement.nshapes, |t| arrangement.shape_of(t), arena)
        .map_err(|f| polygon_failure(f, &arrangement.polys))?;
    Ok(repolygonize(&out, &arrangement.polys, arena))
}
