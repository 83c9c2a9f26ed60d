// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Extraction of the oriented boundary between flagged and unflagged cells

use super::cell::CellsInfo;
use super::patch::PatchesInfo;
use crate::geometry::{MArena, Mesh};
use log::debug;

/// Keep the triangles separating an included cell from an excluded one.
///
/// A kept triangle whose included side is above it is flipped, so every
/// output triangle faces out of the retained volume. Flipped triangles are
/// new arena faces; the rest are shared with `tm`.
pub fn extract_from_flag_diffs(tm: &Mesh, pinfo: &PatchesInfo, cinfo: &CellsInfo, arena: &mut MArena) -> Mesh {
    let flag = |c: Option<usize>| c.map_or(false, |c| cinfo.cell(c).flag());
    let mut out = Vec::new();
    for (t, &f) in tm.faces().iter().enumerate() {
        let patch = pinfo.patch(pinfo.tri_patch(t));
        let above = flag(patch.cell_above);
        let below = flag(patch.cell_below);
        if above == below {
            continue;
        }
        if !above {
            out.push(f);
            continue;
        }
        let face = arena.face(f);
        let (v, e) = (&face.vert, &face.edge_orig);
        let vert = vec![v[0], v[2], v[1]];
        let edge_orig = vec![e[2], e[1], e[0]];
        let orig = face.orig;
        out.push(arena.add_face(vert, orig, edge_orig));
    }
    debug!("extracted {} of {} triangles", out.len(), tm.face_count());
    Mesh::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::ambient::find_ambient_cell;
    use crate::boolean::cell::find_cells;
    use crate::boolean::patch::find_patches;
    use crate::boolean::topology::TriMeshTopology;
    use crate::boolean::winding::propagate_windings_and_flag;
    use crate::boolean::BoolOp;
    use crate::geometry::{exact_volume, is_closed, AxisBox, BoxArrangement};
    use num_rational::BigRational;

    fn extract(boxes: &[AxisBox], op: BoolOp, arena: &mut MArena) -> Mesh {
        let arr = BoxArrangement::build(boxes, arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, arena);
        let mut pinfo = find_patches(&arr.tris, &topo, arena);
        let mut cinfo = find_cells(&arr.tris, &topo, arena, &mut pinfo).unwrap();
        let ambient = find_ambient_cell(&arr.tris, &topo, &pinfo, arena).unwrap();
        propagate_windings_and_flag(&pinfo, &mut cinfo, ambient, op, arr.nshapes, |t| arr.shape_of(t)).unwrap();
        extract_from_flag_diffs(&arr.tris, &pinfo, &cinfo, arena)
    }

    #[test]
    fn test_single_cube_is_kept_as_is() {
        let mut arena = MArena::new();
        let out = extract(&[AxisBox::unit([0.0; 3])], BoolOp::Union, &mut arena);
        assert_eq!(out.face_count(), 12);
        assert_eq!(exact_volume(&out, &arena), BigRational::from_integer(1.into()));
    }

    #[test]
    fn test_difference_flips_inner_walls() {
        let mut arena = MArena::new();
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])];
        let out = extract(&boxes, BoolOp::Difference, &mut arena);
        assert_eq!(out.face_count(), 12);
        assert!(is_closed(&out, &arena));
        assert_eq!(exact_volume(&out, &arena), BigRational::new(1.into(), 2.into()));
    }

    #[test]
    fn test_union_drops_interior_walls() {
        let mut arena = MArena::new();
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])];
        let out = extract(&boxes, BoolOp::Union, &mut arena);
        assert_eq!(out.face_count(), 28);
        assert!(is_closed(&out, &arena));
        assert_eq!(exact_volume(&out, &arena), BigRational::new(3.into(), 2.into()));
    }
}
