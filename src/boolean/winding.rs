// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Winding numbers and boolean predicates over cells

use super::cell::CellsInfo;
use super::patch::PatchesInfo;
use super::BoolOp;
use crate::error::BooleanError;
use log::{debug, trace};
use std::collections::VecDeque;

/// Decide membership in the result from a cell's per-shape winding numbers.
///
/// A shape counts as containing the cell when its winding number is nonzero.
/// Difference keeps what is inside shape 0 and outside at least one other
/// shape; with a single shape it keeps shape 0.
pub fn apply_bool_op(op: BoolOp, winding: &[i32]) -> bool {
    match op {
        BoolOp::None => false,
        BoolOp::Union => winding.iter().any(|&w| w != 0),
        BoolOp::Intersection => !winding.is_empty() && winding.iter().all(|&w| w != 0),
        BoolOp::Difference => match winding.split_first() {
            None => false,
            Some((&first, rest)) => first != 0 && (rest.is_empty() || rest.iter().any(|&w| w == 0)),
        },
    }
}

/// Breadth-first walk from the ambient cell assigning windings and flags.
///
/// The ambient cell has all windings zero. Crossing a patch of shape `s`
/// from the cell above it to the cell below it adds one to entry `s`, so the
/// inside of an outward oriented shape ends up at +1. This is the reverse of
/// counting below-to-above crossings as positive; the predicates only test
/// for zero, so either sign picks the same cells. Every cell must be reached.
pub fn propagate_windings_and_flag<F>(
    pinfo: &PatchesInfo,
    cinfo: &mut CellsInfo,
    c_ambient: usize,
    op: BoolOp,
    nshapes: usize,
    shape_fn: F,
) -> Result<(), BooleanError>
where
    F: Fn(usize) -> usize,
{
    if c_ambient >= cinfo.cell_count() {
        return Err(BooleanError::AmbientCell(format!(
            "ambient cell {} out of range for {} cells",
            c_ambient,
            cinfo.cell_count()
        )));
    }
    let zero = vec![0; nshapes];
    let flag = apply_bool_op(op, &zero);
    let ambient = cinfo.cell_mut(c_ambient);
    ambient.set_winding(zero);
    ambient.set_flag(flag);

    let mut queue = VecDeque::from([c_ambient]);
    while let Some(c) = queue.pop_front() {
        let patches = cinfo.cell(c).patches().to_vec();
        for p in patches {
            let patch = pinfo.patch(p);
            let p_above_c = patch.cell_below == Some(c);
            let neighbor = if p_above_c { patch.cell_above } else { patch.cell_below };
            let Some(c_neighbor) = neighbor else {
                return Err(BooleanError::MissingCell { patch: p });
            };
            if cinfo.cell(c_neighbor).winding_assigned() {
                continue;
            }

            let t = patch.first_tri().ok_or(BooleanError::MissingCell { patch: p })?;
            let shape = shape_fn(t);
            if shape >= nshapes {
                return Err(BooleanError::ShapeOutOfRange { shape, nshapes });
            }
            let mut winding = cinfo.cell(c).winding().to_vec();
            winding[shape] += if p_above_c { -1 } else { 1 };
            let flag = apply_bool_op(op, &winding);
            trace!(
                "cell {} -> {} across patch {} (shape {}): winding {:?} flag {}",
                c,
                c_neighbor,
                p,
                shape,
                winding,
                flag
            );

            let next = cinfo.cell_mut(c_neighbor);
            next.set_winding(winding);
            next.set_flag(flag);
            queue.push_back(c_neighbor);
        }
    }

    if let Some(unreached) = cinfo.cells().iter().position(|cell| !cell.winding_assigned()) {
        debug!("cell {} not reached from ambient cell {}", unreached, c_ambient);
        return Err(BooleanError::DisconnectedGraph);
    }
    debug!(
        "assigned windings to {} cells, {} flagged",
        cinfo.cell_count(),
        cinfo.cells().iter().filter(|cell| cell.flag()).count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::ambient::find_ambient_cell;
    use crate::boolean::cell::find_cells;
    use crate::boolean::patch::find_patches;
    use crate::boolean::topology::TriMeshTopology;
    use crate::geometry::{AxisBox, BoxArrangement, MArena, Mesh};

    #[test]
    fn test_predicates() {
        assert!(!apply_bool_op(BoolOp::Union, &[0, 0]));
        assert!(apply_bool_op(BoolOp::Union, &[0, 1]));
        assert!(apply_bool_op(BoolOp::Union, &[-1, 0]));

        assert!(apply_bool_op(BoolOp::Intersection, &[1, 1]));
        assert!(!apply_bool_op(BoolOp::Intersection, &[1, 0]));
        assert!(apply_bool_op(BoolOp::Intersection, &[2]));

        assert!(apply_bool_op(BoolOp::Difference, &[1]));
        assert!(apply_bool_op(BoolOp::Difference, &[1, 0]));
        assert!(!apply_bool_op(BoolOp::Difference, &[1, 1]));
        assert!(apply_bool_op(BoolOp::Difference, &[1, 1, 0]));
        assert!(!apply_bool_op(BoolOp::Difference, &[0, 0]));

        assert!(!apply_bool_op(BoolOp::None, &[1]));
    }

    fn propagate(boxes: &[AxisBox], op: BoolOp) -> Result<(PatchesInfo, CellsInfo, usize), BooleanError> {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(boxes, &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let mut pinfo = find_patches(&arr.tris, &topo, &arena);
        let mut cinfo = find_cells(&arr.tris, &topo, &arena, &mut pinfo)?;
        let ambient = find_ambient_cell(&arr.tris, &topo, &pinfo, &mut arena)?;
        propagate_windings_and_flag(&pinfo, &mut cinfo, ambient, op, arr.nshapes, |t| arr.shape_of(t))?;
        Ok((pinfo, cinfo, ambient))
    }

    #[test]
    fn test_single_cube_windings() {
        let (pinfo, cinfo, ambient) = propagate(&[AxisBox::unit([0.0; 3])], BoolOp::Union).unwrap();
        let inside = pinfo.patch(0).cell_below.unwrap();
        assert_eq!(cinfo.cell(ambient).winding(), &[0]);
        assert_eq!(cinfo.cell(inside).winding(), &[1]);
        assert!(cinfo.cell(inside).flag());
        assert!(!cinfo.cell(ambient).flag());
    }

    #[test]
    fn test_overlapping_cubes_windings() {
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])];
        let (_, cinfo, _) = propagate(&boxes, BoolOp::Intersection).unwrap();
        let mut windings: Vec<Vec<i32>> = cinfo.cells().iter().map(|c| c.winding().to_vec()).collect();
        windings.sort();
        windings.dedup();
        assert_eq!(windings, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
        for cell in cinfo.cells() {
            assert_eq!(cell.flag(), cell.winding() == [1, 1]);
        }
    }

    #[test]
    fn test_inward_oriented_cube_winds_negative() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();
        let faces = arr
            .tris
            .faces()
            .iter()
            .map(|&f| {
                let vert = arena.face(f).vert.clone();
                arena.add_face(vec![vert[0], vert[2], vert[1]], Some(0), vec![None; 3])
            })
            .collect();
        let tm = Mesh::new(faces);

        let topo = TriMeshTopology::new(&tm, &arena);
        let mut pinfo = find_patches(&tm, &topo, &arena);
        let mut cinfo = find_cells(&tm, &topo, &arena, &mut pinfo).unwrap();
        let ambient = find_ambient_cell(&tm, &topo, &pinfo, &mut arena).unwrap();
        assert_eq!(Some(ambient), pinfo.patch(0).cell_below);

        propagate_windings_and_flag(&pinfo, &mut cinfo, ambient, BoolOp::Union, 1, |_| 0).unwrap();
        let inside = pinfo.patch(0).cell_above.unwrap();
        assert_eq!(cinfo.cell(inside).winding(), &[-1]);
        assert!(cinfo.cell(inside).flag());
        assert!(!cinfo.cell(ambient).flag());
    }

    #[test]
    fn test_shape_out_of_range() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let mut pinfo = find_patches(&arr.tris, &topo, &arena);
        let mut cinfo = find_cells(&arr.tris, &topo, &arena, &mut pinfo).unwrap();
        let ambient = find_ambient_cell(&arr.tris, &topo, &pinfo, &mut arena).unwrap();

        let err = propagate_windings_and_flag(&pinfo, &mut cinfo, ambient, BoolOp::Union, 1, |_| 3).unwrap_err();
        assert_eq!(err, BooleanError::ShapeOutOfRange { shape: 3, nshapes: 1 });
    }
}
