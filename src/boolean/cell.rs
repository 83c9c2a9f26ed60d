// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cells of space bounded by patches, and the patch-cell graph

use super::patch::{PatchesInfo, Side};
use super::sort::{flap, sort_tris_around_edge, tri_verts};
use super::topology::{Edge, TriMeshTopology};
use crate::error::BooleanError;
use crate::geometry::{MArena, Mesh};
use ahash::AHashSet;
use log::{debug, trace};

/// Connected region of space bounded by patches.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    patches: Vec<usize>,
    winding: Vec<i32>,
    winding_assigned: bool,
    flag: bool,
}

impl Cell {
    pub fn patches(&self) -> &[usize] {
        &self.patches
    }

    pub fn add_patch(&mut self, p: usize) {
        if !self.patches.contains(&p) {
            self.patches.push(p);
        }
    }

    /// Per-shape winding numbers; empty until assigned.
    pub fn winding(&self) -> &[i32] {
        &self.winding
    }

    pub fn winding_assigned(&self) -> bool {
        self.winding_assigned
    }

    pub fn set_winding(&mut self, winding: Vec<i32>) {
        self.winding = winding;
        self.winding_assigned = true;
    }

    /// Whether the cell is inside the boolean result.
    pub fn flag(&self) -> bool {
        self.flag
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.flag = flag;
    }
}

/// All cells of an arrangement.
#[derive(Debug, Clone, Default)]
pub struct CellsInfo {
    cell: Vec<Cell>,
}

impl CellsInfo {
    pub fn add_cell(&mut self) -> usize {
        self.cell.push(Cell::default());
        self.cell.len() - 1
    }

    pub fn cell(&self, c: usize) -> &Cell {
        &self.cell[c]
    }

    pub fn cell_mut(&mut self, c: usize) -> &mut Cell {
        &mut self.cell[c]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cell
    }

    pub fn cell_count(&self) -> usize {
        self.cell.len()
    }
}

/// Build the cells around every witness edge and attach them to patches.
///
/// Walking the rotational order at an edge, the cell following one triangle
/// must be the cell preceding the next. A new cell is created when neither
/// side has one yet; when both sides already carry different cells the
/// arrangement is rejected with [`BooleanError::UnresolvedCellMerge`].
/// Patches meeting no other patch get a fresh cell on each side.
pub fn find_cells(
    tm: &Mesh,
    tmtopo: &TriMeshTopology,
    arena: &MArena,
    pinfo: &mut PatchesInfo,
) -> Result<CellsInfo, BooleanError> {
    let mut cinfo = CellsInfo::default();
    let mut done: AHashSet<Edge> = AHashSet::new();
    let witnesses: Vec<Edge> = pinfo.witnesses().map(|(_, e)| e).collect();

    for e in witnesses {
        if !done.insert(e) {
            continue;
        }
        let sorted = sort_tris_around_edge(tm, arena, e, tmtopo.edge_tris(&e), None);
        let n = sorted.len();
        for i in 0..n {
            let (t, t_next) = (sorted[i], sorted[(i + 1) % n]);
            let r = pinfo.tri_patch(t);
            let r_next = pinfo.tri_patch(t_next);
            let (_, r_flipped) = flap(&tri_verts(tm, arena, t), e);
            let (_, r_next_flipped) = flap(&tri_verts(tm, arena, t_next), e);

            let r_follow = Side::following(r_flipped);
            let r_next_prev = Side::preceding(r_next_flipped);

            let follow_cell = pinfo.patch(r).cell(r_follow);
            let prev_cell = pinfo.patch(r_next).cell(r_next_prev);
            match (follow_cell, prev_cell) {
                (None, None) => {
                    let c = cinfo.add_cell();
                    pinfo.patch_mut(r).set_cell(r_follow, c);
                    pinfo.patch_mut(r_next).set_cell(r_next_prev, c);
                    cinfo.cell_mut(c).add_patch(r);
                    cinfo.cell_mut(c).add_patch(r_next);
                    trace!("edge {:?}: new cell {} between patches {} and {}", e.ids(), c, r, r_next);
                }
                (Some(c), None) => {
                    pinfo.patch_mut(r_next).set_cell(r_next_prev, c);
                    cinfo.cell_mut(c).add_patch(r_next);
                    trace!("edge {:?}: patch {} joins cell {}", e.ids(), r_next, c);
                }
                (None, Some(c)) => {
                    pinfo.patch_mut(r).set_cell(r_follow, c);
                    cinfo.cell_mut(c).add_patch(r);
                    trace!("edge {:?}: patch {} joins cell {}", e.ids(), r, c);
                }
                (Some(first), Some(second)) if first != second => {
                    return Err(BooleanError::UnresolvedCellMerge {
                        edge: e.ids(),
                        first,
                        second,
                    });
                }
                (Some(_), Some(_)) => {}
            }
        }
    }

    for p in 0..pinfo.patch_count() {
        let patch = pinfo.patch(p);
        if patch.cell_above.is_none() && patch.cell_below.is_none() {
            for side in [Side::Above, Side::Below] {
                let c = cinfo.add_cell();
                pinfo.patch_mut(p).set_cell(side, c);
                cinfo.cell_mut(c).add_patch(p);
            }
            trace!("isolated patch {} bounded by its own cells", p);
        }
    }

    debug!(
        "found {} cells for {} patches ({} witness edges)",
        cinfo.cell_count(),
        pinfo.patch_count(),
        done.len()
    );
    Ok(cinfo)
}

/// Check the patch-cell graph: every patch has both cells, every cell has a
/// patch, and the bipartite graph is connected.
pub fn patch_cell_graph_ok(cinfo: &CellsInfo, pinfo: &PatchesInfo) -> Result<(), BooleanError> {
    if pinfo.patch_count() == 0 || cinfo.cell_count() == 0 {
        return Err(BooleanError::DisconnectedGraph);
    }
    for (c, cell) in cinfo.cells().iter().enumerate() {
        if cell.patches().is_empty() {
            return Err(BooleanError::EmptyCell { cell: c });
        }
        if cell.patches().iter().any(|&p| p >= pinfo.patch_count()) {
            return Err(BooleanError::DisconnectedGraph);
        }
    }
    for (p, patch) in pinfo.patches().iter().enumerate() {
        match (patch.cell_above, patch.cell_below) {
            (Some(a), Some(b)) if a < cinfo.cell_count() && b < cinfo.cell_count() => {}
            _ => return Err(BooleanError::MissingCell { patch: p }),
        }
    }

    let mut cell_reached = vec![false; cinfo.cell_count()];
    let mut patch_reached = vec![false; pinfo.patch_count()];
    let mut stack = vec![0];
    while let Some(p) = stack.pop() {
        if patch_reached[p] {
            continue;
        }
        patch_reached[p] = true;
        let patch = pinfo.patch(p);
        for c in [patch.cell_above, patch.cell_below].into_iter().flatten() {
            if cell_reached[c] {
                continue;
            }
            cell_reached[c] = true;
            stack.extend(cinfo.cell(c).patches().iter().filter(|&&q| !patch_reached[q]));
        }
    }
    if cell_reached.iter().all(|&r| r) && patch_reached.iter().all(|&r| r) {
        Ok(())
    } else {
        Err(BooleanError::DisconnectedGraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::patch::find_patches;
    use crate::geometry::{AxisBox, BoxArrangement};

    fn build(boxes: &[AxisBox]) -> Result<(PatchesInfo, CellsInfo), BooleanError> {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(boxes, &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let mut pinfo = find_patches(&arr.tris, &topo, &arena);
        let cinfo = find_cells(&arr.tris, &topo, &arena, &mut pinfo)?;
        Ok((pinfo, cinfo))
    }

    #[test]
    fn test_single_cube_has_inside_and_outside() {
        let (pinfo, cinfo) = build(&[AxisBox::unit([0.0; 3])]).unwrap();
        assert_eq!(cinfo.cell_count(), 2);
        let patch = pinfo.patch(0);
        assert_ne!(patch.cell_above, patch.cell_below);
        assert!(patch_cell_graph_ok(&cinfo, &pinfo).is_ok());
    }

    #[test]
    fn test_overlapping_cubes_graph() {
        let (pinfo, cinfo) = build(&[AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])]).unwrap();
        assert_eq!(pinfo.patch_count(), 20);
        assert_eq!(cinfo.cell_count(), 12);
        assert!(patch_cell_graph_ok(&cinfo, &pinfo).is_ok());
        for patch in pinfo.patches() {
            assert!(patch.cell_above.is_some() && patch.cell_below.is_some());
        }
    }

    #[test]
    fn test_nested_cubes_are_disconnected() {
        let inner = AxisBox::new([0.25; 3], [0.75; 3]);
        let (pinfo, cinfo) = build(&[AxisBox::unit([0.0; 3]), inner]).unwrap();
        assert_eq!(cinfo.cell_count(), 4);
        assert_eq!(patch_cell_graph_ok(&cinfo, &pinfo), Err(BooleanError::DisconnectedGraph));
    }

    #[test]
    fn test_overlap_along_z_needs_cell_merge() {
        let err = build(&[AxisBox::unit([0.0; 3]), AxisBox::unit([0.0, 0.0, 0.5])]).unwrap_err();
        assert!(matches!(err, BooleanError::UnresolvedCellMerge { .. }));
    }

    #[test]
    fn test_empty_cell_is_reported() {
        let (pinfo, mut cinfo) = build(&[AxisBox::unit([0.0; 3])]).unwrap();
        cinfo.add_cell();
        assert_eq!(patch_cell_graph_ok(&cinfo, &pinfo), Err(BooleanError::EmptyCell { cell: 2 }));
    }
}
