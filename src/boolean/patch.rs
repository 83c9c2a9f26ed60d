// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Partition of triangles into manifold-connected patches

use super::topology::{Edge, TriMeshTopology};
use crate::geometry::{MArena, Mesh};
use std::collections::BTreeMap;

/// Which side of a patch a cell bounds, relative to each triangle's own orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The side the counter-clockwise normal points to.
    Above,
    Below,
}

impl Side {
    /// Side facing the next triangle in rotational order around an edge.
    pub fn following(flipped: bool) -> Self {
        if flipped {
            Side::Below
        } else {
            Side::Above
        }
    }

    /// Side facing the previous triangle in rotational order around an edge.
    pub fn preceding(flipped: bool) -> Self {
        Self::following(flipped).opposite()
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Above => Side::Below,
            Side::Below => Side::Above,
        }
    }
}

/// Maximal set of triangles connected through manifold edges.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    tri: Vec<usize>,
    pub cell_above: Option<usize>,
    pub cell_below: Option<usize>,
}

impl Patch {
    pub fn tris(&self) -> &[usize] {
        &self.tri
    }

    pub fn tri_count(&self) -> usize {
        self.tri.len()
    }

    /// Representative triangle, used for the shape lookup.
    pub fn first_tri(&self) -> Option<usize> {
        self.tri.first().copied()
    }

    pub fn cell(&self, side: Side) -> Option<usize> {
        match side {
            Side::Above => self.cell_above,
            Side::Below => self.cell_below,
        }
    }

    pub fn set_cell(&mut self, side: Side, cell: usize) {
        match side {
            Side::Above => self.cell_above = Some(cell),
            Side::Below => self.cell_below = Some(cell),
        }
    }
}

/// Patches of a triangle mesh and the witness edges between them.
#[derive(Debug, Clone, Default)]
pub struct PatchesInfo {
    patch: Vec<Patch>,
    tri_patch: Vec<usize>,
    /// One witness edge per adjacent patch pair, keyed with the lower patch first.
    pp_edge: BTreeMap<(usize, usize), Edge>,
}

impl PatchesInfo {
    pub fn patch(&self, p: usize) -> &Patch {
        &self.patch[p]
    }

    pub fn patch_mut(&mut self, p: usize) -> &mut Patch {
        &mut self.patch[p]
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patch
    }

    pub fn patch_count(&self) -> usize {
        self.patch.len()
    }

    pub fn tri_patch(&self, t: usize) -> usize {
        self.tri_patch[t]
    }

    pub fn patch_patch_edge(&self, p: usize, q: usize) -> Option<Edge> {
        self.pp_edge.get(&(p.min(q), p.max(q))).copied()
    }

    /// Adjacent patch pairs in ascending order with their witness edge.
    pub fn witnesses(&self) -> impl Iterator<Item = ((usize, usize), Edge)> + '_ {
        self.pp_edge.iter().map(|(&pq, &e)| (pq, e))
    }

    pub fn witness_count(&self) -> usize {
        self.pp_edge.len()
    }
}

/// Flood-fill the triangles of `tm` into patches.
///
/// Growth crosses manifold edges only, using an explicit stack so the
/// result depends only on face order. When a non-manifold edge first shows
/// two distinct assigned patches, that edge becomes their witness.
pub fn find_patches(tm: &Mesh, tmtopo: &TriMeshTopology, arena: &MArena) -> PatchesInfo {
    let ntri = tm.face_count();
    let mut assigned: Vec<Option<usize>> = vec![None; ntri];
    let mut info = PatchesInfo::default();

    for t in 0..ntri {
        if assigned[t].is_some() {
            continue;
        }
        let cur = info.patch.len();
        info.patch.push(Patch::default());
        let mut stack = vec![t];
        while let Some(tcand) = stack.pop() {
            if assigned[tcand].is_some() {
                continue;
            }
            assigned[tcand] = Some(cur);
            info.patch[cur].tri.push(tcand);

            let face = arena.face(tm.face(tcand));
            for pos in 0..face.len() {
                let e = Edge::new(face.vert[pos], face.vert[face.next_pos(pos)]);
                match tmtopo.other_tri_if_manifold(&e, tcand) {
                    Some(other) => {
                        if assigned[other].is_none() {
                            stack.push(other);
                        }
                    }
                    None => {
                        for &other in tmtopo.edge_tris(&e) {
                            if other == tcand {
                                continue;
                            }
                            if let Some(p_other) = assigned[other] {
                                if p_other != cur {
                                    info.pp_edge.entry((p_other.min(cur), p_other.max(cur))).or_insert(e);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    info.tri_patch = assigned.into_iter().flatten().collect();
    debug_assert_eq!(info.tri_patch.len(), ntri);
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AxisBox, BoxArrangement};

    #[test]
    fn test_single_cube_is_one_patch() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let pinfo = find_patches(&arr.tris, &topo, &arena);

        assert_eq!(pinfo.patch_count(), 1);
        assert_eq!(pinfo.patch(0).tri_count(), 12);
        assert_eq!(pinfo.witness_count(), 0);
    }

    #[test]
    fn test_overlapping_cubes_patches_and_witnesses() {
        let mut arena = MArena::new();
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])];
        let arr = BoxArrangement::build(&boxes, &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let pinfo = find_patches(&arr.tris, &topo, &arena);

        assert_eq!(pinfo.patch_count(), 20);
        assert_eq!(pinfo.witness_count(), 74);
        let distinct: std::collections::BTreeSet<Edge> = pinfo.witnesses().map(|(_, e)| e).collect();
        assert_eq!(distinct.len(), 16);
        let total: usize = pinfo.patches().iter().map(Patch::tri_count).sum();
        assert_eq!(total, 40);
        for t in 0..40 {
            assert!(pinfo.patch(pinfo.tri_patch(t)).tris().contains(&t));
        }
        for ((p, q), e) in pinfo.witnesses() {
            assert!(p < q);
            assert_eq!(pinfo.patch_patch_edge(q, p), Some(e));
            assert!(topo.edge_tris(&e).len() > 2);
        }
    }
}
