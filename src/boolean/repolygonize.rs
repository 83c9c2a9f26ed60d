// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Re-polygonization of boolean output triangles
//!
//! Triangles descending from the same input polygon are merged across
//! synthetic edges, then synthetic vertices left in the middle of a straight
//! polygon side are removed.

use crate::geometry::exact::collinear;
use crate::geometry::{cyclic_equal, FaceId, MArena, Mesh, VertId};
use ahash::AHashMap;
use log::debug;

/// Shared side of faces under merge.
#[derive(Debug, Clone)]
struct MergeEdge {
    /// Endpoints with the lower id first.
    v1: VertId,
    v2: VertId,
    len_squared: f64,
    /// Face running along the edge from `v1` to `v2`.
    left_face: Option<usize>,
    right_face: Option<usize>,
    orig: Option<usize>,
    dissolvable: bool,
}

#[derive(Debug, Clone)]
struct MergeFace {
    vert: Vec<VertId>,
    /// Edge index for the side starting at each position.
    edge: Vec<usize>,
    merge_to: Option<usize>,
}

/// Faces of one input polygon and the sides between them.
struct FaceMergeState {
    face: Vec<MergeFace>,
    edge: Vec<MergeEdge>,
    orig: Option<usize>,
}

impl FaceMergeState {
    fn new(tris: &[usize], tm: &Mesh, arena: &MArena) -> Self {
        let mut state = Self {
            face: Vec::with_capacity(tris.len()),
            edge: Vec::with_capacity(3 * tris.len()),
            orig: tris.first().and_then(|&t| arena.face(tm.face(t)).orig),
        };
        let mut edge_map: AHashMap<(VertId, VertId), usize> = AHashMap::new();

        for &t in tris {
            let tri = arena.face(tm.face(t));
            let f = state.face.len();
            let mut face = MergeFace {
                vert: tri.vert.clone(),
                edge: Vec::with_capacity(tri.len()),
                merge_to: None,
            };
            for pos in 0..tri.len() {
                let (a, b) = (tri.vert[pos], tri.vert[tri.next_pos(pos)]);
                let key = (a.min(b), a.max(b));
                let e = *edge_map.entry(key).or_insert_with(|| {
                    let len_squared = (arena.vert(key.1).co - arena.vert(key.0).co).norm_squared();
                    state.edge.push(MergeEdge {
                        v1: key.0,
                        v2: key.1,
                        len_squared,
                        left_face: None,
                        right_face: None,
                        orig: tri.edge_orig[pos],
                        dissolvable: tri.edge_orig[pos].is_none(),
                    });
                    state.edge.len() - 1
                });
                let me = &mut state.edge[e];
                if me.dissolvable && tri.edge_orig[pos].is_some() {
                    me.dissolvable = false;
                    me.orig = tri.edge_orig[pos];
                }
                if me.v1 == a {
                    debug_assert!(me.left_face.is_none());
                    me.left_face = Some(f);
                } else {
                    debug_assert!(me.right_face.is_none());
                    me.right_face = Some(f);
                }
                face.edge.push(e);
            }
            state.face.push(face);
        }
        state
    }

    /// Whether removing edge `e` between faces `a` and `b` keeps both a single
    /// boundary loop and no repeated vertex.
    fn dissolve_leaves_valid(&self, e: usize, a: usize, b: usize) -> bool {
        let me = &self.edge[e];
        let fa = &self.face[a];
        let fb = &self.face[b];
        let second_shared = fa
            .edge
            .iter()
            .filter(|&&other| other != e)
            .any(|&other| {
                let oe = &self.edge[other];
                oe.left_face == Some(b) || oe.right_face == Some(b)
            });
        if second_shared {
            return false;
        }
        !fa
            .vert
            .iter()
            .filter(|&&v| v != me.v1 && v != me.v2)
            .any(|v| fb.vert.contains(v))
    }

    /// Replace edge `e` in face `a` by the rest of face `b`; `b` is merged into `a`.
    fn splice(&mut self, e: usize, a: usize, b: usize) {
        let (Some(a_start), Some(b_start)) = (
            self.face[a].edge.iter().position(|&x| x == e),
            self.face[b].edge.iter().position(|&x| x == e),
        ) else {
            debug_assert!(false, "edge {} not on both faces", e);
            return;
        };
        let fb = std::mem::replace(
            &mut self.face[b],
            MergeFace {
                vert: Vec::new(),
                edge: Vec::new(),
                merge_to: Some(a),
            },
        );
        let blen = fb.vert.len();
        let fa = &self.face[a];
        let mut vert = Vec::with_capacity(fa.vert.len() + blen - 2);
        let mut edge = Vec::with_capacity(fa.vert.len() + blen - 2);
        vert.extend_from_slice(&fa.vert[..a_start]);
        edge.extend_from_slice(&fa.edge[..a_start]);
        for k in 1..blen {
            let bi = (b_start + k) % blen;
            let (v, be) = (fb.vert[bi], fb.edge[bi]);
            vert.push(v);
            edge.push(be);
            let moved = &mut self.edge[be];
            if moved.v1 == v {
                moved.left_face = Some(a);
            } else {
                moved.right_face = Some(a);
            }
        }
        let fa = &self.face[a];
        vert.extend_from_slice(&fa.vert[a_start + 1..]);
        edge.extend_from_slice(&fa.edge[a_start + 1..]);

        let fa = &mut self.face[a];
        fa.vert = vert;
        fa.edge = edge;
        let me = &mut self.edge[e];
        me.left_face = None;
        me.right_face = None;
    }

    /// Dissolve as many synthetic edges as possible, longest first.
    fn dissolve(&mut self) {
        let mut order: Vec<usize> = (0..self.edge.len()).filter(|&e| self.edge[e].dissolvable).collect();
        order.sort_by(|&x, &y| self.edge[y].len_squared.total_cmp(&self.edge[x].len_squared));
        for e in order {
            let (Some(a), Some(b)) = (self.edge[e].left_face, self.edge[e].right_face) else {
                continue;
            };
            if a == b || !self.dissolve_leaves_valid(e, a, b) {
                continue;
            }
            self.splice(e, a, b);
        }
    }

    /// Surviving faces, in original triangle order.
    fn into_faces(self, arena: &mut MArena) -> Vec<FaceId> {
        let mut out = Vec::new();
        for mf in self.face.iter().filter(|mf| mf.merge_to.is_none()) {
            let edge_orig = mf.edge.iter().map(|&e| self.edge[e].orig).collect();
            out.push(arena.add_face(mf.vert.clone(), self.orig, edge_orig));
        }
        out
    }
}

/// Two triangles sharing a synthetic diagonal that recreate their input quad.
fn untouched_quad(t1: FaceId, t2: FaceId, pm_face: FaceId, arena: &MArena) -> bool {
    let (tri1, tri2, in_face) = (arena.face(t1), arena.face(t2), arena.face(pm_face));
    if in_face.len() != 4 {
        return false;
    }
    let (Some(a), Some(b)) = (tri1.tri(), tri2.tri()) else {
        return false;
    };
    for i in 0..3 {
        for j in 0..3 {
            if a[(i + 1) % 3] == b[j] && a[i] == b[(j + 1) % 3] {
                if tri1.edge_orig[i].is_some() {
                    return false;
                }
                let quad = [a[(i + 1) % 3], a[(i + 2) % 3], a[i], b[(j + 2) % 3]];
                return cyclic_equal(&quad, &in_face.vert);
            }
        }
    }
    false
}

fn merge_tris_for_face(tris: &[usize], tm: &Mesh, pm_face: FaceId, arena: &mut MArena) -> Vec<FaceId> {
    match tris {
        &[t] => return vec![tm.face(t)],
        &[t1, t2] if untouched_quad(tm.face(t1), tm.face(t2), pm_face, arena) => return vec![pm_face],
        _ => {}
    }
    let mut state = FaceMergeState::new(tris, tm, arena);
    state.dissolve();
    state.into_faces(arena)
}

/// Synthetic vertices of valence two lying exactly on a straight side.
fn find_dissolve_verts(pm: &mut Mesh, arena: &MArena) -> Vec<bool> {
    pm.populate_vert(arena);
    let mut dissolve: Vec<bool> = pm.verts().iter().map(|&v| arena.vert(v).orig.is_none()).collect();
    let mut neighbors: Vec<Option<(VertId, VertId)>> = vec![None; pm.vert_count()];

    for &f in pm.faces() {
        let face = arena.face(f);
        for pos in 0..face.len() {
            let Some(index) = pm.lookup_vert(face.vert[pos]) else {
                continue;
            };
            if !dissolve[index] {
                continue;
            }
            let n1 = face.vert[face.next_pos(pos)];
            let n2 = face.vert[face.prev_pos(pos)];
            match neighbors[index] {
                None => neighbors[index] = Some((n1, n2)),
                Some((f1, f2)) => {
                    if !((n1 == f2 && n2 == f1) || (n1 == f1 && n2 == f2)) {
                        dissolve[index] = false;
                    }
                }
            }
        }
    }

    for (index, d) in dissolve.iter_mut().enumerate() {
        if !*d {
            continue;
        }
        *d = match neighbors[index] {
            Some((n1, n2)) => collinear(arena.co(n1), arena.co(pm.verts()[index]), arena.co(n2)),
            None => false,
        };
    }
    dissolve
}

fn dissolve_verts(pm: &mut Mesh, dissolve: &[bool], arena: &mut MArena) {
    for index in 0..pm.face_count() {
        let erase: Vec<bool> = arena
            .face(pm.face(index))
            .vert
            .iter()
            .map(|&v| pm.lookup_vert(v).map_or(false, |i| dissolve[i]))
            .collect();
        if erase.iter().any(|&e| e) {
            pm.erase_face_positions(index, &erase, arena);
        }
    }
    pm.populate_vert(arena);
}

/// Convert boolean output triangles back into polygons.
///
/// `tm_out` triangles are grouped by `orig`, an index into `pm_in`. Groups
/// are merged across dissolvable (synthetic) edges; a pair of triangles that
/// reproduces its input quad yields the input face itself. Triangles without
/// a valid `orig` are passed through after the merged faces. Finally
/// synthetic vertices of valence two on a straight line are removed.
pub fn repolygonize(tm_out: &Mesh, pm_in: &Mesh, arena: &mut MArena) -> Mesh {
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); pm_in.face_count()];
    let mut loose = Vec::new();
    for (t, &f) in tm_out.faces().iter().enumerate() {
        match arena.face(f).orig {
            Some(orig) if orig < groups.len() => groups[orig].push(t),
            _ => loose.push(f),
        }
    }

    let mut faces = Vec::new();
    for (in_f, tris) in groups.iter().enumerate() {
        if !tris.is_empty() {
            faces.extend(merge_tris_for_face(tris, tm_out, pm_in.face(in_f), arena));
        }
    }
    faces.extend(loose);

    let mut pm_out = Mesh::new(faces);
    let dissolve = find_dissolve_verts(&mut pm_out, arena);
    let count = dissolve.iter().filter(|&&d| d).count();
    if count > 0 {
        dissolve_verts(&mut pm_out, &dissolve, arena);
    }
    debug!(
        "repolygonized {} triangles into {} faces, dissolved {} vertices",
        tm_out.face_count(),
        pm_out.face_count(),
        count
    );
    pm_out
}
