// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge and vertex adjacency of a triangle mesh

use crate::geometry::{MArena, Mesh, VertId};
use ahash::AHashMap;

/// Undirected edge, canonicalized so the lower vertex id comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    v: [VertId; 2],
}

impl Edge {
    pub fn new(a: VertId, b: VertId) -> Self {
        if a <= b {
            Self { v: [a, b] }
        } else {
            Self { v: [b, a] }
        }
    }

    pub fn v0(&self) -> VertId {
        self.v[0]
    }

    pub fn v1(&self) -> VertId {
        self.v[1]
    }

    /// Endpoint opposite to `v`.
    pub fn other(&self, v: VertId) -> VertId {
        if self.v[0] == v {
            self.v[1]
        } else {
            self.v[0]
        }
    }

    pub fn ids(&self) -> (usize, usize) {
        (self.v[0].0, self.v[1].0)
    }
}

/// Adjacency tables for a triangle mesh, keyed by [`Edge`] and [`VertId`].
///
/// Lists are kept in discovery order (face order, then position order), so
/// anything iterating them is deterministic for a given input ordering.
#[derive(Debug, Default)]
pub struct TriMeshTopology {
    edge_tri: AHashMap<Edge, Vec<usize>>,
    vert_edges: AHashMap<VertId, Vec<Edge>>,
}

impl TriMeshTopology {
    pub fn new(tm: &Mesh, arena: &MArena) -> Self {
        let mut topo = Self::default();
        for (t, &f) in tm.faces().iter().enumerate() {
            let face = arena.face(f);
            debug_assert!(face.is_tri());
            for pos in 0..face.len() {
                let v = face.vert[pos];
                let e = Edge::new(v, face.vert[face.next_pos(pos)]);

                let edges = topo.vert_edges.entry(v).or_default();
                if !edges.contains(&e) {
                    edges.push(e);
                }
                let tris = topo.edge_tri.entry(e).or_default();
                if !tris.contains(&t) {
                    tris.push(t);
                }
            }
        }
        topo
    }

    /// Triangles incident to `e`, in discovery order.
    pub fn edge_tris(&self, e: &Edge) -> &[usize] {
        self.edge_tri.get(e).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges leaving `v` in some triangle.
    pub fn vert_edges(&self, v: VertId) -> &[Edge] {
        self.vert_edges.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The other triangle on `e` when exactly two triangles share it.
    pub fn other_tri_if_manifold(&self, e: &Edge, t: usize) -> Option<usize> {
        match self.edge_tris(e) {
            &[a, b] if a == t => Some(b),
            &[a, b] if b == t => Some(a),
            _ => None,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edge_tri.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AxisBox, BoxArrangement};

    #[test]
    fn test_edge_is_canonical() {
        let e = Edge::new(VertId(7), VertId(2));
        assert_eq!(e, Edge::new(VertId(2), VertId(7)));
        assert_eq!(e.v0(), VertId(2));
        assert_eq!(e.other(VertId(2)), VertId(7));
        assert_eq!(e.ids(), (2, 7));
    }

    #[test]
    fn test_closed_cube_is_manifold() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);

        // 12 cube edges plus 6 face diagonals
        assert_eq!(topo.edge_count(), 18);
        for t in 0..arr.tris.face_count() {
            let face = arena.face(arr.tris.face(t));
            for pos in 0..3 {
                let e = Edge::new(face.vert[pos], face.vert[face.next_pos(pos)]);
                let other = topo.other_tri_if_manifold(&e, t).unwrap();
                assert_ne!(other, t);
            }
        }
    }

    #[test]
    fn test_touching_cubes_have_non_manifold_edge() {
        let mut arena = MArena::new();
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::new([1.0, 1.0, 0.0], [2.0, 2.0, 1.0])];
        let arr = BoxArrangement::build(&boxes, &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);

        let a = arena.find_vert(&crate::geometry::Point3Q::from_ints(1, 1, 0)).unwrap();
        let b = arena.find_vert(&crate::geometry::Point3Q::from_ints(1, 1, 1)).unwrap();
        let shared = Edge::new(a, b);
        assert_eq!(topo.edge_tris(&shared).len(), 4);
        assert_eq!(topo.other_tri_if_manifold(&shared, topo.edge_tris(&shared)[0]), None);
        assert!(topo.vert_edges(a).contains(&shared) || topo.vert_edges(b).contains(&shared));
    }
}
