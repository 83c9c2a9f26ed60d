// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena owning every vertex and face touched by a boolean call
//!
//! Vertices are deduplicated on their exact coordinate and receive
//! sequential ids, so id order is creation order. Faces are immutable once
//! added; operations that "change" a face allocate a new one.

use super::exact::{Plane, Point3Q};
use crate::error::BooleanError;
use ahash::AHashMap;
use nalgebra::Point3;

/// Stable vertex handle; ordering follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertId(pub usize);

/// Stable face handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);

/// Arena vertex
#[derive(Debug, Clone)]
pub struct Vert {
    pub id: VertId,
    pub co_exact: Point3Q,
    /// Float mirror of `co_exact`, never used for decisions.
    pub co: Point3<f64>,
    /// Originating input vertex, `None` for synthetic vertices.
    pub orig: Option<usize>,
}

/// Arena face: a polygon with per-edge provenance
#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    pub vert: Vec<VertId>,
    /// Original edge index for the edge starting at each position; `None` marks a synthetic edge.
    pub edge_orig: Vec<Option<usize>>,
    /// Original face index this face descends from.
    pub orig: Option<usize>,
    pub plane: Plane,
}

impl Face {
    pub fn len(&self) -> usize {
        self.vert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vert.is_empty()
    }

    pub fn is_tri(&self) -> bool {
        self.vert.len() == 3
    }

    pub fn next_pos(&self, pos: usize) -> usize {
        (pos + 1) % self.vert.len()
    }

    pub fn prev_pos(&self, pos: usize) -> usize {
        (pos + self.vert.len() - 1) % self.vert.len()
    }

    /// Triangle vertices, if this face is a triangle.
    pub fn tri(&self) -> Option<[VertId; 3]> {
        match self.vert.as_slice() {
            &[a, b, c] => Some([a, b, c]),
            _ => None,
        }
    }

    /// Same vertex cycle up to rotation.
    pub fn cyclic_equal(&self, other: &Face) -> bool {
        cyclic_equal(&self.vert, &other.vert)
    }
}

/// Equality of two vertex cycles up to rotation (not reflection).
pub fn cyclic_equal(a: &[VertId], b: &[VertId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    let n = a.len();
    (0..n).any(|start| (0..n).all(|k| a[(start + k) % n] == b[k]))
}

/// Vertex and face storage for one boolean call and its result.
#[derive(Debug, Clone, Default)]
pub struct MArena {
    verts: Vec<Vert>,
    faces: Vec<Face>,
    vert_lookup: AHashMap<Point3Q, VertId>,
}

impl MArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the vertex at `co`, creating it if absent. An existing vertex keeps its provenance.
    pub fn add_or_find_vert(&mut self, co: Point3Q, orig: Option<usize>) -> VertId {
        if let Some(&id) = self.vert_lookup.get(&co) {
            return id;
        }
        let id = VertId(self.verts.len());
        self.verts.push(Vert {
            id,
            co: co.to_f64(),
            co_exact: co.clone(),
            orig,
        });
        self.vert_lookup.insert(co, id);
        id
    }

    /// Like [`MArena::add_or_find_vert`], converting a float triple exactly.
    pub fn add_vert_f64(&mut self, co: [f64; 3], orig: Option<usize>) -> Result<VertId, BooleanError> {
        let exact = Point3Q::from_f64(co).ok_or(BooleanError::NonFiniteCoordinate)?;
        Ok(self.add_or_find_vert(exact, orig))
    }

    pub fn find_vert(&self, co: &Point3Q) -> Option<VertId> {
        self.vert_lookup.get(co).copied()
    }

    /// Add a face whose vertices are known to belong to this arena.
    pub fn add_face(&mut self, vert: Vec<VertId>, orig: Option<usize>, edge_orig: Vec<Option<usize>>) -> FaceId {
        debug_assert!(vert.len() >= 3, "face needs at least 3 vertices");
        debug_assert_eq!(vert.len(), edge_orig.len());
        let plane = {
            let points: Vec<&Point3Q> = vert.iter().map(|v| &self.verts[v.0].co_exact).collect();
            Plane::from_polygon(&points)
        };
        let id = FaceId(self.faces.len());
        self.faces.push(Face {
            id,
            vert,
            edge_orig,
            orig,
            plane,
        });
        id
    }

    /// Validating variant of [`MArena::add_face`] for caller supplied data.
    pub fn try_add_face(
        &mut self,
        vert: Vec<VertId>,
        orig: Option<usize>,
        edge_orig: Vec<Option<usize>>,
    ) -> Result<FaceId, BooleanError> {
        if vert.len() < 3 {
            return Err(BooleanError::InvalidFace(format!(
                "face has {} vertices, need at least 3",
                vert.len()
            )));
        }
        if vert.len() != edge_orig.len() {
            return Err(BooleanError::InvalidFace(format!(
                "{} vertices but {} edge origins",
                vert.len(),
                edge_orig.len()
            )));
        }
        if let Some(v) = vert.iter().find(|v| v.0 >= self.verts.len()) {
            return Err(BooleanError::InvalidFace(format!("unknown vertex {}", v.0)));
        }
        Ok(self.add_face(vert, orig, edge_orig))
    }

    pub fn vert(&self, id: VertId) -> &Vert {
        &self.verts[id.0]
    }

    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0]
    }

    pub fn co(&self, id: VertId) -> &Point3Q {
        &self.verts[id.0].co_exact
    }

    pub fn vert_count(&self) -> usize {
        self.verts.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_are_deduplicated_exactly() {
        let mut arena = MArena::new();
        let a = arena.add_vert_f64([0.5, 0.0, 1.0], Some(3)).unwrap();
        let b = arena.add_vert_f64([0.5, 0.0, 1.0], None).unwrap();
        let c = arena.add_vert_f64([0.5, 0.0, 1.0 + f64::EPSILON], None).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(arena.vert_count(), 2);
        assert_eq!(arena.vert(a).orig, Some(3));
        assert_eq!(arena.vert(c).id, VertId(1));
    }

    #[test]
    fn test_non_finite_vertex_is_rejected() {
        let mut arena = MArena::new();
        let err = arena.add_vert_f64([f64::NAN, 0.0, 0.0], None).unwrap_err();
        assert_eq!(err, BooleanError::NonFiniteCoordinate);
        assert_eq!(arena.vert_count(), 0);
    }

    #[test]
    fn test_try_add_face_validates_shape() {
        let mut arena = MArena::new();
        let a = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 0), None);
        let b = arena.add_or_find_vert(Point3Q::from_ints(1, 0, 0), None);
        let c = arena.add_or_find_vert(Point3Q::from_ints(0, 1, 0), None);

        assert!(arena.try_add_face(vec![a, b], None, vec![None, None]).is_err());
        assert!(arena.try_add_face(vec![a, b, c], None, vec![None]).is_err());
        assert!(arena.try_add_face(vec![a, b, VertId(9)], None, vec![None; 3]).is_err());

        let f = arena.try_add_face(vec![a, b, c], Some(0), vec![Some(0), Some(1), None]).unwrap();
        let face = arena.face(f);
        assert!(face.is_tri());
        assert_eq!(face.next_pos(2), 0);
        assert_eq!(face.prev_pos(0), 2);
        assert!(!face.plane.is_degenerate());
    }

    #[test]
    fn test_cyclic_equal() {
        let v: Vec<VertId> = (0..4).map(VertId).collect();
        assert!(cyclic_equal(&v, &[v[2], v[3], v[0], v[1]]));
        assert!(!cyclic_equal(&v, &[v[3], v[2], v[1], v[0]]));
        assert!(!cyclic_equal(&v, &v[..3]));
    }
}
