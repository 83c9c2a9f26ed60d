// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation: an ordered list of arena faces

use super::arena::{FaceId, MArena, VertId};
use ahash::{AHashMap, AHashSet};

/// Polygonal or triangle mesh whose faces live in an [`MArena`].
///
/// The vertex list is only available after [`Mesh::populate_vert`], which
/// records vertices in first-seen order over the faces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mesh {
    faces: Vec<FaceId>,
    verts: Vec<VertId>,
    vert_to_index: AHashMap<VertId, usize>,
}

impl Mesh {
    pub fn new(faces: Vec<FaceId>) -> Self {
        Self {
            faces,
            verts: Vec::new(),
            vert_to_index: AHashMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    pub fn face(&self, index: usize) -> FaceId {
        self.faces[index]
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Build the vertex list in first-seen order.
    pub fn populate_vert(&mut self, arena: &MArena) {
        self.verts.clear();
        self.vert_to_index.clear();
        for &f in &self.faces {
            for &v in &arena.face(f).vert {
                if !self.vert_to_index.contains_key(&v) {
                    self.vert_to_index.insert(v, self.verts.len());
                    self.verts.push(v);
                }
            }
        }
    }

    /// Populated vertices; empty until [`Mesh::populate_vert`] runs.
    pub fn verts(&self) -> &[VertId] {
        &self.verts
    }

    pub fn vert_count(&self) -> usize {
        self.verts.len()
    }

    /// Position of `v` in the populated vertex list.
    pub fn lookup_vert(&self, v: VertId) -> Option<usize> {
        self.vert_to_index.get(&v).copied()
    }

    /// Replace face `index` by a copy without the flagged positions.
    ///
    /// Kept positions keep their edge provenance. A face that would drop
    /// below three vertices is left untouched and `false` is returned.
    pub fn erase_face_positions(&mut self, index: usize, erase: &[bool], arena: &mut MArena) -> bool {
        let face = arena.face(self.faces[index]);
        debug_assert_eq!(face.len(), erase.len());
        let kept = erase.iter().filter(|&&e| !e).count();
        if kept < 3 {
            return false;
        }
        let mut vert = Vec::with_capacity(kept);
        let mut edge_orig = Vec::with_capacity(kept);
        for (pos, &e) in erase.iter().enumerate() {
            if !e {
                vert.push(face.vert[pos]);
                edge_orig.push(face.edge_orig[pos]);
            }
        }
        let orig = face.orig;
        self.faces[index] = arena.add_face(vert, orig, edge_orig);
        true
    }

    /// True when every face is a triangle.
    pub fn is_all_tris(&self, arena: &MArena) -> bool {
        self.faces.iter().all(|&f| arena.face(f).is_tri())
    }

    /// Number of distinct vertices referenced, without populating.
    pub fn distinct_vert_count(&self, arena: &MArena) -> usize {
        let mut seen = AHashSet::new();
        for &f in &self.faces {
            seen.extend(arena.face(f).vert.iter().copied());
        }
        seen.len()
    }
}
