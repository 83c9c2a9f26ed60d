// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact angular sort of the triangles around an edge

use super::topology::Edge;
use crate::geometry::{orient3d, MArena, Mesh, VertId};
use std::cmp::Ordering;

/// Index standing in for a synthetic triangle that is not part of the mesh.
pub const EXTRA_TRI: usize = usize::MAX;

/// Position of a triangle relative to the reference triangle's plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wedge {
    /// Coplanar, flap on the same side of the edge.
    Same,
    /// Coplanar, flap on the other side of the edge.
    Opposite,
    Below,
    Above,
}

/// Flap vertex of `tri` with respect to `e`, and whether `tri` runs along `e` from `v1` to `v0`.
pub fn flap(tri: &[VertId; 3], e: Edge) -> (VertId, bool) {
    for i in 0..3 {
        let (a, b, c) = (tri[i], tri[(i + 1) % 3], tri[(i + 2) % 3]);
        if a == e.v0() && b == e.v1() {
            return (c, false);
        }
        if a == e.v1() && b == e.v0() {
            return (c, true);
        }
    }
    debug_assert!(false, "triangle does not contain edge {:?}", e);
    (tri[2], false)
}

/// Vertices of triangle `t` of `tm`.
pub(crate) fn tri_verts(tm: &Mesh, arena: &MArena, t: usize) -> [VertId; 3] {
    let face = arena.face(tm.face(t));
    face.tri().unwrap_or([face.vert[0], face.vert[1], face.vert[2]])
}

/// Triangles fanning around one edge.
struct EdgeFan<'a> {
    tm: &'a Mesh,
    arena: &'a MArena,
    edge: Edge,
    extra: Option<[VertId; 3]>,
}

impl EdgeFan<'_> {
    fn tri(&self, t: usize) -> [VertId; 3] {
        if t == EXTRA_TRI {
            if let Some(extra) = self.extra {
                return extra;
            }
        }
        tri_verts(self.tm, self.arena, t)
    }

    fn wedge(&self, reference: &[VertId; 3], flap0: VertId, rev0: bool, t: usize) -> Wedge {
        let (fv, _) = flap(&self.tri(t), self.edge);
        let co = |v: VertId| self.arena.co(v);
        match orient3d(co(reference[0]), co(reference[1]), co(reference[2]), co(fv)) {
            Ordering::Greater if rev0 => Wedge::Above,
            Ordering::Greater => Wedge::Below,
            Ordering::Less if rev0 => Wedge::Below,
            Ordering::Less => Wedge::Above,
            Ordering::Equal if fv == flap0 => Wedge::Same,
            Ordering::Equal => Wedge::Opposite,
        }
    }

    /// Coplanar duplicates: reversed triangles first by descending index, then the rest ascending.
    fn sort_coplanar(&self, group: &mut [usize]) {
        group.sort_by_key(|&t| {
            let (_, rev) = flap(&self.tri(t), self.edge);
            let key = t as i128;
            if rev {
                -key
            } else {
                key
            }
        });
    }

    fn sort(&self, tris: &[usize], outermost: bool) -> Vec<usize> {
        let Some(&t0) = tris.first() else {
            return Vec::new();
        };
        let reference = self.tri(t0);
        let (flap0, rev0) = flap(&reference, self.edge);

        let mut same = vec![t0];
        let mut opposite = Vec::new();
        let mut below = Vec::new();
        let mut above = Vec::new();
        for &t in &tris[1..] {
            match self.wedge(&reference, flap0, rev0, t) {
                Wedge::Same => same.push(t),
                Wedge::Opposite => opposite.push(t),
                Wedge::Below => below.push(t),
                Wedge::Above => above.push(t),
            }
        }

        if same.len() > 1 {
            self.sort_coplanar(&mut same);
        }
        if opposite.len() > 1 {
            self.sort_coplanar(&mut opposite);
        }
        if below.len() > 1 {
            below = self.sort(&below, false);
        }
        if above.len() > 1 {
            above = self.sort(&above, false);
        }

        // A nested call sorts a half-fan; its reference sits between the below and above wedges.
        // Either way the concatenation continues the counterclockwise sweep from the flap.
        let order = if outermost {
            [same, above, opposite, below]
        } else {
            [below, same, above, opposite]
        };
        order.concat()
    }
}

/// Sort the triangles around `e` into rotational order, starting at `tris[0]`.
///
/// `extra`, when given, is the synthetic triangle that [`EXTRA_TRI`] stands for.
/// Increasing order turns in the direction of the first triangle's normal
/// when that triangle runs along `e` from `v0` to `v1`.
pub fn sort_tris_around_edge(
    tm: &Mesh,
    arena: &MArena,
    e: Edge,
    tris: &[usize],
    extra: Option<[VertId; 3]>,
) -> Vec<usize> {
    let fan = EdgeFan {
        tm,
        arena,
        edge: e,
        extra,
    };
    fan.sort(tris, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FaceId, Point3Q};
    use num_rational::BigRational;

    /// Seven triangles around the z axis, alternating orientation, flaps at increasing angles.
    fn fan_mesh(arena: &mut MArena) -> (Mesh, Edge) {
        let a = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 0), None);
        let b = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 1), None);
        let half = BigRational::new(1.into(), 2.into());
        let flaps = [(1, 0), (2, 1), (1, 2), (-1, 1), (-1, -1), (1, -2), (3, -1)];
        let faces: Vec<FaceId> = flaps
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let co = Point3Q::new(BigRational::from_integer(x.into()), BigRational::from_integer(y.into()), half.clone());
                let f = arena.add_or_find_vert(co, None);
                let vert = if i % 2 == 0 { vec![a, b, f] } else { vec![b, a, f] };
                arena.add_face(vert, None, vec![None; 3])
            })
            .collect();
        (Mesh::new(faces), Edge::new(a, b))
    }

    #[test]
    fn test_flap_reports_direction() {
        let t = [VertId(4), VertId(1), VertId(9)];
        assert_eq!(flap(&t, Edge::new(VertId(1), VertId(4))), (VertId(9), true));
        assert_eq!(flap(&t, Edge::new(VertId(1), VertId(9))), (VertId(4), false));
    }

    #[test]
    fn test_sorted_fan_is_identity() {
        let mut arena = MArena::new();
        let (tm, e) = fan_mesh(&mut arena);
        let tris: Vec<usize> = (0..7).collect();
        assert_eq!(sort_tris_around_edge(&tm, &arena, e, &tris, None), tris);
    }

    #[test]
    fn test_shuffled_fan_is_rotationally_sorted() {
        let mut arena = MArena::new();
        let (tm, e) = fan_mesh(&mut arena);
        let sorted = sort_tris_around_edge(&tm, &arena, e, &[3, 0, 5, 1, 6, 2, 4], None);
        assert_eq!(sorted, vec![3, 4, 5, 6, 0, 1, 2]);
    }

    #[test]
    fn test_every_rotation_starts_at_reference() {
        let mut arena = MArena::new();
        let (tm, e) = fan_mesh(&mut arena);
        for start in 0..7 {
            let mut tris: Vec<usize> = (0..7).rev().collect();
            tris.rotate_left((7 - start) % 7);
            let reference = tris[0];
            let sorted = sort_tris_around_edge(&tm, &arena, e, &tris, None);
            let expected: Vec<usize> = (0..7).map(|k| (reference + k) % 7).collect();
            assert_eq!(sorted, expected, "input {:?}", tris);
        }
    }

    #[test]
    fn test_shuffles_with_opposite_flap_sort_counterclockwise() {
        let mut arena = MArena::new();
        let a = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 0), None);
        let b = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 1), None);
        // Flap 3 lies in the plane of flap 0, on the other side of the edge
        let flaps = [(1, 0), (2, 1), (1, 2), (-1, 0), (-1, -1), (1, -2)];
        let faces: Vec<FaceId> = flaps
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let f = arena.add_or_find_vert(Point3Q::from_ints(x, y, 0), None);
                let vert = if i % 2 == 0 { vec![a, b, f] } else { vec![b, a, f] };
                arena.add_face(vert, None, vec![None; 3])
            })
            .collect();
        let tm = Mesh::new(faces);
        let e = Edge::new(a, b);

        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut tris: Vec<usize> = (0..6).collect();
        for _ in 0..300 {
            for i in (1..tris.len()).rev() {
                seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
                tris.swap(i, (seed >> 33) as usize % (i + 1));
            }
            let reference = tris[0];
            let sorted = sort_tris_around_edge(&tm, &arena, e, &tris, None);
            let expected: Vec<usize> = (0..6).map(|k| (reference + k) % 6).collect();
            assert_eq!(sorted, expected, "input {:?}", tris);
        }
    }

    #[test]
    fn test_coplanar_duplicates_are_ordered_by_signed_index() {
        let mut arena = MArena::new();
        let a = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 0), None);
        let b = arena.add_or_find_vert(Point3Q::from_ints(0, 0, 1), None);
        let f = arena.add_or_find_vert(Point3Q::from_ints(1, 0, 0), None);
        let g = arena.add_or_find_vert(Point3Q::from_ints(-1, 0, 0), None);
        let faces = vec![
            arena.add_face(vec![a, b, f], None, vec![None; 3]),
            arena.add_face(vec![b, a, f], None, vec![None; 3]),
            arena.add_face(vec![a, b, f], None, vec![None; 3]),
            arena.add_face(vec![b, a, g], None, vec![None; 3]),
            arena.add_face(vec![a, b, g], None, vec![None; 3]),
        ];
        let tm = Mesh::new(faces);
        let sorted = sort_tris_around_edge(&tm, &arena, Edge::new(a, b), &[0, 1, 2, 3, 4], None);
        // same side: 1 (reversed) before 0 and 2; opposite side: 3 (reversed) before 4
        assert_eq!(sorted, vec![1, 0, 2, 3, 4]);
    }

    #[test]
    fn test_extra_triangle_is_placed_in_fan() {
        let mut arena = MArena::new();
        let (tm, e) = fan_mesh(&mut arena);
        // Synthetic flap at 45 degrees, between triangles 1 and 2
        let d = arena.add_or_find_vert(Point3Q::from_ints(5, 5, 0), None);
        let extra = [e.v0(), e.v1(), d];
        let mut tris: Vec<usize> = (0..7).collect();
        tris.push(EXTRA_TRI);
        let sorted = sort_tris_around_edge(&tm, &arena, e, &tris, Some(extra));
        assert_eq!(sorted, vec![0, 1, EXTRA_TRI, 2, 3, 4, 5, 6]);
    }
}
