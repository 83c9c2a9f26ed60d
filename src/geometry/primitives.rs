// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives and conforming box arrangements

use super::arena::{MArena, VertId};
use super::exact::Point3Q;
use super::mesh::Mesh;
use crate::error::BooleanError;
use num_rational::BigRational;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl AxisBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Unit cube translated by `offset`.
    pub fn unit(offset: [f64; 3]) -> Self {
        Self::new(offset, [offset[0] + 1.0, offset[1] + 1.0, offset[2] + 1.0])
    }

    fn exact(&self) -> Result<(Point3Q, Point3Q), BooleanError> {
        let lo = Point3Q::from_f64(self.min).ok_or(BooleanError::NonFiniteCoordinate)?;
        let hi = Point3Q::from_f64(self.max).ok_or(BooleanError::NonFiniteCoordinate)?;
        if (0..3).any(|a| lo.coord(a) >= hi.coord(a)) {
            return Err(BooleanError::InvalidFace(format!(
                "degenerate box {:?}..{:?}",
                self.min, self.max
            )));
        }
        Ok((lo, hi))
    }
}

/// Geometric primitives
pub enum Primitive {
    Cuboid(AxisBox),
}

impl Primitive {
    pub fn cuboid(min: [f64; 3], max: [f64; 3]) -> Self {
        Self::Cuboid(AxisBox::new(min, max))
    }

    /// Closed quad mesh with outward counter-clockwise faces.
    ///
    /// Face `i` has `orig = Some(first_face + i)` and edges numbered from
    /// `4 * (first_face + i)`, so several primitives can share one arena.
    /// New corners are their own input vertices.
    pub fn to_polymesh(&self, arena: &mut MArena, first_face: usize) -> Result<Mesh, BooleanError> {
        match self {
            Self::Cuboid(b) => {
                let (lo, hi) = b.exact()?;
                let mut faces = Vec::with_capacity(6);
                for (i, quad) in box_quads(&lo, &hi).into_iter().enumerate() {
                    let orig = first_face + i;
                    let vert: Vec<VertId> = quad
                        .into_iter()
                        .map(|co| {
                            let next = arena.vert_count();
                            arena.add_or_find_vert(co, Some(next))
                        })
                        .collect();
                    let edge_orig = (0..4).map(|k| Some(4 * orig + k)).collect();
                    faces.push(arena.add_face(vert, Some(orig), edge_orig));
                }
                Ok(Mesh::new(faces))
            }
        }
    }
}

/// The six faces of a box as outward counter-clockwise quads, ordered z, y, x with the low side first.
fn box_quads(lo: &Point3Q, hi: &Point3Q) -> Vec<[Point3Q; 4]> {
    let mut quads = Vec::with_capacity(6);
    for axis in [2, 1, 0] {
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        for high in [false, true] {
            let fixed = if high { hi.coord(axis) } else { lo.coord(axis) };
            let corners = side_corners(lo.coord(u), hi.coord(u), lo.coord(v), hi.coord(v), high);
            quads.push(corners.map(|(cu, cv)| place(axis, fixed, &cu, &cv)));
        }
    }
    quads
}

/// Corners of a box side in `(u, v)` parameters, counter-clockwise seen from outside.
fn side_corners(
    lo_u: &BigRational,
    hi_u: &BigRational,
    lo_v: &BigRational,
    hi_v: &BigRational,
    high: bool,
) -> [(BigRational, BigRational); 4] {
    let c = [
        (lo_u.clone(), lo_v.clone()),
        (hi_u.clone(), lo_v.clone()),
        (hi_u.clone(), hi_v.clone()),
        (lo_u.clone(), hi_v.clone()),
    ];
    if high {
        c
    } else {
        let [c0, c1, c2, c3] = c;
        [c0, c3, c2, c1]
    }
}

fn place(axis: usize, fixed: &BigRational, cu: &BigRational, cv: &BigRational) -> Point3Q {
    let mut co = [fixed.clone(), fixed.clone(), fixed.clone()];
    co[(axis + 1) % 3] = cu.clone();
    co[(axis + 2) % 3] = cv.clone();
    Point3Q::from_axes(co)
}

/// A non-self-intersecting triangle arrangement together with the polygons it came from.
#[derive(Debug, Clone)]
pub struct Arrangement {
    /// Original polygons; triangle `orig` indexes into this mesh.
    pub polys: Mesh,
    /// Conforming triangles.
    pub tris: Mesh,
    /// Shape owning each triangle of `tris`.
    pub shape: Vec<usize>,
    pub nshapes: usize,
}

impl Arrangement {
    pub fn shape_of(&self, tri: usize) -> usize {
        self.shape[tri]
    }
}

/// Builds arrangements of axis-aligned boxes, one shape per box.
///
/// Every box side is cut along the union grid of all box coordinates, so
/// coplanar overlapping sides share vertices and edges exactly. Each grid
/// cell is split on its low-low to high-high diagonal. Box corners carry
/// vertex provenance; grid points are synthetic.
pub struct BoxArrangement;

impl BoxArrangement {
    pub fn build(boxes: &[AxisBox], arena: &mut MArena) -> Result<Arrangement, BooleanError> {
        let exact: Vec<(Point3Q, Point3Q)> = boxes.iter().map(AxisBox::exact).collect::<Result<_, _>>()?;
        let grid: Vec<Vec<BigRational>> = (0..3)
            .map(|axis| {
                let mut g: Vec<BigRational> = exact
                    .iter()
                    .flat_map(|(lo, hi)| [lo.coord(axis).clone(), hi.coord(axis).clone()])
                    .collect();
                g.sort();
                g.dedup();
                g
            })
            .collect();

        // Corners first so they own the low vertex ids and their provenance
        let mut corner = 0;
        for (lo, hi) in &exact {
            for z in [&lo.z, &hi.z] {
                for y in [&lo.y, &hi.y] {
                    for x in [&lo.x, &hi.x] {
                        let co = Point3Q::new(x.clone(), y.clone(), z.clone());
                        arena.add_or_find_vert(co, Some(corner));
                        corner += 1;
                    }
                }
            }
        }

        let mut polys = Vec::with_capacity(6 * boxes.len());
        let mut tris = Vec::new();
        let mut shape = Vec::new();
        for (s, (lo, hi)) in exact.iter().enumerate() {
            for axis in [2, 1, 0] {
                let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
                for high in [false, true] {
                    let fixed = if high { hi.coord(axis) } else { lo.coord(axis) };
                    let corners = side_corners(lo.coord(u), hi.coord(u), lo.coord(v), hi.coord(v), high);
                    let poly_index = polys.len();
                    let first_edge = 4 * poly_index;

                    let vert: Vec<VertId> = corners
                        .iter()
                        .map(|(cu, cv)| arena.add_or_find_vert(place(axis, fixed, cu, cv), None))
                        .collect();
                    let edge_orig = (0..4).map(|k| Some(first_edge + k)).collect();
                    polys.push(arena.add_face(vert, Some(poly_index), edge_orig));

                    let us = clip(&grid[u], lo.coord(u), hi.coord(u));
                    let vs = clip(&grid[v], lo.coord(v), hi.coord(v));
                    for i in 0..us.len().saturating_sub(1) {
                        for j in 0..vs.len().saturating_sub(1) {
                            let p00 = (us[i], vs[j]);
                            let p10 = (us[i + 1], vs[j]);
                            let p11 = (us[i + 1], vs[j + 1]);
                            let p01 = (us[i], vs[j + 1]);
                            let cell_tris = if high {
                                [[p00, p10, p11], [p00, p11, p01]]
                            } else {
                                [[p00, p01, p11], [p00, p11, p10]]
                            };
                            for t in cell_tris {
                                let edge_orig = (0..3)
                                    .map(|k| side_edge(&corners, t[k], t[(k + 1) % 3]).map(|e| first_edge + e))
                                    .collect();
                                let vert = t
                                    .iter()
                                    .map(|&(cu, cv)| arena.add_or_find_vert(place(axis, fixed, cu, cv), None))
                                    .collect();
                                tris.push(arena.add_face(vert, Some(poly_index), edge_orig));
                                shape.push(s);
                            }
                        }
                    }
                }
            }
        }

        Ok(Arrangement {
            polys: Mesh::new(polys),
            tris: Mesh::new(tris),
            shape,
            nshapes: boxes.len(),
        })
    }
}

fn clip<'a>(grid: &'a [BigRational], lo: &BigRational, hi: &BigRational) -> Vec<&'a BigRational> {
    grid.iter().filter(|c| *c >= lo && *c <= hi).collect()
}

/// Index of the original side containing the segment `p`-`q`, if any.
fn side_edge(
    corners: &[(BigRational, BigRational); 4],
    p: (&BigRational, &BigRational),
    q: (&BigRational, &BigRational),
) -> Option<usize> {
    (0..4).find(|&i| {
        let (c0, c1) = (&corners[i], &corners[(i + 1) % 4]);
        let along_u = c0.0 == c1.0 && *p.0 == c0.0 && *q.0 == c0.0;
        let along_v = c0.1 == c1.1 && *p.1 == c0.1 && *q.1 == c0.1;
        along_u || along_v
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::{exact_volume, is_closed};
    use crate::geometry::arena::FaceId;
    use crate::geometry::exact::int;

    #[test]
    fn test_cuboid_polymesh_is_closed_unit_volume() {
        let mut arena = MArena::new();
        let mesh = Primitive::cuboid([0.0; 3], [1.0; 3]).to_polymesh(&mut arena, 0).unwrap();

        assert_eq!(mesh.face_count(), 6);
        assert_eq!(arena.vert_count(), 8);
        assert!(is_closed(&mesh, &arena));
        assert_eq!(exact_volume(&mesh, &arena), int(1));
    }

    #[test]
    fn test_degenerate_box_is_rejected() {
        let mut arena = MArena::new();
        let flat = AxisBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        assert!(matches!(
            BoxArrangement::build(&[flat], &mut arena),
            Err(BooleanError::InvalidFace(_))
        ));
        let nan = AxisBox::new([0.0, f64::NAN, 0.0], [1.0, 1.0, 1.0]);
        assert_eq!(
            BoxArrangement::build(&[nan], &mut arena).unwrap_err(),
            BooleanError::NonFiniteCoordinate
        );
    }

    #[test]
    fn test_single_box_arrangement() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();

        assert_eq!(arr.polys.face_count(), 6);
        assert_eq!(arr.tris.face_count(), 12);
        assert_eq!(arena.vert_count(), 8);
        assert!(is_closed(&arr.tris, &arena));
        assert_eq!(exact_volume(&arr.tris, &arena), int(1));
        // Each triangle has exactly one synthetic edge: the cell diagonal
        for &f in arr.tris.faces() {
            let face = arena.face(f);
            assert_eq!(face.edge_orig.iter().filter(|e| e.is_none()).count(), 1);
        }
    }

    #[test]
    fn test_overlapping_boxes_share_grid() {
        let mut arena = MArena::new();
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])];
        let arr = BoxArrangement::build(&boxes, &mut arena).unwrap();

        assert_eq!(arr.nshapes, 2);
        assert_eq!(arr.tris.face_count(), 40);
        assert_eq!(arr.shape.iter().filter(|&&s| s == 1).count(), 20);
        // Every grid point is a corner of one of the boxes
        assert_eq!(arena.vert_count(), 16);
        for s in 0..2 {
            let faces: Vec<FaceId> = arr
                .tris
                .faces()
                .iter()
                .zip(&arr.shape)
                .filter(|(_, &sh)| sh == s)
                .map(|(&f, _)| f)
                .collect();
            let one = Mesh::new(faces);
            assert!(is_closed(&one, &arena));
            assert_eq!(exact_volume(&one, &arena), int(1));
        }
    }
}
