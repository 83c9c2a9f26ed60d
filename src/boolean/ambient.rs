// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Location of the unbounded outer cell

use super::patch::{PatchesInfo, Side};
use super::sort::{flap, sort_tris_around_edge, tri_verts, EXTRA_TRI};
use super::topology::{Edge, TriMeshTopology};
use crate::error::BooleanError;
use crate::geometry::exact::{abs_ratio, int};
use crate::geometry::{MArena, Mesh, Vector3Q, VertId};
use log::debug;
use num_rational::BigRational;
use num_traits::Zero;

/// Find the ambient cell of a valid patch-cell graph.
///
/// Starts from a vertex of maximal x and the incident edge of steepest
/// projected slope, which lies on the convex hull. A synthetic triangle
/// joins that edge to a point one unit further along +x; after sorting it
/// into the fan around the edge, the cell between its two neighbours is
/// the outer cell. The synthetic vertex stays in the arena.
pub fn find_ambient_cell(
    tm: &Mesh,
    tmtopo: &TriMeshTopology,
    pinfo: &PatchesInfo,
    arena: &mut MArena,
) -> Result<usize, BooleanError> {
    let v_extreme = extreme_vertex(tm, arena).ok_or_else(|| BooleanError::AmbientCell("empty mesh".into()))?;
    let ehull = hull_edge(v_extreme, tmtopo, arena)
        .ok_or_else(|| BooleanError::AmbientCell(format!("no edge at extreme vertex {}", v_extreme.0)))?;

    let dummy_co = arena.co(v_extreme).add(&Vector3Q::new(int(1), BigRational::zero(), BigRational::zero()));
    let dummy = arena.add_or_find_vert(dummy_co, None);
    let extra = [ehull.v0(), ehull.v1(), dummy];
    let (p0, p1, p2) = (arena.co(extra[0]), arena.co(extra[1]), arena.co(extra[2]));
    if p1.sub(p0).cross(&p2.sub(p0)).is_zero() {
        return Err(BooleanError::AmbientCell("degenerate hull edge".into()));
    }

    let mut fan: Vec<usize> = tmtopo.edge_tris(&ehull).to_vec();
    fan.push(EXTRA_TRI);
    let sorted = sort_tris_around_edge(tm, arena, ehull, &fan, Some(extra));
    let n = sorted.len();
    let pos = sorted
        .iter()
        .position(|&t| t == EXTRA_TRI)
        .ok_or_else(|| BooleanError::AmbientCell("synthetic triangle lost in sort".into()))?;
    let prev = sorted[(pos + n - 1) % n];
    let next = sorted[(pos + 1) % n];
    if prev == EXTRA_TRI || next == EXTRA_TRI {
        return Err(BooleanError::AmbientCell("hull edge has no triangles".into()));
    }

    let (_, prev_flipped) = flap(&tri_verts(tm, arena, prev), ehull);
    let (_, next_flipped) = flap(&tri_verts(tm, arena, next), ehull);
    let after_prev = pinfo.patch(pinfo.tri_patch(prev)).cell(Side::following(prev_flipped));
    let before_next = pinfo.patch(pinfo.tri_patch(next)).cell(Side::preceding(next_flipped));
    match (after_prev, before_next) {
        (Some(a), Some(b)) if a == b => {
            debug!("ambient cell {} found at hull edge {:?}", a, ehull.ids());
            Ok(a)
        }
        _ => Err(BooleanError::AmbientCell(format!(
            "neighbours of hull edge {:?} disagree ({:?} vs {:?})",
            ehull.ids(),
            after_prev,
            before_next
        ))),
    }
}

/// First vertex, in face order, with the largest x coordinate.
fn extreme_vertex(tm: &Mesh, arena: &MArena) -> Option<VertId> {
    let mut best: Option<VertId> = None;
    for &f in tm.faces() {
        for &v in &arena.face(f).vert {
            let better = match best {
                None => true,
                Some(b) => arena.co(v).x > arena.co(b).x,
            };
            if better {
                best = Some(v);
            }
        }
    }
    best
}

/// Edge at `v` with the steepest |dy/dx|; an edge with dx = 0 wins outright.
fn hull_edge(v: VertId, tmtopo: &TriMeshTopology, arena: &MArena) -> Option<Edge> {
    let co = arena.co(v);
    let mut best: Option<(Edge, BigRational)> = None;
    for &e in tmtopo.vert_edges(v) {
        let other = arena.co(e.other(v));
        let dx = &other.x - &co.x;
        let dy = &other.y - &co.y;
        match abs_ratio(&dy, &dx) {
            None => return Some(e),
            Some(slope) => {
                if best.as_ref().map_or(true, |(_, s)| slope > *s) {
                    best = Some((e, slope));
                }
            }
        }
    }
    best.map(|(e, _)| e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::cell::find_cells;
    use crate::boolean::patch::find_patches;
    use crate::geometry::{AxisBox, BoxArrangement, Point3Q};

    #[test]
    fn test_ambient_cell_of_single_cube() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let mut pinfo = find_patches(&arr.tris, &topo, &arena);
        find_cells(&arr.tris, &topo, &arena, &mut pinfo).unwrap();

        let ambient = find_ambient_cell(&arr.tris, &topo, &pinfo, &mut arena).unwrap();
        // Outward oriented faces have the outside above them
        assert_eq!(Some(ambient), pinfo.patch(0).cell_above);
        // The synthetic vertex was added to the arena
        assert_eq!(arena.vert_count(), 9);
    }

    #[test]
    fn test_ambient_cell_of_overlapping_cubes() {
        let mut arena = MArena::new();
        let boxes = [AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])];
        let arr = BoxArrangement::build(&boxes, &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let mut pinfo = find_patches(&arr.tris, &topo, &arena);
        find_cells(&arr.tris, &topo, &arena, &mut pinfo).unwrap();

        let ambient = find_ambient_cell(&arr.tris, &topo, &pinfo, &mut arena).unwrap();
        assert_eq!(ambient, 3);
    }

    #[test]
    fn test_collinear_sliver_has_no_ambient_cell() {
        let mut arena = MArena::new();
        let v: Vec<VertId> = (0..3)
            .map(|x| arena.add_or_find_vert(Point3Q::from_ints(x, 0, 0), None))
            .collect();
        let tm = Mesh::new(vec![
            arena.add_face(vec![v[0], v[1], v[2]], Some(0), vec![None; 3]),
            arena.add_face(vec![v[2], v[1], v[0]], Some(1), vec![None; 3]),
        ]);
        let topo = TriMeshTopology::new(&tm, &arena);
        let mut pinfo = find_patches(&tm, &topo, &arena);
        find_cells(&tm, &topo, &arena, &mut pinfo).unwrap();

        let err = find_ambient_cell(&tm, &topo, &pinfo, &mut arena).unwrap_err();
        assert!(matches!(err, BooleanError::AmbientCell(_)), "{:?}", err);
    }

    #[test]
    fn test_hull_edge_prefers_vertical_projection() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3])], &mut arena).unwrap();
        let topo = TriMeshTopology::new(&arr.tris, &arena);
        let v = extreme_vertex(&arr.tris, &arena).unwrap();
        assert_eq!(arena.co(v).x, int(1));

        let e = hull_edge(v, &topo, &arena).unwrap();
        let other = arena.co(e.other(v));
        assert_eq!(other.x, arena.co(v).x);
    }
}
