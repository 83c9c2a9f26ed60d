// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::arena::{MArena, VertId};
use super::mesh::Mesh;
use ahash::AHashMap;
use num_rational::BigRational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Signed volume; positive for outward oriented closed meshes
    pub volume: f64,
    /// Total surface area
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Number of distinct vertices
    pub vertex_count: usize,
    /// Number of polygons
    pub face_count: usize,
    /// Number of triangles in a fan split of all polygons
    pub triangle_count: usize,
    /// Every directed edge is matched by its reverse
    pub is_watertight: bool,
}

impl GeometryStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            vertex_count: 0,
            face_count: 0,
            triangle_count: 0,
            is_watertight: true,
        }
    }

    /// Print the statistics as a boxed table
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              BOOLEAN RESULT                              ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Volume:          {:>10.4}                              ║", self.volume);
        println!("║ Surface Area:    {:>10.4}                              ║", self.surface_area);
        println!("║                                                          ║");
        println!("║ Bounding Box:                                            ║");
        println!(
            "║   Min: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
            self.bbox[0], self.bbox[1], self.bbox[2]
        );
        println!(
            "║   Max: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
            self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("║                                                          ║");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Faces:           {:>10}                              ║", self.face_count);
        println!("║ Triangles:       {:>10}                              ║", self.triangle_count);
        println!(
            "║ Watertight:      {:>10}                              ║",
            if self.is_watertight { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh, arena: &MArena) -> GeometryStats {
    if mesh.is_empty() {
        return GeometryStats::empty();
    }

    let mut volume = 0.0;
    let mut surface_area = 0.0;
    let mut triangle_count = 0;
    for (a, b, c) in fan_triangles(mesh, arena) {
        let (p0, p1, p2) = (arena.vert(a).co, arena.vert(b).co, arena.vert(c).co);
        volume += p0.coords.dot(&p1.coords.cross(&p2.coords)) / 6.0;
        surface_area += (p1 - p0).cross(&(p2 - p0)).norm() / 2.0;
        triangle_count += 1;
    }

    GeometryStats {
        volume,
        surface_area,
        bbox: calculate_bounding_box(mesh, arena),
        vertex_count: mesh.distinct_vert_count(arena),
        face_count: mesh.face_count(),
        triangle_count,
        is_watertight: is_closed(mesh, arena),
    }
}

/// Exact signed volume by fan decomposition against the origin.
pub fn exact_volume(mesh: &Mesh, arena: &MArena) -> BigRational {
    let mut six_vol = BigRational::zero();
    for (a, b, c) in fan_triangles(mesh, arena) {
        let (p0, p1, p2) = (arena.co(a).coords(), arena.co(b).coords(), arena.co(c).coords());
        six_vol += p0.dot(&p1.cross(&p2));
    }
    six_vol / BigRational::from_integer(6.into())
}

/// Every directed edge appears as often as its reverse.
pub fn is_closed(mesh: &Mesh, arena: &MArena) -> bool {
    let mut directed: AHashMap<(VertId, VertId), usize> = AHashMap::new();
    for &f in mesh.faces() {
        let face = arena.face(f);
        for pos in 0..face.len() {
            let e = (face.vert[pos], face.vert[face.next_pos(pos)]);
            *directed.entry(e).or_insert(0) += 1;
        }
    }
    directed
        .iter()
        .all(|(&(a, b), &n)| directed.get(&(b, a)).copied().unwrap_or(0) == n)
}

fn fan_triangles<'a>(mesh: &'a Mesh, arena: &'a MArena) -> impl Iterator<Item = (VertId, VertId, VertId)> + 'a {
    mesh.faces().iter().flat_map(move |&f| {
        let vert = &arena.face(f).vert;
        (1..vert.len().saturating_sub(1)).map(move |i| (vert[0], vert[i], vert[i + 1]))
    })
}

fn calculate_bounding_box(mesh: &Mesh, arena: &MArena) -> [f64; 6] {
    let mut bbox = [f64::MAX, f64::MAX, f64::MAX, f64::MIN, f64::MIN, f64::MIN];
    for &f in mesh.faces() {
        for &v in &arena.face(f).vert {
            let p = arena.vert(v).co;
            for axis in 0..3 {
                bbox[axis] = bbox[axis].min(p[axis]);
                bbox[axis + 3] = bbox[axis + 3].max(p[axis]);
            }
        }
    }
    bbox
}
