// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - exact coordinates, arena-owned meshes and primitives

pub mod analytics;
pub mod arena;
pub mod exact;
mod mesh;
mod primitives;

pub use analytics::{analyze, exact_volume, is_closed, GeometryStats};
pub use arena::{cyclic_equal, Face, FaceId, MArena, Vert, VertId};
pub use exact::{orient3d, Plane, Point3Q, Vector3Q};
pub use mesh::Mesh;
pub use primitives::{Arrangement, AxisBox, BoxArrangement, Primitive};
