// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Boolean
//!
//! Exact boolean operations (union, intersection, difference) over
//! non-self-intersecting triangle arrangements. Coordinates are arbitrary
//! precision rationals, so every orientation decision is exact. Output
//! triangles are merged back into the polygons they came from.

pub mod boolean;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod io;

pub use boolean::parallel::{BatchJob, BatchOutcome};
pub use boolean::{
    boolean_arrangement, boolean_mesh, boolean_trimesh, boolean_trimesh_with_report, run_batch, BoolOp,
    BooleanReport,
};
pub use error::{BooleanError, BooleanFailure};
pub use geometry::{AxisBox, BoxArrangement, MArena, Mesh, Primitive};
pub use io::{export_obj, export_stl, SceneConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_union() {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&[AxisBox::unit([0.0; 3]), AxisBox::unit([0.5, 0.0, 0.0])], &mut arena).unwrap();
        let result = boolean_arrangement(&arr, BoolOp::Union, &mut arena);
        assert!(result.is_ok());
    }
}
