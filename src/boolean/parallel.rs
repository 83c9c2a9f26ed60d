// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parallel evaluation of independent box booleans

use super::{boolean_trimesh_with_report, repolygonize, BoolOp, BooleanReport};
use crate::error::BooleanError;
use crate::geometry::{AxisBox, BoxArrangement, MArena, Mesh};
use rayon::prelude::*;

/// One self-contained boolean over axis-aligned boxes, shape `i` being box `i`.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub op: BoolOp,
    pub boxes: Vec<AxisBox>,
    pub repolygonize: bool,
}

/// Result of a [`BatchJob`] with the arena its mesh lives in.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub arena: MArena,
    pub mesh: Mesh,
    pub report: BooleanReport,
}

impl BatchJob {
    pub fn new(op: BoolOp, boxes: Vec<AxisBox>) -> Self {
        Self {
            op,
            boxes,
            repolygonize: true,
        }
    }

    /// Run the job in a fresh arena.
    pub fn run(&self) -> Result<BatchOutcome, BooleanError> {
        let mut arena = MArena::new();
        let arr = BoxArrangement::build(&self.boxes, &mut arena)?;
        let (tris, mut report) =
            boolean_trimesh_with_report(&arr.tris, self.op, arr.nshapes, |t| arr.shape_of(t), &mut arena)
                .map_err(|failure| failure.error)?;
        let mesh = if self.repolygonize {
            repolygonize(&tris, &arr.polys, &mut arena)
        } else {
            tris
        };
        report.output_faces = mesh.face_count();
        Ok(BatchOutcome { arena, mesh, report })
    }
}

/// Run jobs in parallel; results keep the order of `jobs`.
pub fn run_batch(jobs: &[BatchJob]) -> Vec<Result<BatchOutcome, BooleanError>> {
    jobs.par_iter().map(BatchJob::run).collect()
}
