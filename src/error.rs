// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the boolean pipeline

use crate::geometry::Mesh;
use thiserror::Error;

/// Structural and input-validity failures raised by the boolean pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BooleanError {
    /// Some patch or cell cannot be reached from the rest of the patch-cell graph.
    #[error("patch-cell graph is disconnected")]
    DisconnectedGraph,

    /// A patch ended graph construction without both bounding cells.
    #[error("patch {patch} is missing a bounding cell")]
    MissingCell {
        /// Patch index.
        patch: usize,
    },

    /// A cell ended graph construction with no incident patch.
    #[error("cell {cell} has no incident patch")]
    EmptyCell {
        /// Cell index.
        cell: usize,
    },

    /// Two distinct cells were found on the same side of a witness edge.
    ///
    /// Merging cells is not supported; the arrangement is rejected instead.
    #[error("unresolved cell merge at edge ({}, {}): cells {first} and {second}", edge.0, edge.1)]
    UnresolvedCellMerge {
        /// Vertex ids of the witness edge.
        edge: (usize, usize),
        /// Cell already bounding the preceding triangle.
        first: usize,
        /// Cell already bounding the following triangle.
        second: usize,
    },

    /// The unbounded outer cell could not be identified.
    #[error("cannot locate ambient cell: {0}")]
    AmbientCell(String),

    /// The shape function returned an id outside `[0, nshapes)`.
    #[error("shape {shape} out of range for {nshapes} shapes")]
    ShapeOutOfRange {
        /// Returned shape id.
        shape: usize,
        /// Number of shapes in the arrangement.
        nshapes: usize,
    },

    /// A floating point coordinate was NaN or infinite.
    #[error("non-finite coordinate")]
    NonFiniteCoordinate,

    /// A face was malformed (too few vertices, mismatched provenance, unknown vertex).
    #[error("invalid face: {0}")]
    InvalidFace(String),
}

/// Failure of a pipeline entry point, carrying the mesh the caller should fall back to.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct BooleanFailure {
    /// What went wrong.
    #[source]
    pub error: BooleanError,
    /// Mesh returned in place of a result.
    pub fallback: Mesh,
}

impl BooleanFailure {
    pub fn new(error: BooleanError, fallback: Mesh) -> Self {
        Self { error, fallback }
    }
}

/// Unrecognized boolean operation name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown boolean operation '{0}' (expected none, union, intersection or difference)")]
pub struct ParseBoolOpError(pub String);
