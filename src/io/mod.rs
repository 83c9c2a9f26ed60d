// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - scene loading and mesh export

mod obj;
mod scene;
mod stl;

pub use obj::{export_obj, write_obj};
pub use scene::{ExportFormat, SceneConfig, SceneOutcome, OP_ENV_VAR};
pub use stl::{export_stl, write_stl};
