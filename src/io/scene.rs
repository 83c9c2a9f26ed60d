// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene configuration: a boolean over boxes, loaded from TOML

use super::{export_obj, export_stl};
use crate::boolean::parallel::{BatchJob, BatchOutcome};
use crate::boolean::{BoolOp, BooleanReport};
use crate::geometry::{analyze, AxisBox, GeometryStats, MArena, Mesh};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding [`SceneConfig::operation`] in [`SceneConfig::load`].
pub const OP_ENV_VAR: &str = "POLYFRAME_BOOLEAN_OP";

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Obj,
    Stl,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportFormat::Obj => f.write_str("obj"),
            ExportFormat::Stl => f.write_str("stl"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "obj" => Ok(ExportFormat::Obj),
            "stl" => Ok(ExportFormat::Stl),
            other => Err(anyhow!("Unsupported export format: {}", other)),
        }
    }
}

/// Boolean scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Operation applied to the boxes
    #[serde(default)]
    pub operation: BoolOp,
    /// Operands; box 0 is the minuend of a difference
    pub boxes: Vec<AxisBox>,
    /// Where to write the result, if anywhere
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub format: ExportFormat,
    /// Merge output triangles back into polygons
    #[serde(default = "default_repolygonize")]
    pub repolygonize: bool,
}

fn default_repolygonize() -> bool {
    true
}

/// Evaluated scene
#[derive(Debug, Clone)]
pub struct SceneOutcome {
    pub arena: MArena,
    pub mesh: Mesh,
    pub report: BooleanReport,
    pub stats: GeometryStats,
}

impl From<BatchOutcome> for SceneOutcome {
    fn from(outcome: BatchOutcome) -> Self {
        let stats = analyze(&outcome.mesh, &outcome.arena);
        Self {
            arena: outcome.arena,
            mesh: outcome.mesh,
            report: outcome.report,
            stats,
        }
    }
}

impl SceneConfig {
    pub fn new(operation: BoolOp, boxes: Vec<AxisBox>) -> Self {
        Self {
            operation,
            boxes,
            output: None,
            format: ExportFormat::default(),
            repolygonize: true,
        }
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read scene file: {:?}", path.as_ref()))?;
        let config: SceneConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse scene file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        if let Ok(op) = std::env::var(OP_ENV_VAR) {
            config.operation = op
                .parse()
                .with_context(|| format!("Invalid {} value", OP_ENV_VAR))?;
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize scene")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write scene file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn job(&self) -> BatchJob {
        BatchJob {
            op: self.operation,
            boxes: self.boxes.clone(),
            repolygonize: self.repolygonize,
        }
    }

    /// Run the boolean in a fresh arena.
    pub fn evaluate(&self) -> Result<SceneOutcome> {
        let outcome = self
            .job()
            .run()
            .with_context(|| format!("Boolean {} of {} boxes failed", self.operation, self.boxes.len()))?;
        Ok(outcome.into())
    }

    /// Write `outcome` to the configured output, returning the path written.
    pub fn export(&self, outcome: &SceneOutcome) -> Result<Option<PathBuf>> {
        let Some(path) = &self.output else {
            return Ok(None);
        };
        match self.format {
            ExportFormat::Obj => export_obj(&outcome.mesh, &outcome.arena, path)?,
            ExportFormat::Stl => export_stl(&outcome.mesh, &outcome.arena, path)?,
        }
        Ok(Some(path.clone()))
    }
}
