// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::boolean::BooleanReport;
use crate::io::SceneOutcome;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report an evaluated scene with colors
    pub fn report_scene(name: &str, outcome: &SceneOutcome, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Scene:".bold(), name.cyan());
        println!("{}", "━".repeat(80).bright_black());

        let report = &outcome.report;
        let stats = &outcome.stats;
        if stats.is_watertight {
            println!("{} {}", "✅".green(), format!("{} result is closed", report.op).green().bold());
        } else {
            println!("{} {}", "⚠️".yellow(), format!("{} result is open", report.op).yellow().bold());
        }

        println!("\n{}", "Pipeline:".bold());
        Self::print_count("Shapes", report.nshapes);
        Self::print_count("Input triangles", report.input_triangles);
        Self::print_count("Patches", report.patches);
        Self::print_count("Witness edges", report.witness_edges);
        Self::print_count("Cells", report.cells);
        if let Some(c) = report.ambient_cell {
            Self::print_count("Ambient cell", c);
        }
        Self::print_count("Output faces", report.output_faces);

        println!("\n{}", "Result:".bold());
        println!("  {} {}", "Volume:".bright_black(), format!("{:.6}", stats.volume).cyan());
        println!("  {} {}", "Surface area:".bright_black(), format!("{:.6}", stats.surface_area).cyan());
        println!("  {} {}", "Vertices:".bright_black(), stats.vertex_count.to_string().cyan());
        println!("  {} {}", "Time:".bright_black(), Self::format_duration(duration).yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Print per-cell windings and flags
    pub fn report_cells(report: &BooleanReport) {
        println!("\n{}", "Cells:".bold());
        for (c, (winding, flag)) in report.cell_windings.iter().zip(&report.cell_flags).enumerate() {
            let marker = if Some(c) == report.ambient_cell { " (ambient)" } else { "" };
            let line = format!("  {:>4} {:?}{}", c, winding, marker);
            if *flag {
                println!("{}", line.green());
            } else {
                println!("{}", line.bright_black());
            }
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_count(name: &str, value: usize) {
        println!("  {} {}", format!("{}:", name).bright_black(), value.to_string().cyan());
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
