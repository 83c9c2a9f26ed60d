// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Boolean CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use polyframe_boolean::cli::Reporter;
use polyframe_boolean::io::{ExportFormat, SceneConfig, SceneOutcome};
use polyframe_boolean::{run_batch, AxisBox, BatchJob};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "polyframe-boolean")]
#[command(about = "Polyframe Boolean - exact mesh booleans over box arrangements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate scene files and export their results
    Run {
        /// Scene TOML file(s)
        #[arg(required = true)]
        scenes: Vec<String>,
    },

    /// Combine boxes given on the command line
    Boxes {
        /// Operation (union, intersection, difference, none)
        #[arg(short = 'p', long, default_value = "union")]
        op: String,

        /// Box as x0,y0,z0,x1,y1,z1; the first box is the minuend of a difference
        #[arg(short, long = "box", value_name = "BOX", required = true)]
        boxes: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (obj, stl)
        #[arg(short, long, default_value = "obj")]
        format: String,

        /// Keep the output triangulated
        #[arg(long)]
        no_repolygonize: bool,

        /// Print the pipeline report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenes } => run_command(&scenes, cli.verbose)?,
        Commands::Boxes {
            op,
            boxes,
            output,
            format,
            no_repolygonize,
            json,
        } => {
            let mut scene = SceneConfig::new(op.parse()?, parse_boxes(&boxes)?);
            scene.output = output.map(PathBuf::from);
            scene.format = format.parse()?;
            scene.repolygonize = !no_repolygonize;
            boxes_command(&scene, json, cli.verbose)?;
        }
        Commands::Version => {
            println!("Polyframe Boolean v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn parse_boxes(specs: &[String]) -> Result<Vec<AxisBox>> {
    specs
        .iter()
        .map(|arg| {
            let values: Vec<f64> = arg
                .split(',')
                .map(|s| s.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .with_context(|| format!("Invalid box coordinates: {}", arg))?;
            if values.len() != 6 {
                bail!("Box needs 6 coordinates, got {}: {}", values.len(), arg);
            }
            Ok(AxisBox::new(
                [values[0], values[1], values[2]],
                [values[3], values[4], values[5]],
            ))
        })
        .collect()
}

fn boxes_command(scene: &SceneConfig, json: bool, verbose: bool) -> Result<()> {
    let start = Instant::now();
    let outcome = match scene.evaluate() {
        Ok(outcome) => outcome,
        Err(e) => {
            Reporter::report_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };
    let duration = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        Reporter::report_scene("command line", &outcome, duration);
        if verbose {
            Reporter::report_cells(&outcome.report);
            outcome.stats.print();
        }
    }
    export(scene, &outcome)
}

fn run_command(paths: &[String], verbose: bool) -> Result<()> {
    let mut scenes = Vec::new();
    for path in paths {
        match SceneConfig::load(path) {
            Ok(scene) => scenes.push((path.as_str(), scene)),
            Err(e) => Reporter::report_error(&format!("{:#}", e)),
        }
    }
    if scenes.is_empty() {
        eprintln!("{}", "No scenes to evaluate".red());
        std::process::exit(1);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("Evaluating {} scene(s)", scenes.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let jobs: Vec<BatchJob> = scenes.iter().map(|(_, scene)| scene.job()).collect();
    let start = Instant::now();
    let results = run_batch(&jobs);
    let duration = start.elapsed();
    spinner.finish_with_message("Evaluation complete");

    let mut failed = 0;
    for ((name, scene), result) in scenes.iter().zip(results) {
        match result {
            Ok(outcome) => {
                let outcome = SceneOutcome::from(outcome);
                Reporter::report_scene(name, &outcome, duration);
                if verbose {
                    Reporter::report_cells(&outcome.report);
                    outcome.stats.print();
                }
                if scene.output.is_none() {
                    Reporter::report_info(&format!("{}: no output path, result not written", name));
                }
                export(scene, &outcome)?;
            }
            Err(e) => {
                failed += 1;
                Reporter::report_error(&format!("{}: {}", name, e));
            }
        }
    }

    if failed > 0 {
        Reporter::report_warning(&format!("{} of {} scene(s) failed", failed, scenes.len()));
        std::process::exit(1);
    }
    Ok(())
}

fn export(scene: &SceneConfig, outcome: &SceneOutcome) -> Result<()> {
    if let Some(path) = scene.export(outcome)? {
        let kind = match scene.format {
            ExportFormat::Obj => "OBJ",
            ExportFormat::Stl => "STL",
        };
        Reporter::success(&format!("Wrote {} {}", kind, path.display()));
    }
    Ok(())
}
