/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use gantry::config::PipelineConfig;
use gantry::dataset::parse_file;
use gantry::engine::{SerialSgsEngine, SolveStatus};
use gantry::feasibility::verify_machines;
use gantry::pipeline::Pipeline;
use gantry::results::instance::JssInstance;
use gantry::results::mapping::{FileMapping, MachineMappingSource};
use gantry::results::{load_result, ResultFormat};
use gantry::schedule::report::DEFAULT_NAME_WIDTH;
use gantry::schedule::Report;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Gantry scheduling pipeline.
///
/// Example:
///   gantry solve demos/j6.sm -c demos/gantry.yaml -o schedule.yaml
///   gantry inspect demos/result_b.txt -m demos/mapping.txt
#[derive(Debug, Parser)]
#[command(
    name = "gantry",
    about = "Project / job-shop scheduling pipeline",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(short = 'v', long = "verbose", global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a dataset, build the makespan model, solve it and report the schedule.
    Solve(SolveArgs),
    /// Read an externally produced result file and check it for machine overlaps.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct SolveArgs {
    /// Sectioned project dataset.
    dataset: PathBuf,

    /// Path to the YAML pipeline configuration.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Planning horizon; overrides both configuration and dataset.
    #[arg(long = "horizon")]
    horizon: Option<i64>,

    /// Write the canonical schedule as YAML.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print the built model instead of solving it.
    #[arg(long = "dump-model", default_value_t = false)]
    dump_model: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Result file (solver output or job-shop result).
    result: PathBuf,

    /// Machine mapping file, one row of machine indices per job.
    #[arg(short = 'm', long = "mapping")]
    mapping: Option<PathBuf>,

    /// JSS instance supplying durations and machines.
    #[arg(short = 'i', long = "instance")]
    instance: Option<PathBuf>,

    /// auto | solver | job-shop
    #[arg(short = 'f', long = "format", default_value = "auto")]
    format: ResultFormat,

    /// Width of the job-name column.
    #[arg(long = "name-width", default_value_t = DEFAULT_NAME_WIDTH)]
    name_width: usize,
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load_from_file(path),
        None => {
            warn!("No configuration file provided, using default pipeline settings");
            Ok(PipelineConfig::default())
        }
    }
}

fn solve(args: &SolveArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = SerialSgsEngine::new(config.priority);
    let pipeline = Pipeline::new(engine, config).with_horizon(args.horizon);

    if args.dump_model {
        let dataset = parse_file(&args.dataset)?;
        let prepared = pipeline
            .prepare_dataset(&dataset)
            .with_context(|| format!("Failed to build model for {}", args.dataset.display()))?;
        print!("{}", prepared.model);
        return Ok(());
    }

    let outcome = pipeline.run_file(&args.dataset)?;

    match outcome.report(pipeline.config().name_width) {
        Some(report) => print!("{report}"),
        None => println!("No schedule: {}", outcome.status),
    }
    if let Some(feasibility) = &outcome.feasibility {
        println!("{feasibility}");
    }

    if let (Some(path), Some(schedule)) = (&args.output, &outcome.schedule) {
        let yaml = schedule.to_yaml().context("Failed to serialise schedule")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Cannot write schedule: {}", path.display()))?;
        info!(path = %path.display(), "schedule written");
    } else if args.output.is_some() {
        warn!(status = %outcome.status, "no schedule to write");
    }
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<()> {
    let instance = args.instance.as_deref().map(JssInstance::load).transpose()?;
    let mapping = args.mapping.as_ref().map(FileMapping::new);

    let result = load_result(
        &args.result,
        args.format,
        mapping.as_ref().map(|m| m as &dyn MachineMappingSource),
        instance.as_ref(),
    )?;

    let timeline = result.machine_timeline();
    println!("Makespan: {}", result.makespan);
    for (machine, ops) in &timeline {
        let busy: i64 = ops.iter().map(|op| op.duration).sum();
        println!("  M{machine}: {} operation(s), busy {busy}", ops.len());
    }
    println!();

    let schedule = result.to_schedule();
    let report = Report::new(&schedule, SolveStatus::Feasible)
        .with_name_width(args.name_width);
    print!("{report}");
    println!("{}", verify_machines(&timeline));
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Level is controlled by the RUST_LOG env-var; -v lowers the default to debug.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match &cli.command {
        Command::Solve(args) => {
            info!(
                dataset = %args.dataset.display(),
                config = ?args.config,
                horizon = ?args.horizon,
                "solve"
            );
            solve(args)
        }
        Command::Inspect(args) => {
            info!(
                result = %args.result.display(),
                mapping = ?args.mapping,
                instance = ?args.instance,
                "inspect"
            );
            inspect(args)
        }
    };

    if let Err(e) = outcome {
        error!("gantry failed: {:#}", e);
        process::exit(1);
    }
}
