/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Random job-shop instance generator.
//!
//! Every job visits machines in its own shuffled order; operation `k` runs on
//! `order[k mod machines]`, so jobs with more operations than machines revisit
//! them.  Durations are uniform in `1..=100`.  The same seed always yields the
//! same instance.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

use gantry::results::{JssInstance, JssOperation};

const MAX_DURATION: i64 = 100;

/// Generate a random JSS instance.
///
/// Example:
///   gen-jss 10 5 5               # → dataset_10x5x5.jss, seed 42
///   gen-jss 3 3 4 small.jss 7
#[derive(Debug, Parser)]
#[command(
    name = "gen-jss",
    about = "Random job-shop instance generator",
    long_about = None,
)]
struct Cli {
    /// Number of jobs.
    jobs: usize,

    /// Number of machines.
    machines: usize,

    /// Operations per job.
    operations: usize,

    /// Output file (default: dataset_<jobs>x<machines>x<operations>.jss).
    output: Option<PathBuf>,

    /// Random seed.
    #[arg(default_value_t = 42)]
    seed: u64,
}

fn generate(jobs: usize, machines: usize, operations: usize, seed: u64) -> Result<JssInstance> {
    if machines == 0 && operations > 0 {
        bail!("operations need at least one machine");
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let jobs = (0..jobs)
        .map(|_| {
            let mut order: Vec<usize> = (0..machines).collect();
            order.shuffle(&mut rng);
            (0..operations)
                .map(|op| JssOperation {
                    machine: order[op % machines],
                    duration: rng.random_range(1..=MAX_DURATION),
                })
                .collect()
        })
        .collect();
    Ok(JssInstance { machines, jobs })
}

fn default_output(cli: &Cli) -> PathBuf {
    let Cli {
        jobs,
        machines,
        operations,
        ..
    } = cli;
    PathBuf::from(format!("dataset_{jobs}x{machines}x{operations}.jss"))
}

fn run(cli: &Cli) -> Result<()> {
    let instance = generate(cli.jobs, cli.machines, cli.operations, cli.seed)?;
    let path = cli.output.clone().unwrap_or_else(|| default_output(cli));
    std::fs::write(&path, instance.to_string())
        .with_context(|| format!("Cannot write instance: {}", path.display()))?;
    info!(
        path = %path.display(),
        jobs = cli.jobs,
        machines = cli.machines,
        operations = cli.operations,
        seed = cli.seed,
        "instance written"
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("gen-jss failed: {:#}", e);
        process::exit(1);
    }
}
