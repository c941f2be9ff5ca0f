// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmark entry point
//!
//! Prints the worker count, one timing line per step, and the mean
//! throughput. Diagnostics go to stderr through `env_logger`
//! (`RUST_LOG=debug` for per-phase timings).

use anyhow::{Context, Result};
use clap::Parser;

use nbody_bench::config::{
    SimulationParams, DEFAULT_PARTICLES, DEFAULT_SEED, DEFAULT_STEPS, DEFAULT_TIMESTEP,
    DEFAULT_WARMUP,
};
use nbody_bench::report::ConsoleReporter;
use nbody_bench::simulation::Simulation;

#[derive(Parser, Debug)]
#[command(version, about = "All-pairs gravitational N-body benchmark")]
struct Args {
    /// Number of particles
    #[arg(short = 'n', long, default_value_t = DEFAULT_PARTICLES)]
    particles: usize,

    /// Number of time steps
    #[arg(short, long, default_value_t = DEFAULT_STEPS)]
    steps: usize,

    /// Time-step size
    #[arg(long, default_value_t = DEFAULT_TIMESTEP)]
    dt: f32,

    /// Leading steps excluded from the statistics
    #[arg(short, long, default_value_t = DEFAULT_WARMUP)]
    warmup: usize,

    /// Worker threads (0 = all hardware threads)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Seed for particle initialization
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

impl From<Args> for SimulationParams {
    fn from(args: Args) -> Self {
        SimulationParams::default()
            .with_particles(args.particles)
            .with_steps(args.steps)
            .with_timestep(args.dt)
            .with_warmup(args.warmup)
            .with_threads(args.threads)
            .with_seed(args.seed)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = SimulationParams::from(Args::parse());
    let mut sim = Simulation::new(params).context("failed to set up simulation")?;
    let report = sim.run(&mut ConsoleReporter).context("benchmark run failed")?;

    log::info!(
        "Finished {} steps with the {} kernel on {} threads",
        report.step_times.len(),
        report.kernel,
        report.threads
    );

    Ok(())
}
