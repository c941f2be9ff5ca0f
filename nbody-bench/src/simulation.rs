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
//! Benchmark driver
//!
//! The [`Simulation`] owns the particle store for the whole run and lends it
//! to the two phases of each step in turn:
//!
//! ```text
//! for step in 1..=S:
//!     start timer
//!     kick   (parallel force + velocity)   -- barrier
//!     drift  (sequential position)         -- barrier
//!     stop timer, report, fold rate into statistics
//! report mean +/- stddev over steps warmup+1..=S
//! ```
//!
//! A driver moves through `Uninitialized → Running → Reported` exactly once.
//! Steps are never skipped, retried, or reordered, and a reported driver
//! cannot be run again.

use std::time::Instant;

use crate::config::SimulationParams;
use crate::error::{NBodyError, NBodyResult};
use crate::force::{select_kernel, ForceKernel};
use crate::integrator::SymplecticEuler;
use crate::particle::{ParticleStore, SeededUniform, UniformSource};
use crate::pool::WorkerPool;
use crate::report::Reporter;
use crate::stats::{Throughput, ThroughputMeter};

/// Lifecycle of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Particles initialized, no step taken yet
    Uninitialized,
    /// Executing the given 1-indexed step
    Running {
        /// Current step
        step: usize,
    },
    /// Statistics reported; terminal
    Reported,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    /// Workers used by the force phase
    pub threads: usize,
    /// Force kernel used
    pub kernel: String,
    /// Wall-clock seconds of every step, warm-up included
    pub step_times: Vec<f64>,
    /// First step counted in the statistics
    pub first_measured_step: usize,
    /// Last step counted in the statistics
    pub last_step: usize,
    /// Steps-per-second statistics over the measured range
    pub throughput: Throughput,
}

/// Owns the particle state and runs the timed step loop
pub struct Simulation {
    params: SimulationParams,
    store: ParticleStore,
    integrator: SymplecticEuler,
    pool: WorkerPool,
    state: DriverState,
}

impl Simulation {
    /// Validate `params` and initialize particles from the seeded generator
    pub fn new(params: SimulationParams) -> NBodyResult<Self> {
        let mut source = SeededUniform::for_initialization(params.seed)?;
        Self::with_source(params, &mut source)
    }

    /// Validate `params` and initialize particles from `source`
    pub fn with_source(
        params: SimulationParams,
        source: &mut impl UniformSource,
    ) -> NBodyResult<Self> {
        params.validate()?;
        let store = ParticleStore::initialize(params.particles, source);
        Self::from_store(params, store)
    }

    /// Validate `params` and adopt an existing particle store
    ///
    /// The store length must equal `params.particles`. The force kernel is
    /// the best one the CPU supports.
    pub fn from_store(params: SimulationParams, store: ParticleStore) -> NBodyResult<Self> {
        check_store(&params, &store)?;
        Self::from_parts(params, store, select_kernel())
    }

    /// Validate `params` and run `store` with the given force kernel
    pub fn from_parts(
        params: SimulationParams,
        store: ParticleStore,
        kernel: Box<dyn ForceKernel>,
    ) -> NBodyResult<Self> {
        check_store(&params, &store)?;

        let pool = WorkerPool::new(params.threads)?;
        let integrator = SymplecticEuler::new(params.dt, kernel);
        log::info!(
            "Simulation ready: {} particles, {} steps, dt = {}, warm-up = {}, kernel = {}",
            params.particles,
            params.steps,
            params.dt,
            params.warmup,
            integrator.kernel_name()
        );

        Ok(Simulation {
            params,
            store,
            integrator,
            pool,
            state: DriverState::Uninitialized,
        })
    }

    /// Parameters of this run
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Current particle state
    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Workers used by the force phase
    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    /// Name of the force kernel in use
    pub fn kernel_name(&self) -> &str {
        self.integrator.kernel_name()
    }

    /// Run every step, reporting progress and final statistics
    ///
    /// Fails with [`NBodyError::InvalidState`] if the driver already ran.
    pub fn run(&mut self, reporter: &mut impl Reporter) -> NBodyResult<BenchmarkReport> {
        if self.state != DriverState::Uninitialized {
            return Err(NBodyError::InvalidState(format!(
                "simulation cannot run from state {:?}",
                self.state
            )));
        }

        let steps = self.params.steps;
        let threads = self.pool.threads();
        let mut meter = ThroughputMeter::new(self.params.warmup);
        let mut step_times = Vec::with_capacity(steps);

        reporter.threads(threads);
        log::debug!(
            "Initial momentum {:?}, kinetic energy {:.6e}",
            self.store.total_momentum(),
            self.store.kinetic_energy()
        );

        for step in 1..=steps {
            self.state = DriverState::Running { step };

            let start = Instant::now();
            self.integrator.kick(self.store.as_mut_slice(), &self.pool);
            let kicked = start.elapsed();
            self.integrator.drift(self.store.as_mut_slice());
            let elapsed = start.elapsed();

            let elapsed_secs = elapsed.as_secs_f64();
            log::debug!(
                "Step {}: kick {:.6} s, drift {:.6} s",
                step,
                kicked.as_secs_f64(),
                (elapsed - kicked).as_secs_f64()
            );

            reporter.step(step, elapsed_secs);
            meter.record(step, elapsed_secs);
            step_times.push(elapsed_secs);
        }

        let throughput = meter.finalize().ok_or_else(|| {
            NBodyError::InvalidState("no steps after warm-up were measured".to_string())
        })?;
        let first_measured_step = self.params.warmup + 1;
        reporter.summary(first_measured_step, steps, &throughput);

        log::debug!(
            "Final momentum {:?}, kinetic energy {:.6e}",
            self.store.total_momentum(),
            self.store.kinetic_energy()
        );
        self.state = DriverState::Reported;

        Ok(BenchmarkReport {
            threads,
            kernel: self.integrator.kernel_name().to_string(),
            step_times,
            first_measured_step,
            last_step: steps,
            throughput,
        })
    }
}

fn check_store(params: &SimulationParams, store: &ParticleStore) -> NBodyResult<()> {
    params.validate()?;
    if store.len() != params.particles {
        return Err(NBodyError::ParticleCount {
            expected: params.particles,
            actual: store.len(),
        });
    }
    Ok(())
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("params", &self.params)
            .field("particles", &self.store.len())
            .field("integrator", &self.integrator)
            .field("pool", &self.pool)
            .field("state", &self.state)
            .finish()
    }
}
