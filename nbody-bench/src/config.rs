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
//! Simulation parameters
//!
//! All parameters are fixed for the lifetime of a run. Defaults reproduce the
//! reference benchmark: 30000 particles, 20 steps, dt = 0.01, one warm-up
//! step, every available hardware thread, seed 1.

use crate::error::{NBodyError, NBodyResult};

/// Default number of particles
pub const DEFAULT_PARTICLES: usize = 30_000;

/// Default number of time steps
pub const DEFAULT_STEPS: usize = 20;

/// Default time-step magnitude
pub const DEFAULT_TIMESTEP: f32 = 0.01;

/// Default number of warm-up steps excluded from statistics
///
/// The first iteration pays for page faults and cold caches.
pub const DEFAULT_WARMUP: usize = 1;

/// Default seed for particle initialization
pub const DEFAULT_SEED: u64 = 1;

/// Immutable parameters of a benchmark run
///
/// # Example
///
/// ```
/// use nbody_bench::config::SimulationParams;
///
/// let params = SimulationParams::default()
///     .with_particles(1024)
///     .with_steps(5)
///     .with_threads(2);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.measured_steps(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Number of particles N
    pub particles: usize,
    /// Number of time steps S
    pub steps: usize,
    /// Time-step magnitude dt
    pub dt: f32,
    /// Leading steps excluded from throughput statistics
    pub warmup: usize,
    /// Worker threads for the force phase (0 = all hardware threads)
    pub threads: usize,
    /// Seed for the uniform random source
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            particles: DEFAULT_PARTICLES,
            steps: DEFAULT_STEPS,
            dt: DEFAULT_TIMESTEP,
            warmup: DEFAULT_WARMUP,
            threads: 0,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationParams {
    /// Set the particle count
    pub fn with_particles(mut self, particles: usize) -> Self {
        self.particles = particles;
        self
    }

    /// Set the step count
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the time step
    pub fn with_timestep(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Set the warm-up step count
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the worker thread count (0 = all hardware threads)
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of steps that contribute to the throughput statistic
    pub fn measured_steps(&self) -> usize {
        self.steps.saturating_sub(self.warmup)
    }

    /// Check the parameters before any allocation happens
    ///
    /// Rejects an empty particle set, a step count that leaves no measured
    /// steps after warm-up, and a non-positive or non-finite time step.
    pub fn validate(&self) -> NBodyResult<()> {
        if self.particles == 0 {
            return Err(NBodyError::InvalidConfig(
                "particle count must be positive".to_string(),
            ));
        }

        if self.steps <= self.warmup {
            return Err(NBodyError::InvalidConfig(format!(
                "step count {} must exceed warm-up count {}",
                self.steps, self.warmup
            )));
        }

        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(NBodyError::InvalidConfig(format!(
                "time step {} must be positive and finite",
                self.dt
            )));
        }

        // Offsets into the flat scalar array are computed in i32 by the
        // vectorized kernel.
        if self.particles > i32::MAX as usize / 6 {
            return Err(NBodyError::InvalidConfig(format!(
                "particle count {} exceeds the supported maximum {}",
                self.particles,
                i32::MAX as usize / 6
            )));
        }

        Ok(())
    }
}
