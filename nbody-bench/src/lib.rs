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
//! # nbody-bench
//!
//! A direct-summation gravitational N-body benchmark. Every step evaluates
//! all N² pairwise interactions in parallel, integrates with symplectic
//! Euler, and measures throughput in steps per second.
//!
//! ## Features
//!
//! - **Flat particle store**: six `f32` scalars per particle, contiguous
//! - **All-pairs kernel**: unit masses, G = 1, no softening
//! - **Parallelization**: Rayon work-stealing pool, one task per particle
//! - **SIMD**: optional AVX2 kernel with runtime CPU detection (`simd` feature)
//! - **Statistics**: streaming mean and standard deviation of steps per second
//!
//! ## Example
//!
//! ```rust
//! use nbody_bench::config::SimulationParams;
//! use nbody_bench::simulation::Simulation;
//!
//! let params = SimulationParams::default()
//!     .with_particles(256)
//!     .with_steps(3)
//!     .with_threads(2);
//!
//! let mut sim = Simulation::new(params).unwrap();
//! let mut lines: Vec<String> = Vec::new();
//! let report = sim.run(&mut lines).unwrap();
//!
//! assert_eq!(report.first_measured_step, 2);
//! assert_eq!(lines.len(), 5);
//! ```

#![warn(missing_docs)]

/// Simulation parameters and validation
pub mod config;

/// Error types
pub mod error;

/// Particle state and initialization
pub mod particle;

/// All-pairs gravitational force kernel
pub mod force;

/// Worker pool for the force phase
pub mod pool;

/// Symplectic Euler integration
pub mod integrator;

/// Throughput statistics
pub mod stats;

/// Console reporting
pub mod report;

/// Benchmark driver
pub mod simulation;

/// SIMD force kernels
#[cfg(feature = "simd")]
pub mod simd;

pub use config::SimulationParams;
pub use error::{NBodyError, NBodyResult};
pub use particle::{Particle, ParticleStore};
pub use simulation::{BenchmarkReport, Simulation};
