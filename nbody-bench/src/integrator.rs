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
//! Symplectic Euler time integration
//!
//! Each step is split into two phases separated by a barrier:
//!
//! ```text
//! kick:   v(t + dt) = v(t) + a(x(t)) * dt      (parallel, one task per particle)
//! drift:  x(t + dt) = x(t) + v(t + dt) * dt    (sequential, O(N))
//! ```
//!
//! The drift uses the velocity produced by the kick of the same step, which
//! makes the scheme semi-implicit (symplectic) Euler.
//!
//! # Memory
//!
//! The kick first evaluates every acceleration into a scratch buffer owned by
//! the integrator, then applies them. Positions are only read during the
//! kick, so every task sees the same step-start state. The buffer is reused
//! across steps to keep the hot loop allocation-free.

use crate::force::{compute_accelerations, ForceKernel};
use crate::particle::Particle;
use crate::pool::WorkerPool;

/// Fixed-step symplectic Euler integrator
///
/// # Example
///
/// ```
/// use nbody_bench::force::DirectKernel;
/// use nbody_bench::integrator::SymplecticEuler;
/// use nbody_bench::particle::Particle;
/// use nbody_bench::pool::WorkerPool;
///
/// let pool = WorkerPool::new(1).unwrap();
/// let mut integrator = SymplecticEuler::new(0.01, Box::new(DirectKernel));
/// let mut particles = [
///     Particle::at_rest([-0.5, 0.0, 0.0]),
///     Particle::at_rest([0.5, 0.0, 0.0]),
/// ];
///
/// integrator.step(&mut particles, &pool);
/// assert!(particles[0].vx > 0.0);
/// assert!(particles[1].vx < 0.0);
/// ```
pub struct SymplecticEuler {
    timestep: f32,
    kernel: Box<dyn ForceKernel>,
    accelerations: Vec<[f32; 3]>,
}

impl SymplecticEuler {
    /// Create an integrator with the given timestep and force kernel
    ///
    /// # Panics
    ///
    /// Panics if timestep is non-positive, NaN, or infinite
    pub fn new(timestep: f32, kernel: Box<dyn ForceKernel>) -> Self {
        assert!(
            timestep > 0.0 && timestep.is_finite(),
            "Timestep must be positive and finite"
        );
        SymplecticEuler {
            timestep,
            kernel,
            accelerations: Vec::new(),
        }
    }

    /// Get the timestep
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Name of the force kernel in use
    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    /// Force-and-velocity phase
    ///
    /// Computes the net acceleration on every particle from step-start
    /// positions on the worker pool, then applies `v += dt * a` with one
    /// task per particle. Only velocities change. Returns after all tasks
    /// have completed.
    pub fn kick(&mut self, particles: &mut [Particle], pool: &WorkerPool) {
        let dt = self.timestep;

        self.accelerations.resize(particles.len(), [0.0; 3]);
        compute_accelerations(
            self.kernel.as_ref(),
            particles,
            &mut self.accelerations,
            pool,
        );

        let accelerations = &self.accelerations;
        pool.for_each_indexed(particles, |i, p| {
            let a = accelerations[i];
            p.vx += dt * a[0];
            p.vy += dt * a[1];
            p.vz += dt * a[2];
        });
    }

    /// Position phase
    ///
    /// Applies `x += v * dt` using the velocities left by [`Self::kick`].
    /// Each particle touches only its own state.
    pub fn drift(&self, particles: &mut [Particle]) {
        let dt = self.timestep;
        for p in particles.iter_mut() {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.z += p.vz * dt;
        }
    }

    /// Advance one full step: kick, then drift
    pub fn step(&mut self, particles: &mut [Particle], pool: &WorkerPool) {
        self.kick(particles, pool);
        self.drift(particles);
    }
}

impl std::fmt::Debug for SymplecticEuler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymplecticEuler")
            .field("timestep", &self.timestep)
            .field("kernel", &self.kernel.name())
            .finish()
    }
}
