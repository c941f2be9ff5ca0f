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
//! All-pairs gravitational force kernel
//!
//! Every particle is attracted by every other particle with unit mass and a
//! gravitational constant of 1:
//!
//! **a_i = Σ_{j≠i} (p_j − p_i) / |p_j − p_i|³**
//!
//! # Numerical Behavior
//!
//! There is no softening term. The self pair is skipped by index, and that is
//! the only guard: two distinct particles at the same position divide by zero
//! and produce non-finite values, which then flow into the velocity and
//! position of the affected particles. Adding softening would change both the
//! physics and the cost profile of the benchmark.
//!
//! # Parallel Computation
//!
//! The acceleration of particle `i` depends only on the positions at the start
//! of the step, so all `N` evaluations are independent. They run as one task
//! per particle on the [`WorkerPool`], each writing a distinct output slot.

use crate::particle::Particle;
use crate::pool::WorkerPool;

/// Strategy for evaluating the net acceleration on one particle
///
/// Implementations must skip the self pair and must not apply softening.
pub trait ForceKernel: Send + Sync {
    /// Name of this kernel, for logs and benchmark labels
    fn name(&self) -> &str;

    /// Net acceleration on particle `i` from every other particle
    ///
    /// # Panics
    ///
    /// May panic if `i` is out of bounds for `particles`.
    fn acceleration_on(&self, i: usize, particles: &[Particle]) -> [f32; 3];
}

/// Acceleration that `source` induces on `target`
///
/// Returns `(p_source − p_target) / |p_source − p_target|³`. Swapping the
/// arguments negates the result exactly, since only the sign of the
/// displacement changes.
#[inline(always)]
pub fn pairwise_acceleration(target: &Particle, source: &Particle) -> [f32; 3] {
    let dx = source.x - target.x;
    let dy = source.y - target.y;
    let dz = source.z - target.z;
    let dr_squared = dx * dx + dy * dy + dz * dz;
    let dr_power_n32 = 1.0 / (dr_squared * dr_squared.sqrt());
    [dx * dr_power_n32, dy * dr_power_n32, dz * dr_power_n32]
}

/// Reference scalar kernel
///
/// Accumulates contributions in index order in single precision. Always
/// available and used as the baseline for the vectorized kernels.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectKernel;

impl ForceKernel for DirectKernel {
    fn name(&self) -> &str {
        "direct"
    }

    fn acceleration_on(&self, i: usize, particles: &[Particle]) -> [f32; 3] {
        let target = &particles[i];
        let (mut fx, mut fy, mut fz) = (0.0f32, 0.0f32, 0.0f32);

        for (j, source) in particles.iter().enumerate() {
            if j == i {
                continue;
            }
            let [ax, ay, az] = pairwise_acceleration(target, source);
            fx += ax;
            fy += ay;
            fz += az;
        }

        [fx, fy, fz]
    }
}

/// Select the fastest kernel available on this machine
///
/// With the `simd` feature this picks the vectorized kernel when the CPU
/// supports it; otherwise it returns [`DirectKernel`].
pub fn select_kernel() -> Box<dyn ForceKernel> {
    #[cfg(feature = "simd")]
    {
        crate::simd::select_kernel()
    }

    #[cfg(not(feature = "simd"))]
    {
        Box::new(DirectKernel)
    }
}

/// Evaluate the acceleration on every particle
///
/// Writes `out[i]` for each `i` using step-start positions from `particles`.
/// Returns once every task has finished.
///
/// # Panics
///
/// Panics if `out` and `particles` differ in length.
pub fn compute_accelerations(
    kernel: &dyn ForceKernel,
    particles: &[Particle],
    out: &mut [[f32; 3]],
    pool: &WorkerPool,
) {
    assert_eq!(
        particles.len(),
        out.len(),
        "Acceleration buffer must match particle count"
    );
    pool.fill_indexed(out, |i| kernel.acceleration_on(i, particles));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn magnitude(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_pairwise_direction_and_magnitude() {
        let a = Particle::at_rest([-0.5, 0.0, 0.0]);
        let b = Particle::at_rest([0.5, 0.0, 0.0]);

        let acc = pairwise_acceleration(&a, &b);
        assert_eq!(acc, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_inverse_square_law() {
        let origin = Particle::at_rest([0.0; 3]);
        let near = Particle::at_rest([0.0, 1.0, 0.0]);
        let far = Particle::at_rest([0.0, 2.0, 0.0]);

        let a_near = magnitude(pairwise_acceleration(&origin, &near));
        let a_far = magnitude(pairwise_acceleration(&origin, &far));
        assert!((a_near / a_far - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_pairwise_symmetry() {
        let pairs = [
            ([0.1, -0.7, 0.3], [0.9, 0.2, -0.4]),
            ([-1.0, -1.0, -1.0], [0.999, 0.5, -0.25]),
            ([0.0, 0.0, 0.0], [1e-3, 0.0, 2e-3]),
        ];

        for (p, q) in pairs {
            let a = Particle::at_rest(p);
            let b = Particle::at_rest(q);
            let on_a = pairwise_acceleration(&a, &b);
            let on_b = pairwise_acceleration(&b, &a);
            assert_eq!(on_a, [-on_b[0], -on_b[1], -on_b[2]]);
        }
    }

    #[test]
    fn test_single_particle_has_no_self_force() {
        let particles = [Particle::new([0.3, 0.2, 0.1], [1.0, 1.0, 1.0])];
        assert_eq!(DirectKernel.acceleration_on(0, &particles), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_self_pair_skipped() {
        // Net force on the middle particle cancels only if its own position is
        // never paired with itself (which would produce NaN).
        let particles = [
            Particle::at_rest([-1.0, 0.0, 0.0]),
            Particle::at_rest([0.0, 0.0, 0.0]),
            Particle::at_rest([1.0, 0.0, 0.0]),
        ];
        let acc = DirectKernel.acceleration_on(1, &particles);
        assert_eq!(acc, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_coincident_particles_are_not_finite() {
        let particles = [
            Particle::at_rest([0.25, 0.25, 0.25]),
            Particle::at_rest([0.25, 0.25, 0.25]),
        ];
        let acc = DirectKernel.acceleration_on(0, &particles);
        assert!(acc.iter().any(|a| !a.is_finite()));
    }

    #[test]
    fn test_compute_accelerations_fills_every_slot() {
        let particles = [
            Particle::at_rest([-0.5, 0.0, 0.0]),
            Particle::at_rest([0.5, 0.0, 0.0]),
        ];
        let mut out = [[f32::NAN; 3]; 2];
        let pool = WorkerPool::new(2).unwrap();

        compute_accelerations(&DirectKernel, &particles, &mut out, &pool);
        assert_eq!(out, [[1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]]);
    }

    #[test]
    #[should_panic(expected = "Acceleration buffer must match particle count")]
    fn test_compute_accelerations_length_mismatch() {
        let particles = [Particle::default(); 3];
        let mut out = [[0.0; 3]; 2];
        let pool = WorkerPool::new(1).unwrap();
        compute_accelerations(&DirectKernel, &particles, &mut out, &pool);
    }

    #[test]
    fn test_select_kernel_matches_direct() {
        let particles: Vec<Particle> = (0..37)
            .map(|i| {
                let t = i as f32;
                Particle::at_rest([(t * 0.37).sin(), (t * 0.13).cos(), (t * 0.07).sin()])
            })
            .collect();

        let kernel = select_kernel();
        for i in 0..particles.len() {
            let expected = DirectKernel.acceleration_on(i, &particles);
            let actual = kernel.acceleration_on(i, &particles);
            for k in 0..3 {
                let tolerance = 1e-3 * expected[k].abs().max(1.0);
                assert!(
                    (expected[k] - actual[k]).abs() < tolerance,
                    "{} kernel mismatch at particle {} axis {}: {} vs {}",
                    kernel.name(), i, k, actual[k], expected[k]
                );
            }
        }
    }
}
