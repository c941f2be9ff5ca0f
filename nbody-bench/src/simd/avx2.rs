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
//! AVX2 force kernel for x86_64 CPUs
//!
//! Evaluates eight source particles per iteration of the inner loop. Source
//! coordinates are gathered straight out of the array-of-structures layout
//! with a stride of six scalars, so the particle store needs no transposed
//! copy.
//!
//! # Requirements
//!
//! - x86_64 CPU with AVX and AVX2 support
//! - Detected automatically at runtime
//!
//! # Accuracy
//!
//! Contributions are summed per lane and reduced at the end, so the result
//! differs from [`DirectKernel`](crate::force::DirectKernel) by
//! reordering error only. Non-finite contributions from coincident particles
//! propagate exactly as in the scalar kernel.

use std::arch::x86_64::*;

use super::dispatch::detect_cpu_features;
use super::AVX2_LANES;
use crate::force::{pairwise_acceleration, ForceKernel};
use crate::particle::{Particle, SCALARS_PER_PARTICLE};

/// Largest particle count whose scalar offsets fit in `i32`
const MAX_PARTICLES: usize = i32::MAX as usize / SCALARS_PER_PARTICLE;

/// AVX2 all-pairs kernel
///
/// Only constructible on CPUs that support AVX2.
#[derive(Debug)]
pub struct Avx2Kernel {
    _supported: (),
}

impl Avx2Kernel {
    /// Create the kernel if the current CPU supports it
    pub fn new() -> Option<Self> {
        let supported = detect_cpu_features().supports_avx2_kernel()
            && is_x86_feature_detected!("avx")
            && is_x86_feature_detected!("avx2");

        supported.then_some(Avx2Kernel { _supported: () })
    }
}

impl ForceKernel for Avx2Kernel {
    fn name(&self) -> &str {
        "avx2"
    }

    fn acceleration_on(&self, i: usize, particles: &[Particle]) -> [f32; 3] {
        assert!(i < particles.len(), "Particle index {} out of bounds", i);
        assert!(
            particles.len() <= MAX_PARTICLES,
            "AVX2 kernel supports at most {} particles",
            MAX_PARTICLES
        );

        // SAFETY: `Avx2Kernel::new` only succeeds when AVX and AVX2 are
        // available, and `i` is in bounds.
        unsafe { accumulate(i, particles) }
    }
}

#[target_feature(enable = "avx,avx2")]
unsafe fn accumulate(i: usize, particles: &[Particle]) -> [f32; 3] {
    let n = particles.len();
    let target = &particles[i];
    // Particle is repr(C) with six f32 fields
    let base = particles.as_ptr().cast::<f32>();

    let xi = _mm256_set1_ps(target.x);
    let yi = _mm256_set1_ps(target.y);
    let zi = _mm256_set1_ps(target.z);
    let one = _mm256_set1_ps(1.0);

    let lanes = _mm256_setr_epi32(0, 1, 2, 3, 4, 5, 6, 7);
    let offsets_x = _mm256_setr_epi32(0, 6, 12, 18, 24, 30, 36, 42);
    let offsets_y = _mm256_add_epi32(offsets_x, _mm256_set1_epi32(1));
    let offsets_z = _mm256_add_epi32(offsets_x, _mm256_set1_epi32(2));

    let mut fx = _mm256_setzero_ps();
    let mut fy = _mm256_setzero_ps();
    let mut fz = _mm256_setzero_ps();

    let full = n - n % AVX2_LANES;
    let mut j = 0;
    while j < full {
        let block = base.add(j * SCALARS_PER_PARTICLE);
        let xj = _mm256_i32gather_ps::<4>(block, offsets_x);
        let yj = _mm256_i32gather_ps::<4>(block, offsets_y);
        let zj = _mm256_i32gather_ps::<4>(block, offsets_z);

        let dx = _mm256_sub_ps(xj, xi);
        let dy = _mm256_sub_ps(yj, yi);
        let dz = _mm256_sub_ps(zj, zi);
        let dr_squared = _mm256_add_ps(
            _mm256_add_ps(_mm256_mul_ps(dx, dx), _mm256_mul_ps(dy, dy)),
            _mm256_mul_ps(dz, dz),
        );
        let dr_power_n32 =
            _mm256_div_ps(one, _mm256_mul_ps(dr_squared, _mm256_sqrt_ps(dr_squared)));

        // The self pair evaluates to NaN; mask its lane to zero
        let self_lane = _mm256_set1_epi32((i as i32).wrapping_sub(j as i32));
        let self_mask = _mm256_castsi256_ps(_mm256_cmpeq_epi32(lanes, self_lane));

        fx = _mm256_add_ps(fx, _mm256_andnot_ps(self_mask, _mm256_mul_ps(dx, dr_power_n32)));
        fy = _mm256_add_ps(fy, _mm256_andnot_ps(self_mask, _mm256_mul_ps(dy, dr_power_n32)));
        fz = _mm256_add_ps(fz, _mm256_andnot_ps(self_mask, _mm256_mul_ps(dz, dr_power_n32)));

        j += AVX2_LANES;
    }

    let mut acc = [horizontal_sum(fx), horizontal_sum(fy), horizontal_sum(fz)];

    // Tail
    for (offset, source) in particles[full..].iter().enumerate() {
        if full + offset == i {
            continue;
        }
        let [ax, ay, az] = pairwise_acceleration(target, source);
        acc[0] += ax;
        acc[1] += ay;
        acc[2] += az;
    }

    acc
}

#[target_feature(enable = "avx")]
unsafe fn horizontal_sum(v: __m256) -> f32 {
    let mut lanes = [0.0f32; AVX2_LANES];
    _mm256_storeu_ps(lanes.as_mut_ptr(), v);
    lanes.iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::DirectKernel;

    fn lattice(n: usize) -> Vec<Particle> {
        (0..n)
            .map(|i| {
                let t = i as f32;
                Particle::at_rest([(t * 0.37).sin(), (t * 0.13).cos(), (t * 0.07).sin()])
            })
            .collect()
    }

    fn assert_close(a: [f32; 3], b: [f32; 3]) {
        for k in 0..3 {
            let tolerance = 1e-3 * b[k].abs().max(1.0);
            assert!((a[k] - b[k]).abs() < tolerance, "axis {}: {} vs {}", k, a[k], b[k]);
        }
    }

    #[test]
    fn test_matches_direct_kernel() {
        let Some(kernel) = Avx2Kernel::new() else {
            return;
        };

        // Sizes below, at, and past the lane width exercise the tail loop
        for n in [1, 2, 7, 8, 9, 16, 29] {
            let particles = lattice(n);
            for i in 0..n {
                assert_close(
                    kernel.acceleration_on(i, &particles),
                    DirectKernel.acceleration_on(i, &particles),
                );
            }
        }
    }

    #[test]
    fn test_self_lane_masked() {
        let Some(kernel) = Avx2Kernel::new() else {
            return;
        };

        let particles = lattice(8);
        for i in 0..8 {
            let acc = kernel.acceleration_on(i, &particles);
            assert!(acc.iter().all(|a| a.is_finite()), "particle {}: {:?}", i, acc);
        }
    }

    #[test]
    fn test_coincident_particles_propagate() {
        let Some(kernel) = Avx2Kernel::new() else {
            return;
        };

        let mut particles = lattice(8);
        particles[5] = particles[2];
        let acc = kernel.acceleration_on(2, &particles);
        assert!(acc.iter().any(|a| !a.is_finite()));
    }
}
