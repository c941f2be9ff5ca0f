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
//! Particle state and initialization
//!
//! Particles are stored as a flat array of structures: six single-precision
//! scalars per particle, laid out contiguously as
//! `x, y, z, vx, vy, vz, x, y, z, ...`. The store has a fixed length for
//! its whole lifetime; there is no way to add or remove particles once it
//! has been built.
//!
//! Initialization draws every scalar from an injected [`UniformSource`], so
//! tests can substitute a deterministic sequence for the seeded generator.

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{NBodyError, NBodyResult};

/// Lower bound of the initial position/velocity range
pub const INIT_LOW: f32 = -1.0;

/// Upper bound (exclusive) of the initial position/velocity range
pub const INIT_HIGH: f32 = 1.0;

/// A point mass with unit mass
///
/// `#[repr(C)]` keeps the six fields densely packed in declaration order so
/// a `&[Particle]` can be read as a flat `f32` array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Particle {
    /// Position x
    pub x: f32,
    /// Position y
    pub y: f32,
    /// Position z
    pub z: f32,
    /// Velocity x
    pub vx: f32,
    /// Velocity y
    pub vy: f32,
    /// Velocity z
    pub vz: f32,
}

/// Number of scalar fields per particle
pub const SCALARS_PER_PARTICLE: usize = 6;

const _: () = assert!(
    std::mem::size_of::<Particle>() == SCALARS_PER_PARTICLE * std::mem::size_of::<f32>()
);

impl Particle {
    /// Create a particle from a position and a velocity
    pub fn new(position: [f32; 3], velocity: [f32; 3]) -> Self {
        Particle {
            x: position[0],
            y: position[1],
            z: position[2],
            vx: velocity[0],
            vy: velocity[1],
            vz: velocity[2],
        }
    }

    /// Create a particle at rest at the given position
    pub fn at_rest(position: [f32; 3]) -> Self {
        Particle::new(position, [0.0; 3])
    }

    /// Create a particle from its six scalars in storage order
    pub fn from_scalars(s: [f32; SCALARS_PER_PARTICLE]) -> Self {
        Particle::new([s[0], s[1], s[2]], [s[3], s[4], s[5]])
    }

    /// Position as an array
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Velocity as an array
    pub fn velocity(&self) -> [f32; 3] {
        [self.vx, self.vy, self.vz]
    }

    /// Check that all six fields are finite
    pub fn is_finite(&self) -> bool {
        self.position().iter().chain(self.velocity().iter()).all(|v| v.is_finite())
    }
}

/// Capability producing independent uniform samples in a bounded range
pub trait UniformSource {
    /// Fill `out` with uniform samples
    fn fill(&mut self, out: &mut [f32]);
}

/// Seeded uniform generator over `[low, high)`
///
/// Backed by `StdRng`, so a given seed produces the same sequence for a
/// given `rand` release.
///
/// # Example
///
/// ```
/// use nbody_bench::particle::{SeededUniform, UniformSource};
///
/// let mut source = SeededUniform::new(1, -1.0, 1.0).unwrap();
/// let mut samples = [0.0f32; 6];
/// source.fill(&mut samples);
/// assert!(samples.iter().all(|s| (-1.0..1.0).contains(s)));
/// ```
pub struct SeededUniform {
    rng: StdRng,
    distribution: Uniform<f32>,
}

impl SeededUniform {
    /// Create a generator for `[low, high)` from a seed
    pub fn new(seed: u64, low: f32, high: f32) -> NBodyResult<Self> {
        let distribution = Uniform::new(low, high)
            .map_err(|e| NBodyError::RandomSource(format!("[{}, {}): {}", low, high, e)))?;
        Ok(SeededUniform {
            rng: StdRng::seed_from_u64(seed),
            distribution,
        })
    }

    /// Create a generator over the initialization range `[-1, 1)`
    pub fn for_initialization(seed: u64) -> NBodyResult<Self> {
        Self::new(seed, INIT_LOW, INIT_HIGH)
    }
}

impl UniformSource for SeededUniform {
    fn fill(&mut self, out: &mut [f32]) {
        for value in out.iter_mut() {
            *value = self.distribution.sample(&mut self.rng);
        }
    }
}

/// Fixed-length, contiguous particle array
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Allocate `count` particles and fill every scalar from `source`
    ///
    /// Samples are consumed in storage order: all six fields of particle 0,
    /// then particle 1, and so on.
    pub fn initialize(count: usize, source: &mut impl UniformSource) -> Self {
        let mut particles = Vec::with_capacity(count);
        let mut scalars = [0.0f32; SCALARS_PER_PARTICLE];
        for _ in 0..count {
            source.fill(&mut scalars);
            particles.push(Particle::from_scalars(scalars));
        }
        ParticleStore { particles }
    }

    /// Wrap an explicit particle list
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        ParticleStore { particles }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check whether the store holds no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Borrow the particles
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Borrow the particles mutably
    ///
    /// The slice cannot change length, which keeps the store fixed-size.
    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Iterate over the particles
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Total linear momentum, accumulated in double precision (unit masses)
    pub fn total_momentum(&self) -> [f64; 3] {
        self.particles.iter().fold([0.0; 3], |acc, p| {
            [
                acc[0] + p.vx as f64,
                acc[1] + p.vy as f64,
                acc[2] + p.vz as f64,
            ]
        })
    }

    /// Total kinetic energy, accumulated in double precision (unit masses)
    ///
    /// KE = Σ 0.5 * v²
    pub fn kinetic_energy(&self) -> f64 {
        self.particles
            .iter()
            .map(|p| {
                let (vx, vy, vz) = (p.vx as f64, p.vy as f64, p.vz as f64);
                0.5 * (vx * vx + vy * vy + vz * vz)
            })
            .sum()
    }

    /// Count particles with a non-finite field
    pub fn non_finite_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_finite()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Emits 0, 1, 2, ... so fill order is observable
    struct Counter(f32);

    impl UniformSource for Counter {
        fn fill(&mut self, out: &mut [f32]) {
            for value in out.iter_mut() {
                *value = self.0;
                self.0 += 1.0;
            }
        }
    }

    #[test]
    fn test_particle_layout() {
        assert_eq!(std::mem::size_of::<Particle>(), 24);
        assert_eq!(std::mem::align_of::<Particle>(), 4);
    }

    #[test]
    fn test_fill_order_matches_flat_layout() {
        let store = ParticleStore::initialize(2, &mut Counter(0.0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.as_slice()[0], Particle::new([0.0, 1.0, 2.0], [3.0, 4.0, 5.0]));
        assert_eq!(store.as_slice()[1], Particle::new([6.0, 7.0, 8.0], [9.0, 10.0, 11.0]));
    }

    #[test]
    fn test_seeded_initialization_is_deterministic() {
        let mut a = SeededUniform::for_initialization(1).unwrap();
        let mut b = SeededUniform::for_initialization(1).unwrap();

        let first = ParticleStore::initialize(500, &mut a);
        let second = ParticleStore::initialize(500, &mut b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = SeededUniform::for_initialization(1).unwrap();
        let mut b = SeededUniform::for_initialization(2).unwrap();

        let first = ParticleStore::initialize(100, &mut a);
        let second = ParticleStore::initialize(100, &mut b);
        assert_ne!(first, second);
    }

    #[test]
    fn test_initial_values_in_range() {
        let mut source = SeededUniform::for_initialization(1).unwrap();
        let store = ParticleStore::initialize(1000, &mut source);

        for p in store.iter() {
            for v in p.position().iter().chain(p.velocity().iter()) {
                assert!(*v >= INIT_LOW && *v < INIT_HIGH, "sample {} out of range", v);
            }
        }
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(SeededUniform::new(1, 1.0, -1.0).is_err());
        assert!(SeededUniform::new(1, 0.0, f32::NAN).is_err());
    }

    #[test]
    fn test_momentum_and_energy() {
        let store = ParticleStore::from_particles(vec![
            Particle::new([0.0; 3], [1.0, 0.0, 0.0]),
            Particle::new([1.0, 0.0, 0.0], [-1.0, 2.0, 0.0]),
        ]);

        assert_eq!(store.total_momentum(), [0.0, 2.0, 0.0]);
        assert!((store.kinetic_energy() - 3.0).abs() < 1e-12);
        assert_eq!(store.non_finite_count(), 0);
    }

    #[test]
    fn test_non_finite_detection() {
        let store = ParticleStore::from_particles(vec![
            Particle::at_rest([0.0; 3]),
            Particle::new([f32::NAN, 0.0, 0.0], [0.0; 3]),
        ]);
        assert!(!store.as_slice()[1].is_finite());
        assert_eq!(store.non_finite_count(), 1);
    }
}
