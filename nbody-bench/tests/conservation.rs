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
//! Integration tests verifying momentum behavior of the step loop

use nbody_bench::force::DirectKernel;
use nbody_bench::integrator::SymplecticEuler;
use nbody_bench::particle::{Particle, ParticleStore};
use nbody_bench::pool::WorkerPool;

fn momentum_drift(before: [f64; 3], after: [f64; 3]) -> f64 {
    before
        .iter()
        .zip(after.iter())
        .map(|(b, a)| (a - b).abs())
        .fold(0.0, f64::max)
}

#[test]
fn test_two_body_single_step() {
    let pool = WorkerPool::new(1).unwrap();
    let mut integrator = SymplecticEuler::new(0.01, Box::new(DirectKernel));
    let mut store = ParticleStore::from_particles(vec![
        Particle::at_rest([-0.5, 0.0, 0.0]),
        Particle::at_rest([0.5, 0.0, 0.0]),
    ]);

    integrator.step(store.as_mut_slice(), &pool);

    let a = store.as_slice()[0];
    let b = store.as_slice()[1];

    // Accelerate toward each other along x only
    assert!(a.vx > 0.0 && b.vx < 0.0);
    assert_eq!([a.vy, a.vz, b.vy, b.vz], [0.0; 4]);

    // |dv| = dt / r² with r = 1
    assert!((a.vx - 0.01).abs() < 1e-7);
    assert_eq!(a.vx, -b.vx);
}

#[test]
fn test_two_body_momentum_conserved() {
    let pool = WorkerPool::new(2).unwrap();
    let mut integrator = SymplecticEuler::new(0.01, Box::new(DirectKernel));
    let mut store = ParticleStore::from_particles(vec![
        Particle::new([-0.5, 0.0, 0.0], [0.0, 0.3, 0.0]),
        Particle::new([0.5, 0.0, 0.0], [0.0, -0.3, 0.0]),
    ]);
    let initial = store.total_momentum();

    for _ in 0..50 {
        integrator.step(store.as_mut_slice(), &pool);
    }

    let drift = momentum_drift(initial, store.total_momentum());
    assert!(drift < 1e-6, "Momentum drifted by {}", drift);
    assert_eq!(store.non_finite_count(), 0);
}

#[test]
fn test_cube_momentum_conserved() {
    let pool = WorkerPool::new(4).unwrap();
    let mut integrator = SymplecticEuler::new(0.01, Box::new(DirectKernel));

    let mut particles = Vec::new();
    for x in [-0.5, 0.5] {
        for y in [-0.5, 0.5] {
            for z in [-0.5, 0.5] {
                particles.push(Particle::at_rest([x, y, z]));
            }
        }
    }
    let mut store = ParticleStore::from_particles(particles);
    let initial = store.total_momentum();

    for _ in 0..20 {
        integrator.step(store.as_mut_slice(), &pool);
    }

    let drift = momentum_drift(initial, store.total_momentum());
    assert!(drift < 1e-5, "Momentum drifted by {}", drift);

    // The cube collapses toward its center
    let p = store.as_slice()[0];
    assert!(p.x > -0.5 && p.y > -0.5 && p.z > -0.5);
}

#[test]
fn test_free_particle_moves_uniformly() {
    let pool = WorkerPool::new(1).unwrap();
    let mut integrator = SymplecticEuler::new(0.25, Box::new(DirectKernel));
    let mut store = ParticleStore::from_particles(vec![Particle::new([0.0; 3], [1.0, -2.0, 0.5])]);

    for _ in 0..4 {
        integrator.step(store.as_mut_slice(), &pool);
    }

    let p = store.as_slice()[0];
    assert_eq!(p.velocity(), [1.0, -2.0, 0.5]);
    assert_eq!(p.position(), [1.0, -2.0, 0.5]);
    assert!((store.kinetic_energy() - 0.5 * 5.25).abs() < 1e-12);
}
