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
//! Two particles falling toward each other
//!
//! Runs the driver on a hand-built two-body system and prints the particle
//! state after every run, showing the equal and opposite velocities.
//!
//! ```text
//! cargo run --example two_body
//! ```

use nbody_bench::config::SimulationParams;
use nbody_bench::particle::{Particle, ParticleStore};
use nbody_bench::report::ConsoleReporter;
use nbody_bench::simulation::Simulation;
use nbody_bench::NBodyResult;

fn main() -> NBodyResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let params = SimulationParams::default()
        .with_particles(2)
        .with_steps(40)
        .with_warmup(0)
        .with_threads(1);

    let store = ParticleStore::from_particles(vec![
        Particle::at_rest([-0.5, 0.0, 0.0]),
        Particle::at_rest([0.5, 0.0, 0.0]),
    ]);

    let mut sim = Simulation::from_store(params, store)?;
    sim.run(&mut ConsoleReporter)?;

    for (i, p) in sim.particles().iter().enumerate() {
        println!(
            "particle {}: position ({:+.5}, {:+.5}, {:+.5}) velocity ({:+.5}, {:+.5}, {:+.5})",
            i, p.x, p.y, p.z, p.vx, p.vy, p.vz
        );
    }
    println!("total momentum: {:?}", sim.particles().total_momentum());

    Ok(())
}
