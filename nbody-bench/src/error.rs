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
//! Error types for the benchmark engine
//!
//! Fallible library operations return `NBodyResult<T>`. Numerical problems
//! (coincident particles, non-finite forces) are not errors: they propagate
//! through the particle state untouched.

use thiserror::Error;

/// Unified error type for the benchmark engine
#[derive(Debug, Error)]
pub enum NBodyError {
    /// A simulation parameter is out of its valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be created
    #[cfg(feature = "parallel")]
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The uniform random source could not be constructed
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// A particle store does not match the configured particle count
    #[error("Particle count mismatch: expected {expected}, got {actual}")]
    ParticleCount {
        /// Particle count from the simulation parameters
        expected: usize,
        /// Length of the supplied particle store
        actual: usize,
    },

    /// The driver was used out of order (e.g. run twice)
    #[error("Invalid driver state: {0}")]
    InvalidState(String),
}

/// Convenience alias for `Result<T, NBodyError>`
pub type NBodyResult<T> = Result<T, NBodyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = NBodyError::InvalidConfig("step count 1 must exceed warm-up count 1".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: step count 1 must exceed warm-up count 1"
        );

        let err = NBodyError::ParticleCount { expected: 4, actual: 2 };
        assert_eq!(err.to_string(), "Particle count mismatch: expected 4, got 2");
    }
}
