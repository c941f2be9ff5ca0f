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
//! Streaming throughput statistics
//!
//! Each measured step contributes its rate `1 / elapsed` to two running
//! sums. The mean and standard deviation are derived from those sums once,
//! after the run:
//!
//! ```text
//! mean   = Σ r / n
//! stddev = sqrt(Σ r² / n − mean²)
//! ```
//!
//! The sum-of-squares form needs O(1) memory but loses precision when the
//! rates are large compared with their spread. Benchmark rates are small
//! positive numbers, so this is acceptable here.

use std::fmt;

/// Mean and standard deviation of steps per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    /// Mean steps per second
    pub mean: f64,
    /// Standard deviation of steps per second
    pub stddev: f64,
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} +/- {:.3} steps per second", self.mean, self.stddev)
    }
}

/// Running rate accumulators with a warm-up cutoff
///
/// Steps numbered `1..=warmup` are ignored.
///
/// # Example
///
/// ```
/// use nbody_bench::stats::ThroughputMeter;
///
/// let mut meter = ThroughputMeter::new(1);
/// meter.record(1, 1.0);  // warm-up, ignored
/// meter.record(2, 0.5);  // 2 steps/s
/// meter.record(3, 0.25); // 4 steps/s
///
/// let throughput = meter.finalize().unwrap();
/// assert_eq!(throughput.mean, 3.0);
/// assert_eq!(throughput.stddev, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThroughputMeter {
    warmup: usize,
    rate_sum: f64,
    rate_sq_sum: f64,
    samples: usize,
}

impl ThroughputMeter {
    /// Create an empty meter that skips the first `warmup` steps
    pub fn new(warmup: usize) -> Self {
        ThroughputMeter {
            warmup,
            ..Default::default()
        }
    }

    /// Fold the elapsed time of 1-indexed `step` into the accumulators
    ///
    /// Returns whether the step was counted.
    pub fn record(&mut self, step: usize, elapsed_secs: f64) -> bool {
        if step <= self.warmup {
            return false;
        }

        let rate = 1.0 / elapsed_secs;
        self.rate_sum += rate;
        self.rate_sq_sum += rate * rate;
        self.samples += 1;
        true
    }

    /// Number of steps counted so far
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of leading steps excluded
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Derive mean and standard deviation from the accumulators
    ///
    /// Returns `None` if no step was counted. Rounding can push the variance
    /// slightly below zero when all rates are equal; it is clamped to zero.
    pub fn finalize(&self) -> Option<Throughput> {
        if self.samples == 0 {
            return None;
        }

        let n = self.samples as f64;
        let mean = self.rate_sum / n;
        let variance = (self.rate_sq_sum / n - mean * mean).max(0.0);

        Some(Throughput {
            mean,
            stddev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario() {
        let mut meter = ThroughputMeter::new(1);
        assert!(!meter.record(1, 1.0));
        assert!(meter.record(2, 0.5));
        assert!(meter.record(3, 0.25));

        assert_eq!(meter.samples(), 2);
        let throughput = meter.finalize().unwrap();
        assert_eq!(throughput.mean, 3.0);
        assert_eq!(throughput.stddev, 1.0);
    }

    #[test]
    fn test_no_warmup() {
        let mut meter = ThroughputMeter::new(0);
        meter.record(1, 0.5);

        let throughput = meter.finalize().unwrap();
        assert_eq!(throughput.mean, 2.0);
        assert_eq!(throughput.stddev, 0.0);
    }

    #[test]
    fn test_constant_rate_has_zero_spread() {
        let mut meter = ThroughputMeter::new(0);
        for step in 1..=10 {
            meter.record(step, 0.1);
        }

        let throughput = meter.finalize().unwrap();
        assert!((throughput.mean - 10.0).abs() < 1e-9);
        assert!(throughput.stddev >= 0.0);
        assert!(throughput.stddev < 1e-6);
    }

    #[test]
    fn test_empty_meter() {
        let meter = ThroughputMeter::new(3);
        assert!(meter.finalize().is_none());
        assert_eq!(meter.warmup(), 3);
    }

    #[test]
    fn test_display() {
        let throughput = Throughput { mean: 3.0, stddev: 1.0 };
        assert_eq!(throughput.to_string(), "3.000 +/- 1.000 steps per second");
    }
}
