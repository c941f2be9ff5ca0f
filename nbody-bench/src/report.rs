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
//! Console reporting
//!
//! The benchmark prints exactly three kinds of lines, which external scripts
//! parse:
//!
//! ```text
//! Propagating particles using 8 threads...
//! Step 1: 0.412 seconds
//! ...
//! Average rate for iterations 2 through 20: 2.541 +/- 0.013 steps per second.
//! ```

use crate::stats::Throughput;

/// Startup line
pub fn threads_line(threads: usize) -> String {
    format!("Propagating particles using {} threads...", threads)
}

/// Per-step timing line
pub fn step_line(step: usize, elapsed_secs: f64) -> String {
    format!("Step {}: {:.3} seconds", step, elapsed_secs)
}

/// Final statistics line
pub fn summary_line(first_step: usize, last_step: usize, throughput: &Throughput) -> String {
    format!(
        "Average rate for iterations {} through {}: {}.",
        first_step, last_step, throughput
    )
}

/// Sink for benchmark progress lines
pub trait Reporter {
    /// Emit one formatted line
    fn emit(&mut self, line: &str);

    /// Report the worker count before the first step
    fn threads(&mut self, threads: usize) {
        self.emit(&threads_line(threads));
    }

    /// Report the elapsed time of a step
    fn step(&mut self, step: usize, elapsed_secs: f64) {
        self.emit(&step_line(step, elapsed_secs));
    }

    /// Report the throughput over the inclusive measured step range
    fn summary(&mut self, first_step: usize, last_step: usize, throughput: &Throughput) {
        self.emit(&summary_line(first_step, last_step, throughput));
    }
}

/// Prints every line to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Collects lines in memory
impl Reporter for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_string());
    }
}
