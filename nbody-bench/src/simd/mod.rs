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
//! SIMD force kernels
//!
//! Vectorized versions of the all-pairs kernel, selected at runtime from the
//! detected CPU features with [`DirectKernel`] as the fallback.
//!
//! # Architecture
//!
//! - **Runtime Detection**: CPU features are queried once and cached
//! - **Dispatch**: [`select_kernel`] returns the best supported kernel (AVX2 > scalar)
//! - **Tolerance**: Vectorized and scalar kernels agree within single-precision
//!   reordering error
//!
//! # Safety
//!
//! Vectorized kernels can only be constructed after a successful runtime
//! check, so their `target_feature` code never runs on an unsupported CPU.

mod dispatch;

#[cfg(target_arch = "x86_64")]
mod avx2;

pub use dispatch::{detect_cpu_features, CpuFeatures};

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Kernel;

use crate::force::{DirectKernel, ForceKernel};

/// f32 lanes per AVX2 vector (256-bit / 32-bit)
pub const AVX2_LANES: usize = 8;

/// Select the best kernel for the current CPU
pub fn select_kernel() -> Box<dyn ForceKernel> {
    #[cfg(target_arch = "x86_64")]
    {
        if let Some(kernel) = Avx2Kernel::new() {
            log::info!("Using AVX2 force kernel");
            return Box::new(kernel);
        }
    }

    log::info!("Using scalar force kernel");
    Box::new(DirectKernel)
}
