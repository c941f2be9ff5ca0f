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
//! CPU feature detection
//!
//! Queries CPUID once per process and caches the result, so kernel
//! selection can consult it without repeated detection overhead.

use std::sync::OnceLock;

/// CPU feature flags relevant to the force kernels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    /// CPU supports AVX
    pub has_avx: bool,
    /// CPU supports AVX2 (required for 32-bit integer gathers)
    pub has_avx2: bool,
}

impl CpuFeatures {
    /// Feature set with everything disabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the AVX2 force kernel can run
    pub fn supports_avx2_kernel(&self) -> bool {
        self.has_avx && self.has_avx2
    }
}

static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Detect CPU features at runtime
///
/// # Platform Support
///
/// - **x86_64**: Feature detection via CPUID
/// - **Other**: All features reported as absent
pub fn detect_cpu_features() -> CpuFeatures {
    *CPU_FEATURES.get_or_init(|| {
        let features = detect_cpu_features_impl();
        log::debug!("Detected CPU features: {:?}", features);
        features
    })
}

#[cfg(target_arch = "x86_64")]
fn detect_cpu_features_impl() -> CpuFeatures {
    use raw_cpuid::CpuId;

    let cpuid = CpuId::new();
    let mut features = CpuFeatures::default();

    if let Some(feature_info) = cpuid.get_feature_info() {
        features.has_avx = feature_info.has_avx();
    }

    if let Some(extended_features) = cpuid.get_extended_feature_info() {
        features.has_avx2 = extended_features.has_avx2();
    }

    features
}

#[cfg(not(target_arch = "x86_64"))]
fn detect_cpu_features_impl() -> CpuFeatures {
    CpuFeatures::default()
}
