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
//! Fixed-size worker pool for the force phase
//!
//! The pool executes one task per particle index. Tasks never block or
//! yield; idle workers steal index ranges from busy ones, which balances the
//! load when the worker count does not divide the particle count evenly.
//!
//! Every call into the pool is a barrier: it returns only after all tasks
//! have completed, so the next phase always observes a fully written output.
//!
//! Without the `parallel` feature the pool runs every task on the calling
//! thread and reports a single worker.

use crate::error::NBodyResult;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fixed-size pool of worker threads
pub struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `threads` workers
    ///
    /// `0` selects every available hardware thread (or `RAYON_NUM_THREADS`
    /// when set).
    #[cfg(feature = "parallel")]
    pub fn new(threads: usize) -> NBodyResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("nbody-worker-{}", index))
            .build()?;

        log::info!("Worker pool ready with {} threads", pool.current_num_threads());
        Ok(WorkerPool { pool })
    }

    /// Build the sequential stand-in pool
    ///
    /// The requested thread count is ignored.
    #[cfg(not(feature = "parallel"))]
    pub fn new(threads: usize) -> NBodyResult<Self> {
        if threads > 1 {
            log::warn!(
                "Requested {} threads but the `parallel` feature is disabled; running sequentially",
                threads
            );
        }
        Ok(WorkerPool {})
    }

    /// Number of workers executing tasks
    pub fn threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            self.pool.current_num_threads()
        }

        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    /// Set `out[i] = task(i)` for every index, one task per slot
    ///
    /// Each task writes only its own slot, so no synchronization is needed
    /// inside the loop. Returns after every task has finished.
    pub fn fill_indexed<T, F>(&self, out: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(|| {
                out.par_iter_mut()
                    .enumerate()
                    .for_each(|(i, slot)| *slot = task(i));
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = task(i);
            }
        }
    }

    /// Apply `task` to every element with its index, one task per element
    ///
    /// Same barrier semantics as [`WorkerPool::fill_indexed`].
    pub fn for_each_indexed<T, F>(&self, items: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(|| {
                items
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(i, item)| task(i, item));
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (i, item) in items.iter_mut().enumerate() {
                task(i, item);
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}
