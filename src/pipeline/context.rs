//! The execution context: the worker pool a run owns.

use super::error::PipelineError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared counter of context releases, readable after the context is gone.
#[derive(Clone, Debug, Default)]
pub struct ReleaseCounter(Arc<AtomicUsize>);

impl ReleaseCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Dedicated rayon pool for one run.
///
/// Releasing consumes the context, so it can happen at most once; dropping an
/// unreleased context (for example while unwinding) releases it as well.
pub struct ExecutionContext {
    pool: ThreadPool,
    releases: ReleaseCounter,
}

impl ExecutionContext {
    /// Build a pool with `workers` threads (0 means one per CPU).
    pub fn acquire(workers: usize, releases: ReleaseCounter) -> Result<Self, PipelineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("wordtally-worker-{index}"))
            .build()
            .map_err(|e| PipelineError::ContextUnavailable(e.to_string()))?;

        debug!(workers = pool.current_num_threads(), "execution context acquired");
        Ok(Self { pool, releases })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the pool; parallel iterators in `op` use its workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Shut the pool down.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.releases.0.fetch_add(1, Ordering::SeqCst);
        debug!("execution context released");
    }
}
