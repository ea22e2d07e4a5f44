//! Module for dispatching slice renders to workers

// crate modules
use crate::error::Result;

// volstack modules
use volstack_utils::f;

// external crates
use log::debug;
use rayon::prelude::*;

/// Number of slices handed to a worker at a time
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// Work applied to a single slice index
pub type SliceJob<'a> = dyn Fn(usize) -> Result<()> + Sync + 'a;

/// Strategy for running independent slice jobs
///
/// Implementations run `job` once for every index, with whatever parallelism
/// they like, and return once everything completed or with the first error
/// encountered. Completion order is not defined.
///
/// ```rust
/// # use volstack_slicer::{Sequential, SlicePool, WorkerPool};
/// # use std::sync::atomic::{AtomicUsize, Ordering};
/// let total = AtomicUsize::new(0);
/// let job = |i: usize| -> volstack_slicer::Result<()> {
///     total.fetch_add(i, Ordering::Relaxed);
///     Ok(())
/// };
///
/// Sequential.run(&[1, 2, 3], &job).unwrap();
/// WorkerPool::new(2).unwrap().run(&[4, 5], &job).unwrap();
/// assert_eq!(total.into_inner(), 15);
/// ```
pub trait SlicePool {
    /// Run `job` for every index
    fn run(&self, indices: &[usize], job: &SliceJob) -> Result<()>;
}

/// Runs every slice on the calling thread, in order
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequential;

impl SlicePool for Sequential {
    fn run(&self, indices: &[usize], job: &SliceJob) -> Result<()> {
        indices.iter().try_for_each(|&index| job(index))
    }
}

/// Fixed-size rayon thread pool working through batches of slices
///
/// The underlying threads are owned by the pool and shut down when it is
/// dropped.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    batch_size: usize,
}

impl WorkerPool {
    /// Pool with a fixed number of threads
    ///
    /// A thread count of 0 lets rayon decide, usually one per logical core.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| f!("volstack-worker-{i}"))
            .build()?;

        debug!("Worker pool ready with {} threads", pool.current_num_threads());

        Ok(Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Number of slices handed to a worker at a time
    ///
    /// Values below 1 are raised to 1 rather than rejected.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl SlicePool for WorkerPool {
    fn run(&self, indices: &[usize], job: &SliceJob) -> Result<()> {
        self.pool.install(|| {
            indices
                .par_chunks(self.batch_size)
                .try_for_each(|batch| batch.iter().try_for_each(|&index| job(index)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    fn collect_with<P: SlicePool>(pool: &P, indices: &[usize]) -> Vec<usize> {
        let seen = Mutex::new(Vec::new());
        pool.run(indices, &|i| {
            seen.lock().unwrap().push(i);
            Ok(())
        })
        .unwrap();
        seen.into_inner().unwrap()
    }

    #[test]
    fn sequential_keeps_order() {
        assert_eq!(collect_with(&Sequential, &[3, 1, 2]), vec![3, 1, 2]);
    }

    #[test]
    fn workers_cover_every_index() {
        let indices: Vec<usize> = (0..103).collect();
        let pool = WorkerPool::new(3).unwrap().batch_size(5);
        assert_eq!(pool.threads(), 3);

        let mut seen = collect_with(&pool, &indices);
        seen.sort_unstable();
        assert_eq!(seen, indices);
    }

    #[test]
    fn zero_batch_size_is_bumped() {
        let pool = WorkerPool::new(1).unwrap().batch_size(0);
        assert_eq!(collect_with(&pool, &[0, 1]).len(), 2);
    }

    #[test]
    fn first_error_is_returned() {
        let failing = |i: usize| {
            if i == 7 {
                Err(Error::SliceOutOfRange { index: i, n_z: 7 })
            } else {
                Ok(())
            }
        };
        let indices: Vec<usize> = (0..10).collect();

        assert!(Sequential.run(&indices, &failing).is_err());
        assert!(WorkerPool::new(2).unwrap().run(&indices, &failing).is_err());
    }

    #[test]
    fn empty_work() {
        assert!(Sequential.run(&[], &|_| Ok(())).is_ok());
        assert!(WorkerPool::new(2).unwrap().run(&[], &|_| Ok(())).is_ok());
    }
}
