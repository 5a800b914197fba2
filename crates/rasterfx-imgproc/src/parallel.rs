use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// Input and output sizes do not match.
    #[error("source and destination slices must have the same length")]
    SizeMismatch,
}

/// Controls how the pixels of one row are computed.
///
/// Rows are always produced in order so that progress and cancellation stay sequential; the
/// strategy only decides how the pixels inside a row are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to compute the pixels of a row in parallel.
    #[default]
    ParallelElements,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a dedicated thread pool with `n` threads, built once per sweep.
    Fixed(usize),
}

/// A resolved [`ExecutionStrategy`], holding the thread pool when one is needed.
pub(crate) enum RowRunner {
    Serial,
    Global,
    Pool(rayon::ThreadPool),
}

impl RowRunner {
    /// Resolve a strategy, building the dedicated pool if requested.
    pub(crate) fn new(strategy: ExecutionStrategy) -> Result<Self, ParallelError> {
        match strategy {
            ExecutionStrategy::Serial => Ok(RowRunner::Serial),
            ExecutionStrategy::ParallelElements => Ok(RowRunner::Global),
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(ParallelError::InvalidThreadCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(RowRunner::Pool(pool))
            }
        }
    }

    /// Fill `dst_row` chunk by chunk, calling `op(index, chunk)` for each `chunk_len` slice.
    pub(crate) fn fill_chunks<F>(
        &self,
        dst_row: &mut [u8],
        chunk_len: usize,
        op: F,
    ) -> Result<(), ParallelError>
    where
        F: Fn(usize, &mut [u8]) + Sync + Send,
    {
        if chunk_len == 0 || dst_row.len() % chunk_len != 0 {
            return Err(ParallelError::SizeMismatch);
        }
        self.for_each_chunk(dst_row, chunk_len, op);
        Ok(())
    }

    /// Call `op(index, chunk)` for each `chunk_len` slice of `dst`.
    ///
    /// `chunk_len` must be non-zero. A trailing remainder shorter than `chunk_len` is left
    /// untouched.
    pub(crate) fn for_each_chunk<F>(&self, dst: &mut [u8], chunk_len: usize, op: F)
    where
        F: Fn(usize, &mut [u8]) + Sync + Send,
    {
        match self {
            RowRunner::Serial => {
                dst.chunks_exact_mut(chunk_len)
                    .enumerate()
                    .for_each(|(i, chunk)| op(i, chunk));
            }
            RowRunner::Global => {
                dst.par_chunks_exact_mut(chunk_len)
                    .enumerate()
                    .for_each(|(i, chunk)| op(i, chunk));
            }
            RowRunner::Pool(pool) => {
                pool.install(|| {
                    dst.par_chunks_exact_mut(chunk_len)
                        .enumerate()
                        .for_each(|(i, chunk)| op(i, chunk));
                });
            }
        }
    }
}
