use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rasterfx_image::{PixelBuffer, Rgb8};

use crate::error::FilterError;
use crate::parallel::{ExecutionStrategy, RowRunner};

/// Fractional progress of a sweep: `completed` of `total` rows are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of completed rows.
    pub completed: usize,
    /// Total number of rows in the sweep.
    pub total: usize,
}

impl Progress {
    /// Progress as a whole percentage in `[0, 100]`.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }
}

/// A cooperative cancellation flag shared between the caller and a running sweep.
///
/// Cloning the token shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The sweep observes it at its next row boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type ProgressFn<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Drives a per-pixel computation over a whole buffer.
///
/// The sweep visits rows in order. Before each row the cancellation token is checked; after each
/// row a [`Progress`] report is delivered, so reports strictly increase by one row per step.
/// The source buffer is only read, and the result buffer is returned only when every row
/// completed.
///
/// # Example
///
/// ```
/// use rasterfx_image::{PixelBuffer, Rgb8};
/// use rasterfx_imgproc::executor::Executor;
///
/// let src = PixelBuffer::from_size_val([3, 2].into(), Rgb8::new(10, 20, 30)).unwrap();
/// let dst = Executor::new()
///     .run(&src, |src, x, y| src.pixel(x, y).map(|c| c * 2))
///     .unwrap();
/// assert_eq!(dst.pixel(2, 1), Rgb8::new(20, 40, 60));
/// ```
#[derive(Default)]
pub struct Executor<'a> {
    strategy: ExecutionStrategy,
    cancel: Option<CancelToken>,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Executor<'a> {
    /// Create an executor with the default strategy, no cancellation and no progress reports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how the pixels of each row are distributed.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Observe `token` between rows.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Deliver a [`Progress`] report after each completed row.
    pub fn with_progress(mut self, f: impl Fn(Progress) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// The configured execution strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Whether the attached token, if any, has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Compute `op(src, x, y)` for every pixel and collect the results into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Cancelled`] if the token was cancelled before the last row started,
    /// and [`FilterError::Parallel`] if the strategy cannot be set up.
    pub fn run<F>(&self, src: &PixelBuffer, op: F) -> Result<PixelBuffer, FilterError>
    where
        F: Fn(&PixelBuffer, usize, usize) -> Rgb8 + Send + Sync,
    {
        let total = src.height();
        self.sweep(src, op, |completed| Progress { completed, total })
    }

    /// Same as [`Executor::run`], with `progress_at` mapping completed rows to the reported value.
    pub(crate) fn sweep<F, P>(
        &self,
        src: &PixelBuffer,
        op: F,
        progress_at: P,
    ) -> Result<PixelBuffer, FilterError>
    where
        F: Fn(&PixelBuffer, usize, usize) -> Rgb8 + Send + Sync,
        P: Fn(usize) -> Progress,
    {
        let runner = RowRunner::new(self.strategy)?;

        let height = src.height();
        let stride = src.row_stride();
        let mut data = vec![0u8; stride * height];

        for (y, dst_row) in data.chunks_exact_mut(stride).enumerate() {
            if self.is_cancelled() {
                log::info!("sweep cancelled after {y} of {height} rows");
                return Err(FilterError::Cancelled);
            }

            runner.fill_chunks(dst_row, src.num_channels(), |x, dst_pixel| {
                dst_pixel.copy_from_slice(&op(src, x, y).channels());
            })?;

            self.report(progress_at(y + 1));
        }

        Ok(PixelBuffer::new(src.size(), data)?)
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(f) = &self.progress {
            f(progress);
        }
    }
}
