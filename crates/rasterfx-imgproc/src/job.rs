use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rasterfx_image::PixelBuffer;

use crate::error::FilterError;
use crate::executor::{CancelToken, Executor, Progress};
use crate::parallel::ExecutionStrategy;
use crate::pipeline::Pipeline;

/// A pipeline running on a worker thread.
///
/// The caller's thread stays free: it can poll or block on [`FilterJob::progress`], request
/// cancellation, and finally collect the result with [`FilterJob::join`]. The source is shared
/// read-only, so a cancelled job leaves the caller's image exactly as it was.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use rasterfx_image::{PixelBuffer, Rgb8};
/// use rasterfx_imgproc::{job::FilterJob, parallel::ExecutionStrategy, pipeline::Pipeline};
///
/// let src = Arc::new(PixelBuffer::from_size_val([8, 8].into(), Rgb8::new(1, 2, 3)).unwrap());
/// let pipeline = Pipeline::from_names(&["brightness"]).unwrap();
/// let job = FilterJob::spawn(pipeline, src, ExecutionStrategy::Serial);
///
/// let last = job.progress().iter().last().unwrap();
/// assert_eq!(last.percent(), 100);
/// assert_eq!(job.join().unwrap().pixel(0, 0), Rgb8::new(31, 32, 33));
/// ```
pub struct FilterJob {
    cancel: CancelToken,
    progress: Receiver<Progress>,
    handle: JoinHandle<Result<PixelBuffer, FilterError>>,
}

impl FilterJob {
    /// Start running `pipeline` on `source` in the background.
    pub fn spawn(pipeline: Pipeline, source: Arc<PixelBuffer>, strategy: ExecutionStrategy) -> Self {
        Self::spawn_with_token(pipeline, source, strategy, CancelToken::new())
    }

    /// Same as [`FilterJob::spawn`], observing an existing cancellation token.
    pub fn spawn_with_token(
        pipeline: Pipeline,
        source: Arc<PixelBuffer>,
        strategy: ExecutionStrategy,
        cancel: CancelToken,
    ) -> Self {
        let (tx, progress) = mpsc::channel();
        let token = cancel.clone();

        let handle = thread::spawn(move || {
            let executor = Executor::new()
                .with_strategy(strategy)
                .with_cancel_token(token)
                .with_progress(move |p| {
                    // the receiver may have been dropped; the job still runs to completion
                    let _ = tx.send(p);
                });
            pipeline.run(&source, &executor)
        });

        Self {
            cancel,
            progress,
            handle,
        }
    }

    /// Request cancellation. The job stops at its next row or step boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Progress reports, in order. The channel closes when the job finishes.
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Wait for the job and return its result.
    ///
    /// A panic on the worker thread is resumed on the caller's thread.
    pub fn join(self) -> Result<PixelBuffer, FilterError> {
        self.handle
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
    }
}
