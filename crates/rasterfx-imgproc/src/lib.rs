#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// border handling for neighborhood reads.
pub mod border;

/// filter catalog and the single `apply` entry point.
pub mod catalog;

/// per-pixel color remaps.
pub mod color;

/// glass and wave displacement filters.
pub mod displace;

/// filters driven by global channel statistics.
pub mod enhance;

/// Error types for the imgproc module.
pub mod error;

/// row sweep driver with progress and cancellation.
pub mod executor;

/// convolution filters and kernels.
pub mod filter;

/// background jobs.
pub mod job;

/// order-statistic filtering.
pub mod median;

/// morphological operations.
pub mod morphology;

/// module containing parallization utilities.
pub mod parallel;

/// chained filter and morphology steps.
pub mod pipeline;

pub use crate::catalog::{apply, Filter, PreparedFilter};
pub use crate::error::{FilterError, MAX_KERNEL_SIDE};
pub use crate::executor::{CancelToken, Executor, Progress};
pub use crate::job::FilterJob;
pub use crate::morphology::{
    apply_morphology, apply_morphology_with_strategy, ElementShape, MorphOp, StructuringElement,
};
pub use crate::parallel::ExecutionStrategy;
pub use crate::pipeline::{Pipeline, Step};
