use rasterfx_image::ImageError;

use crate::parallel::ParallelError;

/// An error type for filter construction and execution.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// Kernel, window or structuring element dimensions are zero or even.
    #[error("Kernel size must be positive and odd, got {0}x{1}")]
    InvalidKernelSize(usize, usize),

    /// A scalar filter parameter is out of its valid range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The rows of a kernel or structuring element have different lengths.
    #[error("Kernel rows have inconsistent lengths")]
    NonRectangularKernel,

    /// Every cell of the structuring element is inactive.
    #[error("Structuring element has no active cells")]
    AllKernelElementsInactive,

    /// The operation observed a cancellation request and discarded its result.
    #[error("Operation cancelled")]
    Cancelled,

    /// Error from the pixel buffer.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the parallel execution backend.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

impl FilterError {
    /// Whether this is the expected outcome of a cancellation request rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FilterError::Cancelled)
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Largest accepted side of a kernel, median window or structuring element.
pub const MAX_KERNEL_SIDE: usize = 4095;

/// Check that a kernel dimension pair is positive, odd and at most [`MAX_KERNEL_SIDE`].
pub(crate) fn check_kernel_size(width: usize, height: usize) -> Result<(), FilterError> {
    if width == 0 || height == 0 || width % 2 == 0 || height % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(width, height));
    }
    if width > MAX_KERNEL_SIDE || height > MAX_KERNEL_SIDE {
        return Err(FilterError::invalid(
            "size",
            format!("{width}x{height} exceeds the maximum side {MAX_KERNEL_SIDE}"),
        ));
    }
    Ok(())
}

/// The side `2 * radius + 1` of a square kernel, bounded by [`MAX_KERNEL_SIDE`].
pub(crate) fn side_from_radius(radius: usize) -> Result<usize, FilterError> {
    match radius.checked_mul(2).and_then(|d| d.checked_add(1)) {
        Some(side) if side <= MAX_KERNEL_SIDE => Ok(side),
        _ => Err(FilterError::invalid(
            "radius",
            format!("{radius} exceeds the maximum {}", MAX_KERNEL_SIDE / 2),
        )),
    }
}
