//! Filter operations
//!
//! This module provides neighborhood convolution and the factory for its kernels.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel;

/// Convolution operations
mod convolution;
pub use convolution::*;
