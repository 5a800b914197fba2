#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the image module.
pub mod error;

/// pixel buffer representation used by every filter.
pub mod image;

/// 8-bit RGB pixel type.
pub mod pixel;

pub use crate::error::ImageError;
pub use crate::image::{ImageSize, PixelBuffer};
pub use crate::pixel::Rgb8;
