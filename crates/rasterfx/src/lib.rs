#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rasterfx_image as image;

#[doc(inline)]
pub use rasterfx_imgproc as imgproc;

#[doc(inline)]
pub use rasterfx_io as io;
