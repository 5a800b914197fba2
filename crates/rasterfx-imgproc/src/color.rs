//! Per-pixel color remaps.
//!
//! Each function has the shape `(src, x, y) -> Rgb8` so it can be handed to
//! [`Executor::run`](crate::executor::Executor::run) directly or through a closure that binds its
//! parameters.

use rasterfx_image::{PixelBuffer, Rgb8};

/// Define the RGB weights for the luminance used by grayscale and sepia.
const RW: f64 = 0.36;
const GW: f64 = 0.53;
const BW: f64 = 0.11;

/// Default sepia tone depth.
pub const DEFAULT_SEPIA_DEPTH: i32 = 100;

/// Default brightness increment.
pub const DEFAULT_BRIGHTNESS_DELTA: i32 = 30;

/// Luminance of a pixel, truncated to an integer.
///
/// I = 0.36 * R + 0.53 * G + 0.11 * B
#[inline]
pub fn intensity(px: Rgb8) -> i32 {
    (RW * px.r as f64 + GW * px.g as f64 + BW * px.b as f64) as i32
}

/// Invert a pixel.
///
/// The green and blue channels swap places while being inverted:
/// `out = (255 - R, 255 - B, 255 - G)`. Applying it twice restores the input.
pub fn invert(src: &PixelBuffer, x: usize, y: usize) -> Rgb8 {
    let px = src.pixel(x, y);
    Rgb8::new(255 - px.r, 255 - px.b, 255 - px.g)
}

/// Replace a pixel with its luminance on every channel.
///
/// # Example
///
/// ```
/// use rasterfx_image::{PixelBuffer, Rgb8};
/// use rasterfx_imgproc::color::grayscale;
///
/// let src = PixelBuffer::from_size_val([1, 1].into(), Rgb8::WHITE).unwrap();
/// assert_eq!(grayscale(&src, 0, 0), Rgb8::WHITE);
/// ```
pub fn grayscale(src: &PixelBuffer, x: usize, y: usize) -> Rgb8 {
    let i = intensity(src.pixel(x, y));
    Rgb8::clamped(i, i, i)
}

/// Tint a pixel's luminance towards brown.
///
/// With `k = depth`: `R = I + 2k`, `G = I + k/2`, `B = I - k`, each clamped.
pub fn sepia(src: &PixelBuffer, x: usize, y: usize, depth: i32) -> Rgb8 {
    let i = intensity(src.pixel(x, y));
    Rgb8::clamped(
        i.saturating_add(depth.saturating_mul(2)),
        (i as f64 + 0.5 * depth as f64) as i32,
        i.saturating_sub(depth),
    )
}

/// Add `delta` to every channel, clamped.
pub fn brightness(src: &PixelBuffer, x: usize, y: usize, delta: i32) -> Rgb8 {
    let px = src.pixel(x, y);
    Rgb8::clamped(
        (px.r as i32).saturating_add(delta),
        (px.g as i32).saturating_add(delta),
        (px.b as i32).saturating_add(delta),
    )
}
