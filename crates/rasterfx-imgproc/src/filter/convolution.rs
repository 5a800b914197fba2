use rasterfx_image::{PixelBuffer, Rgb8};

use super::kernels::Kernel;
use crate::border::BorderPolicy;

/// Default offset added by the emboss filter to re-center its signed response.
pub const DEFAULT_EMBOSS_OFFSET: f32 = 50.0;

/// Weighted neighborhood sum over a [`Kernel`].
///
/// For each channel the output is `Σ src(x + k, y + l) * kernel(k + rx, l + ry)` over the kernel
/// window, plus a constant `offset`, truncated to an integer and clamped to `[0, 255]`.
/// Neighbors outside the image replicate the nearest edge pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionFilter {
    kernel: Kernel,
    offset: f32,
    border: BorderPolicy,
}

impl ConvolutionFilter {
    /// Create a filter from a kernel, with no offset and replicated borders.
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            offset: 0.0,
            border: BorderPolicy::Replicate,
        }
    }

    /// Add `offset` to every channel before clamping.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Compute the filtered pixel at `(x, y)`.
    pub fn transform(&self, src: &PixelBuffer, x: usize, y: usize) -> Rgb8 {
        let (rx, ry) = self.kernel.radius();
        let (rx, ry) = (rx as isize, ry as isize);

        let mut sum = [0.0f32; 3];
        for l in -ry..=ry {
            for k in -rx..=rx {
                let weight = self.kernel.get((k + rx) as usize, (l + ry) as usize);
                let px = self
                    .border
                    .pixel(src, x as isize + k, y as isize + l)
                    .channels();
                for (acc, &c) in sum.iter_mut().zip(px.iter()) {
                    *acc += c as f32 * weight;
                }
            }
        }

        Rgb8::clamped(
            (sum[0] + self.offset) as i32,
            (sum[1] + self.offset) as i32,
            (sum[2] + self.offset) as i32,
        )
    }
}
