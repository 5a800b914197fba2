use rasterfx_image::{PixelBuffer, Rgb8};

use crate::border::BorderPolicy;
use crate::error::{check_kernel_size, FilterError};

/// Default median window side.
pub const DEFAULT_MEDIAN_SIZE: usize = 3;

/// Order-statistic filter selecting the per-channel median of an `n × n` window.
///
/// Window samples are read through [`BorderPolicy::Inset`] with the window radius as margin, so
/// samples near the border are clamped into `[radius, len - radius]` rather than onto the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedianFilter {
    size: usize,
    border: BorderPolicy,
}

impl MedianFilter {
    /// Create a median filter over an odd `size × size` window.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelSize`] if `size` is zero or even, and
    /// [`FilterError::InvalidParameter`] if it exceeds [`MAX_KERNEL_SIDE`](crate::MAX_KERNEL_SIDE).
    pub fn new(size: usize) -> Result<Self, FilterError> {
        check_kernel_size(size, size)?;
        let radius = size / 2;
        Ok(Self {
            size,
            border: BorderPolicy::Inset {
                margin_x: radius,
                margin_y: radius,
            },
        })
    }

    /// The window side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compute the filtered pixel at `(x, y)`.
    pub fn transform(&self, src: &PixelBuffer, x: usize, y: usize) -> Rgb8 {
        let r = (self.size / 2) as isize;
        let count = self.size * self.size;

        let mut samples: [Vec<u8>; 3] = [
            Vec::with_capacity(count),
            Vec::with_capacity(count),
            Vec::with_capacity(count),
        ];
        for l in -r..=r {
            for k in -r..=r {
                let px = self.border.pixel(src, x as isize + k, y as isize + l);
                for (channel, c) in samples.iter_mut().zip(px.channels()) {
                    channel.push(c);
                }
            }
        }

        let mid = count / 2;
        let [r, g, b] = samples.map(|mut channel| *channel.select_nth_unstable(mid).1);
        Rgb8::new(r, g, b)
    }
}
