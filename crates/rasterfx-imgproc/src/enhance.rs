//! Color corrections driven by whole-image statistics.
//!
//! Each correction has a prepare phase that scans the full source once and returns an immutable
//! statistics value, and a per-pixel phase that only reads it.

use rasterfx_image::{PixelBuffer, Rgb8};

/// Per-channel means of a buffer, used by the gray-world balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    /// Integer-truncated mean of each channel, in R, G, B order.
    pub means: [u32; 3],
    /// Mean of the three channel means.
    pub average: f64,
}

impl ChannelMeans {
    /// Scan `src` and compute its channel means.
    pub fn compute(src: &PixelBuffer) -> Self {
        let mut sums = [0u64; 3];
        for px in src.pixels() {
            for (sum, c) in sums.iter_mut().zip(px.channels()) {
                *sum += c as u64;
            }
        }

        let count = src.size().area() as u64;
        let means = sums.map(|s| (s / count) as u32);
        let average = means.iter().map(|&m| m as f64).sum::<f64>() / 3.0;

        log::debug!("gray world means {means:?}, average {average:.3}");
        Self { means, average }
    }

    /// Rebalance one pixel so that every channel mean is pulled towards the common average.
    ///
    /// `out[c] = src[c] * average / mean[c]`. A channel whose mean is zero passes through.
    pub fn balance(&self, px: Rgb8) -> Rgb8 {
        let mut out = px.channels();
        for (c, &mean) in out.iter_mut().zip(self.means.iter()) {
            if mean == 0 {
                continue;
            }
            let v = (*c as f64 * self.average / mean as f64) as i32;
            *c = v.clamp(0, 255) as u8;
        }
        Rgb8::from_channels(out)
    }
}

/// Per-channel extremes of a buffer, used by the linear stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRange {
    /// Minimum of each channel, in R, G, B order.
    pub min: [u8; 3],
    /// Maximum of each channel, in R, G, B order.
    pub max: [u8; 3],
}

impl ChannelRange {
    /// Scan `src` and compute its channel ranges.
    pub fn compute(src: &PixelBuffer) -> Self {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for px in src.pixels() {
            for (c, v) in px.channels().into_iter().enumerate() {
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }

        log::debug!("linear stretch ranges min {min:?}, max {max:?}");
        Self { min, max }
    }

    /// Map each channel's `[min, max]` linearly onto `[0, 255]`.
    ///
    /// `out[c] = (src[c] - min[c]) * 255 / (max[c] - min[c])`. A flat channel passes through.
    pub fn stretch(&self, px: Rgb8) -> Rgb8 {
        let mut out = px.channels();
        for (c, v) in out.iter_mut().enumerate() {
            let (lo, hi) = (self.min[c] as i32, self.max[c] as i32);
            if hi == lo {
                continue;
            }
            let stretched = (*v as i32 - lo) * 255 / (hi - lo);
            *v = stretched.clamp(0, 255) as u8;
        }
        Rgb8::from_channels(out)
    }
}

/// Gray-world color balance of the pixel at `(x, y)`.
pub fn gray_world(src: &PixelBuffer, x: usize, y: usize, stats: &ChannelMeans) -> Rgb8 {
    stats.balance(src.pixel(x, y))
}

/// Linear contrast stretch of the pixel at `(x, y)`.
pub fn linear_stretch(src: &PixelBuffer, x: usize, y: usize, stats: &ChannelRange) -> Rgb8 {
    stats.stretch(src.pixel(x, y))
}
