use rand::{rngs::StdRng, Rng, SeedableRng};
use rasterfx_image::{PixelBuffer, Rgb8};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Magnitude of the glass effect jitter along each axis, in pixels.
pub const GLASS_JITTER: isize = 5;

/// Default seed of the glass effect.
pub const DEFAULT_GLASS_SEED: u64 = 0;

/// Sine wave displacement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wave {
    /// Peak displacement in pixels.
    pub amplitude: f64,
    /// Wavelength in pixels.
    pub period: f64,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            amplitude: 20.0,
            period: 30.0,
        }
    }
}

impl Wave {
    /// Check that the wave parameters are finite and the period is non-zero.
    pub fn validate(&self) -> Result<(), FilterError> {
        if !self.amplitude.is_finite() {
            return Err(FilterError::invalid(
                "amplitude",
                format!("must be finite, got {}", self.amplitude),
            ));
        }
        if !self.period.is_finite() || self.period == 0.0 {
            return Err(FilterError::invalid(
                "period",
                format!("must be finite and non-zero, got {}", self.period),
            ));
        }
        Ok(())
    }

    /// Displaced coordinate for `coord`, truncated toward zero.
    #[inline]
    pub fn displace(&self, coord: usize) -> isize {
        let c = coord as f64;
        (c + self.amplitude * (2.0 * std::f64::consts::PI * c / self.period).sin()) as isize
    }
}

fn sample_or_keep(src: &PixelBuffer, x: usize, y: usize, nx: isize, ny: isize) -> Rgb8 {
    if src.size().contains(nx, ny) {
        src.pixel(nx as usize, ny as usize)
    } else {
        src.pixel(x, y)
    }
}

fn pixel_seed(seed: u64, x: usize, y: usize) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (((y as u64) << 32) | x as u64)
}

/// Glass effect: sample a neighbour offset by `±5` pixels on each axis.
///
/// The offsets come from a generator seeded by `(seed, x, y)`, so the result is reproducible and
/// independent of evaluation order. Samples falling outside the image keep the original pixel.
pub fn glass(src: &PixelBuffer, x: usize, y: usize, seed: u64) -> Rgb8 {
    let mut rng = StdRng::seed_from_u64(pixel_seed(seed, x, y));
    let mut jitter = || {
        if rng.random_bool(0.5) {
            GLASS_JITTER
        } else {
            -GLASS_JITTER
        }
    };
    let nx = x as isize + jitter();
    let ny = y as isize + jitter();
    sample_or_keep(src, x, y, nx, ny)
}

/// Displace the horizontal sampling coordinate by a sine of `x`.
pub fn vertical_waves(src: &PixelBuffer, x: usize, y: usize, wave: &Wave) -> Rgb8 {
    sample_or_keep(src, x, y, wave.displace(x), y as isize)
}

/// Displace the vertical sampling coordinate by a sine of `y`.
pub fn horizontal_waves(src: &PixelBuffer, x: usize, y: usize, wave: &Wave) -> Rgb8 {
    sample_or_keep(src, x, y, x as isize, wave.displace(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterfx_image::ImageError;

    fn ramp(width: usize, height: usize) -> Result<PixelBuffer, ImageError> {
        PixelBuffer::from_fn([width, height].into(), |x, y| {
            Rgb8::new(x as u8, y as u8, 0)
        })
    }

    #[test]
    fn glass_is_reproducible() -> Result<(), ImageError> {
        let src = ramp(32, 32)?;
        for (x, y) in [(0, 0), (10, 12), (31, 31)] {
            assert_eq!(glass(&src, x, y, 7), glass(&src, x, y, 7));
        }
        Ok(())
    }

    #[test]
    fn glass_samples_at_jitter_distance() -> Result<(), ImageError> {
        let src = ramp(32, 32)?;
        for y in 5..27 {
            for x in 5..27 {
                let px = glass(&src, x, y, 3);
                assert_eq!((px.r as isize - x as isize).abs(), GLASS_JITTER);
                assert_eq!((px.g as isize - y as isize).abs(), GLASS_JITTER);
            }
        }
        Ok(())
    }

    #[test]
    fn glass_keeps_pixel_when_out_of_bounds() -> Result<(), ImageError> {
        // every jitter leaves a 1x1 image
        let src = PixelBuffer::from_size_val([1, 1].into(), Rgb8::new(1, 2, 3))?;
        assert_eq!(glass(&src, 0, 0, 42), Rgb8::new(1, 2, 3));
        Ok(())
    }

    #[test]
    fn vertical_waves_shift_columns() -> Result<(), ImageError> {
        let wave = Wave::default();
        let src = ramp(40, 2)?;
        assert_eq!(vertical_waves(&src, 0, 1, &wave), Rgb8::new(0, 1, 0));
        assert_eq!(vertical_waves(&src, 7, 1, &wave), Rgb8::new(26, 1, 0));
        assert_eq!(vertical_waves(&src, 22, 0, &wave), Rgb8::new(2, 0, 0));

        let narrow = ramp(10, 2)?;
        assert_eq!(vertical_waves(&narrow, 3, 1, &wave), Rgb8::new(3, 1, 0));
        Ok(())
    }

    #[test]
    fn horizontal_waves_shift_rows() -> Result<(), ImageError> {
        let wave = Wave::default();
        let src = ramp(2, 40)?;
        assert_eq!(horizontal_waves(&src, 1, 7, &wave), Rgb8::new(1, 26, 0));
        assert_eq!(horizontal_waves(&src, 0, 22, &wave), Rgb8::new(0, 2, 0));
        Ok(())
    }

    #[test]
    fn wave_rejects_zero_period() {
        let wave = Wave {
            amplitude: 20.0,
            period: 0.0,
        };
        assert!(matches!(
            wave.validate(),
            Err(FilterError::InvalidParameter { name: "period", .. })
        ));
        assert!(Wave::default().validate().is_ok());
    }
}
