use std::str::FromStr;

use rasterfx_image::{PixelBuffer, Rgb8};
use serde::{Deserialize, Serialize};

use crate::color;
use crate::displace::{self, Wave, DEFAULT_GLASS_SEED};
use crate::enhance::{self, ChannelMeans, ChannelRange};
use crate::error::FilterError;
use crate::executor::Executor;
use crate::filter::{kernels, ConvolutionFilter, Kernel, DEFAULT_EMBOSS_OFFSET};
use crate::median::{MedianFilter, DEFAULT_MEDIAN_SIZE};

/// Every filter the [`Executor`] can drive, with its parameters.
///
/// Serialized internally tagged by `type`, e.g. `{"type": "gaussian", "radius": 2, "sigma": 1.5}`.
/// Omitted parameters take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Invert every channel, swapping green and blue.
    Invert,
    /// Replace each pixel with its luminance.
    Grayscale,
    /// Sepia toning.
    Sepia {
        /// Tone depth.
        #[serde(default = "default_sepia_depth")]
        depth: i32,
    },
    /// Add a constant to every channel.
    Brightness {
        /// Increment, may be negative.
        #[serde(default = "default_brightness_delta")]
        delta: i32,
    },
    /// Uniform blur over a rectangular window.
    BoxBlur {
        /// Window width, odd.
        #[serde(default = "default_box_size")]
        width: usize,
        /// Window height, odd.
        #[serde(default = "default_box_size")]
        height: usize,
    },
    /// Gaussian blur.
    Gaussian {
        /// Kernel radius.
        #[serde(default = "default_gaussian_radius")]
        radius: usize,
        /// Spread, positive.
        #[serde(default = "default_gaussian_sigma")]
        sigma: f32,
    },
    /// Sobel edge response.
    Sobel,
    /// Sharpening.
    Sharpen,
    /// Emboss relief with a fixed offset.
    Emboss,
    /// Diagonal motion blur.
    MotionBlur {
        /// Kernel radius.
        #[serde(default = "default_motion_radius")]
        radius: usize,
    },
    /// Convolution with an arbitrary kernel.
    Convolution {
        /// The kernel, as `{"rows": [[...], ...]}`.
        kernel: Kernel,
        /// Added to every channel before clamping.
        #[serde(default)]
        offset: f32,
    },
    /// Gray-world color balance.
    GrayWorld,
    /// Per-channel linear contrast stretch.
    LinearStretch,
    /// Per-channel median over a square window.
    Median {
        /// Window side, odd.
        #[serde(default = "default_median_size")]
        size: usize,
    },
    /// Frosted glass jitter.
    Glass {
        /// Seed of the per-pixel jitter.
        #[serde(default)]
        seed: u64,
    },
    /// Sine displacement along x.
    VerticalWaves(Wave),
    /// Sine displacement along y.
    HorizontalWaves(Wave),
}

fn default_sepia_depth() -> i32 {
    color::DEFAULT_SEPIA_DEPTH
}

fn default_brightness_delta() -> i32 {
    color::DEFAULT_BRIGHTNESS_DELTA
}

fn default_box_size() -> usize {
    kernels::DEFAULT_BOX_SIZE
}

fn default_gaussian_radius() -> usize {
    kernels::DEFAULT_GAUSSIAN_RADIUS
}

fn default_gaussian_sigma() -> f32 {
    kernels::DEFAULT_GAUSSIAN_SIGMA
}

fn default_motion_radius() -> usize {
    kernels::DEFAULT_MOTION_RADIUS
}

fn default_median_size() -> usize {
    DEFAULT_MEDIAN_SIZE
}

impl Filter {
    /// The short name accepted by [`Filter::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Invert => "invert",
            Filter::Grayscale => "grayscale",
            Filter::Sepia { .. } => "sepia",
            Filter::Brightness { .. } => "brightness",
            Filter::BoxBlur { .. } => "box_blur",
            Filter::Gaussian { .. } => "gaussian",
            Filter::Sobel => "sobel",
            Filter::Sharpen => "sharpen",
            Filter::Emboss => "emboss",
            Filter::MotionBlur { .. } => "motion_blur",
            Filter::Convolution { .. } => "convolution",
            Filter::GrayWorld => "gray_world",
            Filter::LinearStretch => "linear_stretch",
            Filter::Median { .. } => "median",
            Filter::Glass { .. } => "glass",
            Filter::VerticalWaves(_) => "vertical_waves",
            Filter::HorizontalWaves(_) => "horizontal_waves",
        }
    }

    /// Check the parameters without touching any image.
    pub fn validate(&self) -> Result<(), FilterError> {
        self.configure().map(|_| ())
    }

    /// Build the immutable per-pass state, running the statistics pre-pass over `src` if the
    /// filter needs one.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the parameters, if any.
    pub fn prepare(&self, src: &PixelBuffer) -> Result<PreparedFilter, FilterError> {
        Ok(match self.configure()? {
            Config::Ready(prepared) => prepared,
            Config::GrayWorld => PreparedFilter::GrayWorld(ChannelMeans::compute(src)),
            Config::LinearStretch => PreparedFilter::LinearStretch(ChannelRange::compute(src)),
        })
    }

    fn configure(&self) -> Result<Config, FilterError> {
        let convolve = |kernel: Kernel| PreparedFilter::Convolve(ConvolutionFilter::new(kernel));
        let prepared = match self {
            Filter::Invert => PreparedFilter::Invert,
            Filter::Grayscale => PreparedFilter::Grayscale,
            Filter::Sepia { depth } => PreparedFilter::Sepia(*depth),
            Filter::Brightness { delta } => PreparedFilter::Brightness(*delta),
            Filter::BoxBlur { width, height } => {
                convolve(kernels::box_blur_kernel(*width, *height)?)
            }
            Filter::Gaussian { radius, sigma } => {
                convolve(kernels::gaussian_kernel(*radius, *sigma)?)
            }
            Filter::Sobel => convolve(kernels::sobel_kernel()),
            Filter::Sharpen => convolve(kernels::sharpen_kernel()),
            Filter::Emboss => PreparedFilter::Convolve(
                ConvolutionFilter::new(kernels::emboss_kernel()).with_offset(DEFAULT_EMBOSS_OFFSET),
            ),
            Filter::MotionBlur { radius } => convolve(kernels::motion_blur_kernel(*radius)?),
            Filter::Convolution { kernel, offset } => {
                if !offset.is_finite() {
                    return Err(FilterError::invalid(
                        "offset",
                        format!("must be finite, got {offset}"),
                    ));
                }
                PreparedFilter::Convolve(ConvolutionFilter::new(kernel.clone()).with_offset(*offset))
            }
            Filter::GrayWorld => return Ok(Config::GrayWorld),
            Filter::LinearStretch => return Ok(Config::LinearStretch),
            Filter::Median { size } => PreparedFilter::Median(MedianFilter::new(*size)?),
            Filter::Glass { seed } => PreparedFilter::Glass(*seed),
            Filter::VerticalWaves(wave) => {
                wave.validate()?;
                PreparedFilter::VerticalWaves(*wave)
            }
            Filter::HorizontalWaves(wave) => {
                wave.validate()?;
                PreparedFilter::HorizontalWaves(*wave)
            }
        };
        Ok(Config::Ready(prepared))
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    /// Parse a short name into the filter with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        let filter = match name.as_str() {
            "invert" => Filter::Invert,
            "grayscale" | "gray" => Filter::Grayscale,
            "sepia" => Filter::Sepia {
                depth: default_sepia_depth(),
            },
            "brightness" => Filter::Brightness {
                delta: default_brightness_delta(),
            },
            "box_blur" | "blur" => Filter::BoxBlur {
                width: default_box_size(),
                height: default_box_size(),
            },
            "gaussian" => Filter::Gaussian {
                radius: default_gaussian_radius(),
                sigma: default_gaussian_sigma(),
            },
            "sobel" => Filter::Sobel,
            "sharpen" => Filter::Sharpen,
            "emboss" => Filter::Emboss,
            "motion_blur" => Filter::MotionBlur {
                radius: default_motion_radius(),
            },
            "gray_world" => Filter::GrayWorld,
            "linear_stretch" => Filter::LinearStretch,
            "median" => Filter::Median {
                size: default_median_size(),
            },
            "glass" => Filter::Glass {
                seed: DEFAULT_GLASS_SEED,
            },
            "vertical_waves" => Filter::VerticalWaves(Wave::default()),
            "horizontal_waves" => Filter::HorizontalWaves(Wave::default()),
            _ => {
                return Err(FilterError::invalid(
                    "filter",
                    format!("unknown filter `{s}`"),
                ))
            }
        };
        Ok(filter)
    }
}

enum Config {
    Ready(PreparedFilter),
    GrayWorld,
    LinearStretch,
}

/// A filter with validated parameters and any global statistics already computed.
///
/// Read-only for the whole pass, so it can be shared by every pixel computation.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedFilter {
    /// See [`color::invert`].
    Invert,
    /// See [`color::grayscale`].
    Grayscale,
    /// See [`color::sepia`].
    Sepia(i32),
    /// See [`color::brightness`].
    Brightness(i32),
    /// Weighted neighborhood sum.
    Convolve(ConvolutionFilter),
    /// Gray-world balance with the source channel means.
    GrayWorld(ChannelMeans),
    /// Linear stretch with the source channel ranges.
    LinearStretch(ChannelRange),
    /// Median window.
    Median(MedianFilter),
    /// Glass jitter seed.
    Glass(u64),
    /// See [`displace::vertical_waves`].
    VerticalWaves(Wave),
    /// See [`displace::horizontal_waves`].
    HorizontalWaves(Wave),
}

impl PreparedFilter {
    /// Compute the output pixel at `(x, y)` of `src`.
    pub fn transform(&self, src: &PixelBuffer, x: usize, y: usize) -> Rgb8 {
        match self {
            PreparedFilter::Invert => color::invert(src, x, y),
            PreparedFilter::Grayscale => color::grayscale(src, x, y),
            PreparedFilter::Sepia(depth) => color::sepia(src, x, y, *depth),
            PreparedFilter::Brightness(delta) => color::brightness(src, x, y, *delta),
            PreparedFilter::Convolve(filter) => filter.transform(src, x, y),
            PreparedFilter::GrayWorld(means) => enhance::gray_world(src, x, y, means),
            PreparedFilter::LinearStretch(range) => enhance::linear_stretch(src, x, y, range),
            PreparedFilter::Median(filter) => filter.transform(src, x, y),
            PreparedFilter::Glass(seed) => displace::glass(src, x, y, *seed),
            PreparedFilter::VerticalWaves(wave) => displace::vertical_waves(src, x, y, wave),
            PreparedFilter::HorizontalWaves(wave) => displace::horizontal_waves(src, x, y, wave),
        }
    }
}

/// Apply a filter to `src`, producing a new buffer.
///
/// Parameters are validated and statistics computed before the sweep; the sweep itself reports
/// progress and observes cancellation through `executor`. `src` is never modified.
///
/// # Example
///
/// ```
/// use rasterfx_image::{PixelBuffer, Rgb8};
/// use rasterfx_imgproc::{apply, executor::Executor, Filter};
///
/// let src = PixelBuffer::from_size_val([4, 4].into(), Rgb8::new(10, 20, 30)).unwrap();
/// let dst = apply(&"invert".parse::<Filter>().unwrap(), &src, &Executor::new()).unwrap();
/// assert_eq!(dst.pixel(0, 0), Rgb8::new(245, 225, 235));
/// ```
pub fn apply(
    filter: &Filter,
    src: &PixelBuffer,
    executor: &Executor,
) -> Result<PixelBuffer, FilterError> {
    let prepared = filter.prepare(src)?;
    log::trace!("applying {} to {}", filter.name(), src.size());
    executor.run(src, |src, x, y| prepared.transform(src, x, y))
}
