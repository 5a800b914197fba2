use std::str::FromStr;

use rasterfx_image::{PixelBuffer, Rgb8};
use serde::{Deserialize, Serialize};

use super::element::StructuringElement;
use crate::error::FilterError;
use crate::parallel::{ExecutionStrategy, RowRunner};

/// A morphological operation over a [`StructuringElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphOp {
    /// Per-channel maximum over the element.
    Dilate,
    /// Per-channel minimum over the element.
    Erode,
    /// Erosion followed by dilation; removes small bright protrusions.
    Open,
    /// Dilation followed by erosion; fills small dark gaps.
    Close,
    /// Dilation minus erosion; highlights boundaries.
    Gradient,
    /// Source minus its opening; keeps small bright details.
    TopHat,
    /// Closing minus the source; keeps small dark details.
    BlackHat,
}

impl MorphOp {
    /// Every operation, in declaration order.
    pub const ALL: [MorphOp; 7] = [
        MorphOp::Dilate,
        MorphOp::Erode,
        MorphOp::Open,
        MorphOp::Close,
        MorphOp::Gradient,
        MorphOp::TopHat,
        MorphOp::BlackHat,
    ];

    /// The short name accepted by [`MorphOp::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            MorphOp::Dilate => "dilate",
            MorphOp::Erode => "erode",
            MorphOp::Open => "open",
            MorphOp::Close => "close",
            MorphOp::Gradient => "gradient",
            MorphOp::TopHat => "top_hat",
            MorphOp::BlackHat => "black_hat",
        }
    }
}

impl FromStr for MorphOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        MorphOp::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| FilterError::invalid("morphology", format!("unknown operation `{s}`")))
    }
}

/// Dilate an image using a [`StructuringElement`].
///
/// Each pixel strictly inside the margin `[rx, W - rx) × [ry, H - ry)` becomes the per-channel
/// maximum over the active cells of the element, seeded by the pixel at the window's top-left
/// corner. Pixels in the margin are left black.
pub fn dilate(src: &PixelBuffer, element: &StructuringElement) -> PixelBuffer {
    window_extremum(src, element, u8::max, &RowRunner::Global)
}

/// Erode an image using a [`StructuringElement`].
///
/// Same window and margin rules as [`dilate`], with the per-channel minimum.
pub fn erode(src: &PixelBuffer, element: &StructuringElement) -> PixelBuffer {
    window_extremum(src, element, u8::min, &RowRunner::Global)
}

/// Run a morphological operation synchronously.
///
/// Unlike filters driven by the [`Executor`](crate::executor::Executor) this reports no progress
/// and cannot be cancelled. Rows are spread over the global rayon pool; see
/// [`apply_morphology_with_strategy`] to choose another strategy.
///
/// # Example
///
/// ```
/// use rasterfx_image::{PixelBuffer, Rgb8};
/// use rasterfx_imgproc::morphology::{apply_morphology, MorphOp, StructuringElement};
///
/// let src = PixelBuffer::from_size_val([5, 5].into(), Rgb8::new(9, 9, 9)).unwrap();
/// let dst = apply_morphology(MorphOp::Gradient, &src, &StructuringElement::default());
/// assert_eq!(dst.pixel(2, 2), Rgb8::BLACK);
/// ```
pub fn apply_morphology(
    op: MorphOp,
    src: &PixelBuffer,
    element: &StructuringElement,
) -> PixelBuffer {
    run_op(op, src, element, &RowRunner::Global)
}

/// Same as [`apply_morphology`], distributing rows according to `strategy`.
///
/// # Errors
///
/// Returns [`FilterError::Parallel`] if the strategy cannot be set up.
pub fn apply_morphology_with_strategy(
    op: MorphOp,
    src: &PixelBuffer,
    element: &StructuringElement,
    strategy: ExecutionStrategy,
) -> Result<PixelBuffer, FilterError> {
    let runner = RowRunner::new(strategy)?;
    Ok(run_op(op, src, element, &runner))
}

fn run_op(
    op: MorphOp,
    src: &PixelBuffer,
    element: &StructuringElement,
    runner: &RowRunner,
) -> PixelBuffer {
    log::trace!("morphology {} on {}", op.name(), src.size());
    let dilate = |img: &PixelBuffer| window_extremum(img, element, u8::max, runner);
    let erode = |img: &PixelBuffer| window_extremum(img, element, u8::min, runner);
    match op {
        MorphOp::Dilate => dilate(src),
        MorphOp::Erode => erode(src),
        MorphOp::Open => dilate(&erode(src)),
        MorphOp::Close => erode(&dilate(src)),
        MorphOp::Gradient => difference(&dilate(src), &erode(src)),
        MorphOp::TopHat => difference(src, &dilate(&erode(src))),
        MorphOp::BlackHat => difference(&erode(&dilate(src)), src),
    }
}

/// Per-channel `clamp(a - b, 0, 255)`.
fn difference(a: &PixelBuffer, b: &PixelBuffer) -> PixelBuffer {
    let mut dst = a.filled_like(Rgb8::BLACK);
    dst.as_slice_mut()
        .iter_mut()
        .zip(a.as_slice().iter().zip(b.as_slice()))
        .for_each(|(d, (&a, &b))| *d = a.saturating_sub(b));
    dst
}

fn window_extremum(
    src: &PixelBuffer,
    element: &StructuringElement,
    pick: fn(u8, u8) -> u8,
    runner: &RowRunner,
) -> PixelBuffer {
    let (width, height) = (src.width(), src.height());
    let (rx, ry) = element.radius();

    let mut dst = src.filled_like(Rgb8::BLACK);
    let stride = dst.row_stride();

    runner.for_each_chunk(dst.as_slice_mut(), stride, |y, row| {
        if y < ry || y + ry >= height {
            return;
        }
        for x in (rx..width).take_while(|x| x + rx < width) {
            let mut acc = src.pixel(x - rx, y - ry).channels();
            for ky in 0..element.height() {
                for kx in 0..element.width() {
                    if !element.get(kx, ky) {
                        continue;
                    }
                    let px = src.pixel(x + kx - rx, y + ky - ry).channels();
                    for (a, p) in acc.iter_mut().zip(px) {
                        *a = pick(*a, p);
                    }
                }
            }
            row[x * 3..x * 3 + 3].copy_from_slice(&acc);
        }
    });

    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::ElementShape;

    fn spot(size: usize, at: (usize, usize), px: Rgb8) -> Result<PixelBuffer, FilterError> {
        let mut img = PixelBuffer::from_size_val([size, size].into(), Rgb8::new(50, 50, 50))?;
        img.set_pixel(at.0, at.1, px)?;
        Ok(img)
    }

    #[test]
    fn test_dilate_spreads_bright_spot() -> Result<(), FilterError> {
        let src = spot(7, (3, 3), Rgb8::new(200, 100, 50))?;
        let dst = dilate(&src, &StructuringElement::default());

        assert_eq!(dst.pixel(3, 3), Rgb8::new(200, 100, 50));
        assert_eq!(dst.pixel(3, 2), Rgb8::new(200, 100, 50));
        assert_eq!(dst.pixel(4, 3), Rgb8::new(200, 100, 50));
        // the window's top-left corner seeds the maximum
        assert_eq!(dst.pixel(4, 4), Rgb8::new(200, 100, 50));
        // the opposite diagonal is outside both the cross and the seed
        assert_eq!(dst.pixel(2, 2), Rgb8::new(50, 50, 50));
        // the one pixel margin stays black
        assert_eq!(dst.pixel(0, 3), Rgb8::BLACK);
        assert_eq!(dst.pixel(6, 6), Rgb8::BLACK);
        Ok(())
    }

    #[test]
    fn test_erode_spreads_dark_spot() -> Result<(), FilterError> {
        let src = spot(7, (3, 3), Rgb8::new(0, 10, 20))?;
        let element = StructuringElement::new(ElementShape::Box { size: 3 })?;
        let dst = erode(&src, &element);

        assert_eq!(dst.pixel(2, 2), Rgb8::new(0, 10, 20));
        assert_eq!(dst.pixel(4, 4), Rgb8::new(0, 10, 20));
        assert_eq!(dst.pixel(5, 5), Rgb8::new(50, 50, 50));
        Ok(())
    }

    #[test]
    fn test_seed_pixel_is_top_left_corner() -> Result<(), FilterError> {
        // the corner is outside the cross but still seeds the maximum
        let src = spot(5, (1, 1), Rgb8::WHITE)?;
        let dst = dilate(&src, &StructuringElement::default());
        assert_eq!(dst.pixel(2, 2), Rgb8::WHITE);
        assert_eq!(dst.pixel(3, 3), Rgb8::new(50, 50, 50));
        Ok(())
    }

    #[test]
    fn test_element_larger_than_image() -> Result<(), FilterError> {
        let src = PixelBuffer::from_size_val([2, 2].into(), Rgb8::WHITE)?;
        let dst = dilate(&src, &StructuringElement::default());
        assert_eq!(dst, src.filled_like(Rgb8::BLACK));
        Ok(())
    }

    #[test]
    fn test_open_removes_isolated_bright_pixel() -> Result<(), FilterError> {
        let src = spot(9, (4, 4), Rgb8::WHITE)?;
        let dst = apply_morphology(MorphOp::Open, &src, &StructuringElement::default());
        assert_eq!(dst.pixel(4, 4), Rgb8::new(50, 50, 50));
        Ok(())
    }

    #[test]
    fn test_close_fills_isolated_dark_pixel() -> Result<(), FilterError> {
        let src = spot(9, (4, 4), Rgb8::BLACK)?;
        let dst = apply_morphology(MorphOp::Close, &src, &StructuringElement::default());
        assert_eq!(dst.pixel(4, 4), Rgb8::new(50, 50, 50));
        Ok(())
    }

    #[test]
    fn test_gradient_top_hat_black_hat() -> Result<(), FilterError> {
        let element = StructuringElement::default();

        let bright = spot(9, (4, 4), Rgb8::new(150, 150, 150))?;
        let grad = apply_morphology(MorphOp::Gradient, &bright, &element);
        assert_eq!(grad.pixel(4, 3), Rgb8::new(100, 100, 100));
        assert_eq!(grad.pixel(6, 6), Rgb8::BLACK);

        let top_hat = apply_morphology(MorphOp::TopHat, &bright, &element);
        assert_eq!(top_hat.pixel(4, 4), Rgb8::new(100, 100, 100));
        assert_eq!(top_hat.pixel(5, 5), Rgb8::BLACK);

        let dark = spot(9, (4, 4), Rgb8::new(20, 20, 20))?;
        let black_hat = apply_morphology(MorphOp::BlackHat, &dark, &element);
        assert_eq!(black_hat.pixel(4, 4), Rgb8::new(30, 30, 30));
        Ok(())
    }

    #[test]
    fn test_strategy_does_not_change_result() -> Result<(), FilterError> {
        let src = PixelBuffer::from_fn([11, 9].into(), |x, y| {
            Rgb8::new((x * 23) as u8, (y * 29) as u8, ((x * y) % 256) as u8)
        })?;
        let element = StructuringElement::new(ElementShape::Ellipse {
            width: 5,
            height: 3,
        })?;
        for op in MorphOp::ALL {
            let expected = apply_morphology(op, &src, &element);
            for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Fixed(2)] {
                let dst = apply_morphology_with_strategy(op, &src, &element, strategy)?;
                assert_eq!(dst, expected, "{} with {strategy:?}", op.name());
            }
        }
        Ok(())
    }

    #[test]
    fn test_invalid_strategy_is_rejected() -> Result<(), FilterError> {
        let src = spot(5, (2, 2), Rgb8::WHITE)?;
        let res = apply_morphology_with_strategy(
            MorphOp::Dilate,
            &src,
            &StructuringElement::default(),
            ExecutionStrategy::Fixed(0),
        );
        assert!(matches!(res, Err(FilterError::Parallel(_))));
        Ok(())
    }

    #[test]
    fn test_morph_op_from_str() {
        assert_eq!("Dilate".parse::<MorphOp>(), Ok(MorphOp::Dilate));
        assert_eq!("top-hat".parse::<MorphOp>(), Ok(MorphOp::TopHat));
        for op in MorphOp::ALL {
            assert_eq!(op.name().parse::<MorphOp>(), Ok(op));
        }
        assert!("blur".parse::<MorphOp>().is_err());
    }
}
