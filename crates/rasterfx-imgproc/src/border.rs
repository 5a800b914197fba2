use rasterfx_image::{ImageSize, PixelBuffer, Rgb8};

/// Rule for mapping out-of-range coordinates back into the valid buffer rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderPolicy {
    /// Replicate the value of the nearest border pixel.
    ///
    /// Coordinates are clamped into `[0, len - 1]`. Corresponds to OpenCV's `BORDER_REPLICATE`.
    #[default]
    Replicate,

    /// Clamp into a rectangle inset from the border by `(margin_x, margin_y)`.
    ///
    /// Coordinates are clamped into `[margin, len - margin]`, narrowed to stay inside the image
    /// when the margin is zero or the image is smaller than the window.
    Inset {
        /// Horizontal inset in pixels.
        margin_x: usize,
        /// Vertical inset in pixels.
        margin_y: usize,
    },
}

impl BorderPolicy {
    /// Map a possibly out-of-range coordinate to a valid pixel coordinate.
    #[inline]
    pub fn resolve(&self, x: isize, y: isize, size: ImageSize) -> (usize, usize) {
        match *self {
            BorderPolicy::Replicate => (
                replicate_index(x, size.width),
                replicate_index(y, size.height),
            ),
            BorderPolicy::Inset { margin_x, margin_y } => (
                inset_index(x, size.width, margin_x),
                inset_index(y, size.height, margin_y),
            ),
        }
    }

    /// Read the pixel at a possibly out-of-range coordinate.
    #[inline]
    pub fn pixel(&self, src: &PixelBuffer, x: isize, y: isize) -> Rgb8 {
        let (x, y) = self.resolve(x, y, src.size());
        src.pixel(x, y)
    }
}

#[inline]
fn replicate_index(idx: isize, len: usize) -> usize {
    idx.clamp(0, len as isize - 1) as usize
}

#[inline]
fn inset_index(idx: isize, len: usize, margin: usize) -> usize {
    let last = len as isize - 1;
    let lo = (margin as isize).min(last);
    let hi = (len as isize - margin as isize).clamp(lo, last);
    idx.clamp(lo, hi) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replicate_clamps_to_edges() {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let border = BorderPolicy::Replicate;
        assert_eq!(border.resolve(-2, -1, size), (0, 0));
        assert_eq!(border.resolve(5, 7, size), (3, 2));
        assert_eq!(border.resolve(2, 1, size), (2, 1));
    }

    #[test]
    fn inset_clamps_inside_margin() {
        let size = ImageSize {
            width: 6,
            height: 6,
        };
        let border = BorderPolicy::Inset {
            margin_x: 1,
            margin_y: 2,
        };
        assert_eq!(border.resolve(-1, -1, size), (1, 2));
        assert_eq!(border.resolve(0, 0, size), (1, 2));
        // the upper bound is len - margin, inclusive
        assert_eq!(border.resolve(9, 9, size), (5, 4));
    }

    #[test]
    fn inset_stays_in_bounds_for_degenerate_sizes() {
        let tiny = ImageSize {
            width: 1,
            height: 2,
        };
        let border = BorderPolicy::Inset {
            margin_x: 3,
            margin_y: 3,
        };
        assert_eq!(border.resolve(-4, 9, tiny), (0, 1));

        let no_margin = BorderPolicy::Inset {
            margin_x: 0,
            margin_y: 0,
        };
        assert_eq!(no_margin.resolve(10, 10, tiny), (0, 1));
    }
}
