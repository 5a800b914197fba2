use crate::error::ImageError;
use crate::pixel::Rgb8;

/// Number of interleaved channels stored per pixel.
const CHANNELS: usize = 3;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use rasterfx_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Total number of pixels.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether `(x, y)` addresses a pixel inside the image.
    pub fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A width×height grid of 8-bit RGB pixels.
///
/// Pixels are stored row-major and interleaved (`R, G, B, R, G, B, ...`). The size is fixed at
/// construction; only the pixel values are mutable. A buffer always holds at least one pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    size: ImageSize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer from interleaved RGB data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data, `width * height * 3` bytes in R, G, B order.
    ///
    /// # Errors
    ///
    /// If the size is empty or the length of the data does not match it, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterfx_image::{ImageSize, PixelBuffer};
    ///
    /// let image = PixelBuffer::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<u8>) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::EmptyImage(size.width, size.height));
        }

        if data.len() != size.area() * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.area() * CHANNELS,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new buffer with every pixel set to `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterfx_image::{ImageSize, PixelBuffer, Rgb8};
    ///
    /// let image = PixelBuffer::from_size_val([4, 2].into(), Rgb8::WHITE).unwrap();
    /// assert_eq!(image.get_pixel(3, 1).unwrap(), Rgb8::WHITE);
    /// ```
    pub fn from_size_val(size: ImageSize, val: Rgb8) -> Result<Self, ImageError> {
        let data = std::iter::repeat(val.channels())
            .take(size.area())
            .flatten()
            .collect();
        Self::new(size, data)
    }

    /// Create a new buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        size: ImageSize,
        mut f: impl FnMut(usize, usize) -> Rgb8,
    ) -> Result<Self, ImageError> {
        let mut data = Vec::with_capacity(size.area() * CHANNELS);
        for y in 0..size.height {
            for x in 0..size.width {
                data.extend_from_slice(&f(x, y).channels());
            }
        }
        Self::new(size, data)
    }

    /// Create a buffer of the same size as `self` with every pixel set to `val`.
    pub fn filled_like(&self, val: Rgb8) -> Self {
        let data = std::iter::repeat(val.channels())
            .take(self.size.area())
            .flatten()
            .collect();
        Self {
            size: self.size,
            data,
        }
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels per pixel.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Number of bytes in one row.
    pub fn row_stride(&self) -> usize {
        self.size.width * CHANNELS
    }

    /// The interleaved pixel data.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The interleaved pixel data, mutably.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinate is outside the image, an error is returned.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<Rgb8, ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        Ok(self.pixel(x, y))
    }

    /// Set the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinate is outside the image, an error is returned.
    pub fn set_pixel(&mut self, x: usize, y: usize, px: Rgb8) -> Result<(), ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + CHANNELS].copy_from_slice(&px.channels());
        Ok(())
    }

    /// Get the pixel at `(x, y)` without a bounds error.
    ///
    /// PRECONDITION: `x < width` and `y < height`; violating it panics on the slice index.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb8 {
        let offset = self.offset(x, y);
        Rgb8::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        )
    }

    /// Iterate over the pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb8> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|c| Rgb8::new(c[0], c[1], c[2]))
    }

    /// Iterate over the rows as interleaved byte slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.row_stride())
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.size.width + x) * CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ImageError;
    use crate::image::{ImageSize, PixelBuffer};
    use crate::pixel::Rgb8;

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.area(), 200);
        assert!(image_size.contains(9, 19));
        assert!(!image_size.contains(-1, 0));
        assert!(!image_size.contains(10, 0));
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = PixelBuffer::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.width(), 10);
        assert_eq!(image.height(), 20);
        assert_eq!(image.num_channels(), 3);
        assert_eq!(image.row_stride(), 30);

        Ok(())
    }

    #[test]
    fn image_rejects_bad_shapes() {
        let res = PixelBuffer::new([2, 2].into(), vec![0u8; 11]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(11, 12)));

        let res = PixelBuffer::new([0, 3].into(), vec![]);
        assert_eq!(res, Err(ImageError::EmptyImage(0, 3)));
    }

    #[test]
    fn image_get_set_pixel() -> Result<(), ImageError> {
        let mut image = PixelBuffer::from_size_val([3, 2].into(), Rgb8::BLACK)?;
        image.set_pixel(2, 1, Rgb8::new(1, 2, 3))?;

        assert_eq!(image.get_pixel(2, 1)?, Rgb8::new(1, 2, 3));
        assert_eq!(&image.as_slice()[15..18], &[1, 2, 3]);
        assert_eq!(
            image.get_pixel(3, 0),
            Err(ImageError::PixelIndexOutOfBounds(3, 0, 3, 2))
        );

        Ok(())
    }

    #[test]
    fn image_from_fn() -> Result<(), ImageError> {
        let image = PixelBuffer::from_fn([4, 3].into(), |x, y| {
            Rgb8::new(x as u8, y as u8, (x + y) as u8)
        })?;
        assert_eq!(image.pixel(3, 2), Rgb8::new(3, 2, 5));
        assert_eq!(image.pixels().count(), 12);
        assert_eq!(image.rows().count(), 3);

        let black = image.filled_like(Rgb8::BLACK);
        assert_eq!(black.size(), image.size());
        assert!(black.as_slice().iter().all(|&c| c == 0));

        Ok(())
    }
}
