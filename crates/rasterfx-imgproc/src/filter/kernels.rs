use serde::{Deserialize, Serialize};

use crate::error::{check_kernel_size, side_from_radius, FilterError};

/// Default box blur window side.
pub const DEFAULT_BOX_SIZE: usize = 3;

/// Default gaussian kernel radius.
pub const DEFAULT_GAUSSIAN_RADIUS: usize = 3;

/// Default gaussian sigma.
pub const DEFAULT_GAUSSIAN_SIGMA: f32 = 2.0;

/// Default motion blur radius.
pub const DEFAULT_MOTION_RADIUS: usize = 3;

/// A matrix of floating point weights with odd width and height.
///
/// Weights are stored row-major: `data[ky * width + kx]`, where `kx` is the horizontal offset
/// from the left column and `ky` the vertical offset from the top row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KernelRows", into = "KernelRows")]
pub struct Kernel {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

#[derive(Serialize, Deserialize)]
struct KernelRows {
    rows: Vec<Vec<f32>>,
}

impl TryFrom<KernelRows> for Kernel {
    type Error = FilterError;

    fn try_from(repr: KernelRows) -> Result<Self, Self::Error> {
        Kernel::from_rows(&repr.rows)
    }
}

impl From<Kernel> for KernelRows {
    fn from(kernel: Kernel) -> Self {
        KernelRows {
            rows: kernel
                .data
                .chunks_exact(kernel.width)
                .map(<[f32]>::to_vec)
                .collect(),
        }
    }
}

impl Kernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelSize`] if a dimension is zero or even,
    /// [`FilterError::InvalidParameter`] if one exceeds [`MAX_KERNEL_SIDE`](crate::MAX_KERNEL_SIDE)
    /// and [`FilterError::NonRectangularKernel`] if `data` does not hold `width * height` weights.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, FilterError> {
        check_kernel_size(width, height)?;
        if data.len() != width * height {
            return Err(FilterError::NonRectangularKernel);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a kernel from a list of rows, top row first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rasterfx_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::from_rows(&[vec![0.0, 1.0, 0.0]]).unwrap();
    /// assert_eq!(kernel.radius(), (1, 0));
    /// ```
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, FilterError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        check_kernel_size(width, height)?;
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(FilterError::NonRectangularKernel);
        }
        let data = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(width, height, data)
    }

    /// Get the width of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the kernel.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the radius `(width / 2, height / 2)` around the center cell.
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Get a reference to the row-major weights.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Weight at column `kx`, row `ky`.
    #[inline]
    pub fn get(&self, kx: usize, ky: usize) -> f32 {
        self.data[ky * self.width + kx]
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Divide every weight by `norm`. A zero norm leaves the kernel unchanged.
    fn normalized_by(mut self, norm: f32) -> Self {
        if norm != 0.0 {
            self.data.iter_mut().for_each(|k| *k /= norm);
        }
        self
    }
}

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `width` - The width of the window, odd.
/// * `height` - The height of the window, odd.
///
/// # Returns
///
/// A kernel with uniform weights `1 / (width * height)`.
pub fn box_blur_kernel(width: usize, height: usize) -> Result<Kernel, FilterError> {
    check_kernel_size(width, height)?;
    let weight = 1.0 / (width * height) as f32;
    Kernel::new(width, height, vec![weight; width * height])
}

/// Create a gaussian blur kernel.
///
/// Weights are `exp(-(i² + j²) / sigma²)` for offsets `i, j` in `[-radius, radius]`, normalized
/// to sum to one.
///
/// # Arguments
///
/// * `radius` - The radius of the kernel; its side is `2 * radius + 1`.
/// * `sigma` - The spread of the gaussian, positive.
pub fn gaussian_kernel(radius: usize, sigma: f32) -> Result<Kernel, FilterError> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(FilterError::invalid(
            "sigma",
            format!("must be positive and finite, got {sigma}"),
        ));
    }

    let size = side_from_radius(radius)?;
    let sigma_sq = sigma * sigma;
    let r = radius as isize;

    // compute the kernel
    let mut data = Vec::with_capacity(size * size);
    for j in -r..=r {
        for i in -r..=r {
            let d = (i * i + j * j) as f32;
            data.push((-d / sigma_sq).exp());
        }
    }

    // normalize the kernel
    let kernel = Kernel::new(size, size, data)?;
    let norm = kernel.sum();
    log::debug!("gaussian kernel {size}x{size}, sigma {sigma}, norm {norm}");
    Ok(kernel.normalized_by(norm))
}

/// Create the 3x3 Sobel kernel.
///
/// Responds to horizontal intensity changes; the weights are not normalized.
pub fn sobel_kernel() -> Kernel {
    fixed_3x3([[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]])
}

/// Create the 3x3 sharpen kernel.
pub fn sharpen_kernel() -> Kernel {
    fixed_3x3([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]])
}

/// Create the 3x3 emboss kernel.
///
/// The kernel is normalized by the sum of its left column only, not by the full sum.
pub fn emboss_kernel() -> Kernel {
    let kernel = fixed_3x3([[0.0, 1.0, 0.0], [1.0, 0.0, -1.0], [0.0, -1.0, 0.0]]);
    let norm = (0..kernel.height()).map(|ky| kernel.get(0, ky)).sum();
    kernel.normalized_by(norm)
}

/// Create a diagonal motion blur kernel.
///
/// # Arguments
///
/// * `radius` - The radius of the kernel; its side is `2 * radius + 1`.
///
/// # Returns
///
/// A kernel with `1 / size` on the main diagonal and zero elsewhere, renormalized to sum to one.
pub fn motion_blur_kernel(radius: usize) -> Result<Kernel, FilterError> {
    let size = side_from_radius(radius)?;
    let mut data = vec![0.0; size * size];
    for i in 0..size {
        data[i * size + i] = 1.0 / size as f32;
    }
    let kernel = Kernel::new(size, size, data)?;
    let norm = kernel.sum();
    Ok(kernel.normalized_by(norm))
}

fn fixed_3x3(rows: [[f32; 3]; 3]) -> Kernel {
    Kernel {
        data: rows.iter().flatten().copied().collect(),
        width: 3,
        height: 3,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_box_blur_kernel() -> Result<(), FilterError> {
        let kernel = box_blur_kernel(3, 5)?;
        assert_eq!(kernel.width(), 3);
        assert_eq!(kernel.height(), 5);
        assert_eq!(kernel.radius(), (1, 2));
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-6);
        assert!(kernel.data().iter().all(|&k| k == 1.0 / 15.0));
        Ok(())
    }

    #[test]
    fn test_box_blur_kernel_rejects_even() {
        assert_eq!(
            box_blur_kernel(2, 3),
            Err(FilterError::InvalidKernelSize(2, 3))
        );
        assert_eq!(
            box_blur_kernel(3, 0),
            Err(FilterError::InvalidKernelSize(3, 0))
        );
    }

    #[test]
    fn test_gaussian_kernel() -> Result<(), FilterError> {
        let kernel = gaussian_kernel(DEFAULT_GAUSSIAN_RADIUS, DEFAULT_GAUSSIAN_SIGMA)?;
        assert_eq!(kernel.width(), 7);
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-5);

        // peak at the center, symmetric around it
        let center = kernel.get(3, 3);
        assert!(kernel.data().iter().all(|&k| k <= center));
        assert_relative_eq!(kernel.get(0, 2), kernel.get(6, 4));
        assert_relative_eq!(kernel.get(1, 3), kernel.get(3, 1));

        // neighbor ratio follows exp(-1 / sigma²)
        assert_relative_eq!(
            kernel.get(4, 3) / center,
            (-1.0f32 / 4.0).exp(),
            epsilon = 1e-6
        );
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_rejects_bad_sigma() {
        assert!(matches!(
            gaussian_kernel(3, 0.0),
            Err(FilterError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(gaussian_kernel(3, f32::NAN).is_err());
    }

    #[test]
    fn test_fixed_kernels() {
        assert_eq!(sobel_kernel().sum(), 0.0);
        assert_eq!(sobel_kernel().get(0, 1), -2.0);
        assert_eq!(sharpen_kernel().sum(), 1.0);
        assert_eq!(sharpen_kernel().get(1, 1), 5.0);
    }

    #[test]
    fn test_emboss_kernel_partial_normalization() {
        // the left column sums to one, so the weights are unchanged
        let kernel = emboss_kernel();
        assert_eq!(
            kernel.data(),
            &[0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, -1.0, 0.0]
        );
        assert_eq!(kernel.sum(), 0.0);
    }

    #[test]
    fn test_motion_blur_kernel() -> Result<(), FilterError> {
        let kernel = motion_blur_kernel(2)?;
        assert_eq!(kernel.width(), 5);
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-6);
        for ky in 0..5 {
            for kx in 0..5 {
                if kx == ky {
                    assert_relative_eq!(kernel.get(kx, ky), 0.2, epsilon = 1e-6);
                } else {
                    assert_eq!(kernel.get(kx, ky), 0.0);
                }
            }
        }

        let identity = motion_blur_kernel(0)?;
        assert_eq!(identity.data(), &[1.0]);
        Ok(())
    }

    #[test]
    fn test_oversized_kernels_are_rejected() {
        let too_wide = crate::MAX_KERNEL_SIDE + 2;
        assert!(matches!(
            box_blur_kernel(too_wide, 3),
            Err(FilterError::InvalidParameter { name: "size", .. })
        ));
        assert!(box_blur_kernel(usize::MAX, usize::MAX).is_err());
        for radius in [usize::MAX / 2, usize::MAX] {
            assert!(matches!(
                motion_blur_kernel(radius),
                Err(FilterError::InvalidParameter { name: "radius", .. })
            ));
            assert!(matches!(
                gaussian_kernel(radius, 1.0),
                Err(FilterError::InvalidParameter { name: "radius", .. })
            ));
        }
    }

    #[test]
    fn test_kernel_from_rows() {
        assert_eq!(
            Kernel::from_rows(&[vec![1.0, 2.0, 3.0], vec![1.0]]),
            Err(FilterError::InvalidKernelSize(3, 2))
        );
        assert_eq!(
            Kernel::from_rows(&[vec![1.0, 2.0, 3.0], vec![1.0], vec![0.0, 0.0, 0.0]]),
            Err(FilterError::NonRectangularKernel)
        );
        let empty: [Vec<f32>; 0] = [];
        assert_eq!(
            Kernel::from_rows(&empty),
            Err(FilterError::InvalidKernelSize(0, 0))
        );
    }
}
