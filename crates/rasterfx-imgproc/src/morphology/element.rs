use serde::{Deserialize, Serialize};

use crate::error::{check_kernel_size, FilterError};

/// Shapes of morphological structuring elements.
///
/// All elements are centered at their middle cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ElementShape {
    /// A rectangular box: every cell participates.
    Box {
        /// The side length of the square element (size x size).
        size: usize,
    },

    /// A cross (plus): only the center row and the center column participate.
    Cross {
        /// The side length of the square element (size x size).
        size: usize,
    },

    /// An ellipse inscribed in the element.
    Ellipse {
        /// The width of the ellipse.
        width: usize,
        /// The height of the ellipse.
        height: usize,
    },
}

impl Default for ElementShape {
    fn default() -> Self {
        ElementShape::Cross { size: 3 }
    }
}

/// A boolean matrix with odd dimensions marking which neighbor offsets take part in a
/// morphological min/max.
///
/// Cells are stored row-major: `data[ky * width + kx]`.
///
/// # Example
///
/// ```rust
/// use rasterfx_imgproc::morphology::{ElementShape, StructuringElement};
///
/// let element = StructuringElement::new(ElementShape::Cross { size: 3 }).unwrap();
/// assert_eq!(element.radius(), (1, 1));
/// assert!(element.get(1, 0));
/// assert!(!element.get(0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ElementRepr", into = "ElementRepr")]
pub struct StructuringElement {
    data: Vec<bool>,
    width: usize,
    height: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ElementRepr {
    Shape(ElementShape),
    Rows { rows: Vec<Vec<bool>> },
}

impl TryFrom<ElementRepr> for StructuringElement {
    type Error = FilterError;

    fn try_from(repr: ElementRepr) -> Result<Self, Self::Error> {
        match repr {
            ElementRepr::Shape(shape) => StructuringElement::new(shape),
            ElementRepr::Rows { rows } => StructuringElement::from_rows(&rows),
        }
    }
}

impl From<StructuringElement> for ElementRepr {
    fn from(element: StructuringElement) -> Self {
        ElementRepr::Rows {
            rows: element
                .data
                .chunks_exact(element.width)
                .map(<[bool]>::to_vec)
                .collect(),
        }
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        cross(3)
    }
}

impl StructuringElement {
    /// Create a structuring element from a shape.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelSize`] if a dimension is zero or even, and
    /// [`FilterError::InvalidParameter`] if one exceeds [`MAX_KERNEL_SIDE`](crate::MAX_KERNEL_SIDE).
    pub fn new(shape: ElementShape) -> Result<Self, FilterError> {
        let element = match shape {
            ElementShape::Box { size } => {
                check_kernel_size(size, size)?;
                StructuringElement {
                    data: vec![true; size * size],
                    width: size,
                    height: size,
                }
            }
            ElementShape::Cross { size } => {
                check_kernel_size(size, size)?;
                cross(size)
            }
            ElementShape::Ellipse { width, height } => {
                check_kernel_size(width, height)?;
                ellipse(width, height)
            }
        };
        log::debug!(
            "structuring element {:?}: {} of {} cells active",
            shape,
            element.active_count(),
            element.data.len()
        );
        Ok(element)
    }

    /// Create a structuring element from rows of cells, top row first.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelSize`] for zero or even dimensions,
    /// [`FilterError::NonRectangularKernel`] if rows differ in length and
    /// [`FilterError::AllKernelElementsInactive`] if no cell is set.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, FilterError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(FilterError::NonRectangularKernel);
        }
        check_kernel_size(width, height)?;

        let data: Vec<bool> = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        if !data.iter().any(|&v| v) {
            return Err(FilterError::AllKernelElementsInactive);
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Get the width of the element.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the element.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the radius `(width / 2, height / 2)` around the center cell.
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Whether the cell at column `kx`, row `ky` participates.
    #[inline]
    pub fn get(&self, kx: usize, ky: usize) -> bool {
        self.data[ky * self.width + kx]
    }

    /// Number of participating cells.
    pub fn active_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

fn cross(size: usize) -> StructuringElement {
    let mid = size / 2;
    let mut data = vec![false; size * size];

    // fill horizontal line
    for kx in 0..size {
        data[mid * size + kx] = true;
    }

    // fill vertical line
    for ky in 0..size {
        data[ky * size + mid] = true;
    }

    StructuringElement {
        data,
        width: size,
        height: size,
    }
}

fn ellipse(width: usize, height: usize) -> StructuringElement {
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;
    let rx = width as f64 / 2.0;
    let ry = height as f64 / 2.0;

    let mut data = vec![false; width * height];
    for ky in 0..height {
        for kx in 0..width {
            let dx = (kx as f64 - cx) / rx;
            let dy = (ky as f64 - cy) / ry;
            data[ky * width + kx] = dx * dx + dy * dy <= 1.0;
        }
    }

    StructuringElement {
        data,
        width,
        height,
    }
}
