// Morphological image processing operations.

/// Structuring element utilities.
pub mod element;
pub use element::{ElementShape, StructuringElement};

/// Dilation, erosion and their compositions.
pub mod ops;
pub use ops::{apply_morphology, apply_morphology_with_strategy, dilate, erode, MorphOp};
