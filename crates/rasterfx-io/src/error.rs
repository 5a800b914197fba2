/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// The file extension does not name a supported format.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the pixel buffer from decoded data.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] rasterfx_image::ImageError),

    /// Error from the image codec.
    #[error("Failed to decode or encode the image. {0}")]
    CodecError(#[from] image::ImageError),

    /// The image is too large for the codec.
    #[error("Image of {0}x{1} pixels exceeds the codec limits")]
    ImageTooLarge(usize, usize),
}
