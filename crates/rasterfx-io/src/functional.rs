use std::path::Path;

use rasterfx_image::{ImageSize, PixelBuffer};

use crate::error::IoError;

/// Reads an image from the given file path as 8-bit RGB.
///
/// The format is guessed from the file content, so any format supported by the image crate is
/// accepted. Other color types are converted: gray is replicated, alpha is dropped and deeper
/// samples are scaled down to 8 bits.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A pixel buffer holding the decoded image.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<PixelBuffer, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;
    log::debug!(
        "decoded {} as {:?} {}x{}",
        file_path.display(),
        img.color(),
        img.width(),
        img.height()
    );

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(PixelBuffer::new(size, img.into_rgb8().into_raw())?)
}

/// Writes a pixel buffer to the given file path.
///
/// The format is chosen from the file extension.
///
/// # Arguments
///
/// * `file_path` - The destination, with an extension such as `png` or `jpg`.
/// * `image` - The pixel buffer to encode.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &PixelBuffer) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let format = image::ImageFormat::from_path(file_path)
        .map_err(|_| IoError::InvalidFileExtension(file_path.to_path_buf()))?;

    let (width, height) = (image.width(), image.height());
    let too_large = || IoError::ImageTooLarge(width, height);
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;

    image::save_buffer_with_format(
        file_path,
        image.as_slice(),
        w,
        h,
        image::ExtendedColorType::Rgb8,
        format,
    )?;

    Ok(())
}
