use std::path::Path;

use wrapconv_image::{ImageSize, Rgba8Image};

use crate::{error::IoError, png::read_image_png_rgba8};

/// Reads an image from the given file path as four channels (rgba8).
///
/// PNG files go through the native PNG decoder; any other file is handed to
/// [`read_image_any_rgba8`].
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A RGBA image with four channels (rgba8).
pub fn read_image_rgba8(file_path: impl AsRef<Path>) -> Result<Rgba8Image, IoError> {
    let file_path = file_path.as_ref();
    let is_png = file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    if is_png {
        read_image_png_rgba8(file_path)
    } else {
        read_image_any_rgba8(file_path)
    }
}

/// Reads an image of any format supported by the image crate as four channels (rgba8).
///
/// The format is guessed from the file content, not from the extension.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A RGBA image with four channels (rgba8).
pub fn read_image_any_rgba8(file_path: impl AsRef<Path>) -> Result<Rgba8Image, IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Rgba8Image::new(size, img.into_rgba8().into_raw())?)
}
