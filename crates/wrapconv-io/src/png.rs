use std::{fs, io::BufReader, path::Path};

use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use wrapconv_image::{ImageSize, Rgba8Image};

use crate::error::IoError;

/// Read a PNG image as four channels (rgba8).
///
/// Palette, grayscale and 16-bit images are converted; a missing alpha channel is
/// filled with 255.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGBA image with four channels (rgba8).
pub fn read_image_png_rgba8(file_path: impl AsRef<Path>) -> Result<Rgba8Image, IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    let is_png = file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if !is_png {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file = BufReader::new(fs::File::open(file_path)?);
    decode_png_impl(file)
}

/// Decodes a PNG image from raw bytes as four channels (rgba8).
///
/// # Arguments
///
/// - `bytes` - Raw bytes of the png file
pub fn decode_image_png_rgba8(bytes: &[u8]) -> Result<Rgba8Image, IoError> {
    decode_png_impl(bytes)
}

/// Encodes an image (rgba8) into PNG bytes.
///
/// # Arguments
///
/// - `image` - The image to encode.
pub fn encode_image_png_rgba8(image: &Rgba8Image) -> Result<Vec<u8>, IoError> {
    let [width, height] = <[u32; 2]>::try_from(image.size())
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    let mut bytes = Vec::new();

    {
        let mut encoder = Encoder::new(&mut bytes, width, height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
        writer
            .write_image_data(image.as_slice())
            .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    }

    Ok(bytes)
}

/// Writes the given PNG _(rgba8)_ data to the given file path.
///
/// The image is encoded in memory first, so nothing is written if encoding fails.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image to write.
pub fn write_image_png_rgba8(
    file_path: impl AsRef<Path>,
    image: &Rgba8Image,
) -> Result<(), IoError> {
    let bytes = encode_image_png_rgba8(image)?;
    fs::write(file_path, bytes)?;
    Ok(())
}

// utility function to decode a png stream into rgba8
fn decode_png_impl<R: std::io::Read>(source: R) -> Result<Rgba8Image, IoError> {
    let mut decoder = Decoder::new(source);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != BitDepth::Eight {
        return Err(IoError::PngDecodeError(format!(
            "unexpected bit depth after expansion: {:?}",
            info.bit_depth
        )));
    }

    let rgba = match info.color_type {
        ColorType::Rgba => buf,
        ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        ColorType::Indexed => {
            return Err(IoError::PngDecodeError(
                "indexed image was not expanded".to_string(),
            ))
        }
    };

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };

    Ok(Rgba8Image::new(size, rgba)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_raw(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = Encoder::new(&mut bytes, width, height);
            encoder.set_color(color);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        bytes
    }

    #[test]
    fn read_write_png_rgba8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("rgba8.png");

        let data = (0..3 * 2 * 4).map(|v| v as u8 * 7).collect::<Vec<_>>();
        let image = Rgba8Image::new([3, 2].into(), data)?;
        write_image_png_rgba8(&file_path, &image)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_png_rgba8(&file_path)?;
        assert_eq!(image_back, image);

        Ok(())
    }

    #[test]
    fn decode_png_rgb8() -> Result<(), IoError> {
        let bytes = encode_raw(2, 1, ColorType::Rgb, &[1, 2, 3, 4, 5, 6]);
        let image = decode_image_png_rgba8(&bytes)?;
        assert_eq!(image.as_slice(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        Ok(())
    }

    #[test]
    fn decode_png_gray() -> Result<(), IoError> {
        let bytes = encode_raw(2, 1, ColorType::Grayscale, &[9, 200]);
        let image = decode_image_png_rgba8(&bytes)?;
        assert_eq!(image.as_slice(), &[9, 9, 9, 255, 200, 200, 200, 255]);

        let bytes = encode_raw(1, 1, ColorType::GrayscaleAlpha, &[40, 3]);
        let image = decode_image_png_rgba8(&bytes)?;
        assert_eq!(image.as_slice(), &[40, 40, 40, 3]);
        Ok(())
    }

    #[test]
    fn read_png_missing_or_wrong_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let res = read_image_png_rgba8(tmp_dir.path().join("missing.png"));
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));

        let file_path = tmp_dir.path().join("image.bmp");
        fs::write(&file_path, b"not a png")?;
        let res = read_image_png_rgba8(&file_path);
        assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));
        Ok(())
    }

    #[test]
    fn decode_png_corrupt() {
        let res = decode_image_png_rgba8(b"definitely not a png");
        assert!(matches!(res, Err(IoError::PngDecodeError(_))));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn encode_too_wide_image() -> Result<(), IoError> {
        let image = Rgba8Image::new([u32::MAX as usize + 1, 0].into(), vec![])?;
        let res = encode_image_png_rgba8(&image);
        assert!(matches!(
            res,
            Err(IoError::PngEncodingError(ref msg)) if msg.contains("32-bit")
        ));
        Ok(())
    }

    #[test]
    fn write_empty_image_leaves_no_file() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("empty.png");

        let image = Rgba8Image::new([0, 0].into(), vec![])?;
        let res = write_image_png_rgba8(&file_path, &image);
        assert!(matches!(res, Err(IoError::PngEncodingError(_))));
        assert!(!file_path.exists());
        Ok(())
    }
}
