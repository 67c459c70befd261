use std::path::Path;

use wrapconv_imgproc::filter::Kernel2d;

use crate::error::IoError;

/// Parse a kernel from its text description.
///
/// The text holds two integers, `width height`, followed by `width * height` weights in
/// row-major order. Tokens are separated by any whitespace; tokens after the last weight
/// are ignored.
///
/// # Arguments
///
/// * `text` - The kernel description.
///
/// # Errors
///
/// Returns [`IoError::KernelParseError`] for a malformed token and
/// [`IoError::KernelTruncated`] when the text ends early.
///
/// # Examples
///
/// ```
/// use wrapconv_io::kernel::parse_kernel_txt;
///
/// let kernel = parse_kernel_txt("3 1\n0.25 0.5 0.25\n").unwrap();
/// assert_eq!(kernel.width(), 3);
/// assert_eq!(kernel.get(1, 0), Some(0.5));
/// ```
pub fn parse_kernel_txt(text: &str) -> Result<Kernel2d, IoError> {
    let mut tokens = text.split_whitespace().enumerate();

    let mut dimension = |found: usize| -> Result<usize, IoError> {
        let (position, token) = tokens.next().ok_or(IoError::KernelTruncated {
            expected: 2,
            found,
        })?;
        token.parse::<usize>().map_err(|_| IoError::KernelParseError {
            position,
            token: token.to_string(),
        })
    };
    let width = dimension(0)?;
    let height = dimension(1)?;

    let expected = width
        .checked_mul(height)
        .ok_or_else(|| IoError::KernelParseError {
            position: 1,
            token: height.to_string(),
        })?;
    // the text cannot hold more weights than it has bytes
    let mut data = Vec::with_capacity(expected.min(text.len()));
    for (position, token) in tokens.by_ref().take(expected) {
        let weight = token.parse::<f64>().map_err(|_| IoError::KernelParseError {
            position,
            token: token.to_string(),
        })?;
        data.push(weight);
    }

    if data.len() < expected {
        return Err(IoError::KernelTruncated {
            expected: expected + 2,
            found: data.len() + 2,
        });
    }

    let trailing = tokens.count();
    if trailing > 0 {
        log::warn!("ignoring {trailing} trailing tokens after the kernel weights");
    }

    Ok(Kernel2d::new(width, height, data)?)
}

/// Read a kernel from a text file.
///
/// See [`parse_kernel_txt`] for the format.
///
/// # Arguments
///
/// * `file_path` - The path to the kernel file.
pub fn read_kernel_txt(file_path: impl AsRef<Path>) -> Result<Kernel2d, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let text = std::fs::read_to_string(file_path)?;
    parse_kernel_txt(&text)
}
