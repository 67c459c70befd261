#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, encoding/decoding failures,
/// and kernel parsing errors.
pub mod error;

/// High-level image reading functions.
///
/// See [`functional::read_image_rgba8`] for automatic format detection.
pub mod functional;

/// Text kernel files.
///
/// Parse kernels written as `width height` followed by the weights in row-major order.
pub mod kernel;

/// PNG image encoding and decoding.
///
/// Read PNG images of any colour type as RGBA8 and write RGBA8 images.
pub mod png;

pub use crate::error::IoError;
