use thiserror::Error;

use wrapconv_image::ImageError;

use crate::parallel::ParallelError;

/// Errors that can occur during filtering operations.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the parallel executor.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The kernel weights do not match the kernel size.
    #[error("kernel of size {width}x{height} expects {expected} weights, got {actual}")]
    InvalidKernelShape {
        /// Kernel width.
        width: usize,
        /// Kernel height.
        height: usize,
        /// Number of weights expected, `usize::MAX` if the size overflows.
        expected: usize,
        /// Number of weights provided.
        actual: usize,
    },

    /// A kernel row has a different length than the first row.
    #[error("kernel row {row} has {actual} weights, expected {expected}")]
    JaggedKernel {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },

    /// Source and destination images differ in size.
    #[error("source size {src} does not match destination size {dst}")]
    SizeMismatch {
        /// Size of the source image.
        src: wrapconv_image::ImageSize,
        /// Size of the destination image.
        dst: wrapconv_image::ImageSize,
    },
}
