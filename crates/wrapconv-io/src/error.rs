/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] wrapconv_image::ImageError),

    /// Error to decode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to encode the PNG image.
    #[error("Failed to encode the png image. {0}")]
    PngEncodingError(String),

    /// Error to decode the PNG image.
    #[error("Failed to decode the png image. {0}")]
    PngDecodeError(String),

    /// A token of the kernel file is not a valid number.
    #[error("Invalid kernel token {token:?} at position {position}")]
    KernelParseError {
        /// Zero-based index of the token in the file.
        position: usize,
        /// The offending token.
        token: String,
    },

    /// The kernel file ends before all the weights were read.
    #[error("Kernel file is truncated: expected {expected} values, found {found}")]
    KernelTruncated {
        /// Number of values expected, dimensions included.
        expected: usize,
        /// Number of values found.
        found: usize,
    },

    /// Error to build the kernel.
    #[error("Failed to create kernel. {0}")]
    KernelError(#[from] wrapconv_imgproc::filter::FilterError),
}
