//! Filter operations
//!
//! This module provides 2D convolution with wrap-around borders for RGBA images.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel2d;

/// Error types for the filter module.
mod error;
pub use error::FilterError;

/// Convolution with wrap-around borders
mod convolution;
pub use convolution::*;
