#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use wrapconv_image as image;

#[doc(inline)]
pub use wrapconv_imgproc as imgproc;

#[doc(inline)]
pub use wrapconv_io as io;

/// Command line driver: load, convolve, save.
pub mod app;
