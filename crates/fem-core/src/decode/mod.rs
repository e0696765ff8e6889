//! Image decoding front door for fem.
//!
//! Turns the bytes of an uploaded file into a [`DecodedImage`]: RGBA pixels,
//! upright according to EXIF orientation. Everything downstream (resampling,
//! encoding, the size search) reads this type and never mutates it.
//!
//! # Examples
//!
//! ```ignore
//! use fem_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod source;
mod types;

pub use source::decode_image;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, RGBA_CHANNELS};
