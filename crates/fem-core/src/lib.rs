//! fem Core - size-targeted image conversion
//!
//! This crate converts a decoded image to JPEG, AVIF or PNG and, when asked,
//! searches the encoder's quality scalar (and, if necessary, the image
//! dimensions) for an output close to a requested file size.
//!
//! # Module Structure
//!
//! - `decode` - Uploaded file bytes to RGBA pixels
//! - `format` - Output formats and the quality scale
//! - `resize` - Pixel sizes, dimension step-down, resampling
//! - `encode` - The `Encoder` capability and the image-crate codecs
//! - `estimate` - Encoded size in kilobytes, exact or from a data URL
//! - `search` - Quality binary search and the size-targeting controller
//! - `naming` - File names and byte counts for the save/UI layer

pub mod decode;
pub mod encode;
pub mod estimate;
pub mod format;
pub mod naming;
pub mod resize;
pub mod search;

pub use decode::{decode_image, DecodedImage};
pub use encode::{EncodedArtifact, Encoder, ImageEncoder};
pub use format::{OutputFormat, DEFAULT_QUALITY};
pub use resize::PixelSize;
pub use search::{SearchConfig, SearchResult, SizeTargetController, TargetRequest};

/// Convert `image` with the default encoder and configuration.
///
/// Shorthand for [`SizeTargetController::from_config`] with the defaults.
pub fn convert(
    image: &DecodedImage,
    request: TargetRequest,
) -> Result<SearchResult, search::SearchError> {
    SizeTargetController::from_config(SearchConfig::default())?.achieve_target(image, request)
}
