//! Image encoding for fem.
//!
//! This module provides:
//! - The [`Encoder`] capability used by the size search ("encode at quality Q")
//! - [`ImageEncoder`], the default implementation backed by the `image` crate
//! - Per-format encoders for JPEG, AVIF and PNG
//!
//! # Architecture
//!
//! An encode is a pure function of (image, pixel size, format, quality). The
//! source image is resampled to the requested size, composited onto white when
//! the format has no alpha channel, and handed to the codec. Nothing is cached
//! between calls, so the search can call the encoder as often as it needs and
//! concurrent conversions never share state.
//!
//! # Examples
//!
//! ```ignore
//! use fem_core::encode::{Encoder, ImageEncoder};
//! use fem_core::{OutputFormat, PixelSize};
//!
//! let artifact = ImageEncoder::default()
//!     .encode(&image, PixelSize::new(640, 480), OutputFormat::Jpeg, 0.8)
//!     .unwrap();
//! println!("Encoded {} bytes", artifact.len());
//! ```

mod avif;
mod jpeg;
mod png;

use std::borrow::Cow;

use thiserror::Error;
use tracing::trace;

use crate::decode::{DecodedImage, FilterType, RGBA_CHANNELS};
use crate::format::{quality_to_percent, OutputFormat};
use crate::resize::{resample, PixelSize};

pub use avif::encode_avif;
pub use jpeg::encode_jpeg;
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The requested output format is not one the encoder knows
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The codec itself failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

/// An encoded image file.
///
/// Produced by an [`Encoder`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    format: OutputFormat,
    bytes: Vec<u8>,
}

impl EncodedArtifact {
    pub fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The encoded file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Exact encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Renders a decoded image at a pixel size and quality into an encoded file.
///
/// Implementations must be deterministic for fixed inputs, and encoded size
/// must not decrease as quality increases for a fixed image and size; the
/// quality search relies on that ordering to converge.
pub trait Encoder: Send + Sync {
    /// Encode `image` resampled to `size`.
    ///
    /// `quality` lies in `(0, 1]`. Formats without a quality knob accept and
    /// ignore it.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidDimensions` if `size` has a zero dimension,
    /// or another `EncodeError` if the codec fails.
    fn encode(
        &self,
        image: &DecodedImage,
        size: PixelSize,
        format: OutputFormat,
        quality: f32,
    ) -> Result<EncodedArtifact, EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn encode(
        &self,
        image: &DecodedImage,
        size: PixelSize,
        format: OutputFormat,
        quality: f32,
    ) -> Result<EncodedArtifact, EncodeError> {
        (**self).encode(image, size, format, quality)
    }
}

/// The default encoder, backed by the `image` crate's codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageEncoder {
    filter: FilterType,
}

impl ImageEncoder {
    /// An encoder that resamples with `filter`.
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Encoder for ImageEncoder {
    fn encode(
        &self,
        image: &DecodedImage,
        size: PixelSize,
        format: OutputFormat,
        quality: f32,
    ) -> Result<EncodedArtifact, EncodeError> {
        let resampled = resample(image, size, self.filter)?;
        let percent = quality_to_percent(quality);

        // Formats without alpha receive RGB flattened onto white.
        let pixels: Cow<'_, [u8]> = if format.supports_alpha() {
            Cow::Borrowed(resampled.pixels.as_slice())
        } else {
            Cow::Owned(composite_onto_white(&resampled.pixels))
        };

        let bytes = match format {
            OutputFormat::Jpeg => encode_jpeg(&pixels, size.width, size.height, percent)?,
            OutputFormat::Avif => encode_avif(&pixels, size.width, size.height, percent)?,
            OutputFormat::Png => encode_png(&pixels, size.width, size.height)?,
        };

        trace!(%format, %size, percent, bytes = bytes.len(), "encoded");
        Ok(EncodedArtifact::new(format, bytes))
    }
}

/// Flatten RGBA pixels onto an opaque white background, producing RGB.
///
/// Fully transparent pixels become white rather than black, which is what a
/// viewer would have shown behind them.
pub fn composite_onto_white(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / RGBA_CHANNELS * 3);
    for px in rgba.chunks_exact(RGBA_CHANNELS) {
        let alpha = u32::from(px[3]);
        let background = 255 * (255 - alpha);
        for &channel in &px[..3] {
            let blended = (u32::from(channel) * alpha + background + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

pub(crate) fn validate_buffer(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: usize,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(EncodeError::InvalidDimensions { width, height })?;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
