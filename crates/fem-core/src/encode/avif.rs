//! AVIF encoding (lossy, alpha-capable).

use image::codecs::avif::AvifEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_buffer, EncodeError};
use crate::decode::RGBA_CHANNELS;
use crate::format::OutputFormat;

/// Encoder speed (1 slowest/best .. 10 fastest). The size search encodes the
/// same image many times, so favour speed.
const AVIF_SPEED: u8 = 8;

/// Encode RGBA pixel data to AVIF bytes.
///
/// `quality` is 1-100. Alpha is preserved.
pub fn encode_avif(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(pixels, width, height, RGBA_CHANNELS)?;

    let mut buffer = Vec::new();
    AvifEncoder::new_with_speed_quality(&mut buffer, AVIF_SPEED, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Avif,
            message: e.to_string(),
        })?;

    Ok(buffer)
}
