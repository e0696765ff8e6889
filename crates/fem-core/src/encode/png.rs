//! PNG encoding (lossless; output size is fixed by content).

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_buffer, EncodeError};
use crate::decode::RGBA_CHANNELS;
use crate::format::OutputFormat;

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(pixels, width, height, RGBA_CHANNELS)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Png,
            message: e.to_string(),
        })?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&vec![0u8; 4 * 4 * 4], 4, 4).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_png_round_trips_alpha() {
        let mut pixels = vec![255u8; 2 * 2 * 4];
        pixels[3] = 0;
        let png = encode_png(&pixels, 2, 2).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
        assert_eq!(decoded.get_pixel(1, 1).0[3], 255);
    }

    #[test]
    fn test_encode_png_invalid_length() {
        assert!(matches!(
            encode_png(&[0u8; 5], 1, 1),
            Err(EncodeError::InvalidPixelData { expected: 4, actual: 5 })
        ));
    }
}
