//! JPEG encoding.
//!
//! JPEG has no alpha channel; callers hand it RGB that has already been
//! flattened with [`composite_onto_white`](super::composite_onto_white).

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_buffer, EncodeError};
use crate::format::OutputFormat;

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(pixels, width, height, 3)?;

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in 1u8..=100,
        ) {
            let pixels = vec![100u8; (width * height * 3) as usize];
            let a = encode_jpeg(&pixels, width, height, quality).unwrap();
            let b = encode_jpeg(&pixels, width, height, quality).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Property: Mismatched pixel data length always returns error.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in (1u32..=30, 1u32..=30),
            delta in 1usize..=10,
            longer in any::<bool>(),
        ) {
            let expected = (width * height * 3) as usize;
            let len = if longer { expected + delta } else { expected.saturating_sub(delta) };
            prop_assume!(len != expected);

            let result = encode_jpeg(&vec![128u8; len], width, height, 80);
            prop_assert!(
                matches!(result, Err(EncodeError::InvalidPixelData { .. })),
                "expected InvalidPixelData, got {:?}",
                result
            );
        }
    }
}
