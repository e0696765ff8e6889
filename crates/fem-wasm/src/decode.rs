//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@fem/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{to_js_error, JsDecodedImage};
use fem_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an uploaded file (JPEG, PNG or AVIF) to RGBA pixels.
///
/// EXIF orientation is applied, so the result is upright.
///
/// # Errors
///
/// Returns an error if the format is not recognised or the data is corrupt.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([10, 20, 30, 128]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_preserves_alpha() {
        let image = decode_image(&png_bytes(6, 3)).unwrap();
        assert_eq!(image.width(), 6);
        assert_eq!(image.height(), 3);
        assert_eq!(&image.pixels()[..4], &[10, 20, 30, 128]);
    }
}
