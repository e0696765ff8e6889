//! Source image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use tracing::debug;

use super::{DecodeError, DecodedImage, Orientation};

/// Decode an uploaded image file into RGBA pixels.
///
/// The container format is sniffed from the bytes rather than trusted from a
/// file extension. EXIF orientation is applied so the pixels are upright.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a recognised image.
/// Returns `DecodeError::CorruptedFile` if the image is truncated or damaged.
/// Returns `DecodeError::EmptyImage` if the decoder yields a zero dimension.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let Some(format) = reader.format() else {
        return Err(DecodeError::InvalidFormat);
    };

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let orientation = extract_orientation(bytes);
    let img = apply_orientation(img, orientation);

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    debug!(?format, ?orientation, width, height, "decoded source image");
    Ok(DecodedImage::from_rgba_image(rgba))
}

/// EXIF orientation of an image file, `Normal` when absent or unreadable.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
