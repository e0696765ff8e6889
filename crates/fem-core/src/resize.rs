//! Pixel sizes, dimension step-down, and resampling.
//!
//! Resampling uses the `image` crate's filters. All functions leave the input
//! untouched; a same-size request borrows the source instead of copying it.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::decode::{DecodedImage, FilterType};
use crate::encode::EncodeError;

/// Output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The native size of a decoded image.
    pub fn of(image: &DecodedImage) -> Self {
        Self::new(image.width, image.height)
    }

    /// Both dimensions are at least one pixel.
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Shrink both dimensions by `factor`, rounding to the nearest integer with a
/// floor of 1x1.
///
/// A dimension above one pixel always loses at least one pixel, so repeated
/// calls reach 1x1 instead of stalling where rounding would restore the input.
///
/// `factor` must lie in `(0, 1)`; anything else leaves the size unchanged so
/// the result is never larger than the input.
pub fn shrink(size: PixelSize, factor: f64) -> PixelSize {
    if !(factor > 0.0 && factor < 1.0) {
        return size;
    }
    PixelSize {
        width: scale_dimension(size.width, factor),
        height: scale_dimension(size.height, factor),
    }
}

fn scale_dimension(value: u32, factor: f64) -> u32 {
    if value <= 1 {
        return 1;
    }
    let scaled = (f64::from(value) * factor).round() as u32;
    scaled.clamp(1, value - 1)
}

/// Resample an image to exact dimensions.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` if `size` has a zero dimension and
/// `EncodeError::InvalidPixelData` if the source buffer does not match its
/// declared dimensions.
pub fn resample(
    image: &DecodedImage,
    size: PixelSize,
    filter: FilterType,
) -> Result<Cow<'_, DecodedImage>, EncodeError> {
    if !size.is_valid() {
        return Err(EncodeError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }

    let view = image.as_rgba_view().ok_or(EncodeError::InvalidPixelData {
        expected: DecodedImage::expected_len(image.width, image.height),
        actual: image.pixels.len(),
    })?;

    if PixelSize::of(image) == size {
        return Ok(Cow::Borrowed(image));
    }

    let resized = image::imageops::resize(&view, size.width, size.height, filter.to_image_filter());
    Ok(Cow::Owned(DecodedImage::from_rgba_image(resized)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: shrinking never grows a dimension and never reaches zero.
        #[test]
        fn prop_shrink_is_monotone_and_positive(
            width in 1u32..=20_000,
            height in 1u32..=20_000,
            factor in 0.01f64..0.99,
        ) {
            let next = shrink(PixelSize::new(width, height), factor);
            prop_assert!(next.width >= 1 && next.height >= 1);
            prop_assert!(next.width <= width && next.height <= height);
        }

        /// Property: repeated shrinking converges to 1x1 and stays there.
        #[test]
        fn prop_repeated_shrink_reaches_floor(width in 1u32..=4096, height in 1u32..=4096) {
            let mut size = PixelSize::new(width, height);
            for _ in 0..200 {
                size = shrink(size, 0.8);
            }
            prop_assert_eq!(size, PixelSize::new(1, 1));
        }
    }
}
