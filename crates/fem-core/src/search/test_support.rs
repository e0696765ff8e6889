//! Deterministic encoder double for search tests.

use std::sync::Mutex;

use crate::decode::DecodedImage;
use crate::encode::{EncodeError, EncodedArtifact, Encoder};
use crate::format::OutputFormat;
use crate::resize::PixelSize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EncodeCall {
    pub size: PixelSize,
    pub format: OutputFormat,
    pub quality: f32,
}

/// Output size is linear in quality and proportional to pixel count, so the
/// monotonicity the search relies on holds exactly.
#[derive(Debug)]
pub(crate) struct LinearEncoder {
    native: PixelSize,
    /// KB per unit of quality at native size.
    slope_kb: f64,
    /// KB at quality 0 at native size (may be negative; never encoded).
    offset_kb: f64,
    fail_after: Option<usize>,
    calls: Mutex<Vec<EncodeCall>>,
}

impl LinearEncoder {
    /// An encoder yielding `min_kb` at quality 0.05 and `max_kb` at 1.0 for
    /// `native`-sized output.
    pub fn spanning(native: PixelSize, min_kb: f64, max_kb: f64) -> Self {
        let slope_kb = (max_kb - min_kb) / 0.95;
        Self {
            native,
            slope_kb,
            offset_kb: min_kb - 0.05 * slope_kb,
            fail_after: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Succeed `n` times, then fail every call.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn kb_at(&self, size: PixelSize, quality: f32) -> f64 {
        let area = size.pixel_count() as f64 / self.native.pixel_count() as f64;
        (area * (self.offset_kb + self.slope_kb * f64::from(quality))).max(0.0)
    }
}

impl Encoder for LinearEncoder {
    fn encode(
        &self,
        _image: &DecodedImage,
        size: PixelSize,
        format: OutputFormat,
        quality: f32,
    ) -> Result<EncodedArtifact, EncodeError> {
        if !size.is_valid() {
            return Err(EncodeError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }

        let mut calls = self.calls.lock().unwrap();
        let previous = calls.len();
        calls.push(EncodeCall {
            size,
            format,
            quality,
        });
        drop(calls);

        if self.fail_after.is_some_and(|n| previous >= n) {
            return Err(EncodeError::EncodingFailed {
                format,
                message: "injected failure".to_string(),
            });
        }

        let bytes = (self.kb_at(size, quality) * 1024.0).round() as usize;
        Ok(EncodedArtifact::new(format, vec![0u8; bytes]))
    }
}

/// A uniform opaque image of the given size.
pub(crate) fn flat_image(size: PixelSize) -> DecodedImage {
    DecodedImage::new(
        size.width,
        size.height,
        vec![128u8; DecodedImage::expected_len(size.width, size.height)],
    )
}

/// Route search logs to the test harness. Set `RUST_LOG=fem_core=debug` to see them.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
