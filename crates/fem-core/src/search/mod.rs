//! Size-targeted encoding.
//!
//! Given a decoded image, an output format and an optional target size in
//! kilobytes, find the (pixel size, quality) encode whose size is closest to
//! the target. The only levers are the encoder's quality scalar and, as a last
//! resort, shrinking the image.
//!
//! # Architecture
//!
//! - [`quality_search`] binary-searches quality at a fixed pixel size.
//! - [`SizeTargetController`] decides whether a search is needed at all, probes
//!   the reachable size range, steps dimensions down when even the lowest
//!   quality is too big, and runs the quality search at the chosen size.
//!
//! The search is synchronous. Every decision depends on the previous measured
//! size, so the only parallel work is the pair of native-size range probes.
//!
//! # Examples
//!
//! ```ignore
//! use fem_core::search::{SizeTargetController, TargetRequest};
//! use fem_core::{ImageEncoder, OutputFormat};
//!
//! let controller = SizeTargetController::with_defaults(ImageEncoder::default());
//! let result = controller.achieve_target(&image, TargetRequest::targeted(OutputFormat::Jpeg, 50.0))?;
//! println!("{} at q={:.2}: {:.1}KB", result.pixel_size, result.quality, result.estimated_kb);
//! ```

mod config;
mod controller;
mod quality;
mod stop;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{SearchConfig, Tolerance};
pub use controller::{probe_size_limits, SizeTargetController};
pub use quality::{quality_search, QualitySearchOutcome};
#[cfg(not(target_arch = "wasm32"))]
pub use stop::Deadline;
pub use stop::{Never, Stop, StopFn};
pub use types::{
    Probe, SearchError, SearchPhase, SearchResult, SearchWarning, SizeLimits, TargetRequest,
    LOSSLESS_LIMITS_NOTICE,
};

use crate::decode::DecodedImage;
use crate::encode::Encoder;
use crate::estimate::Estimation;
use crate::format::OutputFormat;
use crate::resize::PixelSize;

/// Encode once and measure the result.
pub(crate) fn measure<E: Encoder + ?Sized>(
    encoder: &E,
    image: &DecodedImage,
    size: PixelSize,
    format: OutputFormat,
    quality: f32,
    estimation: Estimation,
) -> Result<Probe, SearchError> {
    let artifact = encoder.encode(image, size, format, quality)?;
    let estimated_kb = estimation.measure(&artifact);
    Ok(Probe {
        pixel_size: size,
        quality,
        artifact,
        estimated_kb,
    })
}
