//! Binary search over the quality axis at a fixed pixel size.

use tracing::debug;

use super::{measure, Probe, SearchConfig, SearchError, Stop};
use crate::decode::DecodedImage;
use crate::encode::Encoder;
use crate::format::OutputFormat;
use crate::resize::PixelSize;

/// Result of one quality search.
#[derive(Debug, Clone, PartialEq)]
pub struct QualitySearchOutcome {
    /// The last encode measured. Its quality is the search's answer.
    pub probe: Probe,
    /// The last encode landed within tolerance of the target.
    pub converged: bool,
    /// Number of encodes performed.
    pub iterations: u32,
    /// The stop token fired before the search finished.
    pub cancelled: bool,
}

/// Search the quality range `[config.min_quality, config.max_quality]` for an
/// encode whose size is within `config.tolerance` of `target_kb`.
///
/// Relies on encoded size not decreasing as quality rises. Each iteration
/// halves the remaining interval; the search stops on the first encode within
/// tolerance, after `config.max_iterations` encodes, or when `stop` fires
/// between encodes. At least one encode is always made, and the last one is
/// returned whether or not it converged.
///
/// # Errors
///
/// Returns `SearchError::Encode` if any encode fails.
pub fn quality_search<E: Encoder + ?Sized>(
    encoder: &E,
    image: &DecodedImage,
    size: PixelSize,
    format: OutputFormat,
    target_kb: f64,
    config: &SearchConfig,
    stop: &dyn Stop,
) -> Result<QualitySearchOutcome, SearchError> {
    let mut min_q = config.min_quality;
    let mut max_q = config.max_quality;
    let mut iterations = 0;

    let (probe, converged, cancelled) = loop {
        let quality = (min_q + max_q) / 2.0;
        let probe = measure(encoder, image, size, format, quality, config.estimation)?;
        iterations += 1;

        debug!(
            iteration = iterations,
            quality,
            estimated_kb = probe.estimated_kb,
            target_kb,
            "quality search step"
        );

        if config.tolerance.accepts(probe.estimated_kb, target_kb) {
            break (probe, true, false);
        }
        if probe.estimated_kb > target_kb {
            max_q = quality;
        } else {
            min_q = quality;
        }

        if iterations >= config.max_iterations {
            break (probe, false, false);
        }
        if stop.should_stop() {
            break (probe, false, true);
        }
    };

    Ok(QualitySearchOutcome {
        probe,
        converged,
        iterations,
        cancelled,
    })
}
