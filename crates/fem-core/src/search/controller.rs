//! Size-targeting controller: picks the pixel size and quality for a request.
//!
//! The search is a small state machine:
//!
//! ```text
//! BoundsCheck ─┬─> DirectEncode ───────────────────────────────> Done
//!              └─> RangeProbe ─┬─> ClampToMaximum ─────────────> Done
//!                              ├─> QualityBinarySearch ────────> Done
//!                              └─> DimensionStepDown ─> QualityBinarySearch ─> Done
//! ```
//!
//! Quality is always lowered before dimensions. Shrinking only starts once an
//! encode at the minimum quality has shown that quality alone cannot reach
//! the target, and it stops at the first size whose minimum-quality encode fits.

use tracing::{debug, info, warn};

use super::quality::quality_search;
use super::{
    measure, Never, Probe, SearchConfig, SearchError, SearchPhase, SearchResult, SearchWarning,
    SizeLimits, Stop, TargetRequest,
};
use crate::decode::DecodedImage;
use crate::encode::{Encoder, ImageEncoder};
use crate::format::OutputFormat;
use crate::resize::{shrink, PixelSize};

/// Drives an [`Encoder`] to hit a requested output size.
///
/// Holds no per-request state, so one controller can serve any number of
/// requests, including concurrently from several threads.
#[derive(Debug, Clone)]
pub struct SizeTargetController<E> {
    encoder: E,
    config: SearchConfig,
}

enum State {
    BoundsCheck,
    DirectEncode,
    RangeProbe { target_kb: f64 },
    ClampToMaximum { target_kb: f64, max: Probe },
    DimensionStepDown { target_kb: f64, floor: Probe },
    QualityBinarySearch { target_kb: f64, size: PixelSize, fallback: Probe },
    Done(Probe),
}

impl State {
    fn phase(&self) -> SearchPhase {
        match self {
            State::BoundsCheck => SearchPhase::BoundsCheck,
            State::DirectEncode => SearchPhase::DirectEncode,
            State::RangeProbe { .. } => SearchPhase::RangeProbe,
            State::ClampToMaximum { .. } => SearchPhase::ClampToMaximum,
            State::DimensionStepDown { .. } => SearchPhase::DimensionStepDown,
            State::QualityBinarySearch { .. } => SearchPhase::QualityBinarySearch,
            State::Done(_) => SearchPhase::Done,
        }
    }
}

/// Bookkeeping for one `achieve_target` call.
struct Run<'a> {
    image: &'a DecodedImage,
    request: TargetRequest,
    stop: &'a dyn Stop,
    warnings: Vec<SearchWarning>,
    phases: Vec<SearchPhase>,
    encodes: u32,
}

impl<E: Encoder> SizeTargetController<E> {
    /// Create a controller, validating the configuration.
    pub fn new(encoder: E, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self { encoder, config })
    }

    /// Create a controller with [`SearchConfig::default`].
    pub fn with_defaults(encoder: E) -> Self {
        Self {
            encoder,
            config: SearchConfig::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Produce the encode that best matches `request`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidInput` for an empty image or a
    /// non-positive target, before any encode. Returns `SearchError::Encode`
    /// if any encode fails.
    pub fn achieve_target(
        &self,
        image: &DecodedImage,
        request: TargetRequest,
    ) -> Result<SearchResult, SearchError> {
        self.achieve_target_with_stop(image, request, &Never)
    }

    /// Like [`achieve_target`](Self::achieve_target), polling `stop` between
    /// encodes. When it fires, the best complete result so far is returned
    /// with [`SearchWarning::Cancelled`].
    pub fn achieve_target_with_stop(
        &self,
        image: &DecodedImage,
        request: TargetRequest,
        stop: &dyn Stop,
    ) -> Result<SearchResult, SearchError> {
        validate_image(image)?;
        request.validate()?;

        let mut run = Run {
            image,
            request,
            stop,
            warnings: Vec::new(),
            phases: Vec::new(),
            encodes: 0,
        };

        let mut state = State::BoundsCheck;
        let probe = loop {
            run.phases.push(state.phase());
            debug!(phase = ?state.phase(), "size search transition");
            state = match state {
                State::BoundsCheck => self.bounds_check(&mut run),
                State::DirectEncode => self.direct_encode(&mut run)?,
                State::RangeProbe { target_kb } => self.range_probe(&mut run, target_kb)?,
                State::ClampToMaximum { target_kb, max } => {
                    run.warn(SearchWarning::AboveMaximum {
                        target_kb,
                        max_kb: max.estimated_kb,
                    });
                    State::Done(max)
                }
                State::DimensionStepDown { target_kb, floor } => {
                    self.step_down(&mut run, target_kb, floor)?
                }
                State::QualityBinarySearch {
                    target_kb,
                    size,
                    fallback,
                } => self.binary_search(&mut run, target_kb, size, fallback)?,
                State::Done(probe) => break probe,
            };
        };

        info!(
            format = %request.format,
            size = %probe.pixel_size,
            quality = probe.quality,
            estimated_kb = probe.estimated_kb,
            target_kb = ?request.target_kb,
            encodes = run.encodes,
            "size search done"
        );

        Ok(SearchResult {
            pixel_size: probe.pixel_size,
            quality: probe.quality,
            artifact: probe.artifact,
            estimated_kb: probe.estimated_kb,
            warnings: run.warnings,
            phases: run.phases,
            encodes: run.encodes,
        })
    }

    /// The range of sizes reachable at native dimensions by quality alone.
    ///
    /// Returns `None` for formats whose size cannot be steered by quality.
    pub fn size_limits(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
    ) -> Result<Option<SizeLimits>, SearchError> {
        probe_size_limits(&self.encoder, image, format, &self.config)
    }

    fn bounds_check(&self, run: &mut Run<'_>) -> State {
        let format = run.request.format;
        match run.request.target_kb {
            Some(_) if !format.supports_quality() => {
                run.warn(SearchWarning::TargetIgnored { format });
                State::DirectEncode
            }
            Some(target_kb) => State::RangeProbe { target_kb },
            None => State::DirectEncode,
        }
    }

    fn direct_encode(&self, run: &mut Run<'_>) -> Result<State, SearchError> {
        let native = PixelSize::of(run.image);
        let probe = self.measure(run, native, self.config.default_quality)?;
        Ok(State::Done(probe))
    }

    fn range_probe(&self, run: &mut Run<'_>, target_kb: f64) -> Result<State, SearchError> {
        let (max, min) = self.probe_extremes(run.image, run.request.format)?;
        run.encodes += 2;
        debug!(
            min_kb = min.estimated_kb,
            max_kb = max.estimated_kb,
            target_kb,
            "native size range"
        );

        if target_kb > max.estimated_kb {
            return Ok(State::ClampToMaximum { target_kb, max });
        }
        if run.stop.should_stop() {
            run.warn(SearchWarning::Cancelled);
            return Ok(State::Done(closest(target_kb, min, max)));
        }
        if target_kb < min.estimated_kb {
            return Ok(State::DimensionStepDown {
                target_kb,
                floor: min,
            });
        }
        Ok(State::QualityBinarySearch {
            target_kb,
            size: max.pixel_size,
            fallback: min,
        })
    }

    fn step_down(
        &self,
        run: &mut Run<'_>,
        target_kb: f64,
        mut floor: Probe,
    ) -> Result<State, SearchError> {
        let mut attempts = 0;
        while attempts < self.config.max_step_downs {
            if run.stop.should_stop() {
                run.warn(SearchWarning::Cancelled);
                return Ok(State::Done(floor));
            }

            let size = shrink(floor.pixel_size, self.config.shrink_factor);
            if size == floor.pixel_size {
                break;
            }
            attempts += 1;
            floor = self.measure(run, size, self.config.min_quality)?;
            debug!(
                attempt = attempts,
                size = %size,
                min_kb = floor.estimated_kb,
                target_kb,
                "dimension step-down"
            );

            if floor.estimated_kb <= target_kb {
                return Ok(State::QualityBinarySearch {
                    target_kb,
                    size,
                    fallback: floor,
                });
            }
        }

        run.warn(SearchWarning::StepDownExhausted {
            attempts,
            min_kb: floor.estimated_kb,
        });
        Ok(State::QualityBinarySearch {
            target_kb,
            size: floor.pixel_size,
            fallback: floor,
        })
    }

    fn binary_search(
        &self,
        run: &mut Run<'_>,
        target_kb: f64,
        size: PixelSize,
        fallback: Probe,
    ) -> Result<State, SearchError> {
        if run.stop.should_stop() {
            run.warn(SearchWarning::Cancelled);
            return Ok(State::Done(fallback));
        }

        let outcome = quality_search(
            &self.encoder,
            run.image,
            size,
            run.request.format,
            target_kb,
            &self.config,
            run.stop,
        )?;
        run.encodes += outcome.iterations;

        if outcome.cancelled {
            run.warn(SearchWarning::Cancelled);
        } else if !outcome.converged {
            run.warn(SearchWarning::NotConverged {
                target_kb,
                estimated_kb: outcome.probe.estimated_kb,
            });
        }
        Ok(State::Done(outcome.probe))
    }

    fn measure(&self, run: &mut Run<'_>, size: PixelSize, quality: f32) -> Result<Probe, SearchError> {
        run.encodes += 1;
        measure(
            &self.encoder,
            run.image,
            size,
            run.request.format,
            quality,
            self.config.estimation,
        )
    }

    /// Encode at native size with Qmax and Qmin. The two encodes are
    /// independent, so they run on two threads when allowed.
    fn probe_extremes(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
    ) -> Result<(Probe, Probe), SearchError> {
        probe_extremes(&self.encoder, image, format, &self.config)
    }
}

impl SizeTargetController<ImageEncoder> {
    /// A controller over the built-in codecs, resampling with
    /// `config.filter`.
    pub fn from_config(config: SearchConfig) -> Result<Self, SearchError> {
        Self::new(ImageEncoder::new(config.filter), config)
    }
}

impl Run<'_> {
    fn warn(&mut self, warning: SearchWarning) {
        warn!(%warning, "size search");
        self.warnings.push(warning);
    }
}

/// Encode at native size with the configured minimum and maximum quality and
/// report the resulting size range.
///
/// Returns `None` for formats whose size cannot be steered by quality.
///
/// # Errors
///
/// Returns `SearchError::InvalidInput` for an empty image and
/// `SearchError::Encode` if either encode fails.
pub fn probe_size_limits<E: Encoder + ?Sized>(
    encoder: &E,
    image: &DecodedImage,
    format: OutputFormat,
    config: &SearchConfig,
) -> Result<Option<SizeLimits>, SearchError> {
    validate_image(image)?;
    if !format.supports_quality() {
        return Ok(None);
    }
    let (max, min) = probe_extremes(encoder, image, format, config)?;
    Ok(Some(SizeLimits {
        min_kb: min.estimated_kb,
        max_kb: max.estimated_kb,
    }))
}

fn probe_extremes<E: Encoder + ?Sized>(
    encoder: &E,
    image: &DecodedImage,
    format: OutputFormat,
    config: &SearchConfig,
) -> Result<(Probe, Probe), SearchError> {
    let native = PixelSize::of(image);
    let at = |quality: f32| measure(encoder, image, native, format, quality, config.estimation);

    if config.parallel_probes && cfg!(not(target_arch = "wasm32")) {
        return std::thread::scope(|scope| {
            let low = scope.spawn(|| at(config.min_quality));
            let max = at(config.max_quality);
            let min = low
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            Ok((max?, min?))
        });
    }

    Ok((at(config.max_quality)?, at(config.min_quality)?))
}

fn closest(target_kb: f64, a: Probe, b: Probe) -> Probe {
    if (a.estimated_kb - target_kb).abs() <= (b.estimated_kb - target_kb).abs() {
        a
    } else {
        b
    }
}

fn validate_image(image: &DecodedImage) -> Result<(), SearchError> {
    if image.width == 0 || image.height == 0 {
        return Err(SearchError::InvalidInput(format!(
            "image dimensions must be positive, got {}x{}",
            image.width, image.height
        )));
    }
    let Some(expected) = DecodedImage::checked_len(image.width, image.height) else {
        return Err(SearchError::InvalidInput(format!(
            "image of {}x{} pixels is too large to address",
            image.width, image.height
        )));
    };
    if image.pixels.len() != expected {
        return Err(SearchError::InvalidInput(format!(
            "pixel buffer holds {} bytes, expected {expected} for {}x{} RGBA",
            image.pixels.len(),
            image.width,
            image.height
        )));
    }
    Ok(())
}
