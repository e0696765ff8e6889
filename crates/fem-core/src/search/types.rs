//! Request, result and error types for the size search.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::{EncodeError, EncodedArtifact};
use crate::format::OutputFormat;
use crate::resize::PixelSize;

/// Errors that abort a conversion.
///
/// Missing the target size is not an error; see [`SearchWarning`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// The image or request was rejected before any encode was attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The search configuration is inconsistent.
    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),

    /// An encode failed; the search stops at the failing step.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// What the caller wants produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRequest {
    pub format: OutputFormat,
    /// Desired output size in kilobytes. `None` means "encode at the default
    /// quality and native size".
    pub target_kb: Option<f64>,
}

impl TargetRequest {
    pub fn new(format: OutputFormat, target_kb: Option<f64>) -> Self {
        Self { format, target_kb }
    }

    /// A request with no size target.
    pub fn untargeted(format: OutputFormat) -> Self {
        Self::new(format, None)
    }

    /// A request aiming at `target_kb` kilobytes.
    pub fn targeted(format: OutputFormat, target_kb: f64) -> Self {
        Self::new(format, Some(target_kb))
    }

    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        match self.target_kb {
            Some(kb) if !(kb.is_finite() && kb > 0.0) => Err(SearchError::InvalidInput(format!(
                "target size must be a positive number of kilobytes, got {kb}"
            ))),
            _ => Ok(()),
        }
    }
}

/// States of the size search, in the order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    BoundsCheck,
    DirectEncode,
    RangeProbe,
    ClampToMaximum,
    DimensionStepDown,
    QualityBinarySearch,
    Done,
}

/// A non-fatal condition: a result was produced, but not exactly what was
/// asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchWarning {
    /// The target is larger than the native-size, maximum-quality encode.
    /// The maximum-quality result was substituted.
    AboveMaximum { target_kb: f64, max_kb: f64 },

    /// Shrinking stopped (attempt cap or 1x1 floor) while the lowest quality
    /// encode was still larger than the target.
    StepDownExhausted { attempts: u32, min_kb: f64 },

    /// The quality search ran out of iterations outside the tolerance.
    NotConverged { target_kb: f64, estimated_kb: f64 },

    /// The format has no quality knob, so the target size was ignored.
    TargetIgnored { format: OutputFormat },

    /// The caller asked the search to stop; the best result so far is returned.
    Cancelled,
}

impl std::fmt::Display for SearchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchWarning::AboveMaximum { target_kb, max_kb } => write!(
                f,
                "target {target_kb:.1}KB exceeds the maximum achievable {max_kb:.1}KB; using maximum quality"
            ),
            SearchWarning::StepDownExhausted { attempts, min_kb } => write!(
                f,
                "target may be unreachable: after {attempts} size reductions the smallest encode is {min_kb:.1}KB"
            ),
            SearchWarning::NotConverged {
                target_kb,
                estimated_kb,
            } => write!(
                f,
                "closest size found is {estimated_kb:.1}KB for a {target_kb:.1}KB target"
            ),
            SearchWarning::TargetIgnored { format } => {
                write!(f, "{format} is lossless; size targeting is limited")
            }
            SearchWarning::Cancelled => write!(f, "search stopped early; returning best result so far"),
        }
    }
}

/// One measured encode.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub pixel_size: PixelSize,
    pub quality: f32,
    pub artifact: EncodedArtifact,
    pub estimated_kb: f64,
}

/// The outcome of one conversion.
///
/// Every field is populated on every path; the search never returns a
/// partial result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub pixel_size: PixelSize,
    pub quality: f32,
    pub artifact: EncodedArtifact,
    pub estimated_kb: f64,
    /// Conditions the caller should surface (target unreachable, etc.).
    pub warnings: Vec<SearchWarning>,
    /// States visited, in order, ending with [`SearchPhase::Done`].
    pub phases: Vec<SearchPhase>,
    /// Number of encoder calls made.
    pub encodes: u32,
}

impl SearchResult {
    /// True if the target was (or could be) met without caveats.
    pub fn is_exact(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn visited(&self, phase: SearchPhase) -> bool {
        self.phases.contains(&phase)
    }
}

/// The sizes reachable at native dimensions by varying quality alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub min_kb: f64,
    pub max_kb: f64,
}

impl std::fmt::Display for SizeLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Est. Range: {}KB - {}KB (will resize if smaller)",
            self.min_kb.round(),
            self.max_kb.round()
        )
    }
}

/// Shown instead of a range for formats whose size cannot be targeted.
pub const LOSSLESS_LIMITS_NOTICE: &str = "PNG size targeting is limited";
