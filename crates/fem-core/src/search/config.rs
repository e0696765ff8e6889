//! Tunables for the size search.

use serde::{Deserialize, Serialize};

use super::SearchError;
use crate::decode::FilterType;
use crate::estimate::Estimation;
use crate::format::{DEFAULT_QUALITY, MAX_QUALITY};

/// How close to the target an encode must be to stop searching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Tolerance {
    /// A fraction of the target (0.05 = within 5%). Scales with the target,
    /// so tiny and huge targets are constrained equally.
    Relative(f64),
    /// A fixed number of kilobytes.
    Absolute(f64),
}

impl Tolerance {
    /// Allowed deviation in kilobytes for `target_kb`.
    pub fn allowed(self, target_kb: f64) -> f64 {
        match self {
            Tolerance::Relative(fraction) => target_kb * fraction,
            Tolerance::Absolute(kb) => kb,
        }
    }

    pub fn accepts(self, estimated_kb: f64, target_kb: f64) -> bool {
        (estimated_kb - target_kb).abs() <= self.allowed(target_kb)
    }

    fn amount(self) -> f64 {
        match self {
            Tolerance::Relative(v) | Tolerance::Absolute(v) => v,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Relative(0.05)
    }
}

/// Search configuration.
///
/// Deserializes from a partial object; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Lowest quality probed or searched (Qmin). Must be > 0.
    pub min_quality: f32,
    /// Highest quality (Qmax).
    pub max_quality: f32,
    /// Quality used when no target is given or the format is lossless.
    pub default_quality: f32,
    /// Binary-search iteration cap.
    pub max_iterations: u32,
    pub tolerance: Tolerance,
    /// Factor applied to both dimensions per step-down, in (0, 1).
    pub shrink_factor: f64,
    /// Step-down attempt cap.
    pub max_step_downs: u32,
    /// Resampling filter for resized encodes. Applied by
    /// [`SizeTargetController::from_config`](super::SizeTargetController::from_config);
    /// other `Encoder` implementations choose their own resampling.
    pub filter: FilterType,
    pub estimation: Estimation,
    /// Run the two native-size range probes on separate threads.
    /// Ignored on wasm32.
    pub parallel_probes: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_quality: 0.05,
            max_quality: MAX_QUALITY,
            default_quality: DEFAULT_QUALITY,
            max_iterations: 10,
            tolerance: Tolerance::default(),
            shrink_factor: 0.8,
            max_step_downs: 10,
            filter: FilterType::Lanczos3,
            estimation: Estimation::Exact,
            parallel_probes: true,
        }
    }
}

impl SearchConfig {
    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), SearchError> {
        let in_range = |q: f32| q.is_finite() && q > 0.0 && q <= MAX_QUALITY;

        if !in_range(self.min_quality) || !in_range(self.max_quality) {
            return Err(invalid(format!(
                "qualities must lie in (0, 1], got min {} max {}",
                self.min_quality, self.max_quality
            )));
        }
        if self.min_quality >= self.max_quality {
            return Err(invalid(format!(
                "min_quality {} must be below max_quality {}",
                self.min_quality, self.max_quality
            )));
        }
        if !(self.min_quality..=self.max_quality).contains(&self.default_quality) {
            return Err(invalid(format!(
                "default_quality {} is outside [{}, {}]",
                self.default_quality, self.min_quality, self.max_quality
            )));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be at least 1".to_string()));
        }
        let tolerance = self.tolerance.amount();
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(invalid(format!("tolerance must be positive, got {tolerance}")));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(invalid(format!(
                "shrink_factor must lie in (0, 1), got {}",
                self.shrink_factor
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> SearchError {
    SearchError::InvalidConfig(message)
}
