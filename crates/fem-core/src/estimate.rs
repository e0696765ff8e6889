//! Encoded size estimation.
//!
//! The exact path measures an artifact's byte length. Browsers often hand
//! around a `data:` URL instead of raw bytes; for that transport form the
//! size is recovered from the base64 payload length, which is accurate to
//! within the encoding's padding (at most two bytes).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::encode::EncodedArtifact;

/// Bytes per kilobyte.
pub const BYTES_PER_KB: f64 = 1024.0;

/// Decoded bytes per base64 character.
pub const BASE64_RATIO: f64 = 0.75;

/// Length of a generic `data:image/*;base64,` prefix.
pub const DATA_URL_HEADER_LEN: usize = "data:image/*;base64,".len();

/// Which measurement the size search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimation {
    /// Measure the artifact's byte length.
    #[default]
    Exact,
    /// Measure the base64 `data:` URL the way a browser-side caller would.
    /// Pick a tolerance that absorbs a couple of bytes of padding.
    DataUrl,
}

impl Estimation {
    pub fn measure(self, artifact: &EncodedArtifact) -> f64 {
        match self {
            Estimation::Exact => estimate_kb(artifact),
            Estimation::DataUrl => estimate_kb_from_data_url(&to_data_url(artifact)),
        }
    }
}

/// Exact size of an artifact in kilobytes.
pub fn estimate_kb(artifact: &EncodedArtifact) -> f64 {
    bytes_to_kb(artifact.len())
}

pub fn bytes_to_kb(bytes: usize) -> f64 {
    bytes as f64 / BYTES_PER_KB
}

/// Approximate size in kilobytes of a payload from its base64 transport form.
///
/// `header_len` is the length of the metadata prefix in front of the payload.
/// Never negative: a transport string shorter than its header estimates 0.
pub fn estimate_kb_from_transport(transport: &str, header_len: usize) -> f64 {
    let payload = transport.len().saturating_sub(header_len);
    payload as f64 * BASE64_RATIO / BYTES_PER_KB
}

/// Approximate size in kilobytes of the file inside a `data:` URL.
///
/// The header is everything up to and including the first comma. A string
/// with no comma is treated as having the generic image header length.
pub fn estimate_kb_from_data_url(url: &str) -> f64 {
    let header_len = url.find(',').map_or(DATA_URL_HEADER_LEN, |i| i + 1);
    estimate_kb_from_transport(url, header_len)
}

/// The `data:` URL form of an artifact, as a browser would produce it.
pub fn to_data_url(artifact: &EncodedArtifact) -> String {
    format!(
        "data:{};base64,{}",
        artifact.format().mime_type(),
        STANDARD.encode(artifact.bytes())
    )
}
