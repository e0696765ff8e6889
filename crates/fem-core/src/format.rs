//! Output formats and the quality scalar.

use serde::{Deserialize, Serialize};

use crate::encode::EncodeError;

/// Lowest quality any encoder will accept. A quality of exactly zero is
/// degenerate for several codecs, so it is clamped up to this value.
pub const MIN_ENCODER_QUALITY: f32 = 0.01;

/// Highest quality (maximum fidelity).
pub const MAX_QUALITY: f32 = 1.0;

/// Quality used when no target size is requested.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Output formats the converter can produce.
///
/// | Variant | Kind     | Quality knob | Alpha |
/// |---------|----------|--------------|-------|
/// | `Jpeg`  | lossy    | yes          | no (composited onto white) |
/// | `Avif`  | lossy    | yes          | yes   |
/// | `Png`   | lossless | ignored      | yes   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Avif,
    Png,
}

impl OutputFormat {
    /// All formats, in the order a format picker lists them.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::Avif, OutputFormat::Png];

    /// Parse a MIME type such as `image/jpeg`.
    pub fn from_mime(mime: &str) -> Result<Self, EncodeError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(OutputFormat::Jpeg),
            "image/avif" => Ok(OutputFormat::Avif),
            "image/png" => Ok(OutputFormat::Png),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Avif => "image/avif",
            OutputFormat::Png => "image/png",
        }
    }

    /// File extension used when saving (the MIME subtype).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Avif => "avif",
            OutputFormat::Png => "png",
        }
    }

    /// Whether the quality scalar meaningfully controls output size.
    pub fn supports_quality(self) -> bool {
        match self {
            OutputFormat::Jpeg | OutputFormat::Avif => true,
            OutputFormat::Png => false,
        }
    }

    /// Whether the format can store an alpha channel.
    pub fn supports_alpha(self) -> bool {
        match self {
            OutputFormat::Jpeg => false,
            OutputFormat::Avif | OutputFormat::Png => true,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Map a quality scalar in `(0, 1]` to a codec's 1-100 integer scale.
///
/// Non-finite values fall back to the lowest quality.
pub fn quality_to_percent(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 1;
    }
    let clamped = quality.clamp(MIN_ENCODER_QUALITY, MAX_QUALITY);
    ((clamped * 100.0).round() as u8).clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(OutputFormat::from_mime("image/jpeg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_mime("IMAGE/PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_mime(" image/avif ").unwrap(), OutputFormat::Avif);
        assert!(matches!(
            OutputFormat::from_mime("image/bmp"),
            Err(EncodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_mime_round_trips_for_every_format() {
        for format in OutputFormat::ALL {
            assert_eq!(OutputFormat::from_mime(format.mime_type()).unwrap(), format);
        }
    }

    #[test]
    fn test_capabilities() {
        assert!(OutputFormat::Jpeg.supports_quality());
        assert!(!OutputFormat::Jpeg.supports_alpha());
        assert!(OutputFormat::Avif.supports_quality());
        assert!(OutputFormat::Avif.supports_alpha());
        assert!(!OutputFormat::Png.supports_quality());
    }

    #[test]
    fn test_extension_is_mime_subtype() {
        for format in OutputFormat::ALL {
            assert!(format.mime_type().ends_with(format.extension()));
        }
    }

    #[test]
    fn test_quality_to_percent() {
        assert_eq!(quality_to_percent(1.0), 100);
        assert_eq!(quality_to_percent(0.92), 92);
        assert_eq!(quality_to_percent(0.05), 5);
        assert_eq!(quality_to_percent(0.0), 1);
        assert_eq!(quality_to_percent(-3.0), 1);
        assert_eq!(quality_to_percent(7.0), 100);
        assert_eq!(quality_to_percent(f32::NAN), 1);
    }
}
