//! Helpers for presenting and saving results.

use crate::format::OutputFormat;

/// Tag inserted into every saved file name.
pub const FILE_TAG: &str = "fem";

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Name for a converted file: `{stem}_fem_{timestamp}.{ext}`.
///
/// The stem is the original name up to its first `.`, so `photo.final.png`
/// becomes `photo_fem_<ts>.jpeg`. A name with no stem falls back to `image`.
pub fn output_file_name(original: &str, format: OutputFormat, timestamp_ms: u64) -> String {
    let stem = original.split('.').next().unwrap_or_default().trim();
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{stem}_{FILE_TAG}_{timestamp_ms}.{}", format.extension())
}

/// Human-readable byte count using 1024-based units, e.g. `1.5 KB`.
///
/// Trailing zeros after the decimal point are dropped.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.decimals$}");
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    format!("{trimmed} {}", UNITS[unit])
}
