//! File naming and byte formatting for the save and preview UI.

use crate::types::to_js_error;
use fem_core::{naming, OutputFormat};
use wasm_bindgen::prelude::*;

/// Download name for a converted file, e.g. `holiday_fem_1700000000000.jpeg`.
///
/// `timestamp_ms` is typically `Date.now()`.
#[wasm_bindgen]
pub fn output_file_name(
    original_name: &str,
    mime_type: &str,
    timestamp_ms: f64,
) -> Result<String, JsValue> {
    let format = OutputFormat::from_mime(mime_type).map_err(to_js_error)?;
    Ok(naming::output_file_name(
        original_name,
        format,
        js_u64(timestamp_ms),
    ))
}

/// Human-readable byte count, e.g. `1.5 KB`.
#[wasm_bindgen]
pub fn format_bytes(bytes: f64, decimals: Option<u32>) -> String {
    naming::format_bytes(js_u64(bytes), decimals.unwrap_or(2) as usize)
}

/// JS numbers arrive as f64; negative and NaN inputs clamp to zero.
fn js_u64(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}
