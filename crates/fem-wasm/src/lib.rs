//! fem WASM - WebAssembly bindings for fem
//!
//! This crate exposes the fem-core converter to JavaScript/TypeScript.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for decoded images
//! - `decode` - Decoding uploaded files to RGBA
//! - `convert` - Size-targeted conversion and size-range probing
//! - `naming` - Download names and byte formatting
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, convert, size_limits_text, output_file_name } from '@fem/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const settings = { min_quality: 0.1 };
//! const range = size_limits_text(image, 'image/jpeg', settings);
//! const result = convert(image, 'image/jpeg', 150, settings);
//! const name = output_file_name(file.name, result.mime_type, Date.now());
//! ```

use wasm_bindgen::prelude::*;

mod convert;
mod decode;
mod naming;
mod types;

pub use convert::{convert, size_limits, size_limits_text, JsConversionResult, JsSizeLimits};
pub use decode::decode_image;
pub use naming::{format_bytes, output_file_name};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
