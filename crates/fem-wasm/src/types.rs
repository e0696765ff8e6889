//! WASM-compatible wrapper types for image data and search settings.

use fem_core::decode::DecodedImage;
use fem_core::search::SearchConfig;
use wasm_bindgen::prelude::*;

/// A decoded RGBA image held in WASM memory.
///
/// Decode once with `decode_image`, then pass the same handle to `convert`
/// and `size_limits` as often as the user changes settings.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Wrap raw RGBA pixels (4 bytes per pixel, row-major order).
    ///
    /// Typically the `data` of a canvas `ImageData`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data as a Uint8Array. This copies out of WASM memory.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release the pixel buffer now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy into a core image. The buffer is not validated here; the
    /// controller rejects mismatched lengths before encoding.
    pub(crate) fn as_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Parse an optional JS settings object into a `SearchConfig`.
///
/// `undefined` and `null` select the defaults; missing fields take their
/// default values.
pub(crate) fn parse_config(value: JsValue) -> Result<SearchConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(SearchConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render any error as a JS string value.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use fem_core::search::Tolerance;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_config_defaults() {
        assert_eq!(
            parse_config(JsValue::UNDEFINED).unwrap(),
            SearchConfig::default()
        );
        assert_eq!(parse_config(JsValue::NULL).unwrap(), SearchConfig::default());
    }

    #[wasm_bindgen_test]
    fn test_parse_config_partial_object() {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"max_iterations".into(), &JsValue::from(4)).unwrap();
        let config = parse_config(obj.into()).unwrap();
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.tolerance, Tolerance::Relative(0.05));
    }

    #[wasm_bindgen_test]
    fn test_parse_config_rejects_garbage() {
        assert!(parse_config(JsValue::from_str("fast")).is_err());
    }
}
