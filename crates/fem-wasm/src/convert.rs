//! Size-targeted conversion bindings.
//!
//! # Example
//!
//! ```typescript
//! import { convert, size_limits_text } from '@fem/wasm';
//!
//! const settings = { min_quality: 0.1 };
//! label.textContent = size_limits_text(image, 'image/jpeg', settings);
//!
//! const result = convert(image, 'image/jpeg', 200, settings, 10_000);
//! preview.src = result.data_url;
//! result.warnings.forEach((w) => console.warn(w));
//! ```

use crate::types::{parse_config, to_js_error, JsDecodedImage};
use fem_core::estimate::to_data_url;
use fem_core::search::{
    Never, SearchConfig, SearchError, SearchResult, SizeLimits, SizeTargetController, Stop,
    StopFn, TargetRequest, LOSSLESS_LIMITS_NOTICE,
};
use fem_core::{EncodedArtifact, ImageEncoder, OutputFormat};
use wasm_bindgen::prelude::*;

/// Size range reachable by quality alone at native dimensions.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsSizeLimits {
    min_kb: f64,
    max_kb: f64,
}

#[wasm_bindgen]
impl JsSizeLimits {
    #[wasm_bindgen(getter)]
    pub fn min_kb(&self) -> f64 {
        self.min_kb
    }

    #[wasm_bindgen(getter)]
    pub fn max_kb(&self) -> f64 {
        self.max_kb
    }
}

impl From<SizeLimits> for JsSizeLimits {
    fn from(limits: SizeLimits) -> Self {
        Self {
            min_kb: limits.min_kb,
            max_kb: limits.max_kb,
        }
    }
}

/// The chosen encode plus everything the UI shows about it.
#[wasm_bindgen]
pub struct JsConversionResult {
    artifact: EncodedArtifact,
    width: u32,
    height: u32,
    quality: f32,
    estimated_kb: f64,
    warnings: Vec<String>,
}

#[wasm_bindgen]
impl JsConversionResult {
    /// Encoded file bytes as a Uint8Array (copied out of WASM memory).
    pub fn bytes(&self) -> Vec<u8> {
        self.artifact.bytes().to_vec()
    }

    /// `data:` URL for previewing the encoded file.
    #[wasm_bindgen(getter)]
    pub fn data_url(&self) -> String {
        to_data_url(&self.artifact)
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.artifact.format().mime_type().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    #[wasm_bindgen(getter)]
    pub fn estimated_kb(&self) -> f64 {
        self.estimated_kb
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.artifact.len()
    }

    /// Human-readable warnings; empty when the target was met.
    #[wasm_bindgen(getter)]
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }
}

impl From<SearchResult> for JsConversionResult {
    fn from(result: SearchResult) -> Self {
        Self {
            width: result.pixel_size.width,
            height: result.pixel_size.height,
            quality: result.quality,
            estimated_kb: result.estimated_kb,
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
            artifact: result.artifact,
        }
    }
}

/// Convert `image` to `mime_type`, aiming for `target_kb` when given.
///
/// `config` is an optional settings object (any subset of the search
/// configuration fields). `timeout_ms` bounds the search by wall-clock time;
/// when it expires the best result so far is returned with a warning.
///
/// # Errors
///
/// Returns an error for an unsupported MIME type, an invalid config, an
/// empty image, a non-positive or non-finite `target_kb`, or an encoder
/// failure.
#[wasm_bindgen]
pub fn convert(
    image: &JsDecodedImage,
    mime_type: &str,
    target_kb: Option<f64>,
    config: JsValue,
    timeout_ms: Option<f64>,
) -> Result<JsConversionResult, JsValue> {
    let format = OutputFormat::from_mime(mime_type).map_err(to_js_error)?;
    let controller =
        SizeTargetController::from_config(parse_config(config)?).map_err(to_js_error)?;

    let request = TargetRequest::new(format, target_kb);
    let decoded = image.as_decoded();
    let result = match timeout_ms {
        Some(ms) => {
            let deadline = js_sys::Date::now() + ms;
            let stop = StopFn(move || js_sys::Date::now() >= deadline);
            run(&controller, &decoded, request, &stop)
        }
        None => run(&controller, &decoded, request, &Never),
    }
    .map_err(to_js_error)?;

    for warning in &result.warnings {
        web_sys::console::warn_1(&JsValue::from_str(&warning.to_string()));
    }
    Ok(result.into())
}

fn run(
    controller: &SizeTargetController<ImageEncoder>,
    image: &fem_core::DecodedImage,
    request: TargetRequest,
    stop: &dyn Stop,
) -> Result<SearchResult, SearchError> {
    controller.achieve_target_with_stop(image, request, stop)
}

/// Probe the size range reachable at native dimensions.
///
/// Pass the same settings object given to `convert` so the range is measured
/// at the qualities and with the estimator the search will use. Returns
/// `undefined` for lossless formats, whose size cannot be steered.
#[wasm_bindgen]
pub fn size_limits(
    image: &JsDecodedImage,
    mime_type: &str,
    config: JsValue,
) -> Result<Option<JsSizeLimits>, JsValue> {
    let format = OutputFormat::from_mime(mime_type).map_err(to_js_error)?;
    probe(image, format, parse_config(config)?)
        .map(|limits| limits.map(JsSizeLimits::from))
        .map_err(to_js_error)
}

/// The size range as UI text, e.g. `Est. Range: 12KB - 340KB (will resize if smaller)`.
#[wasm_bindgen]
pub fn size_limits_text(
    image: &JsDecodedImage,
    mime_type: &str,
    config: JsValue,
) -> Result<String, JsValue> {
    let format = OutputFormat::from_mime(mime_type).map_err(to_js_error)?;
    probe(image, format, parse_config(config)?)
        .map(|limits| limits_text(limits.as_ref()))
        .map_err(to_js_error)
}

fn probe(
    image: &JsDecodedImage,
    format: OutputFormat,
    config: SearchConfig,
) -> Result<Option<SizeLimits>, SearchError> {
    SizeTargetController::from_config(config)?.size_limits(&image.as_decoded(), format)
}

fn limits_text(limits: Option<&SizeLimits>) -> String {
    match limits {
        Some(limits) => limits.to_string(),
        None => LOSSLESS_LIMITS_NOTICE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fem_core::search::SearchWarning;
    use fem_core::PixelSize;

    #[test]
    fn test_limits_text() {
        let limits = SizeLimits {
            min_kb: 11.6,
            max_kb: 340.2,
        };
        assert_eq!(
            limits_text(Some(&limits)),
            "Est. Range: 12KB - 340KB (will resize if smaller)"
        );
        assert_eq!(limits_text(None), LOSSLESS_LIMITS_NOTICE);
    }

    pub(super) fn noisy(width: u32, height: u32) -> JsDecodedImage {
        let pixels = (0..width * height * 4)
            .map(|i| if i % 4 == 3 { 255 } else { (i.wrapping_mul(2654435761) >> 13) as u8 })
            .collect();
        JsDecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_probe_jpeg_and_png() {
        let image = JsDecodedImage::new(16, 16, vec![90u8; 16 * 16 * 4]);

        let limits = probe(&image, OutputFormat::Jpeg, SearchConfig::default())
            .unwrap()
            .unwrap();
        assert!(limits.min_kb > 0.0);
        assert!(limits.min_kb <= limits.max_kb);

        assert!(probe(&image, OutputFormat::Png, SearchConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_probe_uses_configured_floor() {
        let image = noisy(48, 48);
        let default = probe(&image, OutputFormat::Jpeg, SearchConfig::default())
            .unwrap()
            .unwrap();
        let raised = SearchConfig {
            min_quality: 0.5,
            ..SearchConfig::default()
        };
        let raised = probe(&image, OutputFormat::Jpeg, raised).unwrap().unwrap();

        assert!(raised.min_kb > default.min_kb);
        assert_eq!(raised.max_kb, default.max_kb);
    }

    #[test]
    fn test_probe_rejects_invalid_config() {
        let image = noisy(8, 8);
        let bad = SearchConfig {
            min_quality: 0.9,
            max_quality: 0.5,
            ..SearchConfig::default()
        };
        assert!(matches!(
            probe(&image, OutputFormat::Jpeg, bad),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_conversion_result_from_search_result() {
        let result = SearchResult {
            pixel_size: PixelSize::new(40, 30),
            quality: 0.5,
            artifact: EncodedArtifact::new(OutputFormat::Avif, vec![1, 2, 3]),
            estimated_kb: 3.0 / 1024.0,
            warnings: vec![SearchWarning::TargetIgnored {
                format: OutputFormat::Png,
            }],
            phases: Vec::new(),
            encodes: 1,
        };

        let js = JsConversionResult::from(result);
        assert_eq!(js.mime_type(), "image/avif");
        assert_eq!((js.width(), js.height()), (40, 30));
        assert_eq!(js.bytes(), vec![1, 2, 3]);
        assert_eq!(js.byte_length(), 3);
        assert_eq!(js.warnings().len(), 1);
        assert_eq!(js.data_url(), "data:image/avif;base64,AQID");
    }

    #[test]
    fn test_run_without_stop() {
        let image = JsDecodedImage::new(8, 8, vec![200u8; 8 * 8 * 4]);
        let controller = SizeTargetController::with_defaults(ImageEncoder::default());
        let result = run(
            &controller,
            &image.as_decoded(),
            TargetRequest::untargeted(OutputFormat::Png),
            &Never,
        )
        .unwrap();
        assert_eq!(result.pixel_size, PixelSize::new(8, 8));
        assert!(result.warnings.is_empty());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::tests::noisy;
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn gray(width: u32, height: u32) -> JsDecodedImage {
        JsDecodedImage::new(width, height, vec![128u8; (width * height * 4) as usize])
    }

    #[wasm_bindgen_test]
    fn test_convert_untargeted_jpeg() {
        let result = convert(&gray(32, 32), "image/jpeg", None, JsValue::UNDEFINED, None).unwrap();
        assert_eq!(result.width(), 32);
        assert_eq!(&result.bytes()[..2], &[0xFF, 0xD8]);
        assert!(result.data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[wasm_bindgen_test]
    fn test_convert_rejects_non_positive_target() {
        let image = gray(8, 8);
        assert!(convert(&image, "image/jpeg", Some(0.0), JsValue::NULL, None).is_err());
        assert!(convert(&image, "image/jpeg", Some(-3.0), JsValue::NULL, None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_convert_rejects_unknown_mime() {
        assert!(convert(&gray(8, 8), "image/gif", None, JsValue::NULL, None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_convert_expired_timeout_still_returns_result() {
        let result = convert(&gray(32, 32), "image/jpeg", Some(1.0), JsValue::NULL, Some(0.0)).unwrap();
        assert!(!result.bytes().is_empty());
        assert!(!result.warnings().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_size_limits_png_is_undefined() {
        assert!(size_limits(&gray(8, 8), "image/png", JsValue::UNDEFINED)
            .unwrap()
            .is_none());
        assert_eq!(
            size_limits_text(&gray(8, 8), "image/png", JsValue::NULL).unwrap(),
            LOSSLESS_LIMITS_NOTICE
        );
    }

    #[wasm_bindgen_test]
    fn test_size_limits_follow_settings_object() {
        let image = noisy(48, 48);
        let settings = js_sys::Object::new();
        js_sys::Reflect::set(&settings, &"min_quality".into(), &JsValue::from(0.5)).unwrap();

        let default = size_limits(&image, "image/jpeg", JsValue::UNDEFINED)
            .unwrap()
            .unwrap();
        let raised = size_limits(&image, "image/jpeg", settings.into())
            .unwrap()
            .unwrap();
        assert!(raised.min_kb() > default.min_kb());
    }
}
