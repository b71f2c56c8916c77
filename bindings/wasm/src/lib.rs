use anaglyph::{
    classify, ClassifierConfig, ColorSample, DecisionPolicy, DetectionResult, FaceLandmarks,
    GlassesDetector, LandmarkDetector, LandmarkLocator, Preset, Region, StaticEyeRegions,
};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Classifier options, passed as a JavaScript object.
///
/// All fields are optional. When a `preset` is specified, its defaults apply
/// and individual fields override them.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct DetectOptions {
    /// `"cascade"` or `"landmark"`.
    preset: Option<String>,
    /// Minimum red/blue dominance for a lens signature.
    signature_threshold: Option<f64>,
    /// Dominance that maps to confidence 1.0.
    confidence_normalizer: Option<f64>,
    /// Confidence a positive result must exceed, in `[0, 1]`.
    decision_threshold: Option<f64>,
    /// `"confidence"` or `"orientation-match"`.
    policy: Option<String>,
}

/// Eye rectangle in image pixels, as `{x, y, width, height}`.
#[derive(Deserialize)]
struct RegionInput {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl From<RegionInput> for Region {
    fn from(r: RegionInput) -> Self {
        Region::new(r.x, r.y, r.width, r.height)
    }
}

/// One mesh vertex in image pixels. Extra fields such as `z` are ignored.
#[derive(Deserialize)]
struct PointInput {
    x: f64,
    y: f64,
}

/// Landmarks computed on the JS side, handed to the locator as-is.
struct ProvidedLandmarks(Vec<FaceLandmarks>);

impl LandmarkDetector for ProvidedLandmarks {
    fn detect(&self, _image: &RgbImage) -> Vec<FaceLandmarks> {
        self.0.clone()
    }
}

fn string_to_preset(preset: &str) -> Result<Preset, JsValue> {
    match preset {
        "cascade" => Ok(Preset::Cascade),
        "landmark" => Ok(Preset::Landmark),
        _ => Err(make_error(
            "INVALID_OPTIONS",
            &format!("unknown preset: {preset}"),
        )),
    }
}

fn string_to_policy(policy: &str) -> Result<DecisionPolicy, JsValue> {
    match policy {
        "confidence" => Ok(DecisionPolicy::Confidence),
        "orientation-match" => Ok(DecisionPolicy::OrientationMatch),
        _ => Err(make_error(
            "INVALID_OPTIONS",
            &format!("unknown policy: {policy}"),
        )),
    }
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

fn parse_options(options: JsValue) -> Result<DetectOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(DetectOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid options: {e}")))
    }
}

/// Resolve options into a classifier configuration, rejecting values the
/// classifier would refuse so callers see the mistake up front.
fn resolve_config(opts: &DetectOptions) -> Result<ClassifierConfig, JsValue> {
    let mut config = match opts.preset {
        Some(ref p) => string_to_preset(p)?.config(),
        None => ClassifierConfig::default(),
    };
    if let Some(t) = opts.signature_threshold {
        config.signature_threshold = t;
    }
    if let Some(n) = opts.confidence_normalizer {
        config.confidence_normalizer = n;
    }
    if let Some(t) = opts.decision_threshold {
        config.decision_threshold = t;
    }
    if let Some(ref p) = opts.policy {
        config.policy = string_to_policy(p)?;
    }
    config
        .validate()
        .map_err(|e| make_error("INVALID_OPTIONS", &e.to_string()))?;
    Ok(config)
}

fn parse_value<T: for<'de> Deserialize<'de>>(value: JsValue, name: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| make_error("INVALID_INPUT", &format!("invalid {name}: {e}")))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| make_error("SERIALIZE_ERROR", &e.to_string()))
}

fn detect_with(detector: GlassesDetector, input: &[u8]) -> Result<JsValue, JsValue> {
    let result: DetectionResult = detector.detect_bytes(input);
    to_js(&result)
}

/// Detect anaglyph glasses using face-mesh landmarks computed in JS.
///
/// @param input - Raw image bytes (JPEG, PNG, or WebP)
/// @param landmarks - Array of faces, each an array of `{x, y}` points in
///   image pixels (468-point face mesh indexing)
/// @param options - Optional object with fields: preset, signatureThreshold,
///   confidenceNormalizer, decisionThreshold, policy. Defaults to the
///   landmark preset.
#[wasm_bindgen(js_name = "detectWithLandmarks")]
pub fn detect_with_landmarks(
    input: Vec<u8>,
    landmarks: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let mut opts = parse_options(options)?;
    if opts.preset.is_none() {
        opts.preset = Some("landmark".to_string());
    }
    let config = resolve_config(&opts)?;

    let faces: Vec<Vec<PointInput>> = parse_value(landmarks, "landmarks")?;
    let faces = faces
        .into_iter()
        .map(|points| FaceLandmarks::new(points.into_iter().map(|p| (p.x, p.y)).collect()))
        .collect();

    let detector = GlassesDetector::new(LandmarkLocator::new(ProvidedLandmarks(faces)))
        .classifier_config(config);
    detect_with(detector, &input)
}

/// Detect anaglyph glasses in two eye rectangles supplied by the caller.
///
/// @param input - Raw image bytes (JPEG, PNG, or WebP)
/// @param left - `{x, y, width, height}` of one eye
/// @param right - `{x, y, width, height}` of the other eye
/// @param options - Optional object with fields: preset, signatureThreshold,
///   confidenceNormalizer, decisionThreshold, policy
#[wasm_bindgen(js_name = "detectWithRegions")]
pub fn detect_with_regions(
    input: Vec<u8>,
    left: JsValue,
    right: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let config = resolve_config(&parse_options(options)?)?;
    let left: RegionInput = parse_value(left, "left region")?;
    let right: RegionInput = parse_value(right, "right region")?;

    let detector = GlassesDetector::new(StaticEyeRegions::new(left.into(), right.into()))
        .classifier_config(config);
    detect_with(detector, &input)
}

/// Classify two already-summarized eye colors.
///
/// @param left - `[r, g, b]` of the image-left eye
/// @param right - `[r, g, b]` of the image-right eye
/// @param options - Optional object with fields: preset, signatureThreshold,
///   confidenceNormalizer, decisionThreshold, policy
#[wasm_bindgen(js_name = "classifyColors")]
pub fn classify_colors(left: JsValue, right: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let config = resolve_config(&parse_options(options)?)?;
    let [lr, lg, lb]: [u8; 3] = parse_value(left, "left color")?;
    let [rr, rg, rb]: [u8; 3] = parse_value(right, "right color")?;

    let classification = classify(
        ColorSample::new(lr, lg, lb),
        ColorSample::new(rr, rg, rb),
        &config,
    )
    .map_err(|e| make_error("CLASSIFIER_ERROR", &e.to_string()))?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &"wearingGlasses".into(),
        &JsValue::from(classification.wearing_glasses),
    )?;
    js_sys::Reflect::set(
        &obj,
        &"confidence".into(),
        &JsValue::from(classification.confidence),
    )?;
    js_sys::Reflect::set(
        &obj,
        &"orientation".into(),
        &to_js(&classification.orientation)?,
    )?;
    js_sys::Reflect::set(
        &obj,
        &"leftDominance".into(),
        &to_js(&classification.left)?,
    )?;
    js_sys::Reflect::set(
        &obj,
        &"rightDominance".into(),
        &to_js(&classification.right)?,
    )?;

    Ok(JsValue::from(obj))
}
