//! Anaglyph glasses detection: decide from a face photo whether the subject
//! wears red/blue glasses.
//!
//! Detection runs in two stages. An [`EyeLocator`] finds the two eye regions;
//! the median color of each region is then checked for the red-over-one-eye,
//! blue-over-the-other signature of anaglyph lenses.
//!
//! # Example
//!
//! ```no_run
//! use anaglyph::{GlassesDetector, Region, StaticEyeRegions};
//!
//! let raw_bytes = std::fs::read("frame.jpg").unwrap();
//! let locator = StaticEyeRegions::new(Region::new(80, 120, 60, 40), Region::new(180, 120, 60, 40));
//! let result = GlassesDetector::new(locator).detect_bytes(&raw_bytes);
//! println!("wearing glasses: {}", result.wearing_glasses);
//! ```
#![warn(missing_docs)]

mod classifier;
mod color;
pub mod decode;
mod error;
mod eye_heuristic;
/// Face and eye detection traits and data types.
pub mod face_detector;
pub mod landmarks;
mod locator;
mod pipeline;
mod region;
mod result;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;

use image::RgbImage;
use tracing::{debug, warn};

/// Dominance scoring, orientation policy, and tuning knobs.
pub use classifier::{
    classify, orientation_score, Classification, ClassifierConfig, DecisionPolicy, Dominance,
    Orientation, DEFAULT_CONFIDENCE_NORMALIZER, DEFAULT_DECISION_THRESHOLD,
    DEFAULT_SIGNATURE_THRESHOLD, LANDMARK_SIGNATURE_THRESHOLD,
};
/// Region color summarizer.
pub use color::{median_color, ColorSample, RegionColor};
/// Error type and failure codes.
pub use error::{FailureReason, GlassesError};
/// Face-proportion eye detector for face-only backends.
pub use eye_heuristic::ProportionalEyeDetector;
/// Face and eye detection traits and bounding-box type.
pub use face_detector::{Bounds, EyeDetector, FaceDetector};
/// Landmark-mesh locator.
pub use landmarks::{FaceLandmarks, LandmarkDetector, LandmarkLocator};
/// Eye localizer contract and its generic backends.
pub use locator::{select_eye_pair, CascadeLocator, EyeLocator, EyePair, StaticEyeRegions};
/// Pixel regions.
pub use region::{Eye, Region};
/// Detection output.
pub use result::{DetectionResult, Details};
#[cfg(feature = "rustface")]
/// Built-in detector that loads the SeetaFace model.
pub use rustface_backend::RustfaceDetector;

/// Pre-configured classifier settings matching the two detection backends.
///
/// Presets set all classifier parameters; individual settings can be
/// overridden afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// For cascade (face box + eye box) localization.
    ///
    /// - signature threshold 10
    /// - confidence normalized by 50, positive above 0.3
    #[default]
    Cascade,

    /// For landmark-mesh localization, whose contour-hugging regions show a
    /// cleaner signature.
    ///
    /// - signature threshold 15
    /// - positive on any orientation match, regardless of confidence
    Landmark,
}

impl Preset {
    /// Classifier configuration for this preset.
    pub fn config(self) -> ClassifierConfig {
        match self {
            Preset::Cascade => ClassifierConfig::default(),
            Preset::Landmark => ClassifierConfig {
                signature_threshold: LANDMARK_SIGNATURE_THRESHOLD,
                policy: DecisionPolicy::OrientationMatch,
                ..ClassifierConfig::default()
            },
        }
    }
}

/// Detects anaglyph glasses in face images.
///
/// Owns the eye locator and the classifier settings; reusable across images.
/// Every entry point returns a [`DetectionResult`]; failures are reported in
/// the result, never as an `Err`.
pub struct GlassesDetector {
    locator: Box<dyn EyeLocator>,
    config: ClassifierConfig,
}

impl GlassesDetector {
    /// Create a detector with the default ([`Preset::Cascade`]) settings.
    pub fn new(locator: impl EyeLocator + 'static) -> Self {
        Self::from_boxed(Box::new(locator))
    }

    /// Create a detector from an already boxed locator.
    pub fn from_boxed(locator: Box<dyn EyeLocator>) -> Self {
        Self {
            locator,
            config: Preset::default().config(),
        }
    }

    /// Apply a preset configuration. Individual settings can be overridden
    /// after this call.
    ///
    /// ```no_run
    /// use anaglyph::{GlassesDetector, Preset, Region, StaticEyeRegions};
    ///
    /// let locator = StaticEyeRegions::new(Region::new(0, 0, 8, 8), Region::new(16, 0, 8, 8));
    /// let detector = GlassesDetector::new(locator)
    ///     .preset(Preset::Landmark)
    ///     .signature_threshold(12.0);
    /// ```
    pub fn preset(mut self, preset: Preset) -> Self {
        self.config = preset.config();
        self
    }

    /// Set the minimum dominance for a filter signature (default: 10.0).
    pub fn signature_threshold(mut self, threshold: f64) -> Self {
        self.config.signature_threshold = threshold;
        self
    }

    /// Set the dominance that maps to full confidence (default: 50.0).
    pub fn confidence_normalizer(mut self, normalizer: f64) -> Self {
        self.config.confidence_normalizer = normalizer;
        self
    }

    /// Set the confidence a positive decision must exceed (default: 0.3).
    pub fn decision_threshold(mut self, threshold: f64) -> Self {
        self.config.decision_threshold = threshold;
        self
    }

    /// Set the decision policy (default: [`DecisionPolicy::Confidence`]).
    pub fn policy(mut self, policy: DecisionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Replace the whole classifier configuration.
    pub fn classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// The classifier configuration in effect.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Detect glasses in a decoded image.
    pub fn detect(&self, image: &RgbImage) -> DetectionResult {
        match pipeline::detection_pipeline(image, self.locator.as_ref(), &self.config) {
            Ok(result) => result,
            Err(err) => report_failure(err),
        }
    }

    /// Decode JPEG, PNG, or WebP bytes and detect glasses.
    pub fn detect_bytes(&self, input: &[u8]) -> DetectionResult {
        match decode::decode_image(input) {
            Ok(image) => self.detect(&image),
            Err(err) => report_failure(err),
        }
    }

    /// Decode a base64 data URL (or bare base64 string) and detect glasses.
    pub fn detect_data_url(&self, input: &str) -> DetectionResult {
        match decode::decode_data_url(input) {
            Ok(image) => self.detect(&image),
            Err(err) => report_failure(err),
        }
    }
}

fn report_failure(err: GlassesError) -> DetectionResult {
    if err.is_expected() {
        debug!(reason = ?err.reason(), "nothing to classify");
    } else {
        warn!(error = %err, "glasses detection failed");
    }
    DetectionResult::failure(&err)
}
