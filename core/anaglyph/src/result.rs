use serde::Serialize;

use crate::classifier::{Classification, Dominance, Orientation};
use crate::color::ColorSample;
use crate::error::{FailureReason, GlassesError};
use crate::region::Region;

/// Diagnostics of a completed classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    /// Median color of the image-left eye region.
    pub left_eye_color: ColorSample,
    /// Median color of the image-right eye region.
    pub right_eye_color: ColorSample,
    /// Dominance scores of the image-left eye.
    pub left_dominance: Dominance,
    /// Dominance scores of the image-right eye.
    pub right_dominance: Dominance,
    /// Best matching lens orientation, if any.
    pub orientation: Option<Orientation>,
    /// Eye region that was sampled on the image-left side (before clipping).
    pub left_eye_region: Region,
    /// Eye region that was sampled on the image-right side (before clipping).
    pub right_eye_region: Region,
    /// One-line human-readable report of the colors and scores.
    pub summary: String,
}

impl Details {
    pub(crate) fn new(
        left_eye_color: ColorSample,
        right_eye_color: ColorSample,
        left_eye_region: Region,
        right_eye_region: Region,
        classification: &Classification,
    ) -> Self {
        let (left, right) = (classification.left, classification.right);
        let summary = format!(
            "Left eye RGB: {left_eye_color}, Right eye RGB: {right_eye_color} \
             | Left red dominance: {:.1}, Left blue dominance: {:.1} \
             | Right red dominance: {:.1}, Right blue dominance: {:.1}",
            left.red, left.blue, right.red, right.blue,
        );
        Self {
            left_eye_color,
            right_eye_color,
            left_dominance: left,
            right_dominance: right,
            orientation: classification.orientation,
            left_eye_region,
            right_eye_region,
            summary,
        }
    }
}

/// Outcome of one detection request.
///
/// A success carries `details`; a failure carries a `reason` (plus an
/// `error` message for faults) and reports `wearing_glasses = false` with
/// zero confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Whether anaglyph glasses were detected.
    pub wearing_glasses: bool,
    /// Confidence in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Diagnostics, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    /// Why nothing could be classified, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Description of an unexpected failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    pub(crate) fn success(classification: &Classification, details: Details) -> Self {
        Self {
            wearing_glasses: classification.wearing_glasses,
            confidence: Some(classification.confidence),
            details: Some(details),
            reason: None,
            error: None,
        }
    }

    /// Negative result describing `err`.
    pub fn failure(err: &GlassesError) -> Self {
        Self {
            wearing_glasses: false,
            confidence: Some(0.0),
            details: None,
            reason: Some(err.reason()),
            error: (!err.is_expected()).then(|| err.to_string()),
        }
    }

    /// `true` when the pipeline ran to completion, whatever the decision.
    pub fn is_classified(&self) -> bool {
        self.details.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, ClassifierConfig};
    use crate::region::Eye;

    #[test]
    fn no_face_has_reason_without_error() {
        let result = DetectionResult::failure(&GlassesError::NoFaceDetected);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "wearingGlasses": false,
                "confidence": 0.0,
                "reason": "NoFaceDetected",
            })
        );
    }

    #[test]
    fn faults_carry_error_text() {
        let result = DetectionResult::failure(&GlassesError::EmptyRegion { eye: Eye::Right });
        assert_eq!(result.reason, Some(FailureReason::EmptyRegion));
        assert_eq!(
            result.error.as_deref(),
            Some("right eye region does not overlap the image")
        );
        assert!(!result.is_classified());
    }

    #[test]
    fn success_serializes_details() {
        let left = ColorSample::new(200, 80, 70);
        let right = ColorSample::new(70, 80, 200);
        let classification = classify(left, right, &ClassifierConfig::default()).unwrap();
        let details = Details::new(
            left,
            right,
            Region::new(10, 20, 30, 15),
            Region::new(60, 20, 30, 15),
            &classification,
        );
        let result = DetectionResult::success(&classification, details);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["wearingGlasses"], true);
        assert_eq!(json["confidence"], 1.0);
        assert_eq!(json["details"]["leftEyeColor"], serde_json::json!([200, 80, 70]));
        assert_eq!(json["details"]["orientation"], "redLeft");
        assert_eq!(json["details"]["leftDominance"]["red"], 125.0);
        assert_eq!(
            json["details"]["rightEyeRegion"],
            serde_json::json!({"x": 60, "y": 20, "width": 30, "height": 15})
        );
        assert!(json.get("reason").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn summary_matches_report_format() {
        let left = ColorSample::new(100, 100, 100);
        let right = ColorSample::new(100, 100, 100);
        let classification = classify(left, right, &ClassifierConfig::default()).unwrap();
        let details = Details::new(
            left,
            right,
            Region::new(0, 0, 1, 1),
            Region::new(2, 0, 1, 1),
            &classification,
        );
        assert_eq!(
            details.summary,
            "Left eye RGB: (100, 100, 100), Right eye RGB: (100, 100, 100) \
             | Left red dominance: 0.0, Left blue dominance: 0.0 \
             | Right red dominance: 0.0, Right blue dominance: 0.0"
        );
    }
}
