//! Red/blue filter classification from two eye colors.
//!
//! An anaglyph lens is a single-color transparent filter, so the eye behind
//! it shows one channel standing well above the other two. The classifier
//! measures that excess for red and blue on each eye and checks whether one
//! eye carries the red signature while the other carries the blue one.
//! Capture pipelines may mirror the frame, so both physical orientations are
//! accepted.

use serde::Serialize;

use crate::color::ColorSample;
use crate::error::GlassesError;

/// Default minimum dominance (on the 0–255 channel scale) for a filter signature.
pub const DEFAULT_SIGNATURE_THRESHOLD: f64 = 10.0;

/// Default dominance that maps to full confidence.
pub const DEFAULT_CONFIDENCE_NORMALIZER: f64 = 50.0;

/// Default confidence a positive decision must exceed.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.3;

/// Signature threshold used by the landmark-mesh variant.
pub const LANDMARK_SIGNATURE_THRESHOLD: f64 = 15.0;

/// How much red and blue each stand above the other two channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dominance {
    /// `r - (g + b) / 2`
    pub red: f64,
    /// `b - (g + r) / 2`
    pub blue: f64,
}

impl Dominance {
    /// Dominance scores of one color.
    pub fn of(color: ColorSample) -> Self {
        let (r, g, b) = (f64::from(color.r), f64::from(color.g), f64::from(color.b));
        Self {
            red: r - (g + b) / 2.0,
            blue: b - (g + r) / 2.0,
        }
    }
}

/// Which lens sits over which eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// Red filter over the image-left eye, blue over the image-right eye.
    RedLeft,
    /// Blue filter over the image-left eye, red over the image-right eye.
    BlueLeft,
}

/// How the final yes/no decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionPolicy {
    /// Glasses are present when the confidence exceeds the decision threshold.
    #[default]
    Confidence,
    /// Glasses are present whenever either orientation matches, however weakly.
    OrientationMatch,
}

/// Tuning knobs of the classifier.
///
/// The defaults are empirical values, not derived ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Dominance an eye must strictly exceed to count as filtered.
    pub signature_threshold: f64,
    /// Dominance that maps to confidence 1.0.
    pub confidence_normalizer: f64,
    /// Confidence a positive decision must strictly exceed, in `[0, 1]`.
    /// Only consulted by [`DecisionPolicy::Confidence`].
    pub decision_threshold: f64,
    /// How `wearing_glasses` is derived.
    pub policy: DecisionPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            signature_threshold: DEFAULT_SIGNATURE_THRESHOLD,
            confidence_normalizer: DEFAULT_CONFIDENCE_NORMALIZER,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            policy: DecisionPolicy::Confidence,
        }
    }
}

impl ClassifierConfig {
    /// Reject settings that would make the scores meaningless.
    pub fn validate(&self) -> Result<(), GlassesError> {
        if !self.signature_threshold.is_finite() {
            return Err(GlassesError::ClassifierError(format!(
                "signature threshold must be finite, got {}",
                self.signature_threshold
            )));
        }
        if !self.confidence_normalizer.is_finite() || self.confidence_normalizer <= 0.0 {
            return Err(GlassesError::ClassifierError(format!(
                "confidence normalizer must be positive, got {}",
                self.confidence_normalizer
            )));
        }
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Err(GlassesError::ClassifierError(format!(
                "decision threshold must be between 0.0 and 1.0, got {}",
                self.decision_threshold
            )));
        }
        Ok(())
    }
}

/// Outcome of classifying one pair of eye colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Final decision under the configured policy.
    pub wearing_glasses: bool,
    /// Strength of the best matching orientation in `[0, 1]`; 0.0 when none matched.
    pub confidence: f64,
    /// Best matching orientation, if any.
    pub orientation: Option<Orientation>,
    /// Dominance scores of the image-left eye.
    pub left: Dominance,
    /// Dominance scores of the image-right eye.
    pub right: Dominance,
}

/// Confidence that `orientation` explains the two eyes, or `None` when either
/// eye lacks the required signature.
///
/// The weaker eye sets the score, so a strong tint over one eye alone never
/// reads as a pair of glasses.
pub fn orientation_score(
    left: Dominance,
    right: Dominance,
    orientation: Orientation,
    config: &ClassifierConfig,
) -> Option<f64> {
    let (left_signature, right_signature) = match orientation {
        Orientation::RedLeft => (left.red, right.blue),
        Orientation::BlueLeft => (left.blue, right.red),
    };

    let threshold = config.signature_threshold;
    if left_signature > threshold && right_signature > threshold {
        let weaker = left_signature.min(right_signature);
        Some((weaker / config.confidence_normalizer).clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Classify the two eye colors.
pub fn classify(
    left: ColorSample,
    right: ColorSample,
    config: &ClassifierConfig,
) -> Result<Classification, GlassesError> {
    config.validate()?;

    let left = Dominance::of(left);
    let right = Dominance::of(right);

    let best = [Orientation::RedLeft, Orientation::BlueLeft]
        .into_iter()
        .filter_map(|o| orientation_score(left, right, o, config).map(|score| (o, score)))
        .fold(None, |best: Option<(Orientation, f64)>, (o, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((o, score)),
        });

    let confidence = best.map_or(0.0, |(_, score)| score);
    if !confidence.is_finite() {
        return Err(GlassesError::ClassifierError(format!(
            "confidence is not a number: {confidence}"
        )));
    }

    let wearing_glasses = match config.policy {
        DecisionPolicy::Confidence => confidence > config.decision_threshold,
        DecisionPolicy::OrientationMatch => best.is_some(),
    };

    Ok(Classification {
        wearing_glasses,
        confidence,
        orientation: best.map(|(o, _)| o),
        left,
        right,
    })
}
