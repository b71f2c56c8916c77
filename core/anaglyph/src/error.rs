use serde::Serialize;
use thiserror::Error;

use crate::region::Eye;

/// Everything that can stop an image from being classified.
#[derive(Debug, Error)]
pub enum GlassesError {
    /// The input bytes or data URL did not yield an image.
    #[error("failed to decode image: {0}")]
    DecodeFailure(String),

    /// The localizer found no face.
    #[error("no face detected")]
    NoFaceDetected,

    /// Fewer than two usable eye candidates.
    #[error("expected two eye regions, found {found}")]
    InsufficientEyeRegions {
        /// Usable candidates that were found.
        found: usize,
    },

    /// An eye region lies entirely outside the image.
    #[error("{eye} eye region does not overlap the image")]
    EmptyRegion {
        /// The side whose region was empty.
        eye: Eye,
    },

    /// Invalid configuration or a non-finite score.
    #[error("classification failed: {0}")]
    ClassifierError(String),

    /// The face detection model could not be read.
    #[error("failed to load detection model: {0}")]
    ModelLoad(String),
}

/// Machine-readable failure code carried by a negative [`crate::DetectionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// The image could not be materialized.
    DecodeFailure,
    /// The localizer found nothing face-like.
    NoFaceDetected,
    /// Fewer than two eye candidates were found.
    InsufficientEyeRegions,
    /// An eye region had no pixels left after clipping.
    EmptyRegion,
    /// Internal failure of the detection stack.
    ClassifierError,
}

impl GlassesError {
    /// The failure code reported for this error.
    pub fn reason(&self) -> FailureReason {
        match self {
            GlassesError::DecodeFailure(_) => FailureReason::DecodeFailure,
            GlassesError::NoFaceDetected => FailureReason::NoFaceDetected,
            GlassesError::InsufficientEyeRegions { .. } => FailureReason::InsufficientEyeRegions,
            GlassesError::EmptyRegion { .. } => FailureReason::EmptyRegion,
            GlassesError::ClassifierError(_) | GlassesError::ModelLoad(_) => {
                FailureReason::ClassifierError
            }
        }
    }

    /// Whether the error is an expected "nothing to classify" outcome rather
    /// than a fault. Expected outcomes are reported by reason code only.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            GlassesError::NoFaceDetected | GlassesError::InsufficientEyeRegions { .. }
        )
    }
}
