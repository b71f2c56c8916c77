use std::path::Path;

use crate::error::GlassesError;
use crate::face_detector::{Bounds, FaceDetector};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The SeetaFace frontal model (`seeta_fd_frontal_v1.0.bin`) is not bundled;
/// load it from bytes or from a file. Pair it with
/// [`crate::ProportionalEyeDetector`] inside a [`crate::CascadeLocator`].
pub struct RustfaceDetector {
    model: rustface::Model,
    min_face_size: u32,
}

impl RustfaceDetector {
    /// Load the model from an in-memory buffer.
    pub fn from_model_bytes(model_data: &[u8]) -> Result<Self, GlassesError> {
        let model = rustface::read_model(std::io::Cursor::new(model_data))
            .map_err(|e| GlassesError::ModelLoad(e.to_string()))?;
        Ok(Self {
            model,
            min_face_size: 20,
        })
    }

    /// Load the model from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GlassesError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| GlassesError::ModelLoad(format!("{}: {e}", path.display())))?;
        Self::from_model_bytes(&data)
    }

    /// Smallest face side, in pixels, the detector will report (default: 20).
    pub fn min_face_size(mut self, pixels: u32) -> Self {
        self.min_face_size = pixels;
        self
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Bounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Bounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
