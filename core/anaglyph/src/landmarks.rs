//! Eye localization from a dense face landmark mesh.

use image::RgbImage;
use tracing::debug;

use crate::error::GlassesError;
use crate::locator::{EyeLocator, EyePair};
use crate::region::Region;

/// Contour of the eye on the image-left side in the 468-point face mesh.
pub const MESH_EYE_A: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Contour of the eye on the image-right side in the 468-point face mesh.
pub const MESH_EYE_B: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Default padding around each eye contour, as a fraction of its size.
/// The contour hugs the eyelids; the lens filter covers a wider area.
const DEFAULT_PADDING: f64 = 0.15;

/// Landmark points of one face, indexed by mesh vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceLandmarks {
    /// `(x, y)` pixel coordinates per mesh vertex.
    pub points: Vec<(f64, f64)>,
}

impl FaceLandmarks {
    /// Wrap a list of `(x, y)` points.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    fn extent(&self) -> u64 {
        Region::bounding(self.points.iter().copied()).map_or(0, |r| r.area())
    }

    /// Padded bounds of one eye contour. Every index must resolve to a finite
    /// point; a partial contour collapses toward a single pixel.
    fn eye_region(&self, indices: &[usize], padding: f64) -> Option<Region> {
        let points = indices
            .iter()
            .map(|&i| {
                self.points
                    .get(i)
                    .copied()
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
            })
            .collect::<Option<Vec<_>>>()?;
        Region::bounding(points).map(|region| region.padded(padding))
    }
}

/// Pluggable landmark-mesh backend.
pub trait LandmarkDetector: Send + Sync {
    /// Detect every face in the image and return its landmarks.
    fn detect(&self, image: &RgbImage) -> Vec<FaceLandmarks>;
}

/// Locator that derives eye regions from named landmark indices.
pub struct LandmarkLocator {
    detector: Box<dyn LandmarkDetector>,
    eye_a: Vec<usize>,
    eye_b: Vec<usize>,
    padding: f64,
}

impl LandmarkLocator {
    /// Use `detector` with the 468-point face-mesh eye contours.
    pub fn new(detector: impl LandmarkDetector + 'static) -> Self {
        Self {
            detector: Box::new(detector),
            eye_a: MESH_EYE_A.to_vec(),
            eye_b: MESH_EYE_B.to_vec(),
            padding: DEFAULT_PADDING,
        }
    }

    /// Use custom landmark indices for the two eyes, for meshes with a
    /// different topology. Order does not matter.
    pub fn eye_indices(mut self, eye_a: Vec<usize>, eye_b: Vec<usize>) -> Self {
        self.eye_a = eye_a;
        self.eye_b = eye_b;
        self
    }

    /// Set the padding added around each eye contour (default: 0.15).
    pub fn padding(mut self, fraction: f64) -> Self {
        self.padding = fraction;
        self
    }
}

impl EyeLocator for LandmarkLocator {
    fn locate(&self, image: &RgbImage) -> Result<EyePair, GlassesError> {
        let faces = self.detector.detect(image);
        debug!(count = faces.len(), "landmark detection finished");

        let face = faces
            .iter()
            .filter(|face| !face.points.is_empty())
            .max_by_key(|face| face.extent())
            .ok_or(GlassesError::NoFaceDetected)?;

        let eye_a = face.eye_region(&self.eye_a, self.padding);
        let eye_b = face.eye_region(&self.eye_b, self.padding);

        match (eye_a, eye_b) {
            (Some(a), Some(b)) => Ok(EyePair::from_unordered(a, b)),
            (a, b) => Err(GlassesError::InsufficientEyeRegions {
                found: usize::from(a.is_some()) + usize::from(b.is_some()),
            }),
        }
    }
}
