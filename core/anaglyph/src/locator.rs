use image::RgbImage;
use tracing::debug;

use crate::error::GlassesError;
use crate::face_detector::{Bounds, EyeDetector, FaceDetector};
use crate::region::Region;

/// Left and right eye regions, ordered by horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyePair {
    /// The eye closer to the left edge of the image.
    pub left: Region,
    /// The eye closer to the right edge of the image.
    pub right: Region,
}

impl EyePair {
    /// Order two regions by their left edge (then by center on a tie).
    pub fn from_unordered(a: Region, b: Region) -> Self {
        let a_first = (a.x, a.center_x()) <= (b.x, b.center_x());
        if a_first {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }
}

/// Maps an image to its two eye regions.
///
/// Any face or landmark detector can sit behind this trait; the rest of the
/// pipeline only sees the resulting [`EyePair`].
pub trait EyeLocator: Send + Sync {
    /// Locate both eyes, or fail with [`GlassesError::NoFaceDetected`] /
    /// [`GlassesError::InsufficientEyeRegions`].
    fn locate(&self, image: &RgbImage) -> Result<EyePair, GlassesError>;
}

/// Reduce eye candidates to the best two, ordered left to right.
///
/// Candidates are ranked by area (larger first, ties broken by higher
/// confidence) and only the top two survive. Ordering by position happens
/// after that cut, so small spurious detections at the image edges never
/// displace a real eye.
pub fn select_eye_pair(candidates: Vec<Bounds>) -> Result<EyePair, GlassesError> {
    let mut usable: Vec<(Bounds, Region)> = candidates
        .into_iter()
        .filter_map(|bounds| Region::from_bounds(&bounds).map(|region| (bounds, region)))
        .collect();

    if usable.len() < 2 {
        return Err(GlassesError::InsufficientEyeRegions {
            found: usable.len(),
        });
    }

    usable.sort_by(|(a, _), (b, _)| {
        b.area()
            .total_cmp(&a.area())
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });

    Ok(EyePair::from_unordered(usable[0].1, usable[1].1))
}

/// Two-stage locator: find the largest face, then look for eyes inside it.
pub struct CascadeLocator {
    faces: Box<dyn FaceDetector>,
    eyes: Box<dyn EyeDetector>,
}

impl CascadeLocator {
    /// Combine a face detector with an eye detector that runs on each face crop.
    pub fn new(faces: impl FaceDetector + 'static, eyes: impl EyeDetector + 'static) -> Self {
        Self {
            faces: Box::new(faces),
            eyes: Box::new(eyes),
        }
    }
}

impl EyeLocator for CascadeLocator {
    fn locate(&self, image: &RgbImage) -> Result<EyePair, GlassesError> {
        let gray = image::imageops::grayscale(image);
        let (width, height) = gray.dimensions();

        let faces = self.faces.detect(gray.as_raw(), width, height);
        debug!(count = faces.len(), "face detection finished");

        let face = faces
            .iter()
            .filter_map(|bounds| Region::from_bounds(bounds)?.clip(width, height))
            .max_by_key(Region::area)
            .ok_or(GlassesError::NoFaceDetected)?;

        let crop = image::imageops::crop_imm(
            &gray,
            face.x as u32,
            face.y as u32,
            face.width,
            face.height,
        )
        .to_image();

        let candidates: Vec<Bounds> = self
            .eyes
            .detect(crop.as_raw(), crop.width(), crop.height())
            .iter()
            .map(|eye| eye.translated(f64::from(face.x), f64::from(face.y)))
            .collect();
        debug!(count = candidates.len(), ?face, "eye detection finished");

        select_eye_pair(candidates)
    }
}

/// Fixed eye regions supplied by the caller.
///
/// Useful when an upstream component has already located the eyes.
#[derive(Debug, Clone, Copy)]
pub struct StaticEyeRegions {
    pair: EyePair,
}

impl StaticEyeRegions {
    /// Use `a` and `b` as the eye regions, in either order.
    pub fn new(a: Region, b: Region) -> Self {
        Self {
            pair: EyePair::from_unordered(a, b),
        }
    }
}

impl EyeLocator for StaticEyeRegions {
    fn locate(&self, _image: &RgbImage) -> Result<EyePair, GlassesError> {
        Ok(self.pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x: f64, width: f64, height: f64, confidence: f64) -> Bounds {
        Bounds {
            x,
            y: 10.0,
            width,
            height,
            confidence,
        }
    }

    struct FixedBoxes(Vec<Bounds>);

    impl FaceDetector for FixedBoxes {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<Bounds> {
            self.0.clone()
        }
    }

    impl EyeDetector for FixedBoxes {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<Bounds> {
            self.0.clone()
        }
    }

    #[test]
    fn keeps_two_largest_then_orders_by_x() {
        // Areas 50, 200, 180 at x = 10, 100, 50.
        let pair = select_eye_pair(vec![
            candidate(10.0, 5.0, 10.0, 1.0),
            candidate(100.0, 10.0, 20.0, 1.0),
            candidate(50.0, 10.0, 18.0, 1.0),
        ])
        .unwrap();

        assert_eq!(pair.left, Region::new(50, 10, 10, 18));
        assert_eq!(pair.right, Region::new(100, 10, 10, 20));
    }

    #[test]
    fn equal_areas_prefer_higher_confidence() {
        let pair = select_eye_pair(vec![
            candidate(0.0, 10.0, 10.0, 0.2),
            candidate(40.0, 10.0, 10.0, 0.9),
            candidate(80.0, 10.0, 10.0, 0.8),
        ])
        .unwrap();

        assert_eq!(pair.left.x, 40);
        assert_eq!(pair.right.x, 80);
    }

    #[test]
    fn two_candidates_are_only_reordered() {
        let pair = select_eye_pair(vec![
            candidate(70.0, 10.0, 10.0, 1.0),
            candidate(20.0, 12.0, 10.0, 1.0),
        ])
        .unwrap();

        assert_eq!(pair.left.x, 20);
        assert_eq!(pair.right.x, 70);
    }

    #[test]
    fn fewer_than_two_candidates_fails() {
        let err = select_eye_pair(vec![candidate(0.0, 10.0, 10.0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            GlassesError::InsufficientEyeRegions { found: 1 }
        ));
    }

    #[test]
    fn degenerate_candidates_do_not_count() {
        let err = select_eye_pair(vec![
            candidate(0.0, 10.0, 10.0, 1.0),
            candidate(30.0, 0.0, 10.0, 1.0),
            candidate(f64::NAN, 10.0, 10.0, 1.0),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            GlassesError::InsufficientEyeRegions { found: 1 }
        ));
    }

    #[test]
    fn cascade_without_faces_reports_no_face() {
        let locator = CascadeLocator::new(FixedBoxes(vec![]), FixedBoxes(vec![]));
        let image = RgbImage::new(64, 64);
        assert!(matches!(
            locator.locate(&image),
            Err(GlassesError::NoFaceDetected)
        ));
    }

    #[test]
    fn cascade_ignores_faces_outside_the_image() {
        let off_image = Bounds {
            x: 200.0,
            y: 200.0,
            width: 40.0,
            height: 40.0,
            confidence: 5.0,
        };
        let locator = CascadeLocator::new(FixedBoxes(vec![off_image]), FixedBoxes(vec![]));
        let image = RgbImage::new(64, 64);
        assert!(matches!(
            locator.locate(&image),
            Err(GlassesError::NoFaceDetected)
        ));
    }

    #[test]
    fn cascade_translates_eyes_into_image_coordinates() {
        let face = Bounds {
            x: 20.0,
            y: 30.0,
            width: 60.0,
            height: 60.0,
            confidence: 5.0,
        };
        let eyes = vec![
            Bounds {
                x: 35.0,
                y: 15.0,
                width: 15.0,
                height: 10.0,
                confidence: 1.0,
            },
            Bounds {
                x: 5.0,
                y: 15.0,
                width: 15.0,
                height: 10.0,
                confidence: 1.0,
            },
        ];
        let locator = CascadeLocator::new(FixedBoxes(vec![face]), FixedBoxes(eyes));
        let pair = locator.locate(&RgbImage::new(100, 100)).unwrap();

        assert_eq!(pair.left, Region::new(25, 45, 15, 10));
        assert_eq!(pair.right, Region::new(55, 45, 15, 10));
    }

    #[test]
    fn static_regions_are_ordered() {
        let locator = StaticEyeRegions::new(Region::new(60, 0, 5, 5), Region::new(10, 0, 5, 5));
        let pair = locator.locate(&RgbImage::new(1, 1)).unwrap();
        assert_eq!(pair.left.x, 10);
        assert_eq!(pair.right.x, 60);
    }
}
