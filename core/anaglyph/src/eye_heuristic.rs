use crate::face_detector::{Bounds, EyeDetector};

/// Vertical position of the eye centers within a face box.
/// 0.0 = top, 0.5 = center, 1.0 = bottom.
const EYE_LINE: f64 = 0.4;

/// Horizontal distance of each eye center from the face center,
/// as a fraction of the face width.
const EYE_SPREAD: f64 = 0.2;

/// Eye box size as a fraction of the face box.
const EYE_WIDTH: f64 = 0.26;
const EYE_HEIGHT: f64 = 0.16;

/// Proposes both eye boxes from standard frontal-face proportions.
///
/// Lets a face-only detector (such as SeetaFace) drive a
/// [`crate::CascadeLocator`]. The pixel content is not inspected: for a face
/// box of any size it always returns exactly two candidates.
#[derive(Debug, Clone)]
pub struct ProportionalEyeDetector {
    eye_line: f64,
    eye_spread: f64,
    eye_width: f64,
    eye_height: f64,
}

impl Default for ProportionalEyeDetector {
    fn default() -> Self {
        Self {
            eye_line: EYE_LINE,
            eye_spread: EYE_SPREAD,
            eye_width: EYE_WIDTH,
            eye_height: EYE_HEIGHT,
        }
    }
}

impl ProportionalEyeDetector {
    /// Detector with the default frontal-face proportions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vertical position of the eye line (default: 0.4).
    pub fn eye_line(mut self, fraction: f64) -> Self {
        self.eye_line = fraction;
        self
    }

    /// Set the size of each eye box relative to the face (default: 0.26 × 0.16).
    pub fn eye_size(mut self, width_fraction: f64, height_fraction: f64) -> Self {
        self.eye_width = width_fraction;
        self.eye_height = height_fraction;
        self
    }

    fn eye_box(&self, center_x: f64, face_width: f64, face_height: f64) -> Bounds {
        let width = face_width * self.eye_width;
        let height = face_height * self.eye_height;
        Bounds {
            x: center_x - width / 2.0,
            y: face_height * self.eye_line - height / 2.0,
            width,
            height,
            confidence: 1.0,
        }
    }
}

impl EyeDetector for ProportionalEyeDetector {
    fn detect(&self, _gray: &[u8], width: u32, height: u32) -> Vec<Bounds> {
        let (w, h) = (f64::from(width), f64::from(height));
        let center = w / 2.0;
        vec![
            self.eye_box(center - w * self.eye_spread, w, h),
            self.eye_box(center + w * self.eye_spread, w, h),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_eyes_symmetrically() {
        let eyes = ProportionalEyeDetector::new().detect(&[], 100, 100);
        assert_eq!(eyes.len(), 2);

        let (left, right) = (&eyes[0], &eyes[1]);
        assert!((left.x - 17.0).abs() < 1e-9);
        assert!((right.x - 57.0).abs() < 1e-9);
        assert!((left.y - 32.0).abs() < 1e-9);
        assert_eq!(left.width, right.width);
        assert_eq!(left.y, right.y);
    }

    #[test]
    fn eyes_stay_inside_the_face() {
        let eyes = ProportionalEyeDetector::new().detect(&[], 37, 53);
        for eye in &eyes {
            assert!(eye.x >= 0.0 && eye.x + eye.width <= 37.0);
            assert!(eye.y >= 0.0 && eye.y + eye.height <= 53.0);
        }
    }

    #[test]
    fn overrides_apply() {
        let eyes = ProportionalEyeDetector::new()
            .eye_line(0.5)
            .eye_size(0.2, 0.2)
            .detect(&[], 100, 100);
        assert!((eyes[0].y - 40.0).abs() < 1e-9);
        assert!((eyes[0].width - 20.0).abs() < 1e-9);
    }
}
