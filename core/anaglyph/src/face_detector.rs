/// Bounding box reported by a face or eye detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score. Only compared within one detector's output.
    pub confidence: f64,
}

impl Bounds {
    /// Area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The same box shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Finite coordinates and a positive size.
    pub(crate) fn is_usable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib, etc.)
/// and pass it to [`crate::CascadeLocator::new`].
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Bounds>;
}

/// Pluggable eye detection backend, run on the crop of a single face.
pub trait EyeDetector: Send + Sync {
    /// Detect eye candidates in a row-major grayscale face crop of
    /// `width` × `height` bytes. Coordinates are relative to the crop.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Bounds>;
}
