use std::fmt;

use serde::Serialize;

use crate::face_detector::Bounds;

/// Which eye a region belongs to, by horizontal position in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    /// The eye closer to the left edge of the image.
    Left,
    /// The eye closer to the right edge of the image.
    Right,
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eye::Left => f.write_str("left"),
            Eye::Right => f.write_str("right"),
        }
    }
}

/// Axis-aligned rectangle in image pixel coordinates.
///
/// The origin may be negative and the extent may run past the image edge;
/// [`Region::clip`] produces the part that actually covers pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Left edge (pixels).
    pub x: i32,
    /// Top edge (pixels).
    pub y: i32,
    /// Width (pixels).
    pub width: u32,
    /// Height (pixels).
    pub height: u32,
}

impl Region {
    /// Create a region from its top-left corner and size.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered, ignoring the image bounds.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Horizontal center, used to tell the left eye from the right one.
    pub fn center_x(&self) -> f64 {
        f64::from(self.x) + f64::from(self.width) / 2.0
    }

    /// Round a detector box to whole pixels.
    ///
    /// Returns `None` for boxes with non-finite coordinates or no area.
    pub fn from_bounds(bounds: &Bounds) -> Option<Self> {
        if !bounds.is_usable() {
            return None;
        }
        let region = Self {
            x: bounds.x.round() as i32,
            y: bounds.y.round() as i32,
            width: bounds.width.round() as u32,
            height: bounds.height.round() as u32,
        };
        (region.width > 0 && region.height > 0).then_some(region)
    }

    /// Smallest region containing every finite point.
    ///
    /// A single point (or a set of collinear points) still yields a region at
    /// least one pixel wide and tall. Returns `None` when no point is finite
    /// or when the extent does not fit pixel coordinates.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut extent: Option<(f64, f64, f64, f64)> = None;
        for (px, py) in points {
            if !px.is_finite() || !py.is_finite() {
                continue;
            }
            extent = Some(match extent {
                None => (px, py, px, py),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(px), min_y.min(py), max_x.max(px), max_y.max(py))
                }
            });
        }

        let (min_x, min_y, max_x, max_y) = extent?;
        let (x, width) = pixel_span(min_x, max_x)?;
        let (y, height) = pixel_span(min_y, max_y)?;
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Grow the region on every side by `fraction` of its own size.
    pub fn padded(&self, fraction: f64) -> Self {
        if !fraction.is_finite() || fraction <= 0.0 {
            return *self;
        }
        let pad_x = pad_amount(self.width, fraction);
        let pad_y = pad_amount(self.height, fraction);
        Self {
            x: saturate_i32(i64::from(self.x) - i64::from(pad_x)),
            y: saturate_i32(i64::from(self.y) - i64::from(pad_y)),
            width: self.width.saturating_add(pad_x.saturating_mul(2)),
            height: self.height.saturating_add(pad_y.saturating_mul(2)),
        }
    }

    /// Intersect with a `image_width` × `image_height` image.
    ///
    /// The returned region has a non-negative origin and lies fully inside
    /// the image. Returns `None` when the intersection is empty.
    pub fn clip(&self, image_width: u32, image_height: u32) -> Option<Self> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.width)).min(i64::from(image_width));
        let y1 = (i64::from(self.y) + i64::from(self.height)).min(i64::from(image_height));

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Self {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Whole-pixel origin and length covering `[min, max]`, at least one pixel
/// long. `None` when the span does not fit the `i32`/`u32` pixel range.
fn pixel_span(min: f64, max: f64) -> Option<(i32, u32)> {
    let start = min.floor();
    let end = max.ceil();
    if start < f64::from(i32::MIN) || end > f64::from(i32::MAX) {
        return None;
    }
    let length = (end - start).max(1.0);
    if length > f64::from(u32::MAX) {
        return None;
    }
    Some((start as i32, length as u32))
}

fn pad_amount(length: u32, fraction: f64) -> u32 {
    (f64::from(length) * fraction)
        .round()
        .min(f64::from(u32::MAX)) as u32
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
