use std::fmt;

use image::{GenericImageView, RgbImage};
use serde::Serialize;

use crate::region::Region;

/// One RGB triple, each channel in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "[u8; 3]")]
pub struct ColorSample {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ColorSample {
    /// Create a sample from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<ColorSample> for [u8; 3] {
    fn from(color: ColorSample) -> Self {
        [color.r, color.g, color.b]
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Representative color of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionColor {
    /// Per-channel median, or `(0, 0, 0)` when no pixel was sampled.
    pub color: ColorSample,
    /// Number of pixels that contributed.
    pub pixel_count: usize,
}

impl RegionColor {
    /// `true` when the region missed the image entirely.
    ///
    /// The color is then a placeholder and carries no signal; it must not be
    /// read as "very dark".
    pub fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }
}

/// Per-channel median color of the pixels under `region`.
///
/// The region is clipped to the image first. The median (rather than the
/// mean) keeps specular glare on a lens and dark lashes from dragging the
/// result. For an even pixel count the two middle values are averaged and
/// truncated.
pub fn median_color(image: &RgbImage, region: &Region) -> RegionColor {
    let Some(clipped) = region.clip(image.width(), image.height()) else {
        return RegionColor {
            color: ColorSample::default(),
            pixel_count: 0,
        };
    };

    let mut histograms = [[0usize; 256]; 3];
    let view = image::imageops::crop_imm(
        image,
        clipped.x as u32,
        clipped.y as u32,
        clipped.width,
        clipped.height,
    );
    for (_, _, pixel) in view.pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            histograms[channel][usize::from(value)] += 1;
        }
    }

    let pixel_count = clipped.area() as usize;
    let [r, g, b] = histograms.map(|histogram| histogram_median(&histogram, pixel_count));
    RegionColor {
        color: ColorSample::new(r, g, b),
        pixel_count,
    }
}

/// Median of `count` samples stored as a 256-bin histogram.
fn histogram_median(histogram: &[usize; 256], count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    let upper = nth_value(histogram, count / 2);
    if count % 2 == 1 {
        return upper;
    }
    let lower = nth_value(histogram, count / 2 - 1);
    ((u16::from(lower) + u16::from(upper)) / 2) as u8
}

/// The `rank`-th smallest sample (zero-based).
fn nth_value(histogram: &[usize; 256], rank: usize) -> u8 {
    let mut seen = 0;
    for (value, &n) in histogram.iter().enumerate() {
        seen += n;
        if seen > rank {
            return value as u8;
        }
    }
    u8::MAX
}
