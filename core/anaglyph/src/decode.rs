//! Turning transport encodings into an in-memory RGB image.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, Pixel, RgbImage, Rgba};

use crate::error::GlassesError;

/// Decode JPEG, PNG, or WebP bytes into an RGB image.
///
/// Transparent pixels are composited over white so they read as neutral
/// rather than as black.
pub fn decode_image(input: &[u8]) -> Result<RgbImage, GlassesError> {
    let decoded =
        image::load_from_memory(input).map_err(|e| GlassesError::DecodeFailure(e.to_string()))?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(GlassesError::DecodeFailure(
            "image dimensions are zero".to_string(),
        ));
    }

    Ok(flatten_alpha(&decoded))
}

/// Decode a `data:image/...;base64,` URL or a bare base64 string.
pub fn decode_data_url(input: &str) -> Result<RgbImage, GlassesError> {
    let trimmed = input.trim();
    let encoded = if trimmed.starts_with("data:") {
        let (header, payload) = trimmed.split_once(',').ok_or_else(|| {
            GlassesError::DecodeFailure("data URL has no payload".to_string())
        })?;
        if !header.ends_with(";base64") {
            return Err(GlassesError::DecodeFailure(format!(
                "unsupported data URL encoding: {header}"
            )));
        }
        payload
    } else {
        trimmed
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| GlassesError::DecodeFailure(format!("invalid base64: {e}")))?;
    decode_image(&bytes)
}

/// Composite every pixel over an opaque white backdrop.
fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let mut backdrop = Rgba([255, 255, 255, 255]);
        backdrop.blend(rgba.get_pixel(x, y));
        backdrop.to_rgb()
    })
}
