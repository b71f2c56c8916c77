use image::RgbImage;
use tracing::debug;

use crate::classifier::{classify, ClassifierConfig};
use crate::color::median_color;
use crate::error::GlassesError;
use crate::locator::EyeLocator;
use crate::region::Eye;
use crate::result::{DetectionResult, Details};

/// Full detection pipeline: locate → summarize both eyes → classify.
pub(crate) fn detection_pipeline(
    image: &RgbImage,
    locator: &dyn EyeLocator,
    config: &ClassifierConfig,
) -> Result<DetectionResult, GlassesError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(GlassesError::DecodeFailure(
            "image dimensions are zero".to_string(),
        ));
    }
    config.validate()?;

    let eyes = locator.locate(image)?;
    debug!(left = ?eyes.left, right = ?eyes.right, "eye regions located");

    let left = median_color(image, &eyes.left);
    if left.is_empty() {
        return Err(GlassesError::EmptyRegion { eye: Eye::Left });
    }
    let right = median_color(image, &eyes.right);
    if right.is_empty() {
        return Err(GlassesError::EmptyRegion { eye: Eye::Right });
    }
    debug!(
        left = %left.color,
        right = %right.color,
        "eye colors summarized"
    );

    let classification = classify(left.color, right.color, config)?;
    debug!(
        wearing_glasses = classification.wearing_glasses,
        confidence = classification.confidence,
        orientation = ?classification.orientation,
        "classification finished"
    );

    let details = Details::new(
        left.color,
        right.color,
        eyes.left,
        eyes.right,
        &classification,
    );
    Ok(DetectionResult::success(&classification, details))
}
