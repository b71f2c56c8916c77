//! Glasses detection binary: one image in, one JSON result line out.
//!
//! The image is a `data:image/...;base64,` URL or a bare base64 string, given
//! as the only positional argument or piped on stdin (webcam frames are too
//! large for some argument limits). Logs go to stderr so stdout stays a
//! single JSON document.

use std::io::Read;
use std::path::PathBuf;

use anaglyph::{
    CascadeLocator, DecisionPolicy, DetectionResult, EyeLocator, GlassesDetector, GlassesError,
    Preset, ProportionalEyeDetector, Region, RustfaceDetector, StaticEyeRegions,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image as a data URL or bare base64 string (read from stdin when omitted)
    image: Option<String>,

    /// SeetaFace frontal face model (seeta_fd_frontal_v1.0.bin)
    #[arg(long, env = "ANAGLYPH_FACE_MODEL")]
    model: Option<PathBuf>,

    /// Left eye region as x,y,width,height; skips face detection
    #[arg(long, value_parser = parse_region, requires = "right_eye")]
    left_eye: Option<Region>,

    /// Right eye region as x,y,width,height; skips face detection
    #[arg(long, value_parser = parse_region, requires = "left_eye")]
    right_eye: Option<Region>,

    /// Classifier preset
    #[arg(long, value_enum, default_value_t = PresetArg::Cascade, env = "ANAGLYPH_PRESET")]
    preset: PresetArg,

    /// Minimum red/blue dominance for a lens signature (overrides preset)
    #[arg(long, env = "ANAGLYPH_SIGNATURE_THRESHOLD")]
    signature_threshold: Option<f64>,

    /// Dominance that maps to confidence 1.0 (overrides preset)
    #[arg(long, env = "ANAGLYPH_CONFIDENCE_NORMALIZER")]
    confidence_normalizer: Option<f64>,

    /// Confidence a positive result must exceed (overrides preset)
    #[arg(long, env = "ANAGLYPH_DECISION_THRESHOLD")]
    decision_threshold: Option<f64>,

    /// Decision policy (overrides preset)
    #[arg(long, value_enum, env = "ANAGLYPH_POLICY")]
    policy: Option<PolicyArg>,

    /// Pretty-print the JSON result
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    Cascade,
    Landmark,
}

impl From<PresetArg> for Preset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Cascade => Preset::Cascade,
            PresetArg::Landmark => Preset::Landmark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Confidence,
    OrientationMatch,
}

impl From<PolicyArg> for DecisionPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Confidence => DecisionPolicy::Confidence,
            PolicyArg::OrientationMatch => DecisionPolicy::OrientationMatch,
        }
    }
}

fn parse_region(value: &str) -> Result<Region, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, width, height] = parts.as_slice() else {
        return Err(format!("expected x,y,width,height, got {value:?}"));
    };
    let x = x.parse::<i32>().map_err(|e| format!("invalid x: {e}"))?;
    let y = y.parse::<i32>().map_err(|e| format!("invalid y: {e}"))?;
    let width = width
        .parse::<u32>()
        .map_err(|e| format!("invalid width: {e}"))?;
    let height = height
        .parse::<u32>()
        .map_err(|e| format!("invalid height: {e}"))?;
    Ok(Region::new(x, y, width, height))
}

fn build_locator(args: &Args) -> Result<Box<dyn EyeLocator>, GlassesError> {
    if let (Some(left), Some(right)) = (args.left_eye, args.right_eye) {
        return Ok(Box::new(StaticEyeRegions::new(left, right)));
    }

    let model = args.model.as_ref().ok_or_else(|| {
        GlassesError::ModelLoad(
            "no face model given; pass --model or set ANAGLYPH_FACE_MODEL".to_string(),
        )
    })?;
    let faces = RustfaceDetector::from_path(model)?;
    Ok(Box::new(CascadeLocator::new(
        faces,
        ProportionalEyeDetector::new(),
    )))
}

/// Apply the preset, then any individual overrides.
fn configure(detector: GlassesDetector, args: &Args) -> GlassesDetector {
    let mut detector = detector.preset(args.preset.into());
    if let Some(threshold) = args.signature_threshold {
        detector = detector.signature_threshold(threshold);
    }
    if let Some(normalizer) = args.confidence_normalizer {
        detector = detector.confidence_normalizer(normalizer);
    }
    if let Some(threshold) = args.decision_threshold {
        detector = detector.decision_threshold(threshold);
    }
    if let Some(policy) = args.policy {
        detector = detector.policy(policy.into());
    }
    detector
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("anaglyph=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn read_input(args: &Args) -> anyhow::Result<String> {
    if let Some(image) = &args.image {
        return Ok(image.clone());
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read image from stdin")?;
    Ok(buffer)
}

/// Result for one request; an unreadable input still yields a result.
fn respond(args: &Args, input: anyhow::Result<String>) -> DetectionResult {
    match input {
        Ok(input) => {
            info!(bytes = input.len(), "received image");
            run(args, &input)
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "failed to read image");
            DetectionResult::failure(&GlassesError::DecodeFailure(message))
        }
    }
}

fn run(args: &Args, input: &str) -> DetectionResult {
    match build_locator(args) {
        Ok(locator) => configure(GlassesDetector::from_boxed(locator), args).detect_data_url(input),
        Err(err) => {
            error!(error = %err, "failed to set up eye locator");
            DetectionResult::failure(&err)
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let result = respond(&args, read_input(&args));
    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anaglyph::FailureReason;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("detect-glasses").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn parses_region() {
        assert_eq!(parse_region("10, 20,30,40"), Ok(Region::new(10, 20, 30, 40)));
        assert_eq!(parse_region("-4,0,8,8"), Ok(Region::new(-4, 0, 8, 8)));
    }

    #[test]
    fn rejects_malformed_region() {
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,3,-4").is_err());
        assert!(parse_region("a,2,3,4").is_err());
    }

    #[test]
    fn eye_regions_must_come_in_pairs() {
        let result =
            Args::try_parse_from(["detect-glasses", "--left-eye", "0,0,4,4", "abc"]);
        assert!(result.is_err());
    }

    #[test]
    fn overrides_follow_preset() {
        let args = parse(&[
            "--left-eye",
            "0,0,4,4",
            "--right-eye",
            "8,0,4,4",
            "--preset",
            "landmark",
            "--signature-threshold",
            "12",
            "--policy",
            "confidence",
        ]);
        let locator = build_locator(&args).unwrap();
        let detector = configure(GlassesDetector::from_boxed(locator), &args);

        assert_eq!(detector.config().signature_threshold, 12.0);
        assert_eq!(detector.config().policy, DecisionPolicy::Confidence);
    }

    #[test]
    fn missing_model_is_reported_as_result() {
        let args = Args {
            image: None,
            model: None,
            left_eye: None,
            right_eye: None,
            preset: PresetArg::Cascade,
            signature_threshold: None,
            confidence_normalizer: None,
            decision_threshold: None,
            policy: None,
            pretty: false,
        };
        let result = run(&args, "irrelevant");

        assert!(!result.wearing_glasses);
        assert_eq!(result.reason, Some(FailureReason::ClassifierError));
        assert!(result.error.unwrap().contains("--model"));
    }

    #[test]
    fn unreadable_input_is_reported_as_result() {
        let args = parse(&["--left-eye", "0,0,4,4", "--right-eye", "8,0,4,4"]);
        let input: anyhow::Result<String> = Err(anyhow::anyhow!("stream did not contain valid UTF-8"))
            .context("failed to read image from stdin");
        let result = respond(&args, input);

        assert!(!result.wearing_glasses);
        assert_eq!(result.reason, Some(FailureReason::DecodeFailure));
        assert!(result.error.unwrap().contains("valid UTF-8"));
    }

    #[test]
    fn static_regions_skip_detection() {
        let args = parse(&["--left-eye", "0,0,4,4", "--right-eye", "8,0,4,4"]);
        let result = run(&args, "not base64 at all!");
        assert_eq!(result.reason, Some(FailureReason::DecodeFailure));
    }
}
