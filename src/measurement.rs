//! End-to-end measurement: decode, detect, reason, annotate
//!
//! [`HeightMeasurer::try_measure`] propagates errors for Rust callers. The
//! `measure*` methods never fail: any error becomes an absent height with a
//! [`Failure`] attached, so a bad image can't take down the host.

use opencv::{core::Mat, core::Vector, imgcodecs::imwrite, prelude::*};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::annotate::annotate;
use crate::config::MeasurementConfig;
use crate::detection::FeatureDetector;
use crate::error::{Failure, FailureKind, MeasurementError, Result};
use crate::geometry::{CircleCandidate, GeometricReasoner, Point2, Reasoning};
use crate::image_loader::{decode_image, load_image};

/// Candidate counts at each stage, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub segments: usize,
    pub face_segments: usize,
    pub intersections: usize,
    pub circles: usize,
}

/// Outcome of measuring one image.
///
/// Coordinates refer to the processed (possibly downscaled) image.
#[derive(Debug)]
pub struct Measurement {
    /// `reference_y - circle.y` in pixels; `None` when vertex or circle is missing
    pub height: Option<f64>,
    pub vertex: Option<Point2>,
    pub circle: Option<CircleCandidate>,
    pub reference_y: Option<f64>,
    pub stats: DetectionStats,
    /// Processed width and height in pixels
    pub image_size: Option<(i32, i32)>,
    /// Ratio of processed to original size
    pub scale: f64,
    /// Processed image with overlays, when annotation is enabled
    pub annotated: Option<Mat>,
    pub failure: Option<Failure>,
}

/// Serializable view of a [`Measurement`], without the raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub height: Option<f64>,
    pub vertex: Option<Point2>,
    pub circle: Option<CircleCandidate>,
    pub reference_y: Option<f64>,
    pub stats: DetectionStats,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
    pub scale: f64,
    pub failure: Option<Failure>,
}

impl Measurement {
    /// A measurement that never got as far as a reasoning result
    pub fn absent(failure: Failure) -> Self {
        Self {
            height: None,
            vertex: None,
            circle: None,
            reference_y: None,
            stats: DetectionStats::default(),
            image_size: None,
            scale: 1.0,
            annotated: None,
            failure: Some(failure),
        }
    }

    pub fn is_measured(&self) -> bool {
        self.height.is_some()
    }

    pub fn report(&self) -> MeasurementReport {
        MeasurementReport {
            height: self.height,
            vertex: self.vertex,
            circle: self.circle,
            reference_y: self.reference_y,
            stats: self.stats,
            image_width: self.image_size.map(|(w, _)| w),
            image_height: self.image_size.map(|(_, h)| h),
            scale: self.scale,
            failure: self.failure.clone(),
        }
    }

    /// Write the annotated image; the format follows the file extension
    pub fn save_annotated(&self, path: &Path) -> Result<()> {
        let annotated = self
            .annotated
            .as_ref()
            .ok_or_else(|| MeasurementError::processing("No annotated image available"))?;
        let path_str = path.to_str().ok_or_else(|| {
            MeasurementError::processing(format!("Invalid output path: {}", path.display()))
        })?;

        let written = imwrite(path_str, annotated, &Vector::new())
            .map_err(|e| MeasurementError::opencv("Annotated image write", e))?;
        if !written {
            return Err(MeasurementError::processing(format!(
                "Could not write annotated image to {}",
                path.display()
            )));
        }
        Ok(())
    }
}

/// The full pipeline for one configuration.
pub struct HeightMeasurer {
    config: MeasurementConfig,
    detector: FeatureDetector,
    reasoner: GeometricReasoner,
}

impl HeightMeasurer {
    /// Build a measurer, rejecting out-of-range configuration values
    pub fn new(config: MeasurementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: FeatureDetector::new(config.clone()),
            reasoner: GeometricReasoner::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    /// Measure a decoded BGR image, propagating pipeline errors
    #[instrument(skip_all, fields(width = image.cols(), height = image.rows()))]
    pub fn try_measure(&self, image: &Mat) -> Result<Measurement> {
        let features = self.detector.detect(image)?;
        let (width, height) = (features.width(), features.height());

        let reasoning = self
            .reasoner
            .reason(&features.segments, &features.circles, width, height);

        let annotated = if self.config.annotation.enabled {
            Some(annotate(&features.image, &reasoning)?)
        } else {
            None
        };

        let failure = reasoning
            .failure_kind(self.reasoner.height_reference())
            .map(|kind| Failure::new(kind, describe_missing(kind, &reasoning)));

        match (&reasoning.height, &failure) {
            (Some(h), _) => info!(height = h, "Height measured"),
            (None, Some(f)) => warn!(kind = ?f.kind, "{}", f.message),
            (None, None) => {}
        }

        Ok(Measurement {
            height: reasoning.height,
            vertex: reasoning.vertex,
            circle: reasoning.circle,
            reference_y: reasoning.reference_y,
            stats: DetectionStats {
                segments: features.segments.len(),
                face_segments: reasoning.face_segments.len(),
                intersections: reasoning.intersections.len(),
                circles: features.circles.len(),
            },
            image_size: Some((width, height)),
            scale: features.scale,
            annotated,
            failure,
        })
    }

    /// Measure a decoded image; errors become an absent result
    pub fn measure(&self, image: &Mat) -> Measurement {
        self.try_measure(image).unwrap_or_else(|e| absent_from(&e))
    }

    /// Load and measure an image file; errors become an absent result
    pub fn measure_file(&self, path: &Path) -> Measurement {
        match load_image(path) {
            Ok(image) => self.measure(&image),
            Err(e) => absent_from(&e),
        }
    }

    /// Decode and measure an in-memory image; errors become an absent result
    pub fn measure_bytes(&self, bytes: &[u8]) -> Measurement {
        match decode_image(bytes) {
            Ok(image) => self.measure(&image),
            Err(e) => absent_from(&e),
        }
    }
}

fn absent_from(error: &MeasurementError) -> Measurement {
    warn!(error = %error, "Measurement failed");
    Measurement::absent(Failure::from(error))
}

fn describe_missing(kind: FailureKind, reasoning: &Reasoning) -> String {
    let what = match kind {
        FailureKind::NoFixtureVertex => "no valid fixture vertex",
        FailureKind::NoTargetCircle => "no circle inside the target band",
        FailureKind::NoFeatures => "neither a fixture vertex nor a target circle",
        FailureKind::UnreadableImage | FailureKind::ProcessingFailed => "no height",
    };
    format!(
        "Found {what} ({} face segments, {} intersections)",
        reasoning.face_segments.len(),
        reasoning.intersections.len()
    )
}
