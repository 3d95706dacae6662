//! Feature detection
//!
//! Produces raw geometric candidates from a color image: line segments
//! from a probabilistic Hough transform over a Canny edge map, and circle
//! candidates from a gradient Hough transform over the denoised grayscale.

pub mod circles;
pub mod lines;
pub mod preprocess;

pub use circles::CircleDetector;
pub use lines::LineDetector;
pub use preprocess::{Preprocessed, Preprocessor};

use opencv::{core::Mat, prelude::*};
use tracing::debug;

use crate::config::MeasurementConfig;
use crate::error::Result;
use crate::geometry::{CircleCandidate, LineSegment};

/// Raw detections plus the raster they were found on.
#[derive(Debug)]
pub struct Features {
    /// Color image the coordinates refer to (downscaled input)
    pub image: Mat,
    pub segments: Vec<LineSegment>,
    pub circles: Vec<CircleCandidate>,
    /// Ratio of processed to original size
    pub scale: f64,
}

impl Features {
    pub fn width(&self) -> i32 {
        self.image.cols()
    }

    pub fn height(&self) -> i32 {
        self.image.rows()
    }
}

/// Preprocessing followed by line and circle detection.
pub struct FeatureDetector {
    config: MeasurementConfig,
}

impl Default for FeatureDetector {
    fn default() -> Self {
        Self::new(MeasurementConfig::default())
    }
}

impl FeatureDetector {
    pub fn new(config: MeasurementConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, image: &Mat) -> Result<Features> {
        let pre = Preprocessor::new(self.config.preprocessing.clone()).run(image)?;

        let factor = self
            .config
            .preprocessing
            .scale_factor(pre.image.cols(), pre.image.rows());
        let lines = LineDetector::new(self.config.lines.scaled(factor));
        let circles = CircleDetector::new(self.config.circles.scaled(factor));

        let segments = lines.detect(&pre.edges)?;
        let circles = circles.detect(&pre.denoised)?;

        debug!(
            segments = segments.len(),
            circles = circles.len(),
            parameter_scale = factor,
            "Feature detection complete"
        );

        Ok(Features {
            image: pre.image,
            segments,
            circles,
            scale: pre.scale,
        })
    }
}
