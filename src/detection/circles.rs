//! Gradient Hough circle candidates

use opencv::{
    core::{Mat, Vec3f, Vector},
    imgproc::{hough_circles, HOUGH_GRADIENT},
};

use crate::config::CircleDetectionConfig;
use crate::error::{MeasurementError, Result};
use crate::geometry::CircleCandidate;

pub struct CircleDetector {
    config: CircleDetectionConfig,
}

impl Default for CircleDetector {
    fn default() -> Self {
        Self::new(CircleDetectionConfig::default())
    }
}

impl CircleDetector {
    pub fn new(config: CircleDetectionConfig) -> Self {
        Self { config }
    }

    /// Detect circles on a denoised single-channel image.
    ///
    /// Candidates come back in accumulator order (strongest first).
    pub fn detect(&self, gray: &Mat) -> Result<Vec<CircleCandidate>> {
        let mut circles = Vector::<Vec3f>::new();
        hough_circles(
            gray,
            &mut circles,
            HOUGH_GRADIENT,
            self.config.dp,
            self.config.min_center_distance,
            self.config.canny_high_threshold,
            self.config.accumulator_threshold,
            self.config.min_radius,
            self.config.max_radius,
        )
        .map_err(|e| MeasurementError::opencv("Hough circles", e))?;

        Ok(circles
            .iter()
            .map(|c| CircleCandidate::new(c[0], c[1], c[2]))
            .collect())
    }
}
