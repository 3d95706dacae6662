//! Probabilistic Hough line segments

use opencv::{
    core::{Mat, Vec4i, Vector},
    imgproc::hough_lines_p,
};

use crate::config::LineDetectionConfig;
use crate::error::{MeasurementError, Result};
use crate::geometry::LineSegment;

pub struct LineDetector {
    config: LineDetectionConfig,
}

impl Default for LineDetector {
    fn default() -> Self {
        Self::new(LineDetectionConfig::default())
    }
}

impl LineDetector {
    pub fn new(config: LineDetectionConfig) -> Self {
        Self { config }
    }

    /// Detect segments on a binary edge map
    pub fn detect(&self, edges: &Mat) -> Result<Vec<LineSegment>> {
        let mut lines = Vector::<Vec4i>::new();
        hough_lines_p(
            edges,
            &mut lines,
            self.config.rho,
            self.config.theta_degrees.to_radians(),
            self.config.threshold,
            self.config.min_line_length,
            self.config.max_line_gap,
        )
        .map_err(|e| MeasurementError::opencv("Probabilistic Hough lines", e))?;

        Ok(lines
            .iter()
            .map(|l| LineSegment::new(l[0], l[1], l[2], l[3]))
            .collect())
    }
}
