//! Configuration structures for the measurement pipeline.
//!
//! Every tunable threshold lives here, grouped by the stage that consumes
//! it. The defaults reproduce [`crate::constants`].
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use vblock_height::MeasurementConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = MeasurementConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = MeasurementConfig::default();
//! # Ok::<(), vblock_height::MeasurementError>(())
//! ```
//!
//! Sections or fields missing from a JSON file take their default values.
//!
//! # Configuration Sections
//!
//! - [`PreprocessingConfig`]: downscaling, denoising and edge detection
//! - [`LineDetectionConfig`]: probabilistic Hough lines and V-face filtering
//! - [`CircleDetectionConfig`]: Hough circles and the target band
//! - [`SelectionConfig`]: vertex/circle policies and the height reference
//! - [`AnnotationConfig`]: overlay rendering

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants;
use crate::error::{MeasurementError, Result};
use crate::geometry::{AngleBand, CirclePolicy, HeightReference, VertexPolicy, VerticalBand};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    pub preprocessing: PreprocessingConfig,
    pub lines: LineDetectionConfig,
    pub circles: CircleDetectionConfig,
    pub selection: SelectionConfig,
    pub annotation: AnnotationConfig,
}

/// Noise-reduction filter applied to the grayscale image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DenoiseFilter {
    /// Median filter, keeps edges sharper than a blur
    Median { kernel_size: i32 },
    /// Gaussian blur
    Gaussian { kernel_size: i32, sigma: f64 },
}

impl DenoiseFilter {
    /// Gaussian blur with the reference kernel and sigma
    pub fn gaussian() -> Self {
        use constants::preprocessing::*;
        DenoiseFilter::Gaussian {
            kernel_size: GAUSSIAN_KERNEL_SIZE,
            sigma: GAUSSIAN_SIGMA,
        }
    }
}

impl Default for DenoiseFilter {
    fn default() -> Self {
        DenoiseFilter::Median {
            kernel_size: constants::preprocessing::MEDIAN_KERNEL_SIZE,
        }
    }
}

/// Parameters applied before feature detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Downscale so the long side is at most this many pixels (`None` keeps the input size)
    pub max_process_dim: Option<i32>,

    pub denoise: DenoiseFilter,

    /// Canny edge detection low threshold
    pub canny_low_threshold: f64,

    /// Canny edge detection high threshold
    pub canny_high_threshold: f64,

    /// Sobel aperture for Canny (3, 5 or 7)
    pub canny_aperture_size: i32,

    /// Long-side length the pixel-valued detection parameters were tuned for.
    /// When set, those parameters are scaled by `long_side / reference_dimension`.
    pub reference_dimension: Option<i32>,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        use constants::preprocessing::*;
        Self {
            max_process_dim: Some(MAX_PROCESS_DIM),
            denoise: DenoiseFilter::default(),
            canny_low_threshold: CANNY_LOW_THRESHOLD,
            canny_high_threshold: CANNY_HIGH_THRESHOLD,
            canny_aperture_size: CANNY_APERTURE_SIZE,
            reference_dimension: None,
        }
    }
}

impl PreprocessingConfig {
    /// Factor applied to pixel-valued detection parameters for an image of the given size
    pub fn scale_factor(&self, width: i32, height: i32) -> f64 {
        match self.reference_dimension {
            Some(reference) if reference > 0 => {
                f64::from(width.max(height)) / f64::from(reference)
            }
            _ => 1.0,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(dim) = self.max_process_dim {
            if dim <= 0 {
                return Err(MeasurementError::invalid_parameter(
                    "preprocessing.max_process_dim",
                    dim,
                ));
            }
        }
        match self.denoise {
            DenoiseFilter::Median { kernel_size } => {
                if kernel_size < 3 || kernel_size % 2 == 0 {
                    return Err(MeasurementError::invalid_parameter(
                        "preprocessing.denoise.kernel_size",
                        kernel_size,
                    ));
                }
            }
            DenoiseFilter::Gaussian { kernel_size, sigma } => {
                if kernel_size < 1 || kernel_size % 2 == 0 {
                    return Err(MeasurementError::invalid_parameter(
                        "preprocessing.denoise.kernel_size",
                        kernel_size,
                    ));
                }
                if sigma < 0.0 {
                    return Err(MeasurementError::invalid_parameter(
                        "preprocessing.denoise.sigma",
                        sigma,
                    ));
                }
            }
        }
        if self.canny_low_threshold < 0.0 || self.canny_low_threshold > self.canny_high_threshold {
            return Err(MeasurementError::invalid_parameter(
                "preprocessing.canny_low_threshold",
                self.canny_low_threshold,
            ));
        }
        if ![3, 5, 7].contains(&self.canny_aperture_size) {
            return Err(MeasurementError::invalid_parameter(
                "preprocessing.canny_aperture_size",
                self.canny_aperture_size,
            ));
        }
        if let Some(reference) = self.reference_dimension {
            if reference <= 0 {
                return Err(MeasurementError::invalid_parameter(
                    "preprocessing.reference_dimension",
                    reference,
                ));
            }
        }
        Ok(())
    }
}

/// Probabilistic Hough line parameters and the V-face acceptance rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDetectionConfig {
    /// Distance resolution of the accumulator in pixels
    pub rho: f64,

    /// Angle resolution of the accumulator in degrees
    pub theta_degrees: f64,

    /// Accumulator votes required for a line
    pub threshold: i32,

    /// Shortest segment reported, in pixels
    pub min_line_length: f64,

    /// Largest gap bridged between collinear points, in pixels
    pub max_line_gap: f64,

    /// Absolute segment angles (0..180 degrees) accepted as V faces
    pub angle_bands: Vec<AngleBand>,

    /// Segment pairs whose slopes differ by less than this are skipped
    pub parallel_slope_epsilon: f64,

    /// Intersections must satisfy `y > fraction * image_height`
    pub vertex_min_y_fraction: f64,
}

impl Default for LineDetectionConfig {
    fn default() -> Self {
        use constants::lines::*;
        Self {
            rho: HOUGH_RHO,
            theta_degrees: HOUGH_THETA_DEGREES,
            threshold: HOUGH_THRESHOLD,
            min_line_length: MIN_LINE_LENGTH,
            max_line_gap: MAX_LINE_GAP,
            angle_bands: vec![
                AngleBand::new(LEFT_FACE_BAND.0, LEFT_FACE_BAND.1),
                AngleBand::new(RIGHT_FACE_BAND.0, RIGHT_FACE_BAND.1),
            ],
            parallel_slope_epsilon: PARALLEL_SLOPE_EPSILON,
            vertex_min_y_fraction: VERTEX_MIN_Y_FRACTION,
        }
    }
}

impl LineDetectionConfig {
    /// Copy with pixel-valued parameters multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min_line_length: self.min_line_length * factor,
            max_line_gap: self.max_line_gap * factor,
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.rho <= 0.0 {
            return Err(MeasurementError::invalid_parameter("lines.rho", self.rho));
        }
        if self.theta_degrees <= 0.0 || self.theta_degrees > 180.0 {
            return Err(MeasurementError::invalid_parameter(
                "lines.theta_degrees",
                self.theta_degrees,
            ));
        }
        if self.threshold <= 0 {
            return Err(MeasurementError::invalid_parameter(
                "lines.threshold",
                self.threshold,
            ));
        }
        if self.min_line_length < 0.0 {
            return Err(MeasurementError::invalid_parameter(
                "lines.min_line_length",
                self.min_line_length,
            ));
        }
        if self.max_line_gap < 0.0 {
            return Err(MeasurementError::invalid_parameter(
                "lines.max_line_gap",
                self.max_line_gap,
            ));
        }
        if self.angle_bands.is_empty() {
            return Err(MeasurementError::invalid_parameter("lines.angle_bands", "[]"));
        }
        for band in &self.angle_bands {
            if !band.is_well_formed() {
                return Err(MeasurementError::invalid_parameter(
                    "lines.angle_bands",
                    format!("({}, {})", band.min_degrees, band.max_degrees),
                ));
            }
        }
        if self.parallel_slope_epsilon <= 0.0 {
            return Err(MeasurementError::invalid_parameter(
                "lines.parallel_slope_epsilon",
                self.parallel_slope_epsilon,
            ));
        }
        if !(0.0..=1.0).contains(&self.vertex_min_y_fraction) {
            return Err(MeasurementError::invalid_parameter(
                "lines.vertex_min_y_fraction",
                self.vertex_min_y_fraction,
            ));
        }
        Ok(())
    }
}

/// Gradient Hough circle parameters and the band a target center must fall in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleDetectionConfig {
    /// Inverse ratio of accumulator resolution to image resolution
    pub dp: f64,

    /// Minimum distance between detected centers, in pixels
    pub min_center_distance: f64,

    /// High threshold of the internal Canny detector
    pub canny_high_threshold: f64,

    /// Accumulator votes required for a circle
    pub accumulator_threshold: f64,

    /// Radius band in pixels
    pub min_radius: i32,
    pub max_radius: i32,

    /// Vertical band of the image a target center must lie in
    pub band: VerticalBand,
}

impl Default for CircleDetectionConfig {
    fn default() -> Self {
        use constants::circles::*;
        Self {
            dp: DP,
            min_center_distance: MIN_CENTER_DISTANCE,
            canny_high_threshold: CANNY_HIGH_THRESHOLD,
            accumulator_threshold: ACCUMULATOR_THRESHOLD,
            min_radius: MIN_RADIUS,
            max_radius: MAX_RADIUS,
            band: VerticalBand::new(BAND_MIN_FRACTION, BAND_MAX_FRACTION),
        }
    }
}

impl CircleDetectionConfig {
    /// Copy with pixel-valued parameters multiplied by `factor`.
    ///
    /// OpenCV reads a zero `max_radius` as unbounded, so the scaled upper
    /// radius never drops below 1 px.
    pub fn scaled(&self, factor: f64) -> Self {
        let max_radius = ((f64::from(self.max_radius) * factor).round() as i32).max(1);
        let min_radius = ((f64::from(self.min_radius) * factor).round() as i32).min(max_radius);
        Self {
            min_center_distance: self.min_center_distance * factor,
            min_radius,
            max_radius,
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dp < 1.0 {
            return Err(MeasurementError::invalid_parameter("circles.dp", self.dp));
        }
        if self.min_center_distance <= 0.0 {
            return Err(MeasurementError::invalid_parameter(
                "circles.min_center_distance",
                self.min_center_distance,
            ));
        }
        if self.canny_high_threshold <= 0.0 {
            return Err(MeasurementError::invalid_parameter(
                "circles.canny_high_threshold",
                self.canny_high_threshold,
            ));
        }
        if self.accumulator_threshold <= 0.0 {
            return Err(MeasurementError::invalid_parameter(
                "circles.accumulator_threshold",
                self.accumulator_threshold,
            ));
        }
        if self.max_radius <= 0 {
            return Err(MeasurementError::invalid_parameter(
                "circles.max_radius",
                self.max_radius,
            ));
        }
        if self.min_radius < 0 || self.min_radius > self.max_radius {
            return Err(MeasurementError::invalid_parameter(
                "circles.min_radius",
                self.min_radius,
            ));
        }
        if !self.band.is_well_formed() {
            return Err(MeasurementError::invalid_parameter(
                "circles.band",
                format!("({}, {})", self.band.min_fraction, self.band.max_fraction),
            ));
        }
        Ok(())
    }
}

/// Which heuristics pick the vertex and the circle, and what height is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub vertex_policy: VertexPolicy,
    pub circle_policy: CirclePolicy,
    pub height_reference: HeightReference,
}

/// Overlay rendering switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Produce an annotated copy of the processed image
    pub enabled: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MeasurementConfig {
    /// Check every section against its documented range
    pub fn validate(&self) -> Result<()> {
        self.preprocessing.validate()?;
        self.lines.validate()?;
        self.circles.validate()?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeasurementError::config(format!("Failed to read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            MeasurementError::config(format!("Failed to parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MeasurementError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            MeasurementError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }
}
