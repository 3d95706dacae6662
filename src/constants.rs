//! Reference values for the measurement pipeline
//!
//! These constants were tuned against photographs downscaled to at most
//! 800 px on the long side. They seed [`crate::config::MeasurementConfig`]'s
//! defaults; the pipeline itself only reads the configuration.

/// Image preprocessing parameters
pub mod preprocessing {
    /// Images whose long side exceeds this are downscaled before detection
    pub const MAX_PROCESS_DIM: i32 = 800;

    /// Median filter aperture (odd)
    pub const MEDIAN_KERNEL_SIZE: i32 = 5;

    /// Gaussian alternative: kernel size (odd) and sigma
    pub const GAUSSIAN_KERNEL_SIZE: i32 = 5;
    pub const GAUSSIAN_SIGMA: f64 = 1.0;

    /// Canny edge detection thresholds
    pub const CANNY_LOW_THRESHOLD: f64 = 50.0;
    pub const CANNY_HIGH_THRESHOLD: f64 = 150.0;
    pub const CANNY_APERTURE_SIZE: i32 = 3;
}

/// Probabilistic Hough line transform and V-face filtering
pub mod lines {
    pub const HOUGH_RHO: f64 = 1.0;
    pub const HOUGH_THETA_DEGREES: f64 = 1.0;
    pub const HOUGH_THRESHOLD: i32 = 80;
    pub const MIN_LINE_LENGTH: f64 = 100.0;
    pub const MAX_LINE_GAP: f64 = 10.0;

    /// Absolute segment angles (degrees, exclusive) accepted as V faces
    pub const LEFT_FACE_BAND: (f64, f64) = (30.0, 85.0);
    pub const RIGHT_FACE_BAND: (f64, f64) = (95.0, 150.0);

    /// Slopes closer than this are treated as parallel
    pub const PARALLEL_SLOPE_EPSILON: f64 = 0.1;

    /// Intersections must lie below this fraction of the image height
    pub const VERTEX_MIN_Y_FRACTION: f64 = 0.4;
}

/// Gradient Hough circle transform and target band
pub mod circles {
    pub const DP: f64 = 1.0;
    pub const MIN_CENTER_DISTANCE: f64 = 150.0;
    pub const CANNY_HIGH_THRESHOLD: f64 = 100.0;
    pub const ACCUMULATOR_THRESHOLD: f64 = 25.0;
    pub const MIN_RADIUS: i32 = 80;
    pub const MAX_RADIUS: i32 = 150;

    /// Circle centers must lie strictly inside this band of the image height
    pub const BAND_MIN_FRACTION: f64 = 0.3;
    pub const BAND_MAX_FRACTION: f64 = 0.7;
}

/// Overlay styling (BGR colors)
pub mod annotation {
    pub const VERTEX_COLOR: [f64; 3] = [0.0, 255.0, 0.0];
    pub const VERTEX_MARKER_RADIUS: i32 = 7;

    pub const CIRCLE_COLOR: [f64; 3] = [0.0, 0.0, 255.0];
    pub const CIRCLE_THICKNESS: i32 = 3;

    pub const CENTER_COLOR: [f64; 3] = [255.0, 0.0, 0.0];
    pub const CENTER_MARKER_RADIUS: i32 = 5;

    pub const CONNECTOR_COLOR: [f64; 3] = [255.0, 255.0, 0.0];
    pub const CONNECTOR_THICKNESS: i32 = 2;

    pub const LABEL_COLOR: [f64; 3] = [0.0, 255.0, 255.0];
    pub const LABEL_FONT_SCALE: f64 = 0.8;
    pub const LABEL_THICKNESS: i32 = 2;

    /// Label offset from the circle center x and above the connector midpoint
    pub const LABEL_OFFSET_X: i32 = 50;
    pub const LABEL_OFFSET_Y: i32 = 10;

    /// Label origin is clamped to at least this position
    pub const LABEL_MIN_X: i32 = 10;
    pub const LABEL_MIN_Y: i32 = 20;
}
