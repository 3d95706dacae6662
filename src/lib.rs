//! # V-Block Height
//!
//! Measures how high a round workpiece sits in a V-block fixture from a
//! single photograph.
//!
//! The pipeline:
//! - Downscales, denoises and edge-detects the image
//! - Finds straight segments (the fixture faces) and circle candidates
//! - Intersects the faces to locate the vertex at the bottom of the groove
//! - Picks the workpiece circle and reports `vertex.y - circle.y` in pixels
//! - Draws the findings onto a copy of the processed image
//!
//! A missing vertex or circle is not an error: the height is simply absent
//! and a [`Failure`] says why.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vblock_height::{measure_file, MeasurementConfig};
//! use std::path::Path;
//!
//! let measurement = measure_file(Path::new("photo.jpg"), &MeasurementConfig::default());
//! match measurement.height {
//!     Some(h) => println!("Height: {h:.2} px"),
//!     None => println!("{}", measurement.failure.map(|f| f.message).unwrap_or_default()),
//! }
//! ```

use opencv::core::Mat;
use std::path::Path;

pub mod annotate;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod image_loader;
pub mod measurement;
pub mod synthetic;

pub use config::MeasurementConfig;
pub use error::{Failure, FailureKind, MeasurementError, Result};
pub use geometry::{CircleCandidate, HeightReference, Point2};
pub use measurement::{DetectionStats, HeightMeasurer, Measurement, MeasurementReport};

/// Measure the workpiece height in an image file.
///
/// Never fails: unreadable files, invalid configuration and pipeline
/// errors all come back as a [`Measurement`] without a height.
pub fn measure_file(path: &Path, config: &MeasurementConfig) -> Measurement {
    with_measurer(config, |m| m.measure_file(path))
}

/// Measure the workpiece height in an encoded image held in memory
pub fn measure_bytes(bytes: &[u8], config: &MeasurementConfig) -> Measurement {
    with_measurer(config, |m| m.measure_bytes(bytes))
}

/// Measure the workpiece height in an already decoded BGR image
pub fn measure_image(image: &Mat, config: &MeasurementConfig) -> Measurement {
    with_measurer(config, |m| m.measure(image))
}

fn with_measurer(
    config: &MeasurementConfig,
    run: impl FnOnce(&HeightMeasurer) -> Measurement,
) -> Measurement {
    match HeightMeasurer::new(config.clone()) {
        Ok(measurer) => run(&measurer),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected measurement configuration");
            Measurement::absent(Failure::from(&e))
        }
    }
}
