//! Angle band-pass for V-face candidates

use serde::{Deserialize, Serialize};

use super::LineSegment;

/// Open interval of absolute segment angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    pub min_degrees: f64,
    pub max_degrees: f64,
}

impl AngleBand {
    pub fn new(min_degrees: f64, max_degrees: f64) -> Self {
        Self {
            min_degrees,
            max_degrees,
        }
    }

    /// Bounds are exclusive
    pub fn contains(&self, abs_angle_degrees: f64) -> bool {
        abs_angle_degrees > self.min_degrees && abs_angle_degrees < self.max_degrees
    }

    pub fn is_well_formed(&self) -> bool {
        self.min_degrees >= 0.0 && self.max_degrees <= 180.0 && self.min_degrees < self.max_degrees
    }
}

/// Keep segments whose absolute angle falls in any band.
///
/// This does not check that the survivors actually pair up into a V.
pub fn filter_face_segments(segments: &[LineSegment], bands: &[AngleBand]) -> Vec<LineSegment> {
    segments
        .iter()
        .filter(|segment| {
            let angle = segment.abs_angle_degrees();
            bands.iter().any(|band| band.contains(angle))
        })
        .copied()
        .collect()
}
