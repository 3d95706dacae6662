//! From raw detections to a signed height
//!
//! Steps, in order:
//! 1. keep segments whose absolute angle lies in a V-face band
//! 2. intersect every pair of kept segments and drop points outside the
//!    lower region of the image
//! 3. choose the fixture vertex with the configured [`VertexPolicy`]
//! 4. choose the target circle among candidates in the vertical band with
//!    the configured [`CirclePolicy`]
//! 5. `height = reference_y - circle.y`, absent if either side is missing

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    filter_face_segments, valid_intersections, AngleBand, CircleCandidate, CirclePolicy,
    CircleSelector, HeightReference, IntersectionBounds, LineSegment, Point2, VertexPolicy,
    VertexSelector, VerticalBand,
};
use crate::config::MeasurementConfig;
use crate::error::FailureKind;

/// Everything the reasoner derived from one set of detections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    /// Segments that passed the angle filter
    pub face_segments: Vec<LineSegment>,
    /// Intersections inside the vertex region
    pub intersections: Vec<Point2>,
    pub vertex: Option<Point2>,
    pub circle: Option<CircleCandidate>,
    /// Row the height is measured from
    pub reference_y: Option<f64>,
    /// `reference_y - circle.y`; positive when the reference is below the center
    pub height: Option<f64>,
}

impl Reasoning {
    /// Why no height was produced, or `None` if one was
    pub fn failure_kind(&self, reference: HeightReference) -> Option<FailureKind> {
        if self.height.is_some() {
            return None;
        }
        let missing_vertex = reference.requires_vertex() && self.vertex.is_none();
        Some(match (missing_vertex, self.circle.is_none()) {
            (true, true) => FailureKind::NoFeatures,
            (true, false) => FailureKind::NoFixtureVertex,
            (false, true) => FailureKind::NoTargetCircle,
            (false, false) => FailureKind::ProcessingFailed,
        })
    }
}

/// Stateless geometric stage of the pipeline.
#[derive(Debug, Clone)]
pub struct GeometricReasoner {
    angle_bands: Vec<AngleBand>,
    parallel_epsilon: f64,
    vertex_min_y_fraction: f64,
    circle_band: VerticalBand,
    vertex_policy: VertexPolicy,
    circle_policy: CirclePolicy,
    reference: HeightReference,
}

impl Default for GeometricReasoner {
    fn default() -> Self {
        Self::from_config(&MeasurementConfig::default())
    }
}

impl GeometricReasoner {
    pub fn from_config(config: &MeasurementConfig) -> Self {
        Self {
            angle_bands: config.lines.angle_bands.clone(),
            parallel_epsilon: config.lines.parallel_slope_epsilon,
            vertex_min_y_fraction: config.lines.vertex_min_y_fraction,
            circle_band: config.circles.band,
            vertex_policy: config.selection.vertex_policy,
            circle_policy: config.selection.circle_policy,
            reference: config.selection.height_reference,
        }
    }

    pub fn height_reference(&self) -> HeightReference {
        self.reference
    }

    /// Reason over detections from an image of `width` x `height` pixels
    pub fn reason(
        &self,
        segments: &[LineSegment],
        circles: &[CircleCandidate],
        width: i32,
        height: i32,
    ) -> Reasoning {
        let face_segments = filter_face_segments(segments, &self.angle_bands);

        let bounds = IntersectionBounds::new(width, height, self.vertex_min_y_fraction);
        let intersections = valid_intersections(&face_segments, self.parallel_epsilon, &bounds);
        let vertex = self.vertex_policy.select_vertex(&intersections);

        let image_height = f64::from(height);
        let in_band = self.circle_band.filter(circles, image_height);
        let circle = self.circle_policy.select_circle(&in_band, vertex);

        let reference_y = self.reference.reference_y(vertex, image_height);
        let measured = match (reference_y, circle) {
            (Some(reference_y), Some(circle)) => Some(reference_y - f64::from(circle.y)),
            _ => None,
        };

        debug!(
            segments = segments.len(),
            face_segments = face_segments.len(),
            intersections = intersections.len(),
            circles = circles.len(),
            circles_in_band = in_band.len(),
            vertex = ?vertex,
            circle = ?circle,
            height = ?measured,
            "Geometric reasoning complete"
        );

        Reasoning {
            face_segments,
            intersections,
            vertex,
            circle,
            reference_y,
            height: measured,
        }
    }
}
