//! Geometric reasoning over raw detections
//!
//! Turns Hough line segments and circle candidates into a fixture vertex,
//! a target circle and a signed height between them. Everything here is
//! plain arithmetic on pixel coordinates; no OpenCV types cross this
//! boundary.

pub mod filter;
pub mod intersection;
pub mod primitives;
pub mod reasoner;
pub mod selection;

pub use filter::{filter_face_segments, AngleBand};
pub use intersection::{intersect, valid_intersections, IntersectionBounds};
pub use primitives::{CircleCandidate, LineSegment, Point2};
pub use reasoner::{GeometricReasoner, Reasoning};
pub use selection::{
    CirclePolicy, CircleSelector, HeightReference, VertexPolicy, VertexSelector, VerticalBand,
};
