//! Selection policies for the fixture vertex and the target circle
//!
//! Both rules are heuristics without a correctness guarantee when spurious
//! detections are present, so they are kept behind small traits that the
//! reasoner calls without knowing which policy is configured. Ties always
//! resolve to the earliest candidate.

use serde::{Deserialize, Serialize};

use super::{CircleCandidate, Point2};

/// Picks one fixture vertex out of the valid intersections.
pub trait VertexSelector {
    fn select_vertex(&self, candidates: &[Point2]) -> Option<Point2>;
}

/// Picks one target circle out of the candidates inside the vertical band.
pub trait CircleSelector {
    fn select_circle(
        &self,
        in_band: &[CircleCandidate],
        vertex: Option<Point2>,
    ) -> Option<CircleCandidate>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexPolicy {
    /// Smallest y among qualifying intersections
    #[default]
    Topmost,
    /// Largest y among qualifying intersections
    Lowest,
}

impl VertexSelector for VertexPolicy {
    fn select_vertex(&self, candidates: &[Point2]) -> Option<Point2> {
        let mut iter = candidates.iter().copied();
        let first = iter.next()?;
        Some(iter.fold(first, |best, p| {
            let better = match self {
                VertexPolicy::Topmost => p.y < best.y,
                VertexPolicy::Lowest => p.y > best.y,
            };
            if better {
                p
            } else {
                best
            }
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CirclePolicy {
    /// Largest radius
    #[default]
    LargestRadius,
    /// Center horizontally closest to the vertex; largest radius without a vertex
    NearestToVertex,
}

impl CircleSelector for CirclePolicy {
    fn select_circle(
        &self,
        in_band: &[CircleCandidate],
        vertex: Option<Point2>,
    ) -> Option<CircleCandidate> {
        let mut iter = in_band.iter().copied();
        let first = iter.next()?;
        let chosen = match (self, vertex) {
            (CirclePolicy::NearestToVertex, Some(v)) => iter.fold(first, |best, c| {
                let d_best = (f64::from(best.x) - v.x).abs();
                let d = (f64::from(c.x) - v.x).abs();
                if d < d_best {
                    c
                } else {
                    best
                }
            }),
            _ => iter.fold(first, |best, c| if c.radius > best.radius { c } else { best }),
        };
        Some(chosen)
    }
}

/// Open band of image rows, expressed as fractions of the image height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalBand {
    pub min_fraction: f64,
    pub max_fraction: f64,
}

impl VerticalBand {
    pub fn new(min_fraction: f64, max_fraction: f64) -> Self {
        Self {
            min_fraction,
            max_fraction,
        }
    }

    /// Bounds are exclusive
    pub fn contains(&self, y: f64, image_height: f64) -> bool {
        y > image_height * self.min_fraction && y < image_height * self.max_fraction
    }

    pub fn is_well_formed(&self) -> bool {
        self.min_fraction >= 0.0
            && self.max_fraction <= 1.0
            && self.min_fraction < self.max_fraction
    }

    /// Circles whose center lies inside the band, in input order
    pub fn filter(&self, circles: &[CircleCandidate], image_height: f64) -> Vec<CircleCandidate> {
        circles
            .iter()
            .filter(|c| self.contains(f64::from(c.y), image_height))
            .copied()
            .collect()
    }
}

/// The horizontal line height is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightReference {
    /// The detected fixture vertex
    #[default]
    FixtureVertex,
    /// The last pixel row of the processed image; no vertex required
    ImageBottom,
}

impl HeightReference {
    /// Reference row, or `None` if it could not be established
    pub fn reference_y(&self, vertex: Option<Point2>, image_height: f64) -> Option<f64> {
        match self {
            HeightReference::FixtureVertex => vertex.map(|v| v.y),
            HeightReference::ImageBottom => Some(image_height - 1.0),
        }
    }

    pub fn requires_vertex(&self) -> bool {
        matches!(self, HeightReference::FixtureVertex)
    }
}
