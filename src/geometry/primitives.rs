//! Pixel-space primitives shared by detection and reasoning

use serde::{Deserialize, Serialize};

/// A point in image pixel coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A finite segment as reported by the probabilistic Hough transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Horizontal extent `x2 - x1`
    pub fn run(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Vertical extent `y2 - y1`
    pub fn rise(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Signed direction angle in degrees, in `(-180, 180]`
    pub fn angle_degrees(&self) -> f64 {
        f64::from(self.rise())
            .atan2(f64::from(self.run()))
            .to_degrees()
    }

    /// Direction angle folded to `[0, 180]`
    pub fn abs_angle_degrees(&self) -> f64 {
        self.angle_degrees().abs()
    }

    pub fn is_vertical(&self) -> bool {
        self.run() == 0
    }

    /// `dy / dx`, or `None` for a vertical segment
    pub fn slope(&self) -> Option<f64> {
        if self.is_vertical() {
            None
        } else {
            Some(f64::from(self.rise()) / f64::from(self.run()))
        }
    }

    pub fn length(&self) -> f64 {
        f64::from(self.run()).hypot(f64::from(self.rise()))
    }
}

/// A circle reported by the Hough circle transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleCandidate {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl CircleCandidate {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn center(&self) -> Point2 {
        Point2::new(f64::from(self.x), f64::from(self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_angles() {
        assert_eq!(LineSegment::new(0, 0, 10, 0).angle_degrees(), 0.0);
        assert!((LineSegment::new(0, 0, 10, 10).angle_degrees() - 45.0).abs() < 1e-9);
        assert!((LineSegment::new(0, 0, -10, -10).angle_degrees() + 135.0).abs() < 1e-9);
        assert!((LineSegment::new(0, 0, -10, -10).abs_angle_degrees() - 135.0).abs() < 1e-9);
        assert!((LineSegment::new(5, 5, 5, 50).angle_degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_slope() {
        assert_eq!(LineSegment::new(0, 0, 10, 20).slope(), Some(2.0));
        assert_eq!(LineSegment::new(10, 0, 0, 20).slope(), Some(-2.0));
        assert_eq!(LineSegment::new(3, 0, 3, 20).slope(), None);
        assert!(LineSegment::new(3, 0, 3, 20).is_vertical());
    }

    #[test]
    fn test_segment_length() {
        assert_eq!(LineSegment::new(0, 0, 3, 4).length(), 5.0);
    }

    #[test]
    fn test_circle_center() {
        let c = CircleCandidate::new(200.0, 150.0, 70.0);
        assert_eq!(c.center(), Point2::new(200.0, 150.0));
    }
}
