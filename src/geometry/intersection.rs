//! Pairwise intersection of infinite-line extensions

use super::{LineSegment, Point2};

/// Region of the image where a fixture vertex may lie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionBounds {
    pub width: f64,
    pub height: f64,
    /// Points must satisfy `y > min_y_fraction * height`
    pub min_y_fraction: f64,
}

impl IntersectionBounds {
    pub fn new(width: i32, height: i32, min_y_fraction: f64) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
            min_y_fraction,
        }
    }

    pub fn accepts(&self, point: Point2) -> bool {
        let in_image = point.x >= 0.0
            && point.x < self.width
            && point.y >= 0.0
            && point.y < self.height;
        in_image && point.y > self.height * self.min_y_fraction
    }
}

/// Intersect the infinite lines through two segments.
///
/// Returns `None` when both are vertical, or when neither is vertical and
/// their slopes differ by less than `parallel_epsilon`. A vertical segment
/// paired with a non-vertical one always intersects.
pub fn intersect(a: &LineSegment, b: &LineSegment, parallel_epsilon: f64) -> Option<Point2> {
    match (a.slope(), b.slope()) {
        (None, None) => None,
        (None, Some(m2)) => {
            let x = f64::from(a.x1);
            Some(Point2::new(x, m2 * (x - f64::from(b.x1)) + f64::from(b.y1)))
        }
        (Some(m1), None) => {
            let x = f64::from(b.x1);
            Some(Point2::new(x, m1 * (x - f64::from(a.x1)) + f64::from(a.y1)))
        }
        (Some(m1), Some(m2)) => {
            if (m1 - m2).abs() < parallel_epsilon {
                return None;
            }
            let c1 = f64::from(a.y1) - m1 * f64::from(a.x1);
            let c2 = f64::from(b.y1) - m2 * f64::from(b.x1);
            let x = (c2 - c1) / (m1 - m2);
            Some(Point2::new(x, m1 * x + c1))
        }
    }
}

/// Intersections of every unordered segment pair that land inside `bounds`.
///
/// Output order follows the pair order `(0,1), (0,2), ..., (1,2), ...`.
pub fn valid_intersections(
    segments: &[LineSegment],
    parallel_epsilon: f64,
    bounds: &IntersectionBounds,
) -> Vec<Point2> {
    let mut points = Vec::new();
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if let Some(point) = intersect(a, b, parallel_epsilon) {
                if bounds.accepts(point) {
                    points.push(point);
                }
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.1;

    fn assert_close(p: Point2, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y
        );
    }

    #[test]
    fn test_v_faces_meet_at_vertex() {
        let left = LineSegment::new(100, 200, 150, 250);
        let right = LineSegment::new(300, 200, 250, 250);
        let p = intersect(&left, &right, EPS).unwrap();
        assert_close(p, 200.0, 300.0);
    }

    #[test]
    fn test_intersection_uses_extensions_not_extents() {
        let a = LineSegment::new(0, 0, 10, 10);
        let b = LineSegment::new(100, 0, 90, 10);
        let p = intersect(&a, &b, EPS).unwrap();
        assert_close(p, 50.0, 50.0);
    }

    #[test]
    fn test_parallel_segments_never_intersect() {
        let a = LineSegment::new(0, 0, 100, 100);
        let b = LineSegment::new(0, 50, 100, 150);
        assert!(intersect(&a, &b, EPS).is_none());

        // Coincident lines are parallel too
        assert!(intersect(&a, &a, EPS).is_none());
    }

    #[test]
    fn test_nearly_parallel_segments_are_skipped() {
        let a = LineSegment::new(0, 0, 100, 100); // slope 1.0
        let b = LineSegment::new(0, 10, 100, 115); // slope 1.05
        assert!(intersect(&a, &b, EPS).is_none());

        let c = LineSegment::new(0, 10, 100, 130); // slope 1.2
        assert!(intersect(&a, &c, EPS).is_some());
    }

    #[test]
    fn test_two_vertical_segments_are_skipped() {
        let a = LineSegment::new(10, 0, 10, 100);
        let b = LineSegment::new(50, 0, 50, 100);
        assert!(intersect(&a, &b, EPS).is_none());
    }

    #[test]
    fn test_one_vertical_segment() {
        let vertical = LineSegment::new(40, 0, 40, 100);
        let sloped = LineSegment::new(0, 10, 10, 30); // y = 2x + 10
        assert_close(intersect(&vertical, &sloped, EPS).unwrap(), 40.0, 90.0);
        assert_close(intersect(&sloped, &vertical, EPS).unwrap(), 40.0, 90.0);
    }

    #[test]
    fn test_bounds_filter() {
        let bounds = IntersectionBounds::new(400, 400, 0.4);
        assert!(bounds.accepts(Point2::new(200.0, 300.0)));
        assert!(!bounds.accepts(Point2::new(200.0, 160.0)));
        assert!(!bounds.accepts(Point2::new(200.0, 100.0)));
        assert!(!bounds.accepts(Point2::new(-1.0, 300.0)));
        assert!(!bounds.accepts(Point2::new(400.0, 300.0)));
        assert!(!bounds.accepts(Point2::new(200.0, 400.0)));
        assert!(bounds.accepts(Point2::new(0.0, 399.5)));
    }

    #[test]
    fn test_valid_intersections_over_all_pairs() {
        let segments = vec![
            LineSegment::new(100, 200, 150, 250), // left face
            LineSegment::new(300, 200, 250, 250), // right face
            LineSegment::new(110, 200, 160, 250), // parallel to left face
        ];
        let bounds = IntersectionBounds::new(400, 400, 0.4);
        let points = valid_intersections(&segments, EPS, &bounds);

        // (left, right) and (right, parallel); (left, parallel) is skipped
        assert_eq!(points.len(), 2);
        assert_close(points[0], 200.0, 300.0);
        assert_close(points[1], 205.0, 295.0);
    }

    #[test]
    fn test_out_of_bounds_intersections_are_dropped() {
        // These meet above the allowed region
        let segments = vec![
            LineSegment::new(100, 200, 150, 150),
            LineSegment::new(300, 200, 250, 150),
        ];
        let bounds = IntersectionBounds::new(400, 400, 0.4);
        assert!(valid_intersections(&segments, EPS, &bounds).is_empty());
    }
}
