//! Synthetic V-block scenes with known geometry
//!
//! Renders a bright fixture whose two faces meet at a known vertex, with a
//! gray disc resting above it. Used by tests and benchmarks, and handy for
//! checking a configuration without a camera.

use opencv::{
    core::{Mat, Point, Scalar, Vector, CV_8UC3},
    imgproc::{circle, fill_poly, FILLED, LINE_8},
    prelude::*,
};

use crate::error::{MeasurementError, Result};
use crate::geometry::Point2;

/// A fixture plus workpiece with ground-truth coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticScene {
    pub width: i32,
    pub height: i32,
    /// Where the two faces meet
    pub vertex: (i32, i32),
    /// Row where the faces reach the top of the fixture
    pub shoulder_y: i32,
    /// Disc center and radius; `None` renders the fixture alone
    pub disc: Option<((i32, i32), i32)>,
    pub fixture_intensity: f64,
    pub disc_intensity: f64,
}

impl Default for SyntheticScene {
    /// 400x400 scene: 45 degree faces meeting at (200, 300), disc of radius
    /// 90 centered at (200, 150). Ground-truth height is 150 px.
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            vertex: (200, 300),
            shoulder_y: 150,
            disc: Some(((200, 150), 90)),
            fixture_intensity: 255.0,
            disc_intensity: 160.0,
        }
    }
}

impl SyntheticScene {
    pub fn without_disc(mut self) -> Self {
        self.disc = None;
        self
    }

    pub fn with_disc(mut self, center: (i32, i32), radius: i32) -> Self {
        self.disc = Some((center, radius));
        self
    }

    /// Multiply every coordinate and length by `factor`
    pub fn scaled(&self, factor: i32) -> Self {
        let (vx, vy) = self.vertex;
        Self {
            width: self.width * factor,
            height: self.height * factor,
            vertex: (vx * factor, vy * factor),
            shoulder_y: self.shoulder_y * factor,
            disc: self
                .disc
                .map(|((cx, cy), r)| ((cx * factor, cy * factor), r * factor)),
            ..*self
        }
    }

    pub fn vertex_point(&self) -> Point2 {
        Point2::new(f64::from(self.vertex.0), f64::from(self.vertex.1))
    }

    /// Vertex row minus disc center row, when a disc is present
    pub fn expected_height(&self) -> Option<f64> {
        self.disc.map(|((_, cy), _)| f64::from(self.vertex.1 - cy))
    }

    /// Fixture outline: shoulders, both faces down to the vertex, then the
    /// image bottom
    fn fixture_polygon(&self) -> Vector<Point> {
        let (vx, vy) = self.vertex;
        let drop = vy - self.shoulder_y;
        let right = self.width - 1;
        let bottom = self.height - 1;
        Vector::from_iter([
            Point::new(0, self.shoulder_y),
            Point::new(vx - drop, self.shoulder_y),
            Point::new(vx, vy),
            Point::new(vx + drop, self.shoulder_y),
            Point::new(right, self.shoulder_y),
            Point::new(right, bottom),
            Point::new(0, bottom),
        ])
    }

    /// Render as an 8-bit BGR image
    pub fn render(&self) -> Result<Mat> {
        let draw_err = |e| MeasurementError::opencv("Synthetic scene drawing", e);

        let mut image = Mat::zeros(self.height, self.width, CV_8UC3)
            .and_then(|m| m.to_mat())
            .map_err(|e| MeasurementError::opencv("Mat allocation", e))?;

        let mut polygons: Vector<Vector<Point>> = Vector::new();
        polygons.push(self.fixture_polygon());
        fill_poly(
            &mut image,
            &polygons,
            Scalar::all(self.fixture_intensity),
            LINE_8,
            0,
            Point::new(0, 0),
        )
        .map_err(draw_err)?;

        if let Some(((cx, cy), radius)) = self.disc {
            circle(
                &mut image,
                Point::new(cx, cy),
                radius,
                Scalar::all(self.disc_intensity),
                FILLED,
                LINE_8,
                0,
            )
            .map_err(draw_err)?;
        }

        Ok(image)
    }
}
