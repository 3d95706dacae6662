//! Overlay drawing on the processed image
//!
//! Markers: fixture vertex (green dot), circle outline (red) with its
//! center (blue dot), and when a height exists, a vertical connector from
//! the center to the reference row plus a `Height: ... px` label.

use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{circle, line, put_text, FILLED, FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};

use crate::constants::annotation::*;
use crate::error::{MeasurementError, Result};
use crate::geometry::{Point2, Reasoning};

fn bgr(color: [f64; 3]) -> Scalar {
    Scalar::new(color[0], color[1], color[2], 0.0)
}

fn pixel(p: Point2) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

/// Text shown next to the connector
pub fn height_label(height: f64) -> String {
    format!("Height: {height:.2} px")
}

/// Label origin: left of the circle center, just above the connector midpoint,
/// clamped so the text stays on screen
pub fn label_origin(center: Point2, reference_y: f64, height: f64) -> Point {
    let x = center.x.round() as i32 - LABEL_OFFSET_X;
    let y = (reference_y - height / 2.0) as i32 - LABEL_OFFSET_Y;
    Point::new(x.max(LABEL_MIN_X), y.max(LABEL_MIN_Y))
}

/// Copy `image` and draw whatever `reasoning` established onto it
pub fn annotate(image: &Mat, reasoning: &Reasoning) -> Result<Mat> {
    let mut canvas = image
        .try_clone()
        .map_err(|e| MeasurementError::opencv("Annotation copy", e))?;
    let draw_err = |e| MeasurementError::opencv("Annotation drawing", e);

    if let Some(vertex) = reasoning.vertex {
        circle(
            &mut canvas,
            pixel(vertex),
            VERTEX_MARKER_RADIUS,
            bgr(VERTEX_COLOR),
            FILLED,
            LINE_8,
            0,
        )
        .map_err(draw_err)?;
    }

    if let Some(target) = reasoning.circle {
        let center = target.center();
        circle(
            &mut canvas,
            pixel(center),
            target.radius.round() as i32,
            bgr(CIRCLE_COLOR),
            CIRCLE_THICKNESS,
            LINE_8,
            0,
        )
        .map_err(draw_err)?;
        circle(
            &mut canvas,
            pixel(center),
            CENTER_MARKER_RADIUS,
            bgr(CENTER_COLOR),
            FILLED,
            LINE_8,
            0,
        )
        .map_err(draw_err)?;

        if let (Some(height), Some(reference_y)) = (reasoning.height, reasoning.reference_y) {
            line(
                &mut canvas,
                pixel(center),
                pixel(Point2::new(center.x, reference_y)),
                bgr(CONNECTOR_COLOR),
                CONNECTOR_THICKNESS,
                LINE_8,
                0,
            )
            .map_err(draw_err)?;

            put_text(
                &mut canvas,
                &height_label(height),
                label_origin(center, reference_y, height),
                FONT_HERSHEY_SIMPLEX,
                LABEL_FONT_SCALE,
                bgr(LABEL_COLOR),
                LABEL_THICKNESS,
                LINE_AA,
                false,
            )
            .map_err(draw_err)?;
        }
    }

    Ok(canvas)
}
