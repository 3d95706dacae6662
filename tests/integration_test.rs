//! Integration tests for the complete measurement pipeline
//!
//! Every image is rendered with OpenCV drawing primitives so the ground
//! truth is known exactly:
//! - fixture vertex and circle center recovered within a few pixels
//! - height derived from the two
//! - absence reported (not raised) when either feature is missing
//! - file, byte buffer and decoded-image entry points agree

use opencv::{
    core::{Mat, Vec3b, Vector},
    imgcodecs::{imencode, imwrite},
    prelude::*,
};
use std::path::Path;
use std::process::Command;

use vblock_height::{
    image_loader::load_image, measure_bytes, measure_file, measure_image,
    synthetic::SyntheticScene, FailureKind, HeightMeasurer, HeightReference, Measurement,
    MeasurementConfig, MeasurementReport,
};

fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected} +/- {tolerance}, got {actual}"
    );
}

fn measure_scene(scene: &SyntheticScene, config: &MeasurementConfig) -> Measurement {
    let image = scene.render().unwrap();
    measure_image(&image, config)
}

fn encode_png(image: &Mat) -> Vec<u8> {
    let mut buf = Vector::<u8>::new();
    assert!(imencode(".png", image, &mut buf, &Vector::new()).unwrap());
    buf.to_vec()
}

// ============================================================================
// End-to-end geometry
// ============================================================================

#[test]
fn test_default_scene_height() {
    let scene = SyntheticScene::default();
    let m = measure_scene(&scene, &MeasurementConfig::default());

    assert!(m.failure.is_none(), "unexpected failure: {:?}", m.failure);

    let vertex = m.vertex.unwrap();
    assert_close(vertex.x, 200.0, 5.0, "vertex x");
    assert_close(vertex.y, 300.0, 5.0, "vertex y");

    let circle = m.circle.unwrap();
    assert_close(f64::from(circle.x), 200.0, 3.0, "circle x");
    assert_close(f64::from(circle.y), 150.0, 3.0, "circle y");
    assert_close(f64::from(circle.radius), 90.0, 5.0, "circle radius");

    assert_close(m.height.unwrap(), 150.0, 6.0, "height");
    assert_eq!(m.reference_y, Some(vertex.y));
    assert!(m.stats.face_segments >= 2);
    assert!(m.stats.intersections >= 1);
    assert_eq!(m.image_size, Some((400, 400)));
    assert_eq!(m.scale, 1.0);
}

#[test]
fn test_small_workpiece_with_lowered_radius_band() {
    let scene = SyntheticScene::default().with_disc((200, 150), 70);
    let mut config = MeasurementConfig::default();
    config.circles.min_radius = 50;

    let m = measure_scene(&scene, &config);

    let circle = m.circle.unwrap();
    assert_close(f64::from(circle.x), 200.0, 3.0, "circle x");
    assert_close(f64::from(circle.y), 150.0, 3.0, "circle y");
    assert_close(m.height.unwrap(), 150.0, 6.0, "height");
}

#[test]
fn test_image_bottom_reference() {
    let mut config = MeasurementConfig::default();
    config.selection.height_reference = HeightReference::ImageBottom;

    let m = measure_scene(&SyntheticScene::default(), &config);
    assert_eq!(m.reference_y, Some(399.0));
    assert_close(m.height.unwrap(), 249.0, 3.0, "height");
}

#[test]
fn test_large_input_is_downscaled() {
    // 1200x1200 is processed at 800x800, where the disc radius is 180 px
    let scene = SyntheticScene::default().scaled(3);
    let mut config = MeasurementConfig::default();
    config.circles.max_radius = 200;
    config.circles.min_center_distance = 300.0;

    let m = measure_scene(&scene, &config);

    assert_eq!(m.image_size, Some((800, 800)));
    assert_close(m.scale, 2.0 / 3.0, 1e-9, "scale");
    assert_close(m.height.unwrap(), 300.0, 8.0, "height in processed pixels");
}

#[test]
fn test_reference_dimension_scales_pixel_parameters() {
    let scene = SyntheticScene::default().scaled(2);
    let mut config = MeasurementConfig::default();
    config.preprocessing.reference_dimension = Some(400);

    let m = measure_scene(&scene, &config);

    let circle = m.circle.unwrap();
    assert_close(f64::from(circle.radius), 180.0, 8.0, "circle radius");
    assert_close(m.height.unwrap(), 300.0, 8.0, "height");
}

// ============================================================================
// Absence
// ============================================================================

#[test]
fn test_all_black_image_has_no_height() {
    let image = Mat::zeros(400, 400, opencv::core::CV_8UC3)
        .unwrap()
        .to_mat()
        .unwrap();
    let m = measure_image(&image, &MeasurementConfig::default());

    assert!(m.height.is_none());
    assert!(m.circle.is_none());
    assert!(m.vertex.is_none());
    assert_eq!(m.failure.unwrap().kind, FailureKind::NoFeatures);
}

#[test]
fn test_circle_only_has_no_vertex() {
    let scene = SyntheticScene {
        fixture_intensity: 0.0,
        ..SyntheticScene::default()
    };
    let m = measure_scene(&scene, &MeasurementConfig::default());

    assert!(m.circle.is_some());
    assert!(m.vertex.is_none());
    assert!(m.height.is_none());
    assert_eq!(m.failure.unwrap().kind, FailureKind::NoFixtureVertex);
}

#[test]
fn test_fixture_only_has_no_circle() {
    let scene = SyntheticScene::default().without_disc();
    let m = measure_scene(&scene, &MeasurementConfig::default());

    let vertex = m.vertex.unwrap();
    assert_close(vertex.y, 300.0, 5.0, "vertex y");
    assert!(m.circle.is_none());
    assert!(m.height.is_none());
    assert_eq!(m.failure.unwrap().kind, FailureKind::NoTargetCircle);
}

#[test]
fn test_circle_outside_band_is_ignored() {
    // Center at 0.2 of the height, above the target band
    let scene = SyntheticScene::default().with_disc((200, 80), 85);
    let m = measure_scene(&scene, &MeasurementConfig::default());

    assert!(m.vertex.is_some());
    assert!(m.circle.is_none());
    assert_eq!(m.failure.unwrap().kind, FailureKind::NoTargetCircle);
}

// ============================================================================
// Entry points and error handling
// ============================================================================

#[test]
fn test_file_not_found_is_reported() {
    let m = measure_file(
        Path::new("nonexistent_file.jpg"),
        &MeasurementConfig::default(),
    );

    assert!(m.height.is_none());
    assert!(m.annotated.is_none());
    let failure = m.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::UnreadableImage);
    assert!(failure.message.contains("nonexistent_file.jpg"));
}

#[test]
fn test_empty_path_is_reported() {
    let m = measure_file(Path::new(""), &MeasurementConfig::default());
    assert_eq!(m.failure.unwrap().kind, FailureKind::UnreadableImage);
}

#[test]
fn test_corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"not a png at all").unwrap();

    let m = measure_file(&path, &MeasurementConfig::default());
    assert_eq!(m.failure.unwrap().kind, FailureKind::UnreadableImage);
}

#[test]
fn test_entry_points_agree() {
    let config = MeasurementConfig::default();
    let image = SyntheticScene::default().render().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.png");
    assert!(imwrite(path.to_str().unwrap(), &image, &Vector::new()).unwrap());

    let from_image = measure_image(&image, &config).report();
    let from_file = measure_file(&path, &config).report();
    let from_bytes = measure_bytes(&encode_png(&image), &config).report();

    assert!(from_image.height.is_some());
    assert_eq!(from_image, from_file);
    assert_eq!(from_image, from_bytes);
}

#[test]
fn test_png_saved_as_jpg_is_measured() {
    let config = MeasurementConfig::default();
    let image = SyntheticScene::default().render().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.jpg");
    std::fs::write(&path, encode_png(&image)).unwrap();

    let from_file = measure_file(&path, &config).report();
    assert!(from_file.failure.is_none(), "{:?}", from_file.failure);
    assert_eq!(from_file, measure_image(&image, &config).report());
}

#[test]
fn test_measurement_is_idempotent() {
    let measurer = HeightMeasurer::new(MeasurementConfig::default()).unwrap();
    let image = SyntheticScene::default().render().unwrap();

    let first = measurer.try_measure(&image).unwrap().report();
    for _ in 0..3 {
        assert_eq!(measurer.try_measure(&image).unwrap().report(), first);
    }
}

#[test]
fn test_invalid_config_is_reported() {
    let mut config = MeasurementConfig::default();
    config.preprocessing.canny_low_threshold = 500.0;

    let image = SyntheticScene::default().render().unwrap();
    let m = measure_image(&image, &config);
    assert_eq!(m.failure.unwrap().kind, FailureKind::ProcessingFailed);
}

// ============================================================================
// Annotation output
// ============================================================================

#[test]
fn test_annotated_image_marks_vertex() {
    let m = measure_scene(&SyntheticScene::default(), &MeasurementConfig::default());
    let annotated = m.annotated.as_ref().unwrap();
    let vertex = m.vertex.unwrap();

    assert_eq!((annotated.cols(), annotated.rows()), (400, 400));
    // Just below the vertex, clear of the connector
    let px: &Vec3b = annotated
        .at_2d(vertex.y.round() as i32 + 5, vertex.x.round() as i32)
        .unwrap();
    assert_eq!((px[0], px[1], px[2]), (0, 255, 0));
}

#[test]
fn test_save_annotated_round_trip() {
    let m = measure_scene(&SyntheticScene::default(), &MeasurementConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("scene_annotated.png");

    m.save_annotated(&out).unwrap();

    let reloaded = load_image(&out).unwrap();
    assert_eq!((reloaded.cols(), reloaded.rows()), (400, 400));
}

// ============================================================================
// Configuration files and the command line
// ============================================================================

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = MeasurementConfig::default();
    config.circles.min_radius = 50;
    config.selection.height_reference = HeightReference::ImageBottom;
    config.to_json_file(&path).unwrap();

    let loaded = MeasurementConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_cli_measure_json() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("part.png");
    let image = SyntheticScene::default().render().unwrap();
    assert!(imwrite(image_path.to_str().unwrap(), &image, &Vector::new()).unwrap());
    let out_dir = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_vblock-height"))
        .arg("measure")
        .arg(&image_path)
        .arg(dir.path().join("missing.png"))
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports.len(), 2);

    let measured: MeasurementReport = serde_json::from_value(reports[0].clone()).unwrap();
    assert_close(measured.height.unwrap(), 150.0, 6.0, "height");
    assert_eq!(reports[1]["failure"]["kind"], "unreadable_image");

    assert!(out_dir.join("part_annotated.png").exists());
    assert!(!out_dir.join("missing_annotated.png").exists());
}

#[test]
fn test_cli_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let status = Command::new(env!("CARGO_BIN_EXE_vblock-height"))
        .arg("default-config")
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());

    let loaded = MeasurementConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, MeasurementConfig::default());
}
