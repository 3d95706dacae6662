use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vblock_height::{
    detection::FeatureDetector, geometry::GeometricReasoner, synthetic::SyntheticScene,
    HeightMeasurer, MeasurementConfig,
};

fn benchmark_full_pipeline(c: &mut Criterion) {
    let measurer = HeightMeasurer::new(MeasurementConfig::default()).unwrap();
    let mut group = c.benchmark_group("measure");

    // 1200 px and up exercise the downscale path
    for factor in [1, 2, 3] {
        let scene = SyntheticScene::default().scaled(factor);
        let image = scene.render().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(scene.width), &image, |b, image| {
            b.iter(|| measurer.measure(black_box(image)))
        });
    }
    group.finish();
}

fn benchmark_reasoning(c: &mut Criterion) {
    let image = SyntheticScene::default().render().unwrap();
    let features = FeatureDetector::default().detect(&image).unwrap();
    let reasoner = GeometricReasoner::default();

    c.bench_function("reason", |b| {
        b.iter(|| {
            reasoner.reason(
                black_box(&features.segments),
                black_box(&features.circles),
                features.width(),
                features.height(),
            )
        })
    });
}

criterion_group!(benches, benchmark_full_pipeline, benchmark_reasoning);
criterion_main!(benches);
