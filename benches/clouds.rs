//! Run these benches with `cargo bench --bench clouds -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};
use sounding_parcel::CloudConfig;

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(cloud_benches);

criterion_group!(
    name = cloud_benches;
    config = build_tester();
    targets = cloud_column_bench, wide_cloud_raster_bench
);

fn cloud_column_bench(c: &mut Criterion) {
    let snds = utils::load_all_test_soundings();
    let config = CloudConfig::default();

    c.bench_function("cloud_column", |b| {
        b.iter(|| {
            for snd in &snds {
                let _x = sounding_parcel::cloud_raster(snd, &config).expect("oops");
            }
        });
    });
}

fn wide_cloud_raster_bench(c: &mut Criterion) {
    let snds = utils::load_all_test_soundings();
    let config = CloudConfig::default().with_width(64).with_height(400);

    c.bench_function("wide_cloud_raster", |b| {
        b.iter(|| {
            for snd in &snds {
                let _x = sounding_parcel::cloud_raster(snd, &config).expect("oops");
            }
        });
    });
}
