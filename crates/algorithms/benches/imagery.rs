//! Benchmarks for index, classification and mosaic kernels

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geospec_algorithms::composite::{mosaic, TileGroup};
use geospec_algorithms::imagery::{classify, ndvi, threshold, ClassRule, Comparison, RuleSet};
use geospec_core::{Band, GeoTransform, Raster, Scene};

fn create_band(size: usize, base: f64, transform: GeoTransform) -> Raster<f64> {
    let data = (0..size * size)
        .map(|i| {
            let (row, col) = (i / size, i % size);
            base + ((row * 7 + col * 13) % 200) as f64 / 1000.0
        })
        .collect();
    Raster::from_vec(data, size, size)
        .unwrap()
        .with_transform(transform)
}

fn create_tile(id: &str, size: usize, x_offset: f64) -> Scene {
    let gt = GeoTransform::new(x_offset, size as f64, 1.0, -1.0);
    let when = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    Scene::new(id, (size, size), gt, when)
        .with_band(Band::Red, create_band(size, 0.1, gt))
        .unwrap()
        .with_band(Band::Nir, create_band(size, 0.3, gt))
        .unwrap()
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/ndvi");
    for size in [256, 512, 1024, 2048] {
        let gt = GeoTransform::new(0.0, size as f64, 1.0, -1.0);
        let nir = create_band(size, 0.3, gt);
        let red = create_band(size, 0.1, gt);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_threshold_classify(c: &mut Criterion) {
    let rules = RuleSet::new(vec![
        ClassRule::closed(-1.0, 0.0, 1),
        ClassRule::new(0.0, 0.3, 2),
        ClassRule::closed(0.3, 1.0, 3),
        ClassRule::above(0.6, 4),
    ]);

    let mut group = c.benchmark_group("imagery/classify");
    for size in [512, 2048] {
        let gt = GeoTransform::new(0.0, size as f64, 1.0, -1.0);
        let index = ndvi(&create_band(size, 0.3, gt), &create_band(size, 0.1, gt)).unwrap();
        group.bench_with_input(BenchmarkId::new("threshold", size), &size, |b, _| {
            b.iter(|| threshold(black_box(&index), 0.2, Comparison::GreaterThan).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("rules", size), &size, |b, _| {
            b.iter(|| classify(black_box(&index), black_box(&rules)).unwrap())
        });
    }
    group.finish();
}

fn bench_mosaic(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite/mosaic");
    for size in [256, 1024] {
        let tiles = TileGroup::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().date_naive(),
            vec![
                create_tile("a", size, 0.0),
                create_tile("b", size, (size / 2) as f64),
                create_tile("c", size, size as f64),
            ],
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| mosaic(black_box(&tiles)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ndvi, bench_threshold_classify, bench_mosaic);
criterion_main!(benches);
