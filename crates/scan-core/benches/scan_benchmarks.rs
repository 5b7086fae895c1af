//! Benchmarks for scan-core stages.
//!
//! Run with: cargo bench -p scan-core
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p scan-core -- --save-baseline main
//! 2. After changes: cargo bench -p scan-core -- --baseline main

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scan_core::fit::fit_oriented_box;
use scan_core::{ClusterExtractor, ClusterParams, ScanConfig, ScanPipeline, SurfaceExtractor, SurfaceParams};
use scan_spatial::FieldIndex;
use scan_types::{Point3, PointSet, ScanPoint};

// =============================================================================
// Test Cloud Generation
// =============================================================================

/// Create `blobs` cubic blobs of `side^3` points each, spaced 0.05 apart
/// inside a blob and 1.0 apart between blobs.
fn create_cloud(blobs: u32, side: u32) -> PointSet {
    let mut points = Vec::new();
    for b in 0..blobs {
        let origin = f64::from(b);
        for i in 0..side {
            for j in 0..side {
                for k in 0..side {
                    points.push(ScanPoint::from_coords(
                        origin + f64::from(i) * 0.05,
                        f64::from(j) * 0.05,
                        f64::from(k) * 0.05,
                        0.8,
                    ));
                }
            }
        }
    }
    PointSet::from(points)
}

fn config() -> ScanConfig {
    ScanConfig::default().with_eps(0.08).with_min_points(4)
}

// =============================================================================
// Index Benchmarks
// =============================================================================

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("FieldIndex");

    for (name, cloud) in [("1k", create_cloud(8, 5)), ("8k", create_cloud(8, 10))] {
        group.throughput(Throughput::Elements(cloud.len() as u64));

        group.bench_with_input(BenchmarkId::new("build", name), &cloud, |b, cloud| {
            b.iter(|| FieldIndex::build(black_box(cloud.clone()), 0.1));
        });

        let index = FieldIndex::build(cloud, 0.1).unwrap();
        group.bench_with_input(BenchmarkId::new("radius_query", name), &index, |b, index| {
            b.iter(|| index.count_neighbors_in_radius(black_box(Point3::new(0.1, 0.1, 0.1)), 0.1));
        });
    }

    group.finish();
}

// =============================================================================
// Clustering Benchmarks
// =============================================================================

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Clustering");
    group.sample_size(20); // Extraction visits every neighborhood, reduce samples

    for (name, cloud) in [("1k", create_cloud(8, 5)), ("8k", create_cloud(8, 10))] {
        group.throughput(Throughput::Elements(cloud.len() as u64));
        let index = FieldIndex::build(cloud, 0.1).unwrap();
        let extractor = ClusterExtractor::new(ClusterParams::new(0.08, 4)).unwrap();

        group.bench_with_input(BenchmarkId::new("dbscan", name), &index, |b, index| {
            b.iter(|| extractor.extract(black_box(index)));
        });
    }

    group.finish();
}

// =============================================================================
// Fitting Benchmarks
// =============================================================================

fn bench_fitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fitting");

    for side in [5u32, 10, 20] {
        let points: Vec<_> = create_cloud(1, side).iter().map(|p| p.position).collect();
        group.throughput(Throughput::Elements(points.len() as u64));

        group.bench_with_input(BenchmarkId::new("obb", points.len()), &points, |b, points| {
            b.iter(|| fit_oriented_box(black_box(points)));
        });
    }

    group.finish();
}

// =============================================================================
// Surface Benchmarks
// =============================================================================

fn bench_surfaces(c: &mut Criterion) {
    let mut group = c.benchmark_group("Surfaces");
    group.sample_size(20);

    let extractor = SurfaceExtractor::new(SurfaceParams::default().with_radii(0.08, 0.1)).unwrap();
    for (name, cloud) in [("1k", create_cloud(8, 5)), ("8k", create_cloud(8, 10))] {
        group.throughput(Throughput::Elements(cloud.len() as u64));
        let index = FieldIndex::build(cloud, 0.1).unwrap();

        group.bench_with_input(BenchmarkId::new("analyze", name), &index, |b, index| {
            b.iter(|| extractor.analyze(black_box(index)));
        });
    }

    group.finish();
}

// =============================================================================
// Pipeline Benchmarks
// =============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pipeline");
    group.sample_size(10);

    let pipeline = ScanPipeline::new(config()).unwrap();
    for (name, cloud) in [("8_blobs", create_cloud(8, 6)), ("32_blobs", create_cloud(32, 6))] {
        group.throughput(Throughput::Elements(cloud.len() as u64));

        group.bench_with_input(BenchmarkId::new("run", name), &cloud, |b, cloud| {
            b.iter(|| pipeline.run(black_box(cloud.clone())));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(
    benches,
    bench_index,
    bench_clustering,
    bench_fitting,
    bench_surfaces,
    bench_pipeline
);
criterion_main!(benches);
