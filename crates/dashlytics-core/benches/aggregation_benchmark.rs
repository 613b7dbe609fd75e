//! Benchmarks for group-by aggregation, time bucketing and percentiles.
//!
//! Compares batch and streaming aggregation across data scales.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dashlytics_core::{
    aggregate, bucket, moving_average, percentile, stream_aggregate, AggregateOp,
    AggregationSpec, Interval, Record, TimeSeriesSpec,
};

fn create_records(size: usize) -> Vec<Record> {
    let regions = ["north", "south", "east", "west", "central"];
    let products = ["widget", "gadget", "gizmo"];
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");

    (0..size)
        .map(|id| {
            Record::new()
                .with("region", regions[id % regions.len()])
                .with("product", products[id % products.len()])
                .with("revenue", (id % 1000) as f64 + 0.99)
                .with("units", (id % 50) as i64)
                .with("date", start + Duration::minutes(id as i64 * 7))
        })
        .collect()
}

fn spec(op: AggregateOp) -> AggregationSpec {
    AggregationSpec::new(["region", "product"])
        .with("revenue", op)
        .with("units", AggregateOp::Sum)
}

fn bench_aggregate_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_batch");
    group.sample_size(20);

    for size in [1_000, 10_000, 100_000] {
        let records = create_records(size);
        for op in [AggregateOp::Sum, AggregateOp::Median] {
            let spec = spec(op);
            group.bench_with_input(BenchmarkId::new(op.as_str(), size), &size, |b, _| {
                b.iter(|| black_box(aggregate(black_box(&records), &spec)));
            });
        }
    }

    group.finish();
}

fn bench_aggregate_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_streaming");
    group.sample_size(20);

    for size in [1_000, 10_000, 100_000] {
        let records = create_records(size);
        group.bench_with_input(BenchmarkId::new("sum", size), &size, |b, _| {
            b.iter(|| {
                let rows: Vec<Record> =
                    stream_aggregate(black_box(&records), spec(AggregateOp::Sum)).collect();
                black_box(rows)
            });
        });
    }

    group.finish();
}

fn bench_bucket(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_bucket");
    group.sample_size(20);
    let records = create_records(50_000);

    for interval in [Interval::Hour, Interval::Day, Interval::Week, Interval::Month] {
        let spec = TimeSeriesSpec::new("date", "revenue", interval);
        group.bench_with_input(
            BenchmarkId::new(interval.as_str(), records.len()),
            &interval,
            |b, _| b.iter(|| black_box(bucket(black_box(&records), &spec))),
        );
    }

    group.finish();
}

fn bench_trend_and_percentile(c: &mut Criterion) {
    let values: Vec<f64> = (0..100_000).map(|i| ((i * 7919) % 10_007) as f64).collect();

    c.bench_function("moving_average_100k_w30", |b| {
        b.iter(|| black_box(moving_average(black_box(&values), 30)));
    });
    c.bench_function("percentile_p95_100k", |b| {
        b.iter(|| black_box(percentile(black_box(&values), 95.0)));
    });
}

criterion_group!(
    benches,
    bench_aggregate_batch,
    bench_aggregate_streaming,
    bench_bucket,
    bench_trend_and_percentile
);
criterion_main!(benches);
