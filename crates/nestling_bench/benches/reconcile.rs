//! Reconciliation benchmarks.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use nestling_core::{Attrs, Record, Value};
use nestling_testkit::{child_payload, empty_parent, family};

/// Child payloads with ids `1..=count`.
fn batch(count: usize) -> Vec<Value> {
    (1..=count as i64)
        .map(|id| child_payload(id, &format!("child {id}")))
        .collect()
}

/// The same ids with different titles, so every merge writes something.
fn renamed_batch(count: usize) -> Vec<Value> {
    (1..=count as i64)
        .map(|id| child_payload(id, &format!("renamed {id}")))
        .collect()
}

/// Benchmark building a graph from a nested payload.
fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");
    for count in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (_, parent_type) = family();
            let payload = Value::object([("children", Value::Array(batch(count)))]);
            b.iter(|| {
                let record =
                    Record::new(&parent_type, Attrs::from(black_box(payload.clone()))).unwrap();
                black_box(record);
            });
        });
    }
    group.finish();
}

/// Benchmark reconciling an identical payload: every entry matches and
/// no merge writes anything.
fn bench_noop_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_noop");
    for count in [10usize, 100] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let parent = empty_parent();
            parent.set("children", Value::Array(batch(count))).unwrap();
            let payload = Value::Array(batch(count));
            b.iter(|| {
                parent.set("children", black_box(payload.clone())).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark reconciling a payload where every member changes title.
fn bench_update_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_update");
    for count in [10usize, 100] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let renamed = Value::Array(renamed_batch(count));
            b.iter_batched(
                || {
                    let parent = empty_parent();
                    parent.set("children", Value::Array(batch(count))).unwrap();
                    parent
                },
                |parent| {
                    parent.set("children", black_box(renamed.clone())).unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// Benchmark the additive single-payload path.
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    group.bench_function("single_payload", |b| {
        b.iter_batched(
            empty_parent,
            |parent| {
                parent
                    .set("children", black_box(child_payload(1, "appended")))
                    .unwrap();
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_construct,
    bench_noop_reconcile,
    bench_update_reconcile,
    bench_append
);
criterion_main!(benches);
