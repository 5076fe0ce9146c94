//! Duplicate Detection Benchmarks
//!
//! Benchmarks for canonical keys and object duplicate detection.
//!
//! Run with: `cargo bench --bench dedup_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use expectly::{
    canonical_key, find_duplicate_objects, find_duplicate_objects_with_cache,
    find_duplicate_primitives, CanonicalCache, Value,
};
use serde_json::json;

fn records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            Value::from(json!({
                "id": i % (count / 2).max(1),
                "name": format!("user-{}", i % 97),
                "tags": ["a", "b", i % 3],
                "profile": {"active": i % 2 == 0, "score": (i as f64) * 0.5}
            }))
        })
        .collect()
}

fn bench_canonical_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_key");

    let shallow = Value::from(json!({"b": 1, "a": 2, "c": 3}));
    let deep = Value::from(json!({
        "level1": {"level2": {"level3": {"items": [1, 2, 3, {"x": "y"}]}}},
        "other": [[1, 2], [3, 4]]
    }));

    group.bench_function("shallow_object", |bench| {
        bench.iter(|| black_box(canonical_key(black_box(&shallow))));
    });
    group.bench_function("nested_object", |bench| {
        bench.iter(|| black_box(canonical_key(black_box(&deep))));
    });

    group.finish();
}

fn bench_duplicate_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("duplicate_objects");

    for count in [100, 1000, 5000] {
        let items = records(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |bench, items| {
            bench.iter(|| black_box(find_duplicate_objects(black_box(items))));
        });
    }

    group.finish();
}

fn bench_duplicate_objects_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("duplicate_objects_cached");

    for count in [100, 1000, 5000] {
        let items = records(count);
        let mut cache = CanonicalCache::new();
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |bench, items| {
            bench.iter(|| black_box(find_duplicate_objects_with_cache(black_box(items), &mut cache)));
        });
    }

    group.finish();
}

fn bench_duplicate_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("duplicate_primitives");

    for count in [100, 1000, 10000] {
        let items: Vec<Value> = (0..count).map(|i| Value::from(i % 500)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |bench, items| {
            bench.iter(|| black_box(find_duplicate_primitives(black_box(items))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_canonical_key,
    bench_duplicate_objects,
    bench_duplicate_objects_cached,
    bench_duplicate_primitives
);
criterion_main!(benches);
