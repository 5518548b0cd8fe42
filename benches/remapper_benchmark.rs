//! Remapper Performance Benchmarks
//!
//! Classification, validation and evaluation of representative trees.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use remapper_engine::{ContextBuilder, FastRandSource, RemapperEngine};
use serde_json::{Value, json};
use std::hint::black_box;

fn test_remappers() -> Vec<(&'static str, Value)> {
    vec![
        ("simple", json!({ "prop": "name" })),
        ("medium", json!([{ "prop": "items" }, { "array.map": { "prop": "price" } }])),
        (
            "complex",
            json!([
                { "prop": "items" },
                { "array.filter": { "gt": [{ "prop": "price" }, 10] } },
                { "array.map": { "object.from": {
                    "label": { "string.format": {
                        "template": "{name} costs {price}",
                        "values": { "name": { "prop": "name" }, "price": { "prop": "price" } }
                    } },
                    "upper": [{ "prop": "name" }, { "string.case": "upper" }],
                    "position": { "array": "index" }
                } } }
            ]),
        ),
    ]
}

fn test_input(size: usize) -> Value {
    let items: Vec<Value> = (0..size)
        .map(|i| json!({ "name": format!("item {i}"), "price": i % 50 }))
        .collect();
    json!({ "name": "catalogue", "items": items })
}

fn bench_validator(c: &mut Criterion) {
    let mut group = c.benchmark_group("validator");
    group.throughput(Throughput::Elements(1));
    let engine = RemapperEngine::standard();

    for (complexity, remapper) in test_remappers() {
        group.bench_with_input(
            BenchmarkId::new("validate", complexity),
            &remapper,
            |b, remapper| b.iter(|| black_box(engine.validate(black_box(remapper)))),
        );
    }

    group.finish();
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");
    group.throughput(Throughput::Elements(1));
    let engine = RemapperEngine::standard();
    let input = test_input(20);

    for (complexity, remapper) in test_remappers() {
        group.bench_with_input(
            BenchmarkId::new("evaluate", complexity),
            &remapper,
            |b, remapper| b.iter(|| black_box(engine.remap(black_box(remapper), &input))),
        );
    }

    group.finish();
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    let engine = RemapperEngine::standard();
    let builder = ContextBuilder::new().with_random(FastRandSource::with_seed(42));
    let remapper = json!([
        { "prop": "items" },
        { "array.map": { "object.assign": { "id": { "random.string": { "choice": "abcdef0123456789", "length": 8 } } } } }
    ]);

    for size in [10usize, 100, 1000] {
        let input = test_input(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("array_items", size), &input, |b, input| {
            b.iter(|| black_box(engine.evaluate(&remapper, black_box(input), &builder)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validator, bench_evaluator, bench_throughput);
criterion_main!(benches);
