use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scry::emit::StreamSink;
use scry::inspect::{Inspector, Limits};
use scry::value::{Value, ValueArena};

struct Scenario {
    name: &'static str,
    entries: usize,
}

fn bench_limits() -> Limits {
    let mut limits = Limits::default();
    // The call counter persists across iterations; leave it uncapped.
    limits.max_calls = usize::MAX;
    limits.seq_threshold = usize::MAX;
    limits
}

fn build_catalog(entries: usize) -> (ValueArena, Value) {
    let mut arena = ValueArena::new();
    let mut items = Vec::with_capacity(entries);
    for i in 0..entries {
        let item = arena.alloc_composite("Item");
        arena.composite_push(item, "id", Value::Int(i as i64));
        arena.composite_push(item, "name", Value::from(format!("item-{i}").as_str()));
        arena.composite_push(item, "in_stock", Value::Bool(i % 2 == 0));
        items.push(Value::Composite(item));
    }
    let seq = arena.alloc_seq(items);
    (arena, Value::Seq(seq))
}

fn bench_analyze(c: &mut Criterion) {
    let scenarios = [
        Scenario {
            name: "catalog_100",
            entries: 100,
        },
        Scenario {
            name: "catalog_1000",
            entries: 1_000,
        },
    ];

    let mut group = c.benchmark_group("inspect/analyze");
    for scenario in scenarios {
        let (arena, value) = build_catalog(scenario.entries);
        let mut inspector = Inspector::in_memory(bench_limits());
        group.throughput(Throughput::Elements(scenario.entries as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(scenario.name),
            &value,
            |b, value| {
                b.iter(|| {
                    let node = inspector.analyze(&arena, black_box(value), "catalog");
                    black_box(node);
                });
            },
        );
    }
    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let (arena, value) = build_catalog(1_000);
    let mut limits = bench_limits();
    limits.chunk_threshold = 1024;
    let mut inspector = Inspector::in_memory(limits);
    let root = inspector
        .analyze(&arena, &value, "catalog")
        .expect("analysis within budget");
    let text = root.text.clone();

    let mut probe = StreamSink::new(Vec::new());
    inspector.emit(&text, &mut probe).unwrap();
    let emitted = probe.into_inner().len();

    let mut group = c.benchmark_group("inspect/emit");
    group.throughput(Throughput::Bytes(emitted as u64));
    group.bench_function("catalog_1000_chunked", |b| {
        b.iter(|| {
            let mut sink = StreamSink::new(std::io::sink());
            inspector.emit(black_box(&text), &mut sink).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_analyze, bench_emit);
criterion_main!(benches);
