//! Diff engine benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use datasync_bench::{generate_records, keyed, mutate, Record};
use datasync_engine::{diff, DuplicateKeyPolicy, KeyedCollection, Side};

fn same(a: &Record, b: &Record) -> bool {
    a == b
}

/// Benchmark building keyed collections from raw records.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for count in [1_000usize, 10_000, 100_000] {
        let records = generate_records(count, 32);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| {
                let collection = KeyedCollection::build(
                    Side::Source,
                    records.iter().cloned(),
                    |r: &Record| r.id,
                    DuplicateKeyPolicy::LastWins,
                )
                .unwrap();
                black_box(collection);
            });
        });
    }

    group.finish();
}

/// Benchmark diffing collections with 10% churn.
fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for count in [1_000usize, 10_000, 100_000] {
        let source = generate_records(count, 32);
        let destination = mutate(&source, 0.1);
        let (source, destination) = (keyed(&source), keyed(&destination));

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::new("overwrite", count), |b| {
            b.iter(|| {
                let result = diff(black_box(&source), black_box(&destination), &same, None);
                black_box(result);
            });
        });

        let merge = |dst: &Record, src: &Record| Record {
            id: dst.id,
            payload: src.payload.clone(),
        };
        let merge: &dyn Fn(&Record, &Record) -> Record = &merge;
        group.bench_function(BenchmarkId::new("merge", count), |b| {
            b.iter(|| {
                let result = diff(
                    black_box(&source),
                    black_box(&destination),
                    &same,
                    Some(merge),
                );
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark diffing identical collections (the common no-op run).
fn bench_unchanged(c: &mut Criterion) {
    let records = keyed(&generate_records(10_000, 32));

    c.bench_function("diff_unchanged_10k", |b| {
        b.iter(|| {
            let result = diff(black_box(&records), black_box(&records), &same, None);
            black_box(result.has_changes());
        });
    });
}

criterion_group!(benches, bench_build, bench_diff, bench_unchanged);
criterion_main!(benches);
