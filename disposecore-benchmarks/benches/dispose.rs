use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use disposecore::{ConcurrencyMode, Disposable};
use std::hint::black_box;
use std::sync::Arc;

const MODES: [(&str, ConcurrencyMode); 2] = [
    ("unguarded", ConcurrencyMode::Unguarded),
    ("guarded", ConcurrencyMode::Guarded),
];

fn bench_construct_and_dispose(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct_and_dispose");

    for (name, mode) in MODES {
        group.bench_function(name, |b| {
            b.iter(|| {
                let resource = Disposable::with_mode((), mode);
                let _ = black_box(resource.dispose());
            });
        });
    }

    group.finish();
}

fn bench_teardown_with_dependents(c: &mut Criterion) {
    let mut group = c.benchmark_group("teardown_with_dependents");

    for dependents in [1usize, 8, 64, 512] {
        group.throughput(Throughput::Elements(dependents as u64));
        for (name, mode) in MODES {
            group.bench_with_input(
                BenchmarkId::new(name, dependents),
                &dependents,
                |b, &dependents| {
                    b.iter(|| {
                        let owner = Disposable::with_mode((), mode);
                        for _ in 0..dependents {
                            owner.also_dispose(Arc::new(Disposable::new(())));
                        }
                        let _ = black_box(owner.dispose());
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_repeated_dispose(c: &mut Criterion) {
    let mut group = c.benchmark_group("repeated_dispose");

    for (name, mode) in MODES {
        let resource = Disposable::with_mode((), mode);
        let _ = resource.dispose();
        group.bench_function(name, |b| {
            b.iter(|| black_box(resource.dispose()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_construct_and_dispose,
    bench_teardown_with_dependents,
    bench_repeated_dispose
);
criterion_main!(benches);
