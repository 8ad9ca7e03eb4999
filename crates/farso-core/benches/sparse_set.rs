//! Benchmarks for the SparseSet arena backing the widget tree.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use farso_core::alloc::sparse_set::{IndexSlot, SparseSet};
use farso_core::geometry::Rect;

fn bench_sparse_set_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_churn");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut set = SparseSet::new();
                let slots: Vec<IndexSlot> = (0..size)
                    .map(|i| set.push(Rect::from_size(i, i, 10, 10)))
                    .collect();
                for slot in slots.iter().step_by(2) {
                    set.remove(*slot);
                }
                for i in 0..size / 2 {
                    set.push(black_box(Rect::from_size(i, 0, 4, 4)));
                }
                set
            });
        });
    }

    group.finish();
}

fn bench_sparse_set_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_access");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        let mut set = SparseSet::new();
        let slots: Vec<IndexSlot> = (0..size).map(|i| set.push(Rect::from_size(i, 0, 8, 8))).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut width = 0;
                for &slot in &slots {
                    if let Some(rect) = set.get(slot) {
                        width += rect.width();
                    }
                }
                black_box(width)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sparse_set_churn, bench_sparse_set_access);
criterion_main!(benches);
