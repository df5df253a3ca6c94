//! # Banker Engine Benchmarks
//!
//! Measures request handling, previews and savepoint bookkeeping.
//!
//! Run: `cargo bench --bench engine_bench`

use banker_core::prelude::*;
use banker_savepoint::Banker;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn textbook() -> Banker {
    let maximum = Matrix::from_rows(
        &[
            vec![0, 0, 1, 2],
            vec![1, 7, 5, 0],
            vec![2, 3, 5, 6],
            vec![0, 6, 5, 2],
            vec![0, 6, 5, 6],
        ],
        4,
    )
    .unwrap();
    let mut banker = Banker::new(maximum, vec![3, 14, 12, 12]).unwrap();
    for (consumer, request) in [
        (0, [0, 0, 1, 2]),
        (1, [1, 0, 0, 0]),
        (2, [1, 3, 5, 4]),
        (3, [0, 6, 3, 2]),
        (4, [0, 0, 1, 4]),
    ] {
        banker.request(consumer, &request).unwrap();
    }
    banker
}

fn bench_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("request");
    let base = textbook();

    group.bench_function("granted_then_released", |b| {
        let mut banker = base.clone();
        b.iter(|| {
            black_box(banker.request(1, &[0, 4, 2, 0]).unwrap());
            banker.release(1, &[0, 4, 2, 0]).unwrap();
        })
    });

    group.bench_function("denied_need", |b| {
        let mut banker = base.clone();
        b.iter(|| black_box(banker.request(1, &[1, 0, 2, 0]).unwrap()))
    });

    group.bench_function("preview", |b| {
        b.iter(|| black_box(base.preview(1, &[0, 4, 2, 0]).unwrap()))
    });

    group.finish();
}

fn bench_savepoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("savepoints");
    let base = textbook();

    group.bench_function("save_overwrite", |b| {
        let mut banker = base.clone();
        b.iter(|| banker.save("bench").unwrap())
    });

    group.bench_function("rollback", |b| {
        let mut banker = base.clone();
        banker.save("bench").unwrap();
        b.iter(|| banker.rollback_to("bench").unwrap())
    });

    group.bench_function("diff", |b| {
        let mut banker = base.clone();
        banker.save("bench").unwrap();
        banker.release(2, &[1, 3, 5, 4]).unwrap();
        b.iter(|| black_box(banker.diff("bench").unwrap()))
    });

    group.bench_function("reset", |b| {
        let mut banker = base.clone();
        b.iter(|| banker.reset().unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_request, bench_savepoints);
criterion_main!(benches);
