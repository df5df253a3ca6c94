//! # Safety Check Benchmarks
//!
//! Measures the greedy safety scan. Worst case is O(C² · R) when the
//! only finishable consumer is always the last one scanned.
//!
//! Run: `cargo bench --bench safety_bench`

use banker_core::prelude::*;
use banker_core::safety::check_safety;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Ledger where every consumer can finish in index order
fn ordered_ledger(consumers: usize, resources: usize) -> LedgerState {
    let maximum = Matrix::from_rows(&vec![vec![4; resources]; consumers], resources).unwrap();
    let allocation = Matrix::from_rows(&vec![vec![2; resources]; consumers], resources).unwrap();
    LedgerState::from_parts(vec![2; resources], maximum, allocation).unwrap()
}

/// Ledger where consumer i only fits after i + 1 has released, so the scan
/// restarts from index 0 after every finish
fn reversed_ledger(consumers: usize, resources: usize) -> LedgerState {
    let rows: Vec<Vec<Units>> = (0..consumers)
        .map(|i| vec![(consumers - i) as Units + 1; resources])
        .collect();
    let maximum = Matrix::from_rows(&rows, resources).unwrap();
    let allocation = Matrix::from_rows(&vec![vec![1; resources]; consumers], resources).unwrap();
    LedgerState::from_parts(vec![1; resources], maximum, allocation).unwrap()
}

fn bench_safety_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("safety_scan");

    for &consumers in &[5usize, 50, 200] {
        let ordered = ordered_ledger(consumers, 4);
        group.bench_with_input(BenchmarkId::new("ordered", consumers), &ordered, |b, state| {
            b.iter(|| black_box(check_safety(state.available(), state.allocation(), state.need())))
        });

        let reversed = reversed_ledger(consumers, 4);
        group.bench_with_input(BenchmarkId::new("reversed", consumers), &reversed, |b, state| {
            b.iter(|| black_box(is_safe(state)))
        });
    }

    group.finish();
}

fn bench_diagnose(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnose");

    let maximum = Matrix::from_rows(&vec![vec![8; 4]; 50], 4).unwrap();
    let allocation = Matrix::from_rows(&vec![vec![1; 4]; 50], 4).unwrap();
    let state = LedgerState::from_parts(vec![0; 4], maximum, allocation).unwrap();
    let blocked: Vec<usize> = (0..50).collect();

    group.bench_function("all_blocked_50x4", |b| {
        b.iter(|| black_box(banker_core::safety::diagnose(&state, &blocked)))
    });

    group.finish();
}

criterion_group!(benches, bench_safety_scan, bench_diagnose);
criterion_main!(benches);
