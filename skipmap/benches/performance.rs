//! Benchmarks for the concurrent map
//!
//! Single-threaded operation costs by size, plus the classic
//! 70% load / 20% store / 10% delete mix compared against a mutex-guarded
//! `HashMap` doing the same work.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use skipmap::SkipMap;
use std::collections::HashMap;

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for size in [100u64, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let map: SkipMap<u64, u64> = SkipMap::new(16);
                for k in 0..size {
                    map.store(&k, k);
                }
                map
            });
        });
    }

    group.finish();
}

fn bench_load_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_hit");

    for size in [100u64, 1_000, 10_000].iter() {
        let map: SkipMap<u64, u64> = SkipMap::new(16);
        for k in 0..*size {
            map.store(&k, k);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let key = size / 2;
            b.iter(|| black_box(map.load(&key)));
        });
    }

    group.finish();
}

fn bench_load_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_miss");

    for size in [100u64, 1_000, 10_000].iter() {
        let map: SkipMap<u64, u64> = SkipMap::new(16);
        for k in 0..*size {
            map.store(&k, k);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(map.load(&u64::MAX)));
        });
    }

    group.finish();
}

/// Mixed workload: 70% loads, 20% stores, 10% deletes over a preloaded
/// key space, against a coarse-locked HashMap doing the same work.
fn bench_mixed_70_20_10(c: &mut Criterion) {
    const KEYS: u64 = 100_000;
    let mut group = c.benchmark_group("mixed_70_20_10");

    let map: SkipMap<u64, u64> = SkipMap::new(20);
    for k in 0..KEYS {
        map.store(&k, k);
    }
    group.bench_function("skipmap", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let k = rng.gen_range(0..KEYS);
            match rng.gen_range(0..10) {
                0 => {
                    map.delete(&k);
                }
                1 | 2 => map.store(&k, k),
                _ => {
                    black_box(map.load(&k));
                }
            }
        });
    });

    let locked: Mutex<HashMap<u64, u64>> = Mutex::new(HashMap::new());
    for k in 0..KEYS {
        locked.lock().insert(k, k);
    }
    group.bench_function("mutex_hashmap", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let k = rng.gen_range(0..KEYS);
            match rng.gen_range(0..10) {
                0 => {
                    locked.lock().remove(&k);
                }
                1 | 2 => {
                    locked.lock().insert(k, k);
                }
                _ => {
                    black_box(locked.lock().get(&k).copied());
                }
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_store,
    bench_load_hit,
    bench_load_miss,
    bench_mixed_70_20_10
);
criterion_main!(benches);
