//! Notification Store Benchmarks
//!
//! Measures add/remove throughput with and without armed timers, snapshot
//! cost for growing active sets, and clear_all with many pending timers.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use toastq::notifications::{NotificationKind, NotificationStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

/// Add then dismiss, persistent vs timed entries
fn bench_add_remove(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let mut group = c.benchmark_group("add_remove");

    for (name, ttl) in [("persistent", Duration::ZERO), ("timed", Duration::from_secs(60))] {
        let store = NotificationStore::new().expect("store");
        group.throughput(Throughput::Elements(1));
        group.bench_function(name, |b| {
            b.iter(|| {
                let id = store.add_with_ttl(NotificationKind::Info, "Bench", "body", ttl);
                store.remove(&id);
            })
        });
    }

    group.finish();
}

/// Snapshot cost as the active set grows
fn bench_list(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let mut group = c.benchmark_group("list");

    for size in [10usize, 100, 1000] {
        let store = NotificationStore::new().expect("store");
        for i in 0..size {
            store.add_with_ttl(NotificationKind::Success, format!("n{}", i), "", Duration::ZERO);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| store.list())
        });
    }

    group.finish();
}

/// clear_all with every entry holding an armed timer
fn bench_clear_all(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let mut group = c.benchmark_group("clear_all");

    for size in [100usize, 1000] {
        let store = NotificationStore::new().expect("store");
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    store.add_with_ttl(NotificationKind::Warning, format!("n{}", i), "", Duration::from_secs(60));
                }
                store.clear_all();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add_remove, bench_list, bench_clear_all);
criterion_main!(benches);
