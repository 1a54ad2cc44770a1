// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Reorder engine and dirty tracking over collections of growing size

use busdesk::collection::{CollectionStore, DragEnd};
use busdesk::reorder;
use busdesk::types::PlacedItem;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn items(n: u32) -> Vec<PlacedItem<u32>> {
    (1..=n).map(|i| PlacedItem::new(u64::from(i), i, i)).collect()
}

fn bench_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder");
    for n in [10_u32, 100, 1_000] {
        let last = n as usize - 1;
        group.bench_with_input(BenchmarkId::new("first_to_last", n), &n, |b, &n| {
            let mut list = items(n);
            b.iter(|| reorder::reorder(black_box(&mut list), 0, last));
        });
    }
    group.finish();
}

fn bench_dirty_check(c: &mut Criterion) {
    let mut store = CollectionStore::seed(items(1_000));
    let _ = store.drag_end(DragEnd::dropped(999, 0));
    c.bench_function("is_dirty_1000", |b| b.iter(|| black_box(&store).is_dirty()));
}

criterion_group!(benches, bench_reorder, bench_dirty_check);
criterion_main!(benches);
