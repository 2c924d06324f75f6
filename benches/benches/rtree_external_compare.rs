// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_bvh::{Bvh, BvhOptions, Rect};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Rect<2>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Rect::from_xywh(x as f64 * cell, y as f64 * cell, cell, cell));
        }
    }
    out
}

fn to_rstar_rects(v: &[Rect<2>]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|r| Rectangle::from_corners([r.min(0), r.min(1)], [r.max(0), r.max(1)]))
        .collect()
}

fn bench_rtree_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let query = Rect::from_xywh(100.0, 100.0, 400.0, 400.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        for (label, options) in [
            ("tracked", BvhOptions::default()),
            ("untracked", BvhOptions::default().with_object_tracking(false)),
        ] {
            group.bench_function(format!("understory_build_query_{label}_n{n}"), |b| {
                b.iter_batched(
                    || Bvh::<2, u32>::with_options(options),
                    |mut bvh| {
                        for (i, r) in rects.iter().copied().enumerate() {
                            bvh.insert_or_update(r, i as u32);
                        }
                        black_box(bvh.search(&query).len());
                    },
                    BatchSize::SmallInput,
                );
            });
        }

        group.bench_function(format!("rstar_build_query_incremental_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_rects(&rects),
                |rectangles| {
                    let mut tree = RTree::new();
                    for r in rectangles {
                        tree.insert(r);
                    }
                    let aabb = AABB::from_corners(
                        [query.min(0), query.min(1)],
                        [query.max(0), query.max(1)],
                    );
                    black_box(tree.locate_in_envelope_intersecting(&aabb).count());
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("rstar_build_query_bulk_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_rects(&rects),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(
                        [query.min(0), query.min(1)],
                        [query.max(0), query.max(1)],
                    );
                    black_box(tree.locate_in_envelope_intersecting(&aabb).count());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rtree_external_compare);
criterion_main!(benches);
