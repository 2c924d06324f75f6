// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_bvh::{Bvh, BvhOptions, Ray, Rect};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Rect<2>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Rect::from_xywh(x as f64 * cell, y as f64 * cell, cell, cell));
        }
    }
    out
}

fn gen_random_rects<const D: usize>(count: usize, extent: f64, max_size: f64) -> Vec<Rect<D>> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let min = core::array::from_fn(|_| rng.next_f64() * extent);
            let size = core::array::from_fn(|_| 1.0 + rng.next_f64() * max_size);
            Rect::new(min, size)
        })
        .collect()
}

fn build<const D: usize>(rects: &[Rect<D>], options: BvhOptions) -> Bvh<D, u32> {
    let mut bvh = Bvh::with_options(options);
    for (i, r) in rects.iter().copied().enumerate() {
        bvh.insert_or_update(r, i as u32);
    }
    bvh
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_insert");
    for &count in &[1_000usize, 10_000] {
        let rects2 = gen_random_rects::<2>(count, 2000.0, 20.0);
        let rects3 = gen_random_rects::<3>(count, 2000.0, 20.0);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("2d_tracked_n{count}"), |b| {
            b.iter(|| black_box(build(&rects2, BvhOptions::default()).len()));
        });
        group.bench_function(format!("2d_untracked_n{count}"), |b| {
            let options = BvhOptions::default().with_object_tracking(false);
            b.iter(|| black_box(build(&rects2, options).len()));
        });
        group.bench_function(format!("3d_tracked_n{count}"), |b| {
            b.iter(|| black_box(build(&rects3, BvhOptions::default()).len()));
        });
        for &width in &[4usize, 16] {
            group.bench_function(format!("2d_max_width{width}_n{count}"), |b| {
                let options = BvhOptions::default().with_max_width(width);
                b.iter(|| black_box(build(&rects2, options).len()));
            });
        }
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_search");
    for &n in &[64usize, 128] {
        let bvh = build(&gen_grid_rects(n, 10.0), BvhOptions::default());
        group.throughput(Throughput::Elements((n * n) as u64));

        let window = Rect::from_xywh(100.0, 100.0, 200.0, 200.0);
        group.bench_function(format!("grid_window_n{n}"), |b| {
            b.iter(|| black_box(bvh.search(&window).len()));
        });

        let mut rng = Rng::new(0xBADC_F00D_1234_5678);
        let probes: Vec<Rect<2>> = (0..256)
            .map(|_| {
                let x = rng.next_f64() * n as f64 * 10.0;
                let y = rng.next_f64() * n as f64 * 10.0;
                Rect::from_xywh(x, y, 1.0, 1.0)
            })
            .collect();
        group.bench_function(format!("grid_point_probes_n{n}"), |b| {
            b.iter(|| {
                let hits: usize = probes.iter().map(|p| bvh.search_values(p).len()).sum();
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_intersect");
    for &count in &[1_000usize, 10_000] {
        let bvh = build(&gen_random_rects::<2>(count, 2000.0, 20.0), BvhOptions::default());
        let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
        let rays: Vec<Ray<2>> = (0..64)
            .map(|_| {
                let angle = rng.next_f64() * core::f64::consts::TAU;
                Ray::new([1000.0, 1000.0], [angle.cos(), angle.sin()])
            })
            .collect();
        group.throughput(Throughput::Elements(rays.len() as u64));
        group.bench_function(format!("radial_rays_n{count}"), |b| {
            b.iter(|| {
                let hits: usize = rays.iter().map(|r| bvh.intersect(r).len()).sum();
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_remove");
    for &count in &[1_000usize, 10_000] {
        let rects = gen_random_rects::<2>(count, 2000.0, 20.0);
        group.throughput(Throughput::Elements(count as u64 / 2));

        group.bench_function(format!("remove_value_half_n{count}"), |b| {
            b.iter_batched(
                || build(&rects, BvhOptions::default()),
                |mut bvh| {
                    for i in (0..count as u32).step_by(2) {
                        black_box(bvh.remove_value(&i));
                    }
                    bvh
                },
                BatchSize::LargeInput,
            );
        });
        group.bench_function(format!("remove_by_rect_half_n{count}"), |b| {
            b.iter_batched(
                || build(&rects, BvhOptions::default().with_object_tracking(false)),
                |mut bvh| {
                    for (i, r) in rects.iter().enumerate().step_by(2) {
                        black_box(bvh.remove(r, Some(&(i as u32))));
                    }
                    bvh
                },
                BatchSize::LargeInput,
            );
        });
        group.bench_function(format!("move_all_n{count}"), |b| {
            b.iter_batched(
                || build(&rects, BvhOptions::default()),
                |mut bvh| {
                    for (i, r) in rects.iter().enumerate() {
                        let moved = Rect::new([r.min(0) + 5.0, r.min(1) - 5.0], [r.size(0), r.size(1)]);
                        bvh.insert_or_update(moved, i as u32);
                    }
                    bvh
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_search,
    bench_intersect,
    bench_remove
);
criterion_main!(benches);
