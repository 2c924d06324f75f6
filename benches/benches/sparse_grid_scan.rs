// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_sparse_grid::{ChunkExtents, DenseChunk, SparseChunkedGrid, StackedChunk};

/// `n × n` chunks of `size × size` cells, centered on the origin, with every
/// seventh chunk left out.
fn gen_dense_grid(n: i32, size: u32) -> SparseChunkedGrid<DenseChunk<u32>> {
    let mut grid = SparseChunkedGrid::new();
    let side = size as i32;
    for cy in 0..n {
        for cx in 0..n {
            if (cx + cy * n) % 7 == 3 {
                continue;
            }
            let extents = ChunkExtents::new((cx - n / 2) * side, (cy - n / 2) * side, size, size);
            grid.put_chunk(DenseChunk::new(extents, (cx * n + cy) as u32));
        }
    }
    grid
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_grid_scan");
    for &(n, size) in &[(8, 32u32), (32, 16)] {
        let grid = gen_dense_grid(n, size);
        let cells = u64::from(grid.width()) * u64::from(grid.height());
        group.throughput(Throughput::Elements(cells));

        group.bench_function(format!("row_major_n{n}_chunk{size}"), |b| {
            b.iter(|| {
                let mut sum = 0_u64;
                for y in grid.start_y()..grid.end_y() {
                    for x in grid.start_x()..grid.end_x() {
                        sum += u64::from(*grid.get_or(x, y, &0));
                    }
                }
                black_box(sum)
            });
        });

        group.bench_function(format!("column_major_n{n}_chunk{size}"), |b| {
            b.iter(|| {
                let mut sum = 0_u64;
                for x in grid.start_x()..grid.end_x() {
                    for y in grid.start_y()..grid.end_y() {
                        sum += u64::from(*grid.get_or(x, y, &0));
                    }
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

fn bench_stacked(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_grid_stacked");
    let size = 32_u32;
    group.throughput(Throughput::Elements(u64::from(size * size) * 4));
    group.bench_function("push_pop_layers", |b| {
        let mut grid: SparseChunkedGrid<StackedChunk<u16>> = SparseChunkedGrid::new();
        grid.put_chunk(StackedChunk::new(ChunkExtents::new(-16, -16, size, size)));
        b.iter(|| {
            for layer in 0..2_u16 {
                for y in -16..16 {
                    for x in -16..16 {
                        grid.push(x, y, layer);
                    }
                }
            }
            for y in -16..16 {
                for x in -16..16 {
                    black_box(grid.pop(x, y));
                    black_box(grid.pop(x, y));
                }
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_scan, bench_stacked);
criterion_main!(benches);
