// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse chunked grid basics.
//!
//! Lay out a few chunks around the origin, paint cells across chunk borders, stack
//! decorations, and render the whole grid as text with gaps shown blank.
//!
//! Run:
//! - `cargo run -p understory_demos --example sparse_grid_scan`

use understory_sparse_grid::{ChunkExtents, DenseChunk, SparseChunkedGrid, StackedChunk};

fn main() {
    let mut terrain = SparseChunkedGrid::new();
    terrain.put_chunk(DenseChunk::new(ChunkExtents::new(-8, -4, 8, 4), '.'));
    terrain.put_chunk(DenseChunk::new(ChunkExtents::new(0, -4, 8, 4), ','));
    terrain.put_chunk(DenseChunk::new(ChunkExtents::new(-8, 0, 8, 4), '~'));
    // (0, 0)..(8, 4) is left as a gap.

    // A wall that crosses from one chunk into the next.
    for x in -3..3 {
        terrain.set(x, -2, '#');
    }

    let mut decor: SparseChunkedGrid<StackedChunk<char>> = SparseChunkedGrid::new();
    decor.put_chunk(StackedChunk::new(ChunkExtents::new(-8, -4, 16, 8)));
    decor.push(-6, -3, 'o');
    decor.push(-6, -3, '*');
    decor.push(4, 2, 'x');

    println!(
        "terrain: {} chunks over x {}..{}, y {}..{}",
        terrain.len(),
        terrain.start_x(),
        terrain.end_x(),
        terrain.start_y(),
        terrain.end_y()
    );
    for y in terrain.start_y()..terrain.end_y() {
        let row: String = (terrain.start_x()..terrain.end_x())
            .map(|x| {
                decor
                    .get_last(x, y)
                    .or_else(|| terrain.get(x, y))
                    .copied()
                    .unwrap_or(' ')
            })
            .collect();
        println!("{row}");
    }
    println!("tallest decoration stack: {}", decor.max_level());
}
