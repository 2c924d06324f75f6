// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Sparse Grid: 2D cell grids assembled from rectangular chunks.
//!
//! Chunks sit at arbitrary integer offsets (negative ones included) and may leave gaps
//! between them. A [`SparseChunkedGrid`] indexes chunk extents in an
//! [`understory_bvh::Bvh`] and resolves cell coordinates to the covering chunk, caching
//! the last hit so row scans stay cheap.
//!
//! Two chunk storages are provided:
//! - [`DenseChunk`]: one value per cell.
//! - [`StackedChunk`]: a small stack of values per cell, for layered tiles.
//!
//! Any other storage can take part by implementing [`GridChunk`].
//!
//! # Example
//!
//! ```rust
//! use understory_sparse_grid::{ChunkExtents, DenseChunk, SparseChunkedGrid};
//!
//! let mut grid = SparseChunkedGrid::new();
//! grid.put_chunk(DenseChunk::new(ChunkExtents::new(-8, -8, 8, 8), '.'));
//! grid.put_chunk(DenseChunk::new(ChunkExtents::new(16, 0, 4, 4), '#'));
//!
//! assert!(grid.set(-1, -1, '@'));
//! assert_eq!(grid.get(-1, -1), Some(&'@'));
//! assert_eq!(grid.get(17, 2), Some(&'#'));
//!
//! // (4, 2) is within the overall bounds but falls in a gap.
//! assert!(grid.inside(4, 2));
//! assert!(!grid.inside(4, 4));
//! assert_eq!(grid.get(4, 2), None);
//! assert_eq!((grid.start_x(), grid.end_x()), (-8, 20));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod chunk;
mod grid;

pub use chunk::{ChunkExtents, ChunkSizeMismatch, DenseChunk, GridChunk, StackedChunk};
pub use grid::{ChunkId, SparseChunkedGrid};
