// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chunk container and its cell accessors.

use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use log::debug;
use understory_bvh::{Bvh, Rect};

use crate::chunk::{ChunkExtents, DenseChunk, GridChunk, StackedChunk};

/// Generational handle to a chunk in a [`SparseChunkedGrid`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId(u32, u32);

impl ChunkId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

struct Slot<C> {
    generation: u32,
    chunk: C,
}

/// A sparse 2D grid assembled from rectangular chunks at arbitrary integer offsets.
///
/// Chunks are registered in a [`Bvh`] by their extents. Point lookups go through the BVH
/// and remember the last chunk hit, so scanning cells in order rarely touches the tree.
///
/// Chunks are expected not to overlap; where they do, which one a lookup returns is
/// unspecified.
pub struct SparseChunkedGrid<C> {
    slots: Vec<Option<Slot<C>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    index: Bvh<2, ChunkId>,
    bounds: Option<ChunkExtents>,
    last_hit: Cell<Option<ChunkId>>,
}

impl<C> Default for SparseChunkedGrid<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for SparseChunkedGrid<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseChunkedGrid")
            .field("chunks", &self.len())
            .field("free_list", &self.free_list.len())
            .field("bounds", &self.bounds)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<C> SparseChunkedGrid<C> {
    /// An empty grid.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            index: Bvh::new(),
            bounds: None,
            last_hit: Cell::new(None),
        }
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the grid has no chunks.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether `id` refers to a chunk still in the grid.
    pub fn is_alive(&self, id: ChunkId) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: ChunkId) -> Option<&Slot<C>> {
        self.slots
            .get(id.idx())?
            .as_ref()
            .filter(|s| s.generation == id.1)
    }

    /// Borrow a chunk.
    pub fn chunk(&self, id: ChunkId) -> Option<&C> {
        self.slot(id).map(|s| &s.chunk)
    }

    /// Mutably borrow a chunk. Its extents must not change.
    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut C> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .filter(|s| s.generation == id.1)
            .map(|s| &mut s.chunk)
    }

    /// Every chunk with its id, in slot order.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &C)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            let s = s.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ChunkId uses 32-bit indices by design."
            )]
            Some((ChunkId::new(i as u32, s.generation), &s.chunk))
        })
    }

    /// Union of all chunk extents, or `None` when empty.
    pub fn bounds(&self) -> Option<ChunkExtents> {
        self.bounds
    }

    /// Leftmost column of any chunk (0 when empty).
    pub fn start_x(&self) -> i32 {
        self.bounds.map_or(0, |b| b.start_x)
    }

    /// Topmost row of any chunk (0 when empty).
    pub fn start_y(&self) -> i32 {
        self.bounds.map_or(0, |b| b.start_y)
    }

    /// One past the rightmost column of any chunk (0 when empty).
    pub fn end_x(&self) -> i32 {
        self.bounds.map_or(0, |b| b.end_x())
    }

    /// One past the bottom row of any chunk (0 when empty).
    pub fn end_y(&self) -> i32 {
        self.bounds.map_or(0, |b| b.end_y())
    }

    /// Width of [`bounds`](Self::bounds).
    pub fn width(&self) -> u32 {
        self.bounds.map_or(0, |b| b.width)
    }

    /// Height of [`bounds`](Self::bounds).
    pub fn height(&self) -> u32 {
        self.bounds.map_or(0, |b| b.height)
    }

    /// Whether `(x, y)` lies within [`bounds`](Self::bounds). The cell may still be a gap
    /// between chunks; see [`is_covered`](Self::is_covered).
    pub fn inside(&self, x: i32, y: i32) -> bool {
        self.bounds.is_some_and(|b| b.contains(x, y))
    }
}

impl<C: GridChunk> SparseChunkedGrid<C> {
    /// Add a chunk and return its id.
    ///
    /// A chunk already occupying exactly the same extents is removed first.
    pub fn put_chunk(&mut self, chunk: C) -> ChunkId {
        let extents = chunk.extents();
        let same = self
            .index
            .search_values(&extents.rect())
            .into_iter()
            .copied()
            .find(|&id| self.chunk(id).is_some_and(|c| c.extents() == extents));
        if let Some(old) = same {
            debug!("sparse grid: replacing chunk at {extents:?}");
            self.remove_chunk(old);
        }

        let id = self.alloc(chunk);
        self.index.insert_or_update(extents.rect(), id);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(&extents),
            None => extents,
        });
        self.last_hit.set(None);
        id
    }

    /// Remove a chunk, returning it. Stale ids return `None`.
    pub fn remove_chunk(&mut self, id: ChunkId) -> Option<C> {
        self.slot(id)?;
        self.index.remove_value(&id);
        let slot = self.slots[id.idx()].take()?;
        self.free_list.push(id.idx());
        self.last_hit.set(None);
        self.recompute_bounds();
        Some(slot.chunk)
    }

    /// Remove every chunk.
    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(i);
            }
        }
        self.index.clear();
        self.bounds = None;
        self.last_hit.set(None);
    }

    fn alloc(&mut self, chunk: C) -> ChunkId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot { generation, chunk });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot { generation, chunk }));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ChunkId uses 32-bit indices by design."
        )]
        ChunkId::new(idx as u32, generation)
    }

    fn recompute_bounds(&mut self) {
        self.bounds = self
            .slots
            .iter()
            .flatten()
            .map(|s| s.chunk.extents())
            .reduce(|a, b| a.union(&b));
    }

    /// Id of the chunk covering `(x, y)`.
    pub fn chunk_id_at(&self, x: i32, y: i32) -> Option<ChunkId> {
        if let Some(id) = self.last_hit.get()
            && self.chunk(id).is_some_and(|c| c.contains(x, y))
        {
            return Some(id);
        }
        let probe = Rect::from_xywh(f64::from(x), f64::from(y), 1.0, 1.0);
        let id = self
            .index
            .search_values(&probe)
            .into_iter()
            .copied()
            .find(|&id| self.chunk(id).is_some_and(|c| c.contains(x, y)))?;
        self.last_hit.set(Some(id));
        Some(id)
    }

    /// The chunk covering `(x, y)`.
    pub fn chunk_at(&self, x: i32, y: i32) -> Option<&C> {
        self.chunk(self.chunk_id_at(x, y)?)
    }

    /// The chunk covering `(x, y)`, mutably.
    pub fn chunk_at_mut(&mut self, x: i32, y: i32) -> Option<&mut C> {
        let id = self.chunk_id_at(x, y)?;
        self.chunk_mut(id)
    }

    /// Whether some chunk covers `(x, y)`.
    pub fn is_covered(&self, x: i32, y: i32) -> bool {
        self.chunk_id_at(x, y).is_some()
    }

    /// Ids of chunks overlapping the cell rectangle at `(x, y)` of size `width × height`.
    pub fn chunks_in_region(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<ChunkId> {
        let region = ChunkExtents::new(x, y, width, height).rect();
        self.index.search_values(&region).into_iter().copied().collect()
    }
}

impl<T> SparseChunkedGrid<DenseChunk<T>> {
    /// Cell at `(x, y)`, or `None` in a gap.
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.chunk_at(x, y)?.get(x, y)
    }

    /// Cell at `(x, y)`, or `default` in a gap.
    pub fn get_or<'a>(&'a self, x: i32, y: i32, default: &'a T) -> &'a T {
        self.get(x, y).unwrap_or(default)
    }

    /// Mutable cell at `(x, y)`.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.chunk_at_mut(x, y)?.get_mut(x, y)
    }

    /// Overwrite the cell at `(x, y)`. Returns `false` when no chunk covers it.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        self.chunk_at_mut(x, y).is_some_and(|c| c.set(x, y, value))
    }
}

impl<T> SparseChunkedGrid<StackedChunk<T>> {
    /// Stack height at `(x, y)`; 0 in a gap.
    pub fn stack_level(&self, x: i32, y: i32) -> usize {
        self.chunk_at(x, y).map_or(0, |c| c.stack_level(x, y))
    }

    /// Value at `level` of the stack at `(x, y)`.
    pub fn get_at(&self, x: i32, y: i32, level: usize) -> Option<&T> {
        self.chunk_at(x, y)?.get_at(x, y, level)
    }

    /// Topmost value of the stack at `(x, y)`.
    pub fn get_last(&self, x: i32, y: i32) -> Option<&T> {
        self.chunk_at(x, y)?.get_last(x, y)
    }

    /// Overwrite an existing level at `(x, y)`.
    pub fn set_at(&mut self, x: i32, y: i32, level: usize, value: T) -> bool {
        self.chunk_at_mut(x, y)
            .is_some_and(|c| c.set_at(x, y, level, value))
    }

    /// Push onto the stack at `(x, y)`. Returns `false` when no chunk covers it.
    pub fn push(&mut self, x: i32, y: i32, value: T) -> bool {
        self.chunk_at_mut(x, y).is_some_and(|c| c.push(x, y, value))
    }

    /// Pop the stack at `(x, y)`.
    pub fn pop(&mut self, x: i32, y: i32) -> Option<T> {
        self.chunk_at_mut(x, y)?.pop(x, y)
    }

    /// Highest stack level across all chunks.
    pub fn max_level(&self) -> usize {
        self.chunks().map(|(_, c)| c.max_level()).max().unwrap_or(0)
    }
}
