// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunk extents and the two chunk storages.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use understory_bvh::Rect;

/// Integer placement of a chunk in grid coordinates.
///
/// Covers `start_x..end_x` by `start_y..end_y`; the end coordinates are exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkExtents {
    /// Leftmost column.
    pub start_x: i32,
    /// Topmost row.
    pub start_y: i32,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl ChunkExtents {
    /// Create extents from origin and size.
    pub const fn new(start_x: i32, start_y: i32, width: u32, height: u32) -> Self {
        Self {
            start_x,
            start_y,
            width,
            height,
        }
    }

    /// One past the rightmost column.
    pub const fn end_x(&self) -> i32 {
        self.start_x.saturating_add_unsigned(self.width)
    }

    /// One past the bottom row.
    pub const fn end_y(&self) -> i32 {
        self.start_y.saturating_add_unsigned(self.height)
    }

    /// Number of cells.
    pub fn area(&self) -> usize {
        let cells = u64::from(self.width) * u64::from(self.height);
        usize::try_from(cells).unwrap_or(usize::MAX)
    }

    /// Whether `(x, y)` lies inside.
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.start_x && x < self.end_x() && y >= self.start_y && y < self.end_y()
    }

    /// The extents as a BVH rectangle.
    pub fn rect(&self) -> Rect<2> {
        Rect::from_xywh(
            f64::from(self.start_x),
            f64::from(self.start_y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }

    /// Smallest extents covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let start_x = self.start_x.min(other.start_x);
        let start_y = self.start_y.min(other.start_y);
        let end_x = self.end_x().max(other.end_x());
        let end_y = self.end_y().max(other.end_y());
        Self {
            start_x,
            start_y,
            width: end_x.abs_diff(start_x),
            height: end_y.abs_diff(start_y),
        }
    }

    /// Row-major offset of `(x, y)`, or `None` outside.
    pub(crate) fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let dx = u64::from(x.abs_diff(self.start_x));
        let dy = u64::from(y.abs_diff(self.start_y));
        usize::try_from(dy * u64::from(self.width) + dx).ok()
    }
}

/// Error returned when a cell buffer does not match the chunk's `width * height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkSizeMismatch {
    /// Cells required by the extents.
    pub expected: usize,
    /// Cells supplied.
    pub found: usize,
}

impl fmt::Display for ChunkSizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk needs {} cells but {} were supplied",
            self.expected, self.found
        )
    }
}

impl core::error::Error for ChunkSizeMismatch {}

/// A rectangular block of cells that can be placed in a
/// [`SparseChunkedGrid`](crate::SparseChunkedGrid).
pub trait GridChunk {
    /// Where the chunk sits in grid coordinates.
    fn extents(&self) -> ChunkExtents;

    /// Leftmost column.
    fn start_x(&self) -> i32 {
        self.extents().start_x
    }

    /// Topmost row.
    fn start_y(&self) -> i32 {
        self.extents().start_y
    }

    /// One past the rightmost column.
    fn end_x(&self) -> i32 {
        self.extents().end_x()
    }

    /// One past the bottom row.
    fn end_y(&self) -> i32 {
        self.extents().end_y()
    }

    /// Number of columns.
    fn width(&self) -> u32 {
        self.extents().width
    }

    /// Number of rows.
    fn height(&self) -> u32 {
        self.extents().height
    }

    /// Whether `(x, y)` lies inside the chunk.
    fn contains(&self, x: i32, y: i32) -> bool {
        self.extents().contains(x, y)
    }

    /// The chunk extents as a BVH rectangle.
    fn rect(&self) -> Rect<2> {
        self.extents().rect()
    }
}

/// One value per cell, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseChunk<T> {
    extents: ChunkExtents,
    cells: Vec<T>,
}

impl<T: Clone> DenseChunk<T> {
    /// A chunk with every cell set to `fill`.
    pub fn new(extents: ChunkExtents, fill: T) -> Self {
        Self {
            extents,
            cells: vec![fill; extents.area()],
        }
    }
}

impl<T> DenseChunk<T> {
    /// Wrap an existing row-major buffer.
    pub fn from_vec(extents: ChunkExtents, cells: Vec<T>) -> Result<Self, ChunkSizeMismatch> {
        if cells.len() != extents.area() {
            return Err(ChunkSizeMismatch {
                expected: extents.area(),
                found: cells.len(),
            });
        }
        Ok(Self { extents, cells })
    }

    /// Cell at grid coordinates `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.cells.get(self.extents.offset(x, y)?)
    }

    /// Mutable cell at grid coordinates `(x, y)`.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        let offset = self.extents.offset(x, y)?;
        self.cells.get_mut(offset)
    }

    /// Overwrite a cell. Returns `false` if `(x, y)` is outside the chunk.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Consume the chunk, returning its row-major buffer.
    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }
}

impl<T> GridChunk for DenseChunk<T> {
    fn extents(&self) -> ChunkExtents {
        self.extents
    }
}

/// A stack of values per cell, e.g. tile layers.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedChunk<T> {
    extents: ChunkExtents,
    cells: Vec<SmallVec<[T; 2]>>,
}

impl<T> StackedChunk<T> {
    /// A chunk whose stacks are all empty.
    pub fn new(extents: ChunkExtents) -> Self {
        let mut cells = Vec::with_capacity(extents.area());
        cells.resize_with(extents.area(), SmallVec::new);
        Self { extents, cells }
    }

    /// A chunk with one level taken from a row-major buffer.
    pub fn from_vec(extents: ChunkExtents, cells: Vec<T>) -> Result<Self, ChunkSizeMismatch> {
        DenseChunk::from_vec(extents, cells).map(Self::from)
    }

    fn stack(&self, x: i32, y: i32) -> Option<&SmallVec<[T; 2]>> {
        self.cells.get(self.extents.offset(x, y)?)
    }

    fn stack_mut(&mut self, x: i32, y: i32) -> Option<&mut SmallVec<[T; 2]>> {
        let offset = self.extents.offset(x, y)?;
        self.cells.get_mut(offset)
    }

    /// Number of values stacked at `(x, y)`; 0 outside the chunk.
    pub fn stack_level(&self, x: i32, y: i32) -> usize {
        self.stack(x, y).map_or(0, |s| s.len())
    }

    /// Value at `level` (0 is the bottom).
    pub fn get_at(&self, x: i32, y: i32, level: usize) -> Option<&T> {
        self.stack(x, y)?.get(level)
    }

    /// Topmost value.
    pub fn get_last(&self, x: i32, y: i32) -> Option<&T> {
        self.stack(x, y)?.last()
    }

    /// Overwrite an existing level. Returns `false` if there is no such level.
    pub fn set_at(&mut self, x: i32, y: i32, level: usize, value: T) -> bool {
        match self.stack_mut(x, y).and_then(|s| s.get_mut(level)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Push a value on top. Returns `false` if `(x, y)` is outside the chunk.
    pub fn push(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.stack_mut(x, y) {
            Some(stack) => {
                stack.push(value);
                true
            }
            None => false,
        }
    }

    /// Pop the topmost value.
    pub fn pop(&mut self, x: i32, y: i32) -> Option<T> {
        self.stack_mut(x, y)?.pop()
    }

    /// Highest stack level in the chunk.
    pub fn max_level(&self) -> usize {
        self.cells.iter().map(|s| s.len()).max().unwrap_or(0)
    }
}

impl<T> From<DenseChunk<T>> for StackedChunk<T> {
    fn from(dense: DenseChunk<T>) -> Self {
        let extents = dense.extents;
        let cells = dense
            .into_cells()
            .into_iter()
            .map(|v| {
                let mut stack = SmallVec::new();
                stack.push(v);
                stack
            })
            .collect();
        Self { extents, cells }
    }
}

impl<T> GridChunk for StackedChunk<T> {
    fn extents(&self) -> ChunkExtents {
        self.extents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_handle_negative_origins() {
        let e = ChunkExtents::new(-4, -2, 4, 3);
        assert_eq!((e.end_x(), e.end_y()), (0, 1));
        assert!(e.contains(-4, -2));
        assert!(e.contains(-1, 0));
        assert!(!e.contains(0, 0));
        assert_eq!(e.offset(-4, -2), Some(0));
        assert_eq!(e.offset(-1, 0), Some(11));
        assert_eq!(e.offset(0, 0), None);
        assert_eq!(e.rect(), Rect::from_xywh(-4.0, -2.0, 4.0, 3.0));
    }

    #[test]
    fn union_spans_both() {
        let a = ChunkExtents::new(-4, -2, 4, 3);
        let b = ChunkExtents::new(10, 5, 2, 2);
        assert_eq!(a.union(&b), ChunkExtents::new(-4, -2, 16, 9));
    }

    #[test]
    fn dense_rejects_wrong_buffer() {
        let e = ChunkExtents::new(0, 0, 2, 2);
        assert_eq!(
            DenseChunk::from_vec(e, vec![1, 2, 3]),
            Err(ChunkSizeMismatch {
                expected: 4,
                found: 3
            })
        );
        let mut c = DenseChunk::from_vec(e, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(c.get(1, 1), Some(&4));
        assert!(c.set(0, 1, 9));
        assert!(!c.set(2, 0, 9));
        assert_eq!(c.cells(), [1, 2, 9, 4]);
    }

    #[test]
    fn stacked_push_pop() {
        let mut c: StackedChunk<u16> = StackedChunk::new(ChunkExtents::new(5, 5, 2, 1));
        assert_eq!(c.stack_level(5, 5), 0);
        assert!(c.push(5, 5, 1));
        assert!(c.push(5, 5, 2));
        assert!(!c.push(7, 5, 3));
        assert_eq!(c.stack_level(5, 5), 2);
        assert_eq!(c.get_at(5, 5, 0), Some(&1));
        assert_eq!(c.get_last(5, 5), Some(&2));
        assert!(c.set_at(5, 5, 0, 7));
        assert!(!c.set_at(5, 5, 2, 7));
        assert_eq!(c.max_level(), 2);
        assert_eq!(c.pop(5, 5), Some(2));
        assert_eq!(c.get_last(5, 5), Some(&7));
        assert_eq!(c.pop(6, 5), None);
    }

    #[test]
    fn dense_converts_to_single_level_stacks() {
        let e = ChunkExtents::new(0, 0, 2, 1);
        let c = StackedChunk::from_vec(e, vec![10, 20]).unwrap();
        assert_eq!(c.stack_level(1, 0), 1);
        assert_eq!(c.get_last(1, 0), Some(&20));
        assert_eq!(GridChunk::width(&c), 2);
    }
}
