// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory BVH: a dynamic bounding volume hierarchy over N-dimensional rectangles.
//!
//! - Map values to axis-aligned rectangles in any fixed number of dimensions `D`.
//! - Query by overlapping rectangle or by ray, and get hit points and face normals back.
//! - Move or remove values by identity; an optional value → rectangle map makes updates
//!   and lookups O(1).
//!
//! Internal nodes keep between `min_width` and `max_width` children (3 and 6 by
//! default in 2D). Overflowing nodes are split with a linear seed pick followed by a
//! squareness-driven distribution; underfull nodes are cut out and their leaves reinserted.
//! Every traversal uses an explicit stack.
//!
//! # Example
//!
//! ```rust
//! use understory_bvh::{Bvh, Ray, Rect};
//!
//! let mut bvh: Bvh<2, &str> = Bvh::new();
//! bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), "a");
//! bvh.insert_or_update(Rect::from_xywh(5.0, 5.0, 10.0, 10.0), "b");
//!
//! // Both rectangles cover (6, 6).
//! let mut hits = bvh.search_values(&Rect::from_xywh(6.0, 6.0, 1.0, 1.0));
//! hits.sort();
//! assert_eq!(hits, [&"a", &"b"]);
//!
//! // Moving a value replaces its old registration.
//! bvh.insert_or_update(Rect::from_xywh(100.0, 0.0, 10.0, 10.0), "a");
//! assert_eq!(bvh.search_values(&Rect::from_xywh(6.0, 6.0, 1.0, 1.0)), [&"b"]);
//!
//! // Cast a ray along +x at y = 2; it passes below "b".
//! let hits = bvh.intersect(&Ray::new([-20.0, 2.0], [1.0, 0.0]));
//! assert_eq!(hits.len(), 1);
//! assert_eq!(*hits[0].value(), "a");
//! assert_eq!(hits[0].point().get(0), 100.0);
//! ```
//!
//! Rectangles are stored as per-dimension `(min, size)` pairs. Zero-size rectangles are
//! allowed; they never strictly overlap anything, so query them with the [`Inclusive`]
//! comparator or remove them by value.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod bvh;
mod compare;
mod insert;
mod node;
mod objects;
mod options;
mod query;
mod remove;
mod types;

pub use bvh::{Bvh, Iter};
pub use compare::{Comparator, Inclusive, Strict};
pub use node::{Entry, EntryRef, NodeRef};
pub use options::BvhOptions;
pub use query::IntersectResult;
pub use types::{DimensionMismatch, Ray, RaySpan, Rect, Vector, combine};
