// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction options for [`Bvh`](crate::Bvh).

/// Tunables for a [`Bvh`](crate::Bvh).
///
/// ```
/// use understory_bvh::{Bvh, BvhOptions};
///
/// let opts = BvhOptions::default().with_max_width(8).with_object_tracking(false);
/// let bvh: Bvh<2, u32> = Bvh::with_options(opts);
/// assert_eq!(bvh.max_width(), 8);
/// assert_eq!(bvh.min_width(), 4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BvhOptions {
    /// Maximum children per internal node. `None` selects `3 * D`.
    ///
    /// Values below 2 are raised to 2.
    pub max_width: Option<usize>,
    /// Keep a value → rectangle map so updates and lookups by value are O(1).
    ///
    /// Without it `insert_or_update` always inserts a new leaf, and
    /// [`object_bounds`](crate::Bvh::object_bounds) always returns `None`.
    pub track_objects: bool,
}

impl Default for BvhOptions {
    fn default() -> Self {
        Self {
            max_width: None,
            track_objects: true,
        }
    }
}

impl BvhOptions {
    /// Set the maximum node width.
    #[must_use]
    pub const fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Enable or disable the value → rectangle map.
    #[must_use]
    pub const fn with_object_tracking(mut self, track: bool) -> Self {
        self.track_objects = track;
        self
    }

    /// Resolve `(max_width, min_width)` for `dims` dimensions.
    ///
    /// `min_width` is `max_width / dims`, kept within `[1, (max_width + 1) / 2]` so both halves
    /// of an overflowing node can meet the floor.
    pub(crate) fn widths(&self, dims: usize) -> (usize, usize) {
        let dims = dims.max(1);
        let max_width = self.max_width.unwrap_or(3 * dims).max(2);
        let min_width = (max_width / dims).min(max_width.div_ceil(2)).max(1);
        (max_width, min_width)
    }
}
