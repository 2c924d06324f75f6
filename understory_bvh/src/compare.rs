// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle comparison strategies used to prune traversals.

use core::fmt::Debug;

use crate::types::Rect;

/// Pluggable rectangle predicates consulted by search and removal.
///
/// Implementations must be pure: the same inputs always give the same answer.
pub trait Comparator<const D: usize>: Debug {
    /// Whether `a` and `b` overlap.
    fn overlaps(&self, a: &Rect<D>, b: &Rect<D>) -> bool;

    /// Whether `a` lies within `b`.
    fn contains(&self, a: &Rect<D>, b: &Rect<D>) -> bool;
}

/// Default comparator: strict interior overlap and inclusive containment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Strict;

impl<const D: usize> Comparator<D> for Strict {
    #[inline]
    fn overlaps(&self, a: &Rect<D>, b: &Rect<D>) -> bool {
        a.overlaps(b)
    }

    #[inline]
    fn contains(&self, a: &Rect<D>, b: &Rect<D>) -> bool {
        a.is_within(b)
    }
}

/// Comparator that also treats touching boundaries as overlapping.
///
/// Useful for point-like or zero-size registrations, which never strictly overlap anything.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Inclusive;

impl<const D: usize> Comparator<D> for Inclusive {
    fn overlaps(&self, a: &Rect<D>, b: &Rect<D>) -> bool {
        (0..D).all(|dim| a.min(dim) <= b.max(dim) && a.max(dim) >= b.min(dim))
    }

    fn contains(&self, a: &Rect<D>, b: &Rect<D>) -> bool {
        a.is_within(b)
    }
}
