// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removal: targeted and area-wide deletes, underflow extraction and reinsertion.

use alloc::vec;
use alloc::vec::Vec;
use core::hash::Hash;

use log::{debug, trace};
use smallvec::SmallVec;

use crate::bvh::Bvh;
use crate::compare::{Comparator, Strict};
use crate::node::{Entry, Kind, NodeIdx};
use crate::types::Rect;

impl<const D: usize, V: Eq + Hash> Bvh<D, V> {
    /// Remove entries near `rect`.
    ///
    /// With `Some(value)`, removes the first leaf holding `value` whose ancestors cover
    /// `rect`. With `None`, removes every leaf that overlaps `rect` or lies within it.
    /// Returns the removed entries; an empty vector means nothing matched.
    ///
    /// ```
    /// use understory_bvh::{Bvh, Rect};
    ///
    /// let mut bvh: Bvh<2, u32> = Bvh::new();
    /// bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 4.0, 4.0), 1);
    /// bvh.insert_or_update(Rect::from_xywh(2.0, 2.0, 4.0, 4.0), 2);
    /// bvh.insert_or_update(Rect::from_xywh(50.0, 50.0, 4.0, 4.0), 3);
    ///
    /// let removed = bvh.remove(&Rect::from_xywh(0.0, 0.0, 10.0, 10.0), None);
    /// assert_eq!(removed.len(), 2);
    /// assert_eq!(bvh.len(), 1);
    /// ```
    pub fn remove(&mut self, rect: &Rect<D>, value: Option<&V>) -> Vec<Entry<D, V>> {
        self.remove_with(rect, value, &Strict)
    }

    /// [`remove`](Self::remove) with a custom comparator.
    pub fn remove_with<C: Comparator<D>>(
        &mut self,
        rect: &Rect<D>,
        value: Option<&V>,
        cmp: &C,
    ) -> Vec<Entry<D, V>> {
        match value {
            Some(value) => match self.find_leaf(rect, value, cmp) {
                Some(leaf) => vec![self.remove_leaf(leaf)],
                None => Vec::new(),
            },
            None => {
                // Leaf ids stay valid across reinsertion, so collect first.
                let leaves = self.collect_in_area(rect, cmp);
                debug!("bvh: area delete matched {} leaves", leaves.len());
                leaves.into_iter().map(|leaf| self.remove_leaf(leaf)).collect()
            }
        }
    }

    /// Remove a tracked value using its registered rectangle.
    ///
    /// Returns `None` when the value is unknown or object tracking is off.
    pub fn remove_value(&mut self, value: &V) -> Option<Entry<D, V>> {
        let rect = *self.objects.get(value)?;
        self.remove(&rect, Some(value)).pop()
    }

    fn find_leaf<C: Comparator<D>>(&self, rect: &Rect<D>, value: &V, cmp: &C) -> Option<NodeIdx> {
        let mut stack: SmallVec<[NodeIdx; 32]> = SmallVec::new();
        stack.push(self.root);
        while let Some(idx) = stack.pop() {
            match &self.arena.get(idx).kind {
                Kind::Leaf(v) if v == value => return Some(idx),
                Kind::Leaf(_) => {}
                Kind::Branch(children) => {
                    for &c in children {
                        let bounds = &self.arena.get(c).bounds;
                        // Containment keeps zero-size registrations reachable.
                        if cmp.overlaps(rect, bounds)
                            || cmp.contains(rect, bounds)
                            || cmp.contains(bounds, rect)
                        {
                            stack.push(c);
                        }
                    }
                }
            }
        }
        None
    }

    fn collect_in_area<C: Comparator<D>>(&self, rect: &Rect<D>, cmp: &C) -> Vec<NodeIdx> {
        let mut out = Vec::new();
        let mut stack: SmallVec<[NodeIdx; 32]> = SmallVec::new();
        stack.push(self.root);
        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);
            match &node.kind {
                Kind::Leaf(_) => {
                    if cmp.overlaps(rect, &node.bounds) || cmp.contains(&node.bounds, rect) {
                        out.push(idx);
                    }
                }
                Kind::Branch(children) => {
                    for &c in children {
                        let bounds = &self.arena.get(c).bounds;
                        if cmp.overlaps(rect, bounds)
                            || cmp.contains(bounds, rect)
                            || cmp.contains(rect, bounds)
                        {
                            stack.push(c);
                        }
                    }
                }
            }
        }
        out
    }

    /// Detach and free a leaf, then repair the tree above it.
    fn remove_leaf(&mut self, leaf: NodeIdx) -> Entry<D, V> {
        let parent = self.arena.get(leaf).parent;
        if let Some(parent) = parent {
            self.detach(parent, leaf);
        }
        let node = self.arena.free(leaf);
        self.len -= 1;
        let Kind::Leaf(value) = node.kind else {
            unreachable!("remove_leaf called on a branch");
        };
        self.objects.unregister(&value);
        if let Some(parent) = parent {
            self.condense(parent);
        }
        Entry {
            bounds: node.bounds,
            value,
        }
    }
}

impl<const D: usize, V> Bvh<D, V> {
    fn detach(&mut self, parent: NodeIdx, child: NodeIdx) {
        self.arena.children_mut(parent).retain(|&c| c != child);
        self.arena.get_mut(child).parent = None;
    }

    /// Walk from `start` to the root after a removal. Underfull non-root branches are cut
    /// out and their leaves reinserted; everything else is refitted.
    fn condense(&mut self, start: NodeIdx) {
        let mut orphans = Vec::new();
        let mut current = start;
        while let Some(parent) = self.arena.get(current).parent {
            let count = self.arena.children(current).len();
            if count < self.min_width {
                self.detach(parent, current);
                let before = orphans.len();
                self.extract_leaves(current, &mut orphans);
                trace!(
                    "bvh: underflow ({} < {}), extracted {} leaves",
                    count,
                    self.min_width,
                    orphans.len() - before
                );
            } else {
                self.arena.refit(current);
            }
            current = parent;
        }

        let root = self.root;
        if let &[only] = self.arena.children(root)
            && !self.arena.get(only).is_leaf()
        {
            self.detach(root, only);
            let before = orphans.len();
            self.extract_leaves(only, &mut orphans);
            trace!(
                "bvh: root collapse, rebuilding from {} leaves",
                orphans.len() - before
            );
        }
        self.arena.refit(root);

        for leaf in orphans {
            self.place(leaf);
        }
    }

    /// Free the branch `top` and every branch under it, collecting the detached leaves.
    fn extract_leaves(&mut self, top: NodeIdx, out: &mut Vec<NodeIdx>) {
        let mut stack: SmallVec<[NodeIdx; 32]> = SmallVec::new();
        stack.push(top);
        while let Some(idx) = stack.pop() {
            if self.arena.get(idx).is_leaf() {
                self.arena.get_mut(idx).parent = None;
                out.push(idx);
            } else if let Kind::Branch(children) = self.arena.free(idx).kind {
                stack.extend(children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::check::{Rng, assert_invariants};
    use crate::compare::Inclusive;
    use crate::options::BvhOptions;

    #[test]
    fn remove_then_search_misses() {
        let mut bvh: Bvh<2, u32> = Bvh::new();
        let a = Rect::from_xywh(0.0, 0.0, 5.0, 5.0);
        let b = Rect::from_xywh(1.0, 1.0, 5.0, 5.0);
        bvh.insert_or_update(a, 1);
        bvh.insert_or_update(b, 2);
        let removed = bvh.remove(&a, Some(&1));
        assert_eq!(removed, [Entry { bounds: a, value: 1 }]);
        assert_eq!(bvh.search_values(&a), [&2]);
        assert!(!bvh.contains_value(&1));
        assert_invariants(&bvh);
    }

    #[test]
    fn remove_without_match_is_empty() {
        let mut bvh: Bvh<2, u32> = Bvh::new();
        assert!(bvh.remove(&Rect::from_xywh(0.0, 0.0, 1.0, 1.0), None).is_empty());
        bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 1.0, 1.0), 1);
        assert!(
            bvh.remove(&Rect::from_xywh(0.0, 0.0, 1.0, 1.0), Some(&2))
                .is_empty()
        );
        assert!(bvh.remove_value(&5).is_none());
        assert_eq!(bvh.len(), 1);
    }

    #[test]
    fn area_delete_removes_all_overlapping() {
        let mut bvh: Bvh<2, u32> = Bvh::new();
        bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), 1);
        bvh.insert_or_update(Rect::from_xywh(5.0, 5.0, 10.0, 10.0), 2);
        bvh.insert_or_update(Rect::from_xywh(8.0, 5.0, 4.0, 4.0), 3);
        bvh.insert_or_update(Rect::from_xywh(8.0, 2.0, 4.0, 4.0), 4);
        bvh.insert_or_update(Rect::from_xywh(40.0, 40.0, 4.0, 4.0), 5);
        let mut removed: Vec<u32> = bvh
            .remove(&Rect::from_xywh(6.0, 6.0, 3.0, 3.0), None)
            .into_iter()
            .map(|e| e.value)
            .collect();
        removed.sort_unstable();
        assert_eq!(removed, [1, 2, 3]);
        // 4 only touches the region's lower edge.
        let mut left: Vec<u32> = bvh.find_all_values().into_iter().copied().collect();
        left.sort_unstable();
        assert_eq!(left, [4, 5]);
        assert_invariants(&bvh);
    }

    #[test]
    fn untracked_targeted_remove_takes_the_copy_at_rect() {
        let options = BvhOptions::default().with_object_tracking(false);
        let mut bvh: Bvh<2, u32> = Bvh::with_options(options);
        let far = Rect::from_xywh(5.0, 5.0, 1.0, 1.0);
        let near = Rect::from_xywh(0.0, 0.0, 1.0, 1.0);
        bvh.insert_or_update(far, 1);
        bvh.insert_or_update(near, 1);
        assert_eq!(bvh.len(), 2);

        let removed = bvh.remove(&far, Some(&1));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].bounds, far);
        assert!(bvh.search_values(&far).is_empty());
        assert_eq!(bvh.search_values(&near), [&1]);
        assert!(
            bvh.remove(&Rect::from_xywh(20.0, 20.0, 1.0, 1.0), Some(&1))
                .is_empty()
        );
        assert_invariants(&bvh);
    }

    #[test]
    fn degenerate_rect_is_removable() {
        let mut bvh: Bvh<2, u32> = Bvh::new();
        let point = Rect::from_xywh(3.0, 3.0, 0.0, 0.0);
        bvh.insert_or_update(point, 1);
        bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 1.0, 1.0), 2);
        assert_eq!(bvh.remove_value(&1).map(|e| e.bounds), Some(point));
        assert_eq!(bvh.len(), 1);
        // Area deletes pick up zero-size entries lying inside the region.
        bvh.insert_or_update(point, 1);
        let removed = bvh.remove(&Rect::from_xywh(2.0, 2.0, 2.0, 2.0), None);
        assert_eq!(removed.len(), 1);
        assert_invariants(&bvh);
    }

    #[test]
    fn inclusive_comparator_area_delete_takes_touching() {
        let mut bvh: Bvh<2, u32> = Bvh::new();
        bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 5.0, 5.0), 1);
        bvh.insert_or_update(Rect::from_xywh(5.0, 0.0, 5.0, 5.0), 2);
        let region = Rect::from_xywh(5.0, 0.0, 1.0, 1.0);
        assert_eq!(bvh.remove(&region, None).len(), 1);
        bvh.insert_or_update(Rect::from_xywh(5.0, 0.0, 5.0, 5.0), 2);
        assert_eq!(bvh.remove_with(&region, None, &Inclusive).len(), 2);
        assert!(bvh.is_empty());
    }

    #[test]
    fn removing_everything_collapses_to_empty_root() {
        let mut bvh: Bvh<2, u32> = Bvh::with_max_width(4);
        for i in 0..64 {
            let x = f64::from(i % 8) * 10.0;
            let y = f64::from(i / 8) * 10.0;
            bvh.insert_or_update(Rect::from_xywh(x, y, 5.0, 5.0), i);
        }
        assert!(bvh.depth() > 2);
        for i in 0..64 {
            assert!(bvh.remove_value(&i).is_some(), "value {i} missing");
            assert_invariants(&bvh);
        }
        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        assert_eq!(bvh.arena.live(), 1, "only the root survives");
    }

    #[test]
    fn random_half_removal_keeps_invariants() {
        let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
        let mut bvh: Bvh<2, u32> = Bvh::new();
        let mut rects = Vec::new();
        for i in 0..1000 {
            let rect = rng.rect(1000.0, 20.0);
            bvh.insert_or_update(rect, i);
            rects.push(rect);
        }
        assert_invariants(&bvh);
        for (i, rect) in rects.iter().enumerate() {
            let i = u32::try_from(i).unwrap();
            assert!(bvh.search_values(rect).contains(&&i));
        }

        let mut removed = Vec::new();
        for (i, rect) in rects.iter().enumerate() {
            if rng.next_u64() % 2 == 0 {
                let i = u32::try_from(i).unwrap();
                assert_eq!(bvh.remove(rect, Some(&i)).len(), 1);
                removed.push(i);
                assert_invariants(&bvh);
            }
        }
        assert_invariants(&bvh);
        assert_eq!(bvh.len(), 1000 - removed.len());
        for (i, rect) in rects.iter().enumerate() {
            let i = u32::try_from(i).unwrap();
            let found = bvh.search_values(rect).contains(&&i);
            assert_eq!(found, !removed.contains(&i), "value {i}");
        }
    }
}
