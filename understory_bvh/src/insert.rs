// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Insertion: leaf selection, overflow splits and upward refitting.

use alloc::vec;
use core::hash::Hash;

use log::trace;

use crate::bvh::Bvh;
use crate::node::{Node, NodeIdx};
use crate::types::Rect;

impl<const D: usize, V: Clone + Eq + Hash> Bvh<D, V> {
    /// Insert `value` at `rect`, or move it there if it is already registered elsewhere.
    ///
    /// With object tracking on, re-inserting a value at the rectangle it already has is a
    /// no-op, and a value registered at a different rectangle is removed first. Without
    /// tracking every call adds a new leaf.
    pub fn insert_or_update(&mut self, rect: Rect<D>, value: V) {
        if let Some(&old) = self.objects.get(&value) {
            if old == rect {
                return;
            }
            self.remove(&old, Some(&value));
        }
        self.insert_leaf(rect, value.clone());
        self.objects.register(value, rect);
    }
}

impl<const D: usize, V> Bvh<D, V> {
    /// Allocate a new leaf and place it. The object index is left to the caller.
    pub(crate) fn insert_leaf(&mut self, rect: Rect<D>, value: V) -> NodeIdx {
        let leaf = self.arena.alloc(Node::leaf(rect, value));
        self.len += 1;
        self.place(leaf);
        leaf
    }

    /// Attach a detached leaf under the best subtree and restore the invariants upward.
    pub(crate) fn place(&mut self, leaf: NodeIdx) {
        let rect = self.arena.get(leaf).bounds;
        let target = self.choose_subtree(&rect);
        self.attach(target, leaf);
        self.propagate_up(target);
    }

    pub(crate) fn attach(&mut self, parent: NodeIdx, child: NodeIdx) {
        self.arena.children_mut(parent).push(child);
        self.arena.get_mut(child).parent = Some(parent);
    }

    /// Walk down from the root, at each level taking the child whose squareness cost
    /// changes least when `rect` is added, until reaching a node whose children are leaves.
    fn choose_subtree(&self, rect: &Rect<D>) -> NodeIdx {
        let mut current = self.root;
        loop {
            let children = self.arena.children(current);
            let has_branches = children
                .first()
                .is_some_and(|&c| !self.arena.get(c).is_leaf());
            if !has_branches {
                return current;
            }
            let mut best: Option<(f64, NodeIdx)> = None;
            for &child in children {
                let node = self.arena.get(child);
                let n = node.children().len();
                let before = node.bounds.squareness_cost(n + 1);
                let after = node.bounds.union(rect).squareness_cost(n + 2);
                let delta = (after - before).abs();
                if best.is_none_or(|(d, _)| delta < d) {
                    best = Some((delta, child));
                }
            }
            match best {
                Some((_, child)) => current = child,
                None => return current,
            }
        }
    }

    /// Split overflowing nodes and refit everything else from `start` to the root.
    fn propagate_up(&mut self, start: NodeIdx) {
        let mut current = Some(start);
        while let Some(idx) = current {
            if self.arena.children(idx).len() > self.max_width {
                let sibling = self.split(idx);
                let parent = self.arena.get(idx).parent;
                match parent {
                    Some(parent) => self.attach(parent, sibling),
                    None => self.grow_root(idx, sibling),
                }
            } else {
                self.arena.refit(idx);
            }
            current = self.arena.get(idx).parent;
        }
    }

    fn grow_root(&mut self, old_root: NodeIdx, sibling: NodeIdx) {
        let root = self.arena.alloc(Node::branch());
        self.attach(root, old_root);
        self.attach(root, sibling);
        self.root = root;
        trace!("bvh: root split, tree grows to depth {}", self.depth());
    }

    /// Split an overflowing branch in two. `idx` keeps the first group; the returned
    /// detached sibling holds the second. Both come back refitted.
    fn split(&mut self, idx: NodeIdx) -> NodeIdx {
        let mut pool = core::mem::take(self.arena.children_mut(idx));
        let total = pool.len();
        let (a, b) = self.pick_linear(&pool);
        let (seed_a, seed_b) = if a > b {
            let seed_a = pool.remove(a);
            (seed_a, pool.remove(b))
        } else {
            let seed_b = pool.remove(b);
            (pool.remove(a), seed_b)
        };

        let mut group_a = vec![seed_a];
        let mut group_b = vec![seed_b];
        let mut bounds_a = self.arena.get(seed_a).bounds;
        let mut bounds_b = self.arena.get(seed_b).bounds;
        while !pool.is_empty() {
            let remaining = pool.len();
            if group_a.len() + remaining <= self.min_width {
                group_a.append(&mut pool);
                break;
            }
            if group_b.len() + remaining <= self.min_width {
                group_b.append(&mut pool);
                break;
            }
            let (pos, to_a) = self.pick_next(
                &pool,
                (&bounds_a, group_a.len()),
                (&bounds_b, group_b.len()),
            );
            let child = pool.swap_remove(pos);
            let rect = self.arena.get(child).bounds;
            if to_a {
                bounds_a.expand(&rect);
                group_a.push(child);
            } else {
                bounds_b.expand(&rect);
                group_b.push(child);
            }
        }
        debug_assert!(
            group_a.len() >= self.min_width && group_b.len() >= self.min_width,
            "split produced an underfull group"
        );
        trace!(
            "bvh: split {} children into {} + {}",
            total,
            group_a.len(),
            group_b.len()
        );

        *self.arena.children_mut(idx) = group_a;
        self.arena.refit(idx);
        let sibling = self.arena.alloc(Node::branch());
        for child in group_b {
            self.attach(sibling, child);
        }
        self.arena.refit(sibling);
        sibling
    }

    /// Choose two seed children: per dimension, the child with the highest minimum and the
    /// child with the lowest maximum; keep the pair from the dimension with the widest gap.
    fn pick_linear(&self, pool: &[NodeIdx]) -> (usize, usize) {
        let bounds = move |i: usize| &self.arena.get(pool[i]).bounds;
        let mut best: Option<(f64, usize, usize)> = None;
        for dim in 0..D {
            let mut highest_min = 0;
            let mut lowest_max = 0;
            for i in 1..pool.len() {
                if bounds(i).min(dim) > bounds(highest_min).min(dim) {
                    highest_min = i;
                }
                if bounds(i).max(dim) < bounds(lowest_max).max(dim) {
                    lowest_max = i;
                }
            }
            let gap = (bounds(highest_min).min(dim) - bounds(lowest_max).max(dim)).abs();
            if best.is_none_or(|(g, _, _)| gap > g) {
                best = Some((gap, highest_min, lowest_max));
            }
        }
        let (a, b) = best.map_or((0, 1), |(_, a, b)| (a, b));
        if a == b {
            // One child is extreme on both sides; pair it with any other.
            (a, if a == 0 { 1 } else { 0 })
        } else {
            (a, b)
        }
    }

    /// Pick the pooled child whose costs for the two groups differ the most, and the group
    /// (`true` for A) whose cost grows least.
    fn pick_next(
        &self,
        pool: &[NodeIdx],
        (bounds_a, len_a): (&Rect<D>, usize),
        (bounds_b, len_b): (&Rect<D>, usize),
    ) -> (usize, bool) {
        let base_a = bounds_a.squareness_cost(len_a);
        let base_b = bounds_b.squareness_cost(len_b);
        let mut best: Option<(f64, usize, bool)> = None;
        for (i, &child) in pool.iter().enumerate() {
            let rect = &self.arena.get(child).bounds;
            let grow_a = bounds_a.union(rect).squareness_cost(len_a + 1) - base_a;
            let grow_b = bounds_b.union(rect).squareness_cost(len_b + 1) - base_b;
            let spread = (grow_b - grow_a).abs();
            if best.is_none_or(|(s, _, _)| spread > s) {
                let to_a = grow_a < grow_b || (grow_a == grow_b && len_a <= len_b);
                best = Some((spread, i, to_a));
            }
        }
        best.map_or((0, len_a <= len_b), |(_, i, to_a)| (i, to_a))
    }
}
