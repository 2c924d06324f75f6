// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Bvh`] type: construction, accessors and whole-tree iteration.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use crate::node::{Arena, EntryRef, Kind, Node, NodeIdx, NodeRef};
use crate::objects::ObjectIndex;
use crate::options::BvhOptions;
use crate::types::Rect;

/// A dynamic bounding volume hierarchy over `D`-dimensional rectangles.
///
/// Each leaf stores one value and the rectangle it was inserted with. Internal nodes hold
/// between `min_width` and `max_width` children (the root may hold fewer) and their bounds
/// are always the exact MBR of their children.
///
/// All traversals use explicit stacks, so deep trees never recurse.
pub struct Bvh<const D: usize, V> {
    pub(crate) arena: Arena<D, V>,
    /// Always a branch. Empty when the tree is empty.
    pub(crate) root: NodeIdx,
    pub(crate) max_width: usize,
    pub(crate) min_width: usize,
    pub(crate) objects: ObjectIndex<D, V>,
    pub(crate) len: usize,
}

impl<const D: usize, V: Eq + Hash> Default for Bvh<D, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize, V: Eq + Hash> Bvh<D, V> {
    /// Create an empty tree with default options (`max_width = 3 * D`, object tracking on).
    pub fn new() -> Self {
        Self::with_options(BvhOptions::default())
    }

    /// Create an empty tree with a custom maximum node width.
    pub fn with_max_width(max_width: usize) -> Self {
        Self::with_options(BvhOptions::default().with_max_width(max_width))
    }

    /// Create an empty tree from explicit options.
    pub fn with_options(options: BvhOptions) -> Self {
        let (max_width, min_width) = options.widths(D);
        let mut arena = Arena::new();
        let root = arena.alloc(Node::branch());
        Self {
            arena,
            root,
            max_width,
            min_width,
            objects: ObjectIndex::new(options.track_objects),
            len: 0,
        }
    }

    /// Remove every entry. Options are kept.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::branch());
        self.objects.clear();
        self.len = 0;
    }

    /// Whether a value → rectangle map is maintained.
    pub fn is_tracking_objects(&self) -> bool {
        self.objects.is_tracking()
    }

    /// The rectangle `value` is registered with, if tracked.
    pub fn object_bounds(&self, value: &V) -> Option<&Rect<D>> {
        self.objects.get(value)
    }

    /// Whether `value` is registered. Always `false` without object tracking.
    pub fn contains_value(&self, value: &V) -> bool {
        self.objects.get(value).is_some()
    }
}

impl<const D: usize, V> Bvh<D, V> {
    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no leaves.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum children per internal node.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Minimum children per non-root internal node.
    pub fn min_width(&self) -> usize {
        self.min_width
    }

    /// MBR of everything in the tree, or `None` when empty.
    pub fn envelope(&self) -> Option<Rect<D>> {
        if self.is_empty() {
            None
        } else {
            Some(self.arena.get(self.root).bounds)
        }
    }

    /// View of the root node.
    pub fn root(&self) -> NodeRef<'_, D, V> {
        NodeRef::new(&self.arena, self.root)
    }

    /// Number of levels from the root to the deepest leaf (0 when empty).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0_usize)];
        while let Some((idx, level)) = stack.pop() {
            match &self.arena.get(idx).kind {
                Kind::Leaf(_) => deepest = deepest.max(level),
                Kind::Branch(children) => stack.extend(children.iter().map(|&c| (c, level + 1))),
            }
        }
        deepest
    }

    /// Breadth-first iteration over every node, root first.
    pub fn iter(&self) -> Iter<'_, D, V> {
        let mut queue = VecDeque::new();
        queue.push_back(self.root);
        Iter {
            arena: &self.arena,
            queue,
        }
    }

    /// Every leaf, in breadth-first order.
    pub fn find_all(&self) -> Vec<EntryRef<'_, D, V>> {
        self.iter().filter_map(|n| n.entry()).collect()
    }

    /// Every stored value, in breadth-first order.
    pub fn find_all_values(&self) -> Vec<&V> {
        self.iter().filter_map(|n| n.value()).collect()
    }

    /// Write an indented textual dump of the tree.
    ///
    /// Branches print their bounds and child count, leaves their bounds and value.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result
    where
        V: fmt::Debug,
    {
        let mut stack = vec![(self.root, 0_usize)];
        while let Some((idx, level)) = stack.pop() {
            let node = self.arena.get(idx);
            for _ in 0..level {
                out.write_str("  ")?;
            }
            match &node.kind {
                Kind::Branch(children) => {
                    writeln!(out, "branch {} [{}]", node.bounds, children.len())?;
                    stack.extend(children.iter().rev().map(|&c| (c, level + 1)));
                }
                Kind::Leaf(value) => writeln!(out, "leaf {} {:?}", node.bounds, value)?,
            }
        }
        Ok(())
    }
}

impl<'a, const D: usize, V> IntoIterator for &'a Bvh<D, V> {
    type Item = NodeRef<'a, D, V>;
    type IntoIter = Iter<'a, D, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const D: usize, V> fmt::Debug for Bvh<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bvh")
            .field("dimensions", &D)
            .field("len", &self.len)
            .field("max_width", &self.max_width)
            .field("min_width", &self.min_width)
            .field("arena_nodes", &self.arena.live())
            .field("tracked", &self.objects.len())
            .finish_non_exhaustive()
    }
}

/// Breadth-first node iterator returned by [`Bvh::iter`].
pub struct Iter<'a, const D: usize, V> {
    arena: &'a Arena<D, V>,
    queue: VecDeque<NodeIdx>,
}

impl<'a, const D: usize, V> Iterator for Iter<'a, D, V> {
    type Item = NodeRef<'a, D, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.queue.pop_front()?;
        self.queue.extend(self.arena.children(idx).iter().copied());
        Some(NodeRef::new(self.arena, idx))
    }
}

impl<const D: usize, V> fmt::Debug for Iter<'_, D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn empty_tree_shape() {
        let bvh: Bvh<2, u32> = Bvh::new();
        assert!(bvh.is_empty());
        assert_eq!(bvh.envelope(), None);
        assert_eq!(bvh.depth(), 0);
        assert_eq!(bvh.iter().count(), 1);
        assert!(bvh.find_all().is_empty());
        assert_eq!(bvh.root().child_count(), 0);
        check::assert_invariants(&bvh);
    }

    #[test]
    fn clear_resets_everything() {
        let mut bvh: Bvh<2, u32> = Bvh::new();
        for i in 0..20 {
            let x = f64::from(i) * 3.0;
            bvh.insert_or_update(Rect::from_xywh(x, 0.0, 2.0, 2.0), i);
        }
        assert_eq!(bvh.len(), 20);
        bvh.clear();
        assert!(bvh.is_empty());
        assert!(!bvh.contains_value(&3));
        assert_eq!(bvh.arena.live(), 1);
        check::assert_invariants(&bvh);
        bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 1.0, 1.0), 7);
        assert_eq!(bvh.find_all_values(), [&7]);
    }

    #[test]
    fn iteration_is_breadth_first() {
        let mut bvh: Bvh<2, u32> = Bvh::with_max_width(2);
        for i in 0..5 {
            let x = f64::from(i) * 10.0;
            bvh.insert_or_update(Rect::from_xywh(x, 0.0, 1.0, 1.0), i);
        }
        let levels: Vec<bool> = bvh.iter().map(|n| n.is_leaf()).collect();
        let first_leaf = levels.iter().position(|&l| l).unwrap();
        assert!(levels[first_leaf..].iter().all(|&l| l), "leaves come last");
        assert_eq!(bvh.find_all().len(), 5);
        assert!(bvh.depth() >= 2);
    }

    #[test]
    fn dump_lists_every_node() {
        let mut bvh: Bvh<2, &str> = Bvh::new();
        bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 1.0, 1.0), "a");
        bvh.insert_or_update(Rect::from_xywh(2.0, 0.0, 1.0, 1.0), "b");
        let mut out = String::new();
        bvh.dump(&mut out).unwrap();
        assert_eq!(
            out,
            "branch Rect(min=(0, 0), max=(3, 1)) [2]\n  \
             leaf Rect(min=(0, 0), max=(1, 1)) \"a\"\n  \
             leaf Rect(min=(2, 0), max=(3, 1)) \"b\"\n"
        );
    }
}
