// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena and read-only node views.

use alloc::vec::Vec;
use core::fmt;

use crate::types::{Rect, combine};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

pub(crate) enum Kind<V> {
    Branch(Vec<NodeIdx>),
    Leaf(V),
}

pub(crate) struct Node<const D: usize, V> {
    pub(crate) bounds: Rect<D>,
    pub(crate) parent: Option<NodeIdx>,
    pub(crate) kind: Kind<V>,
}

impl<const D: usize, V> Node<D, V> {
    pub(crate) fn branch() -> Self {
        Self {
            bounds: Rect::ZERO,
            parent: None,
            kind: Kind::Branch(Vec::new()),
        }
    }

    pub(crate) fn leaf(bounds: Rect<D>, value: V) -> Self {
        Self {
            bounds,
            parent: None,
            kind: Kind::Leaf(value),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf(_))
    }

    pub(crate) fn children(&self) -> &[NodeIdx] {
        match &self.kind {
            Kind::Branch(children) => children,
            Kind::Leaf(_) => &[],
        }
    }
}

/// Slot arena for tree nodes. Freed slots are recycled through a free list.
pub(crate) struct Arena<const D: usize, V> {
    slots: Vec<Option<Node<D, V>>>,
    free_list: Vec<usize>,
}

impl<const D: usize, V> Arena<D, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<D, V>) -> NodeIdx {
        if let Some(i) = self.free_list.pop() {
            debug_assert!(self.slots[i].is_none(), "free list points at a live slot");
            self.slots[i] = Some(node);
            NodeIdx::new(i)
        } else {
            self.slots.push(Some(node));
            NodeIdx::new(self.slots.len() - 1)
        }
    }

    /// Take a node out of the arena and recycle its slot.
    pub(crate) fn free(&mut self, idx: NodeIdx) -> Node<D, V> {
        match self.slots[idx.get()].take() {
            Some(node) => {
                self.free_list.push(idx.get());
                node
            }
            None => unreachable!("double free of node {}", idx.get()),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    #[inline]
    pub(crate) fn get(&self, idx: NodeIdx) -> &Node<D, V> {
        match &self.slots[idx.get()] {
            Some(node) => node,
            None => unreachable!("dead node {}", idx.get()),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: NodeIdx) -> &mut Node<D, V> {
        match &mut self.slots[idx.get()] {
            Some(node) => node,
            None => unreachable!("dead node {}", idx.get()),
        }
    }

    #[inline]
    pub(crate) fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        self.get(idx).children()
    }

    pub(crate) fn children_mut(&mut self, idx: NodeIdx) -> &mut Vec<NodeIdx> {
        match &mut self.get_mut(idx).kind {
            Kind::Branch(children) => children,
            Kind::Leaf(_) => unreachable!("leaf {} has no children", idx.get()),
        }
    }

    /// Recompute a branch's bounds as the exact MBR of its children.
    pub(crate) fn refit(&mut self, idx: NodeIdx) {
        let bounds = combine(self.children(idx).iter().map(|&c| &self.get(c).bounds))
            .unwrap_or(Rect::ZERO);
        self.get_mut(idx).bounds = bounds;
    }

    /// Number of live nodes, branches included.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}

/// A borrowed view of one node in a [`Bvh`](crate::Bvh).
pub struct NodeRef<'a, const D: usize, V> {
    arena: &'a Arena<D, V>,
    idx: NodeIdx,
}

impl<const D: usize, V> Clone for NodeRef<'_, D, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const D: usize, V> Copy for NodeRef<'_, D, V> {}

impl<'a, const D: usize, V> NodeRef<'a, D, V> {
    pub(crate) fn new(arena: &'a Arena<D, V>, idx: NodeIdx) -> Self {
        Self { arena, idx }
    }

    fn node(&self) -> &'a Node<D, V> {
        self.arena.get(self.idx)
    }

    /// Bounding rectangle: the inserted rect for a leaf, the children's MBR for a branch.
    pub fn bounds(&self) -> &'a Rect<D> {
        &self.node().bounds
    }

    /// The stored value, if this is a leaf.
    pub fn value(&self) -> Option<&'a V> {
        match &self.node().kind {
            Kind::Leaf(v) => Some(v),
            Kind::Branch(_) => None,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Number of direct children (0 for leaves).
    pub fn child_count(&self) -> usize {
        self.node().children().len()
    }

    /// Direct children, in storage order.
    pub fn children(self) -> impl Iterator<Item = Self> + 'a {
        let arena = self.arena;
        self.node()
            .children()
            .iter()
            .map(move |&c| Self::new(arena, c))
    }

    /// View of the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|p| Self::new(self.arena, p))
    }

    /// Borrowed `(bounds, value)` pair, if this is a leaf.
    pub fn entry(&self) -> Option<EntryRef<'a, D, V>> {
        self.value().map(|value| EntryRef {
            bounds: self.bounds(),
            value,
        })
    }
}

impl<const D: usize, V: fmt::Debug> fmt::Debug for NodeRef<'_, D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NodeRef");
        s.field("bounds", self.bounds());
        match self.value() {
            Some(v) => s.field("value", v),
            None => s.field("children", &self.child_count()),
        };
        s.finish_non_exhaustive()
    }
}

/// An owned leaf returned by removal.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<const D: usize, V> {
    /// The rectangle the value was registered with.
    pub bounds: Rect<D>,
    /// The value.
    pub value: V,
}

/// A borrowed leaf returned by queries.
#[derive(Debug)]
pub struct EntryRef<'a, const D: usize, V> {
    /// The rectangle the value was registered with.
    pub bounds: &'a Rect<D>,
    /// The value.
    pub value: &'a V,
}

impl<const D: usize, V> Clone for EntryRef<'_, D, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const D: usize, V> Copy for EntryRef<'_, D, V> {}

impl<const D: usize, V: PartialEq> PartialEq for EntryRef<'_, D, V> {
    fn eq(&self, other: &Self) -> bool {
        self.bounds == other.bounds && self.value == other.value
    }
}

impl<const D: usize, V: Clone> EntryRef<'_, D, V> {
    /// Clone into an owned [`Entry`].
    pub fn to_owned_entry(&self) -> Entry<D, V> {
        Entry {
            bounds: *self.bounds,
            value: self.value.clone(),
        }
    }
}
