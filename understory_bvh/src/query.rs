// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle search, visitor traversal and ray intersection.

use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::bvh::Bvh;
use crate::compare::{Comparator, Strict};
use crate::node::{EntryRef, Kind, NodeIdx, NodeRef};
use crate::types::{Ray, RaySpan, Rect, Vector};

/// Face-equality tolerance used when deriving hit normals.
const NORMAL_EPSILON: f64 = 1e-6;

fn almost_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= NORMAL_EPSILON
}

/// A leaf hit by a ray, returned by [`Bvh::intersect`].
#[derive(Debug)]
pub struct IntersectResult<'a, const D: usize, V> {
    /// The query ray.
    pub ray: Ray<D>,
    /// Ray parameter at the entry point, measured along the ray's dominant axis.
    pub distance: f64,
    /// The leaf that was hit.
    pub entry: EntryRef<'a, D, V>,
}

impl<const D: usize, V> Clone for IntersectResult<'_, D, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const D: usize, V> Copy for IntersectResult<'_, D, V> {}

impl<'a, const D: usize, V> IntersectResult<'a, D, V> {
    /// The stored value.
    pub fn value(&self) -> &'a V {
        self.entry.value
    }

    /// The hit point, `origin + direction * distance`.
    pub fn point(&self) -> Vector<D> {
        self.ray.point_at(self.distance)
    }

    /// Outward face normal at the hit point.
    ///
    /// Per axis: `-1` at or before the near face, `+1` at or past the far face, `0` inside.
    pub fn normal(&self) -> Vector<D> {
        let point = self.point();
        let bounds = self.entry.bounds;
        let mut normal = [0.0; D];
        for (dim, n) in normal.iter_mut().enumerate() {
            let p = point[dim];
            let (lo, hi) = (bounds.min(dim), bounds.max(dim));
            *n = if almost_eq(lo, p) || p < lo {
                -1.0
            } else if almost_eq(hi, p) || p > hi {
                1.0
            } else {
                0.0
            };
        }
        Vector::new(normal)
    }
}

impl<const D: usize, V> Bvh<D, V> {
    /// Every leaf whose rectangle overlaps `rect`, in no particular order.
    pub fn search(&self, rect: &Rect<D>) -> Vec<EntryRef<'_, D, V>> {
        self.search_with(rect, &Strict)
    }

    /// [`search`](Self::search) with a custom comparator.
    pub fn search_with<C: Comparator<D>>(&self, rect: &Rect<D>, cmp: &C) -> Vec<EntryRef<'_, D, V>> {
        let mut out = Vec::new();
        self.visit_with(rect, cmp, |entry| out.push(entry), |_| {});
        out
    }

    /// Values of every leaf whose rectangle overlaps `rect`.
    ///
    /// ```
    /// use understory_bvh::{Bvh, Rect};
    ///
    /// let mut bvh: Bvh<2, &str> = Bvh::new();
    /// bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), "a");
    /// bvh.insert_or_update(Rect::from_xywh(20.0, 0.0, 10.0, 10.0), "b");
    /// assert_eq!(bvh.search_values(&Rect::from_xywh(5.0, 5.0, 1.0, 1.0)), [&"a"]);
    /// ```
    pub fn search_values(&self, rect: &Rect<D>) -> Vec<&V> {
        self.search_values_with(rect, &Strict)
    }

    /// [`search_values`](Self::search_values) with a custom comparator.
    pub fn search_values_with<C: Comparator<D>>(&self, rect: &Rect<D>, cmp: &C) -> Vec<&V> {
        let mut out = Vec::new();
        self.visit_with(rect, cmp, |entry| out.push(entry.value), |_| {});
        out
    }

    /// Walk every node overlapping `rect`, calling `on_branch` for internal nodes and
    /// `on_leaf` for matching leaves.
    pub fn visit<'a>(
        &'a self,
        rect: &Rect<D>,
        on_leaf: impl FnMut(EntryRef<'a, D, V>),
        on_branch: impl FnMut(NodeRef<'a, D, V>),
    ) {
        self.visit_with(rect, &Strict, on_leaf, on_branch);
    }

    fn visit_with<'a, C: Comparator<D>>(
        &'a self,
        rect: &Rect<D>,
        cmp: &C,
        mut on_leaf: impl FnMut(EntryRef<'a, D, V>),
        mut on_branch: impl FnMut(NodeRef<'a, D, V>),
    ) {
        let mut stack: SmallVec<[NodeIdx; 32]> = SmallVec::new();
        stack.push(self.root);
        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);
            if !cmp.overlaps(rect, &node.bounds) {
                continue;
            }
            match &node.kind {
                Kind::Leaf(value) => on_leaf(EntryRef {
                    bounds: &node.bounds,
                    value,
                }),
                Kind::Branch(children) => {
                    on_branch(NodeRef::new(&self.arena, idx));
                    stack.extend(children.iter().copied());
                }
            }
        }
    }

    /// Every leaf hit by `ray`, in no particular order.
    ///
    /// ```
    /// use understory_bvh::{Bvh, Ray, Rect, Vector};
    ///
    /// let mut bvh: Bvh<2, u32> = Bvh::new();
    /// bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), 1);
    ///
    /// let hits = bvh.intersect(&Ray::new([-5.0, 5.0], [1.0, 0.0]));
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits[0].point(), Vector::new([0.0, 5.0]));
    /// assert_eq!(hits[0].normal(), Vector::new([-1.0, 0.0]));
    /// ```
    pub fn intersect(&self, ray: &Ray<D>) -> Vec<IntersectResult<'_, D, V>> {
        let mut out = Vec::new();
        let axis = ray.dominant_axis();
        let mut stack: SmallVec<[NodeIdx; 32]> = SmallVec::new();
        stack.push(self.root);
        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);
            let Some(span) = ray.clip(&node.bounds) else {
                continue;
            };
            match &node.kind {
                Kind::Leaf(value) => {
                    let entry_point = span.entry_point(ray);
                    let distance = (entry_point[axis] - ray.origin(axis)) / ray.direction(axis);
                    out.push(IntersectResult {
                        ray: *ray,
                        distance,
                        entry: EntryRef {
                            bounds: &node.bounds,
                            value,
                        },
                    });
                }
                Kind::Branch(children) => stack.extend(children.iter().copied()),
            }
        }
        out
    }

    /// Parametric span of `ray` inside `rect`, or `None` if it misses.
    pub fn clip_ray(ray: &Ray<D>, rect: &Rect<D>) -> Option<RaySpan> {
        ray.clip(rect)
    }

    /// Parametric span of `ray` inside the whole tree's envelope.
    pub fn clip_ray_to_envelope(&self, ray: &Ray<D>) -> Option<RaySpan> {
        self.envelope().and_then(|env| ray.clip(&env))
    }
}
