// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::fmt;
use core::ops::Index;

/// Error returned when a flat component slice does not match the dimension count of the
/// type being built from it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimensionMismatch {
    /// Number of components the target type expects.
    pub expected: usize,
    /// Number of components that were supplied.
    pub found: usize,
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dimension mismatch: expected {} components, found {}",
            self.expected, self.found
        )
    }
}

impl core::error::Error for DimensionMismatch {}

/// Split a flat `[a0, b0, a1, b1, ...]` slice into two per-dimension arrays.
fn split_pairs<const D: usize>(data: &[f64]) -> Result<([f64; D], [f64; D]), DimensionMismatch> {
    if data.len() != D * 2 {
        return Err(DimensionMismatch {
            expected: D * 2,
            found: data.len(),
        });
    }
    let mut a = [0.0; D];
    let mut b = [0.0; D];
    for (dim, pair) in data.chunks_exact(2).enumerate() {
        a[dim] = pair[0];
        b[dim] = pair[1];
    }
    Ok((a, b))
}

fn write_components(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    f.write_str("(")?;
    for (i, v) in values.iter().enumerate() {
        if i != 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    f.write_str(")")
}

/// A read-only point or direction in `D` dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vector<const D: usize>([f64; D]);

impl<const D: usize> Vector<D> {
    /// Create a vector from its components.
    pub const fn new(components: [f64; D]) -> Self {
        Self(components)
    }

    /// Build a vector from a slice of exactly `D` components.
    pub fn from_slice(components: &[f64]) -> Result<Self, DimensionMismatch> {
        let arr: [f64; D] = components.try_into().map_err(|_| DimensionMismatch {
            expected: D,
            found: components.len(),
        })?;
        Ok(Self(arr))
    }

    /// Number of dimensions.
    pub const fn dimensions(&self) -> usize {
        D
    }

    /// Component along `dim`.
    #[inline]
    pub fn get(&self, dim: usize) -> f64 {
        self.0[dim]
    }

    /// All components.
    pub const fn as_array(&self) -> &[f64; D] {
        &self.0
    }
}

impl<const D: usize> Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, dim: usize) -> &f64 {
        &self.0[dim]
    }
}

impl<const D: usize> From<[f64; D]> for Vector<D> {
    fn from(components: [f64; D]) -> Self {
        Self(components)
    }
}

impl<const D: usize> fmt::Display for Vector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Vector")?;
        write_components(f, &self.0)
    }
}

/// Axis-aligned interval rectangle in `D` dimensions, stored as per-dimension `(min, size)`.
///
/// `max(d)` is derived as `min(d) + size(d)`. Zero and negative sizes are accepted as-is;
/// the predicates below are evaluated literally on such rectangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect<const D: usize> {
    min: [f64; D],
    size: [f64; D],
}

impl<const D: usize> Default for Rect<D> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const D: usize> Rect<D> {
    /// The all-zero rectangle, used as the bounds of an empty tree.
    pub const ZERO: Self = Self {
        min: [0.0; D],
        size: [0.0; D],
    };

    /// Create a rectangle from its per-dimension minimum corner and size.
    pub const fn new(min: [f64; D], size: [f64; D]) -> Self {
        Self { min, size }
    }

    /// Create a rectangle from its minimum and maximum corners.
    pub fn from_min_max(min: [f64; D], max: [f64; D]) -> Self {
        let mut size = [0.0; D];
        for dim in 0..D {
            size[dim] = max[dim] - min[dim];
        }
        Self { min, size }
    }

    /// Build a rectangle from a flat `[min0, size0, min1, size1, ...]` slice.
    pub fn from_intervals(data: &[f64]) -> Result<Self, DimensionMismatch> {
        let (min, size) = split_pairs::<D>(data)?;
        Ok(Self { min, size })
    }

    /// Number of dimensions.
    pub const fn dimensions(&self) -> usize {
        D
    }

    /// Minimum along `dim`.
    #[inline]
    pub fn min(&self, dim: usize) -> f64 {
        self.min[dim]
    }

    /// Size along `dim`.
    #[inline]
    pub fn size(&self, dim: usize) -> f64 {
        self.size[dim]
    }

    /// Maximum along `dim` (`min + size`).
    #[inline]
    pub fn max(&self, dim: usize) -> f64 {
        self.min[dim] + self.size[dim]
    }

    /// Set the minimum along `dim`, keeping the size.
    pub fn set_min(&mut self, dim: usize, value: f64) {
        self.min[dim] = value;
    }

    /// Set the size along `dim`, keeping the minimum.
    pub fn set_size(&mut self, dim: usize, value: f64) {
        self.size[dim] = value;
    }

    /// The minimum corner.
    pub fn min_corner(&self) -> Vector<D> {
        Vector(self.min)
    }

    /// The per-dimension sizes.
    pub fn sizes(&self) -> Vector<D> {
        Vector(self.size)
    }

    /// The maximum corner.
    pub fn max_corner(&self) -> Vector<D> {
        let mut max = [0.0; D];
        for (dim, m) in max.iter_mut().enumerate() {
            *m = self.max(dim);
        }
        Vector(max)
    }

    /// Grow `self` in place to the bounding rectangle of `self` and `other`.
    pub fn expand(&mut self, other: &Self) {
        for dim in 0..D {
            let min = self.min[dim].min(other.min[dim]);
            let max = self.max(dim).max(other.max(dim));
            self.size[dim] = max - min;
            self.min[dim] = min;
        }
    }

    /// Bounding rectangle of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.expand(other);
        out
    }

    /// Whether the interiors of `self` and `other` intersect on every axis.
    ///
    /// Touching edges do not count.
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..D).all(|dim| self.min(dim) < other.max(dim) && self.max(dim) > other.min(dim))
    }

    /// Whether `self` lies entirely within `other` (boundaries inclusive).
    pub fn is_within(&self, other: &Self) -> bool {
        (0..D).all(|dim| self.max(dim) <= other.max(dim) && self.min(dim) >= other.min(dim))
    }

    /// Sum of the per-dimension sizes.
    pub fn size_sum(&self) -> f64 {
        self.size.iter().sum()
    }

    /// Product of the per-dimension sizes (area, volume, ...).
    pub fn size_product(&self) -> f64 {
        self.size.iter().product()
    }

    /// Insertion cost heuristic favouring square, sparsely populated boxes.
    ///
    /// Defined as `product * count / (product / mean^D)` where `mean` is the average edge
    /// length; the ratio `product / mean^D` is 1 for a hypercube and tends to 0 as the box
    /// elongates. Algebraically this is `count * mean^D`, which is what is evaluated so that
    /// flat (zero-volume) boxes still produce a finite cost.
    pub(crate) fn squareness_cost(&self, count: usize) -> f64 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Dimension and child counts are bounded by the node fan-out."
        )]
        let (count, dims) = (count as f64, D as f64);
        let mean = self.size_sum() / dims;
        (0..D).fold(count, |acc, _| acc * mean)
    }
}

impl Rect<2> {
    /// Create a 2D rectangle from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min: [x, y],
            size: [w, h],
        }
    }
}

impl Rect<3> {
    /// Create a 3D box from origin and size.
    pub const fn from_xyz_whd(x: f64, y: f64, z: f64, w: f64, h: f64, d: f64) -> Self {
        Self {
            min: [x, y, z],
            size: [w, h, d],
        }
    }
}

impl<const D: usize> fmt::Display for Rect<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rect(min=")?;
        write_components(f, &self.min)?;
        f.write_str(", max=")?;
        write_components(f, self.max_corner().as_array())?;
        f.write_str(")")
    }
}

/// Minimum bounding rectangle of `rects`, or `None` if there are none.
pub fn combine<'a, const D: usize>(rects: impl IntoIterator<Item = &'a Rect<D>>) -> Option<Rect<D>> {
    let mut it = rects.into_iter();
    let first = *it.next()?;
    Some(it.fold(first, |mut acc, r| {
        acc.expand(r);
        acc
    }))
}

/// A ray in `D` dimensions, stored as per-dimension `(origin, direction)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray<const D: usize> {
    origin: [f64; D],
    direction: [f64; D],
}

/// Parametric span of a ray inside a box: the ray is inside for `t` in `[t_enter, t_exit]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaySpan {
    /// Parameter at which the ray enters the box (clamped to 0 when it starts inside).
    pub t_enter: f64,
    /// Parameter at which the ray leaves the box.
    pub t_exit: f64,
}

impl RaySpan {
    /// Entry point along `ray`.
    pub fn entry_point<const D: usize>(&self, ray: &Ray<D>) -> Vector<D> {
        ray.point_at(self.t_enter)
    }

    /// Exit point along `ray`.
    pub fn exit_point<const D: usize>(&self, ray: &Ray<D>) -> Vector<D> {
        ray.point_at(self.t_exit)
    }
}

impl<const D: usize> Ray<D> {
    /// Create a ray from an origin and a direction (not required to be normalized).
    pub const fn new(origin: [f64; D], direction: [f64; D]) -> Self {
        Self { origin, direction }
    }

    /// Build a ray from a flat `[origin0, dir0, origin1, dir1, ...]` slice.
    pub fn from_intervals(data: &[f64]) -> Result<Self, DimensionMismatch> {
        let (origin, direction) = split_pairs::<D>(data)?;
        Ok(Self { origin, direction })
    }

    /// Origin component along `dim`.
    #[inline]
    pub fn origin(&self, dim: usize) -> f64 {
        self.origin[dim]
    }

    /// Direction component along `dim`.
    #[inline]
    pub fn direction(&self, dim: usize) -> f64 {
        self.direction[dim]
    }

    /// The origin as a vector.
    pub fn origin_vector(&self) -> Vector<D> {
        Vector(self.origin)
    }

    /// The direction as a vector.
    pub fn direction_vector(&self) -> Vector<D> {
        Vector(self.direction)
    }

    /// Point at parameter `t` (`origin + direction * t`).
    pub fn point_at(&self, t: f64) -> Vector<D> {
        let mut p = [0.0; D];
        for (dim, c) in p.iter_mut().enumerate() {
            *c = self.origin[dim] + self.direction[dim] * t;
        }
        Vector(p)
    }

    /// Axis with the largest absolute direction component (first one on ties).
    pub fn dominant_axis(&self) -> usize {
        let mut best = 0;
        for dim in 1..D {
            if self.direction[dim].abs() > self.direction[best].abs() {
                best = dim;
            }
        }
        best
    }

    /// Clip the ray against `rect` with the slab method.
    ///
    /// Returns `None` when the ray misses the box or the box lies entirely behind the
    /// origin. Axis-parallel rays rely on IEEE infinities from the inverse direction.
    pub fn clip(&self, rect: &Rect<D>) -> Option<RaySpan> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for dim in 0..D {
            let inv = 1.0 / self.direction[dim];
            let (near, far) = if inv <= 0.0 {
                (rect.max(dim), rect.min(dim))
            } else {
                (rect.min(dim), rect.max(dim))
            };
            let t0 = (near - self.origin[dim]) * inv;
            let t1 = (far - self.origin[dim]) * inv;
            if t_min > t1 || t0 > t_max {
                return None;
            }
            if t0 > t_min {
                t_min = t0;
            }
            if t1 < t_max {
                t_max = t1;
            }
        }
        if t_min >= f64::INFINITY || t_max <= f64::NEG_INFINITY {
            return None;
        }
        if t_min < 0.0 && t_max < 0.0 {
            return None;
        }
        Some(RaySpan {
            t_enter: t_min.max(0.0),
            t_exit: t_max,
        })
    }
}

impl<const D: usize> fmt::Display for Ray<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ray(origin=")?;
        write_components(f, &self.origin)?;
        f.write_str(", direction=")?;
        write_components(f, &self.direction)?;
        f.write_str(")")
    }
}
