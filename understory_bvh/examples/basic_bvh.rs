// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory BVH: insert, move, search, cast a ray, and remove.

use understory_bvh::{Bvh, Ray, Rect};

fn main() {
    let mut bvh: Bvh<2, u32> = Bvh::new();
    bvh.insert_or_update(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), 1);
    bvh.insert_or_update(Rect::from_xywh(5.0, 5.0, 10.0, 10.0), 2);

    // Move box 1
    bvh.insert_or_update(Rect::from_xywh(20.0, 0.0, 10.0, 10.0), 1);
    println!("box 1 now at {:?}", bvh.object_bounds(&1));

    // Query a small rect around (6, 6)
    let hits = bvh.search_values(&Rect::from_xywh(6.0, 6.0, 1.0, 1.0));
    println!("hits at (6,6): {hits:?}");

    // Cast a ray along +x
    for hit in bvh.intersect(&Ray::new([-10.0, 7.0], [1.0, 0.0])) {
        println!(
            "ray hit {} at {} (normal {})",
            hit.value(),
            hit.point(),
            hit.normal()
        );
    }

    let removed = bvh.remove(&Rect::from_xywh(0.0, 0.0, 100.0, 100.0), None);
    println!("area delete removed {} entries", removed.len());
    assert!(bvh.is_empty());
}
