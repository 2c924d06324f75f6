// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! BVH area deletion and tree shape.
//!
//! Fill a small tree, print its structure, sweep a rectangle of it away, and print
//! the structure again.
//!
//! Run:
//! - `cargo run -p understory_demos --example bvh_area_delete`

use understory_bvh::{Bvh, Inclusive, Rect};

fn main() {
    let mut bvh: Bvh<2, u32> = Bvh::with_max_width(4);
    let mut id = 0;
    for y in 0..5 {
        for x in 0..5 {
            bvh.insert_or_update(Rect::from_xywh(f64::from(x) * 10.0, f64::from(y) * 10.0, 8.0, 8.0), id);
            id += 1;
        }
    }
    // A zero-size marker: only the inclusive comparator can see it.
    bvh.insert_or_update(Rect::from_xywh(25.0, 25.0, 0.0, 0.0), 99);

    let mut out = String::new();
    if bvh.dump(&mut out).is_ok() {
        println!("before ({} entries, depth {}):\n{out}", bvh.len(), bvh.depth());
    }

    let sweep = Rect::from_xywh(15.0, 15.0, 20.0, 20.0);
    let strict = bvh.search_values(&sweep).len();
    let inclusive = bvh.search_values_with(&sweep, &Inclusive).len();
    println!("sweep sees {strict} strictly, {inclusive} inclusively");

    let mut removed: Vec<u32> = bvh.remove(&sweep, None).into_iter().map(|e| e.value).collect();
    removed.sort_unstable();
    println!("removed {removed:?}");

    out.clear();
    if bvh.dump(&mut out).is_ok() {
        println!("after ({} entries, depth {}):\n{out}", bvh.len(), bvh.depth());
    }
    if let Some(env) = bvh.envelope() {
        println!("envelope {env}");
    }
}
