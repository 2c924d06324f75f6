// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! BVH ray picking in 3D.
//!
//! Scatter crates on a floor, cast a camera ray, and report the nearest hit with its
//! entry point and face normal.
//!
//! Run:
//! - `cargo run -p understory_demos --example bvh_ray_pick`

use understory_bvh::{Bvh, Ray, Rect};

fn main() {
    let mut scene: Bvh<3, &str> = Bvh::new();
    scene.insert_or_update(Rect::from_xyz_whd(-50.0, -1.0, -50.0, 100.0, 1.0, 100.0), "floor");
    scene.insert_or_update(Rect::from_xyz_whd(-2.0, 0.0, 8.0, 4.0, 4.0, 4.0), "crate_near");
    scene.insert_or_update(Rect::from_xyz_whd(-3.0, 0.0, 20.0, 6.0, 6.0, 6.0), "crate_far");
    scene.insert_or_update(Rect::from_xyz_whd(10.0, 0.0, 10.0, 2.0, 8.0, 2.0), "pillar");

    println!("{} objects, tree depth {}", scene.len(), scene.depth());

    // Camera at eye height looking down +z, slightly downward.
    let ray = Ray::new([0.0, 2.0, -10.0], [0.0, -0.02, 1.0]);
    let mut hits = scene.intersect(&ray);
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    for hit in &hits {
        println!(
            "{:<10} distance {:>7.3} at {} normal {}",
            hit.value(),
            hit.distance,
            hit.point(),
            hit.normal()
        );
    }
    match hits.first() {
        Some(nearest) => println!("picked: {}", nearest.value()),
        None => println!("picked nothing"),
    }

    // Knock the near crate out of the way and pick again.
    scene.insert_or_update(Rect::from_xyz_whd(30.0, 0.0, 8.0, 4.0, 4.0, 4.0), "crate_near");
    let nearest = scene
        .intersect(&ray)
        .into_iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance));
    println!(
        "after moving crate_near, picked: {}",
        nearest.map_or("nothing", |h| *h.value())
    );
}
