//! Analytic signed distance functions for authoring maps and obstacles.
//!
//! Negative inside the shape, positive outside.

use bevy::math::Vec2;

use super::map::{SdfMap, QUANT_MAX};
use super::error::SdfResult;
use super::scene::DynamicObstacle;

pub fn circle_sdf(point: Vec2, center: Vec2, radius: f32) -> f32 {
    point.distance(center) - radius
}

/// Unsigned distance to the segment `from`-`to`. Subtract a radius for a capsule.
pub fn segment_sdf(point: Vec2, from: Vec2, to: Vec2) -> f32 {
    let ap = point - from;
    let ab = to - from;
    let denom = ab.dot(ab);
    let h = if denom > 0.0 {
        (ap.dot(ab) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (ap - ab * h).length()
}

pub fn box_sdf(point: Vec2, center: Vec2, half_size: Vec2) -> f32 {
    let d = (point - center).abs() - half_size;
    d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
}

/// Box rotated by the unit vector `rotation` (`(cos, sin)` of its angle).
pub fn oriented_box_sdf(point: Vec2, center: Vec2, rotation: Vec2, half_size: Vec2) -> f32 {
    let p = point - center;
    // into the box frame
    let local = Vec2::new(p.x * rotation.x + p.y * rotation.y, -p.x * rotation.y + p.y * rotation.x);
    box_sdf(local, Vec2::ZERO, half_size)
}

pub fn triangle_sdf(point: Vec2, p0: Vec2, p1: Vec2, p2: Vec2) -> f32 {
    let e0 = p1 - p0;
    let e1 = p2 - p1;
    let e2 = p0 - p2;
    let v0 = point - p0;
    let v1 = point - p1;
    let v2 = point - p2;
    let pq0 = v0 - e0 * (v0.dot(e0) / e0.dot(e0)).clamp(0.0, 1.0);
    let pq1 = v1 - e1 * (v1.dot(e1) / e1.dot(e1)).clamp(0.0, 1.0);
    let pq2 = v2 - e2 * (v2.dot(e2) / e2.dot(e2)).clamp(0.0, 1.0);
    let s = sign(e0.x * e2.y - e0.y * e2.x);
    let d = Vec2::new(pq0.dot(pq0), s * (v0.x * e0.y - v0.y * e0.x))
        .min(Vec2::new(pq1.dot(pq1), s * (v1.x * e1.y - v1.y * e1.x)))
        .min(Vec2::new(pq2.dot(pq2), s * (v2.x * e2.y - v2.y * e2.x)));
    -d.x.sqrt() * sign(d.y)
}

fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Quantizes `distance` over a `width` x `height` patch of `map`, anchored at cell `(x, y)`.
///
/// Fails on an empty patch.
pub fn stamp_obstacle(
    name: impl Into<String>,
    map: &SdfMap,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    distance: impl Fn(Vec2) -> f32,
) -> SdfResult<DynamicObstacle> {
    let mut data = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
    for ly in 0..height {
        for lx in 0..width {
            let world = map.grid_to_world(x + lx, y + ly);
            let q = (distance(world) / map.scale()).round().clamp(-QUANT_MAX, QUANT_MAX);
            data.push(q as i16);
        }
    }
    DynamicObstacle::new(name.into(), width, height, x, y, data)
}
