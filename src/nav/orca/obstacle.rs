use bevy::math::Vec2;

use crate::nav::math::{cross, sqr};

/// One vertex of a static obstacle polygon, owning the edge to `next`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleVertex {
    pub point: Vec2,
    /// Unit direction of the edge from this vertex to `next`.
    pub direction: Vec2,
    pub convex: bool,
    pub next: usize,
    pub previous: usize,
}

/// Static obstacle polygons stored as one flat vertex array.
///
/// Vertices link to their neighbors by index, so two vertices are the same
/// vertex exactly when their indices are equal. Polygons are given
/// counter-clockwise; agents must stay on the right of every edge. A
/// two-point polygon is a line segment usable from both sides.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    vertices: Vec<ObstacleVertex>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertex(&self, idx: usize) -> &ObstacleVertex {
        &self.vertices[idx]
    }

    pub fn vertices(&self) -> &[ObstacleVertex] {
        &self.vertices
    }

    /// Appends a polygon and returns the index of its first vertex.
    ///
    /// Fewer than two points, or an edge of zero length, is rejected.
    pub fn add_polygon(&mut self, points: &[Vec2]) -> Option<usize> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let first = self.vertices.len();
        let mut directions = Vec::with_capacity(n);
        for i in 0..n {
            let edge = points[(i + 1) % n] - points[i];
            directions.push(crate::nav::math::try_normalize(edge)?);
        }
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            let convex = n == 2 || left_of(points[prev], points[i], points[next]) >= 0.0;
            self.vertices.push(ObstacleVertex {
                point: points[i],
                direction: directions[i],
                convex,
                next: first + next,
                previous: first + prev,
            });
        }
        Some(first)
    }

    /// Collects the edges within `range` of `position` that face it, nearest first.
    ///
    /// Each edge is identified by the index of its first vertex.
    pub fn query_neighbors(&self, position: Vec2, range: f32, out: &mut Vec<usize>) {
        out.clear();
        let range_sq = sqr(range);
        let edge_dist_sq = |idx: usize| {
            let vertex = &self.vertices[idx];
            dist_sq_point_segment(vertex.point, self.vertices[vertex.next].point, position)
        };
        for (idx, vertex) in self.vertices.iter().enumerate() {
            let next = &self.vertices[vertex.next];
            if left_of(vertex.point, next.point, position) >= 0.0 {
                continue;
            }
            if edge_dist_sq(idx) < range_sq {
                out.push(idx);
            }
        }
        out.sort_by(|&a, &b| edge_dist_sq(a).total_cmp(&edge_dist_sq(b)));
    }
}

/// Positive when `c` lies to the left of the line through `a` and `b`.
#[inline]
pub fn left_of(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    cross(a - c, b - a)
}

pub fn dist_sq_point_segment(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= 0.0 {
        return c.distance_squared(a);
    }
    let r = (c - a).dot(ab) / len_sq;
    if r < 0.0 {
        c.distance_squared(a)
    } else if r > 1.0 {
        c.distance_squared(b)
    } else {
        c.distance_squared(a + r * ab)
    }
}
