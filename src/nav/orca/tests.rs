/// Tests for the ORCA solver
///
/// Covers the head-on collision scenario, the speed bound over random
/// constraint sets, and obstacle constraints built from polygons. The square
/// below is counter-clockwise, so its edges are 0 bottom, 1 right, 2 top, 3 left.

use bevy::math::Vec2;

use super::*;

#[test]
fn test_head_on_agents_separate_without_penetrating() {
    let dt = 0.1;
    let max_speed = 2.0;
    let a = OrcaAgent {
        position: Vec2::new(0.0, 0.0),
        velocity: Vec2::new(1.0, 0.0),
        radius: 0.5,
    };
    let b = OrcaAgent {
        position: Vec2::new(0.9, 0.0),
        velocity: Vec2::new(-1.0, 0.0),
        radius: 0.5,
    };

    let mut lines = Vec::new();
    let mut scratch = Vec::new();

    compute_agent(a.position, a.radius, 2.0, dt, a.velocity, &[b], &mut lines);
    let va = compute_new_velocity(&lines, 0, &mut scratch, max_speed, a.velocity);
    lines.clear();
    compute_agent(b.position, b.radius, 2.0, dt, b.velocity, &[a], &mut lines);
    let vb = compute_new_velocity(&lines, 0, &mut scratch, max_speed, b.velocity);

    let pa = a.position + va * dt;
    let pb = b.position + vb * dt;
    println!("va {:?} vb {:?} distance {}", va, vb, pa.distance(pb));
    assert!(pa.distance(pb) >= 1.0 - 1e-4, "agents still overlap: {}", pa.distance(pb));
    assert!(va.x < 0.0 && vb.x > 0.0, "both back away");
}

#[test]
fn test_new_velocity_respects_max_speed() {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut scratch = Vec::new();
    for _ in 0..500 {
        let count = rng.usize(0..8);
        let lines: Vec<Line> = (0..count)
            .map(|_| {
                let angle = rng.f32() * std::f32::consts::TAU;
                let point = Vec2::new(rng.f32() * 6.0 - 3.0, rng.f32() * 6.0 - 3.0);
                Line::new(point, Vec2::new(angle.cos(), angle.sin()))
            })
            .collect();
        let max_speed = 0.1 + rng.f32() * 3.0;
        let pref = Vec2::new(rng.f32() * 10.0 - 5.0, rng.f32() * 10.0 - 5.0);
        let obstacle_lines = rng.usize(0..=count);
        let v = compute_new_velocity(&lines, obstacle_lines, &mut scratch, max_speed, pref);
        assert!(v.is_finite());
        assert!(
            v.length() <= max_speed + 1e-4,
            "speed {} exceeds {}",
            v.length(),
            max_speed
        );
    }
}

#[test]
fn test_agents_far_apart_keep_preferred_velocity() {
    let other = OrcaAgent {
        position: Vec2::new(0.0, 50.0),
        velocity: Vec2::ZERO,
        radius: 0.5,
    };
    let mut lines = Vec::new();
    compute_agent(Vec2::ZERO, 0.5, 2.0, 0.1, Vec2::X, &[other], &mut lines);
    assert_eq!(lines.len(), 1);
    let v = compute_new_velocity(&lines, 0, &mut Vec::new(), 2.0, Vec2::X);
    assert!((v - Vec2::X).length() < 1e-5, "got {:?}", v);
}

#[test]
fn test_polygon_links_and_convexity() {
    let mut set = ObstacleSet::new();
    // counter-clockwise square plus a segment
    let square = [
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ];
    assert_eq!(set.add_polygon(&square), Some(0));
    assert_eq!(set.add_polygon(&[Vec2::new(5.0, 0.0), Vec2::new(5.0, 3.0)]), Some(4));
    assert_eq!(set.add_polygon(&[Vec2::ONE]), None);
    assert_eq!(set.len(), 6);

    for i in 0..4 {
        let v = set.vertex(i);
        assert!(v.convex);
        assert_eq!(set.vertex(v.next).previous, i);
    }
    assert_eq!(set.vertex(0).direction, Vec2::X);
    assert_eq!(set.vertex(4).next, 5);
    assert_eq!(set.vertex(5).next, 4);
    assert!(set.vertex(4).convex && set.vertex(5).convex);
}

#[test]
fn test_query_returns_facing_edges_nearest_first() {
    let mut set = ObstacleSet::new();
    set.add_polygon(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ]);
    let mut out = Vec::new();
    // below the square: only the bottom edge faces the agent
    set.query_neighbors(Vec2::new(1.0, -1.0), 1.5, &mut out);
    assert_eq!(out, vec![0]);

    // below-right corner sees the bottom and right edges
    set.query_neighbors(Vec2::new(2.5, -1.0), 5.0, &mut out);
    assert_eq!(out.len(), 2);
    assert!(out.contains(&0) && out.contains(&1));
}

#[test]
fn test_obstacle_line_stops_agent_walking_into_wall() {
    let mut set = ObstacleSet::new();
    // wall segment along y = 1
    set.add_polygon(&[Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0)]);
    let position = Vec2::ZERO;
    let radius = 0.5;
    let velocity = Vec2::new(0.0, 2.0);

    let mut neighbors = Vec::new();
    set.query_neighbors(position, 2.0 * 1.0 + radius, &mut neighbors);
    assert_eq!(neighbors.len(), 1);

    let mut lines = Vec::new();
    compute_obstacle(position, radius, 1.0, velocity, &set, &neighbors, &mut lines);
    assert_eq!(lines.len(), 1);
    let v = compute_new_velocity(&lines, lines.len(), &mut Vec::new(), 2.0, velocity);
    let dt = 0.25;
    let next = position + v * dt;
    println!("obstacle-constrained velocity {:?}", v);
    assert!(next.y <= 1.0 - radius + 1e-4, "would end inside the wall band: {:?}", next);
}

fn unit_square() -> ObstacleSet {
    let mut set = ObstacleSet::new();
    set.add_polygon(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ]);
    set
}

fn clearance_to(set: &ObstacleSet, point: Vec2) -> f32 {
    set.vertices()
        .iter()
        .map(|v| dist_sq_point_segment(v.point, set.vertex(v.next).point, point).sqrt())
        .fold(f32::INFINITY, f32::min)
}

#[test]
fn test_agent_overlapping_corner_moves_away_from_it() {
    let set = unit_square();
    let corner = Vec2::new(2.0, 0.0);
    let position = Vec2::new(2.3, -0.2);
    let radius = 0.5;

    let mut neighbors = Vec::new();
    set.query_neighbors(position, 2.5, &mut neighbors);
    assert_eq!(neighbors, vec![0, 1]);

    let mut lines = Vec::new();
    let toward = Vec2::new(-1.0, 1.0);
    compute_obstacle(position, radius, 1.0, toward, &set, &neighbors, &mut lines);
    // the bottom edge leaves its far vertex to the right edge
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].point, Vec2::ZERO);

    let v = compute_new_velocity(&lines, lines.len(), &mut Vec::new(), 2.0, toward);
    println!("corner contact velocity {:?}", v);
    assert!(v.dot(position - corner) >= -1e-4, "still heading into the corner: {:?}", v);
}

#[test]
fn test_agent_overlapping_edge_cannot_push_further_in() {
    let set = unit_square();
    let position = Vec2::new(1.0, -0.3);

    let mut neighbors = Vec::new();
    set.query_neighbors(position, 2.5, &mut neighbors);
    assert_eq!(neighbors, vec![0]);

    let mut lines = Vec::new();
    let preferred = Vec2::new(0.5, 2.0);
    compute_obstacle(position, 0.5, 1.0, preferred, &set, &neighbors, &mut lines);
    assert_eq!(lines.len(), 1);
    assert!((lines[0].direction - Vec2::NEG_X).length() < 1e-6);

    let v = compute_new_velocity(&lines, lines.len(), &mut Vec::new(), 2.0, preferred);
    println!("edge contact velocity {:?}", v);
    assert!(v.y <= 1e-5, "pushing into the edge: {:?}", v);
    assert!((v.x - 0.5).abs() < 1e-4, "sliding along the edge is free: {:?}", v);
}

#[test]
fn test_oblique_vertex_bounds_approach_to_tangent() {
    let set = unit_square();
    // level with the bottom edge but past its left end
    let position = Vec2::new(-0.8, -0.3);
    let radius = 0.5;
    let at_vertex = Vec2::new(1.6, 0.6);

    let mut lines = Vec::new();
    compute_obstacle(position, radius, 1.0, at_vertex, &set, &[0], &mut lines);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].violation(at_vertex) > 0.0);

    let v = compute_new_velocity(&lines, lines.len(), &mut Vec::new(), 2.0, at_vertex);
    assert!(lines[0].violation(v) <= 1e-4);
    let closest = (0..=100)
        .map(|i| (position + v * (i as f32 / 100.0)).length())
        .fold(f32::INFINITY, f32::min);
    println!("oblique velocity {:?}, closest approach {}", v, closest);
    assert!(closest >= radius - 1e-3, "grazed the vertex: {}", closest);
}

#[test]
fn test_leg_into_neighbor_edge_defers_to_that_edge() {
    let set = unit_square();
    let position = Vec2::new(-0.8, -0.3);
    // heading up the left side, nearest the bottom edge's left leg
    let preferred = Vec2::new(0.8, 1.5);

    let mut lines = Vec::new();
    compute_obstacle(position, 0.5, 1.0, preferred, &set, &[0], &mut lines);
    assert!(lines.is_empty(), "the left leg lies along the left edge: {:?}", lines);

    let mut neighbors = Vec::new();
    set.query_neighbors(position, 2.5, &mut neighbors);
    assert_eq!(neighbors, vec![0, 3]);
    compute_obstacle(position, 0.5, 1.0, preferred, &set, &neighbors, &mut lines);
    assert_eq!(lines.len(), 1);
    assert!((lines[0].direction - Vec2::Y).length() < 1e-5);

    let v = compute_new_velocity(&lines, lines.len(), &mut Vec::new(), 2.0, preferred);
    println!("left side velocity {:?}", v);
    assert!(v.x <= 0.3 + 1e-4, "would reach the left edge within the horizon: {:?}", v);
}

#[test]
fn test_edge_behind_existing_line_adds_nothing() {
    let mut set = ObstacleSet::new();
    let wall = [Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0)];
    set.add_polygon(&wall);
    set.add_polygon(&wall);

    let mut neighbors = Vec::new();
    set.query_neighbors(Vec2::ZERO, 2.5, &mut neighbors);
    assert_eq!(neighbors.len(), 2);

    let mut lines = Vec::new();
    compute_obstacle(Vec2::ZERO, 0.5, 1.0, Vec2::new(0.0, 2.0), &set, &neighbors, &mut lines);
    assert_eq!(lines.len(), 1);
}

#[test]
fn test_rounding_the_corner_keeps_clearance() {
    let set = unit_square();
    let radius = 0.5;
    let goal = Vec2::new(4.0, 0.6);
    let mut position = Vec2::new(-1.0, -0.4);
    let mut neighbors = Vec::new();
    let mut lines = Vec::new();
    let mut scratch = Vec::new();
    let dt = 0.05;

    let mut closest = f32::INFINITY;
    for _ in 0..40 {
        let preferred = (goal - position).normalize_or_zero() * 2.0;
        set.query_neighbors(position, 2.0 + radius, &mut neighbors);
        lines.clear();
        compute_obstacle(position, radius, 1.0, preferred, &set, &neighbors, &mut lines);
        let v = compute_new_velocity(&lines, lines.len(), &mut scratch, 2.0, preferred);
        position += v * dt;
        closest = closest.min(clearance_to(&set, position));
    }
    println!("ended at {:?}, closest {}", position, closest);
    assert!(closest >= radius - 1e-3, "entered the square: {}", closest);
    assert!(position.x > 0.5, "made no progress past the corner: {:?}", position);
}
