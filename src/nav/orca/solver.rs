use bevy::math::Vec2;

use super::linear_program::{linear_program2, linear_program3};
use super::line::{Line, OrcaAgent};
use super::obstacle::ObstacleSet;
use crate::nav::math::{cross, sqr, EPSILON};

const RVO_EPSILON: f32 = 1e-5;

#[inline]
fn left_perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

#[inline]
fn right_perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Leg directions of the velocity obstacle of a disk seen from `relative`,
/// returned as `(left, right)`.
fn legs(relative: Vec2, dist_sq: f32, radius: f32) -> (Vec2, Vec2) {
    let leg = (dist_sq - sqr(radius)).max(0.0).sqrt();
    let left = Vec2::new(
        relative.x * leg - relative.y * radius,
        relative.x * radius + relative.y * leg,
    ) / dist_sq;
    let right = Vec2::new(
        relative.x * leg + relative.y * radius,
        -relative.x * radius + relative.y * leg,
    ) / dist_sq;
    (left, right)
}

/// Appends one ORCA line per obstacle edge in `neighbors` not already covered by `lines`.
///
/// `neighbors` holds edge indices into `obstacles`, nearest first, as produced
/// by [`ObstacleSet::query_neighbors`].
pub fn compute_obstacle(
    position: Vec2,
    radius: f32,
    time_horizon_obst: f32,
    velocity: Vec2,
    obstacles: &ObstacleSet,
    neighbors: &[usize],
    lines: &mut Vec<Line>,
) {
    let inv_time_horizon = 1.0 / time_horizon_obst;
    let radius_sq = sqr(radius);

    for &edge in neighbors {
        let mut idx1 = edge;
        let mut idx2 = obstacles.vertex(edge).next;
        let relative1 = obstacles.vertex(idx1).point - position;
        let relative2 = obstacles.vertex(idx2).point - position;

        // an earlier line may already keep the agent clear of this edge
        let already_covered = lines.iter().any(|line| {
            let v1 = cross(inv_time_horizon * relative1 - line.point, line.direction) - inv_time_horizon * radius;
            let v2 = cross(inv_time_horizon * relative2 - line.point, line.direction) - inv_time_horizon * radius;
            v1 >= -RVO_EPSILON && v2 >= -RVO_EPSILON
        });
        if already_covered {
            continue;
        }

        let dist_sq1 = relative1.length_squared();
        let dist_sq2 = relative2.length_squared();
        let obstacle_vector = obstacles.vertex(idx2).point - obstacles.vertex(idx1).point;
        let s = (-relative1).dot(obstacle_vector) / obstacle_vector.length_squared();
        let dist_sq_line = (-relative1 - s * obstacle_vector).length_squared();

        if s < 0.0 && dist_sq1 <= radius_sq {
            // touching the left vertex
            if obstacles.vertex(idx1).convex {
                lines.push(Line::new(Vec2::ZERO, left_perpendicular(relative1).normalize_or_zero()));
            }
            continue;
        }
        if s > 1.0 && dist_sq2 <= radius_sq {
            // touching the right vertex; the next edge handles it unless convex and facing
            let v2 = obstacles.vertex(idx2);
            if v2.convex && cross(relative2, v2.direction) >= 0.0 {
                lines.push(Line::new(Vec2::ZERO, left_perpendicular(relative2).normalize_or_zero()));
            }
            continue;
        }
        if (0.0..1.0).contains(&s) && dist_sq_line <= radius_sq {
            // touching the edge itself
            lines.push(Line::new(Vec2::ZERO, -obstacles.vertex(idx1).direction));
            continue;
        }

        let (mut left_leg, mut right_leg) = if s < 0.0 && dist_sq_line <= radius_sq {
            // seen obliquely, the left vertex alone shapes the obstacle
            if !obstacles.vertex(idx1).convex {
                continue;
            }
            idx2 = idx1;
            legs(relative1, dist_sq1, radius)
        } else if s > 1.0 && dist_sq_line <= radius_sq {
            if !obstacles.vertex(idx2).convex {
                continue;
            }
            idx1 = idx2;
            legs(relative2, dist_sq2, radius)
        } else {
            let left = if obstacles.vertex(idx1).convex {
                legs(relative1, dist_sq1, radius).0
            } else {
                -obstacles.vertex(idx1).direction
            };
            let right = if obstacles.vertex(idx2).convex {
                legs(relative2, dist_sq2, radius).1
            } else {
                obstacles.vertex(idx1).direction
            };
            (left, right)
        };

        // A leg pointing into the neighboring edge is replaced by that edge.
        let v1 = *obstacles.vertex(idx1);
        let v2 = *obstacles.vertex(idx2);
        let left_neighbor = obstacles.vertex(v1.previous);
        let mut left_foreign = false;
        let mut right_foreign = false;
        if v1.convex && cross(left_leg, -left_neighbor.direction) >= 0.0 {
            left_leg = -left_neighbor.direction;
            left_foreign = true;
        }
        if v2.convex && cross(right_leg, v2.direction) <= 0.0 {
            right_leg = v2.direction;
            right_foreign = true;
        }

        let left_cutoff = inv_time_horizon * (v1.point - position);
        let right_cutoff = inv_time_horizon * (v2.point - position);
        let cutoff_vector = right_cutoff - left_cutoff;
        let same_vertex = idx1 == idx2;

        let t = if same_vertex {
            0.5
        } else {
            (velocity - left_cutoff).dot(cutoff_vector) / cutoff_vector.length_squared()
        };
        let t_left = (velocity - left_cutoff).dot(left_leg);
        let t_right = (velocity - right_cutoff).dot(right_leg);

        if (t < 0.0 && t_left < 0.0) || (same_vertex && t_left < 0.0 && t_right < 0.0) {
            let unit_w = (velocity - left_cutoff).normalize_or_zero();
            lines.push(Line::new(
                left_cutoff + radius * inv_time_horizon * unit_w,
                right_perpendicular(unit_w),
            ));
            continue;
        }
        if t > 1.0 && t_right < 0.0 {
            let unit_w = (velocity - right_cutoff).normalize_or_zero();
            lines.push(Line::new(
                right_cutoff + radius * inv_time_horizon * unit_w,
                right_perpendicular(unit_w),
            ));
            continue;
        }

        // nearest of cutoff segment, left leg and right leg
        let dist_sq_cutoff = if t < 0.0 || t > 1.0 || same_vertex {
            f32::INFINITY
        } else {
            (velocity - (left_cutoff + t * cutoff_vector)).length_squared()
        };
        let dist_sq_left = if t_left < 0.0 {
            f32::INFINITY
        } else {
            (velocity - (left_cutoff + t_left * left_leg)).length_squared()
        };
        let dist_sq_right = if t_right < 0.0 {
            f32::INFINITY
        } else {
            (velocity - (right_cutoff + t_right * right_leg)).length_squared()
        };

        if dist_sq_cutoff <= dist_sq_left && dist_sq_cutoff <= dist_sq_right {
            let direction = -v1.direction;
            lines.push(Line::new(
                left_cutoff + radius * inv_time_horizon * left_perpendicular(direction),
                direction,
            ));
            continue;
        }
        if dist_sq_left <= dist_sq_right {
            if left_foreign {
                continue;
            }
            lines.push(Line::new(
                left_cutoff + radius * inv_time_horizon * left_perpendicular(left_leg),
                left_leg,
            ));
            continue;
        }
        if right_foreign {
            continue;
        }
        let direction = -right_leg;
        lines.push(Line::new(
            right_cutoff + radius * inv_time_horizon * left_perpendicular(direction),
            direction,
        ));
    }
}

/// Appends one reciprocal ORCA line per neighboring agent.
///
/// Agents already overlapping use a cutoff over `time_step` instead of
/// `time_horizon`, so they separate within one step.
pub fn compute_agent(
    position: Vec2,
    radius: f32,
    time_horizon: f32,
    time_step: f32,
    velocity: Vec2,
    neighbors: &[OrcaAgent],
    lines: &mut Vec<Line>,
) {
    let inv_time_horizon = 1.0 / time_horizon;
    for other in neighbors {
        let relative_position = other.position - position;
        let relative_velocity = velocity - other.velocity;
        let dist_sq = relative_position.length_squared();
        let combined = radius + other.radius;
        let combined_sq = sqr(combined);

        let (direction, u) = if dist_sq > combined_sq {
            // cutoff center to relative velocity
            let w = relative_velocity - inv_time_horizon * relative_position;
            let w_length_sq = w.length_squared();
            let dot1 = w.dot(relative_position);
            if dot1 < 0.0 && sqr(dot1) > combined_sq * w_length_sq {
                let w_length = w_length_sq.sqrt();
                let unit_w = w / w_length;
                (right_perpendicular(unit_w), (combined * inv_time_horizon - w_length) * unit_w)
            } else {
                let leg = (dist_sq - combined_sq).sqrt();
                let direction = if cross(relative_position, w) > 0.0 {
                    Vec2::new(
                        relative_position.x * leg - relative_position.y * combined,
                        relative_position.x * combined + relative_position.y * leg,
                    ) / dist_sq
                } else {
                    -Vec2::new(
                        relative_position.x * leg + relative_position.y * combined,
                        -relative_position.x * combined + relative_position.y * leg,
                    ) / dist_sq
                };
                let dot2 = relative_velocity.dot(direction);
                (direction, dot2 * direction - relative_velocity)
            }
        } else {
            let inv_time_step = 1.0 / time_step;
            let w = relative_velocity - inv_time_step * relative_position;
            let w_length = w.length();
            // Zero-length w: push straight apart, or along +x when centers coincide.
            let unit_w = if w_length > EPSILON {
                w / w_length
            } else {
                (-relative_position).try_normalize().unwrap_or(Vec2::X)
            };
            (right_perpendicular(unit_w), (combined * inv_time_step - w_length) * unit_w)
        };

        lines.push(Line::new(velocity + 0.5 * u, direction));
    }
}

/// Velocity closest to `pref_velocity` satisfying every line, within `max_speed`.
///
/// The first `num_obst_lines` lines come from obstacles and are never relaxed.
/// When the agent lines are infeasible, the least-violating velocity is
/// returned instead. `projected` is scratch space.
pub fn compute_new_velocity(
    lines: &[Line],
    num_obst_lines: usize,
    projected: &mut Vec<Line>,
    max_speed: f32,
    pref_velocity: Vec2,
) -> Vec2 {
    let mut velocity = Vec2::ZERO;
    let failed = linear_program2(lines, max_speed, pref_velocity, false, &mut velocity);
    if failed < lines.len() {
        linear_program3(lines, num_obst_lines, projected, failed, max_speed, &mut velocity);
    }
    velocity.clamp_length_max(max_speed.max(0.0))
}
