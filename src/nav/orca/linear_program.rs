//! Incremental 2D linear program over half-planes inside a speed disk.

use bevy::math::Vec2;

use super::line::Line;
use crate::nav::math::{cross, sqr};

const RVO_EPSILON: f32 = 1e-5;

/// Optimizes along `lines[line_no]`, clipped by the disk of `radius` and every earlier line.
///
/// With `direction_opt`, `opt` is a unit direction and the extreme point along
/// it is taken; otherwise the point closest to `opt`. Returns `false` when the
/// line has no feasible point.
fn linear_program1(
    lines: &[Line],
    line_no: usize,
    radius: f32,
    opt: Vec2,
    direction_opt: bool,
    result: &mut Vec2,
) -> bool {
    let line = lines[line_no];
    let dot = line.point.dot(line.direction);
    let discriminant = sqr(dot) + sqr(radius) - line.point.length_squared();
    if discriminant < 0.0 {
        // speed disk misses the line entirely
        return false;
    }
    let sqrt_disc = discriminant.sqrt();
    let mut t_left = -dot - sqrt_disc;
    let mut t_right = -dot + sqrt_disc;

    for other in &lines[..line_no] {
        let denominator = cross(line.direction, other.direction);
        let numerator = cross(other.direction, line.point - other.point);
        if denominator.abs() <= RVO_EPSILON {
            // parallel
            if numerator < 0.0 {
                return false;
            }
            continue;
        }
        let t = numerator / denominator;
        if denominator >= 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }
        if t_left > t_right {
            return false;
        }
    }

    *result = if direction_opt {
        if opt.dot(line.direction) > 0.0 {
            line.point + t_right * line.direction
        } else {
            line.point + t_left * line.direction
        }
    } else {
        let t = line.direction.dot(opt - line.point).clamp(t_left, t_right);
        line.point + t * line.direction
    };
    true
}

/// Solves the program from scratch. Returns the index of the first line it
/// could not satisfy, or `lines.len()` on success.
pub(crate) fn linear_program2(lines: &[Line], radius: f32, opt: Vec2, direction_opt: bool, result: &mut Vec2) -> usize {
    *result = if direction_opt {
        opt * radius
    } else if opt.length_squared() > sqr(radius) {
        opt.normalize_or_zero() * radius
    } else {
        opt
    };

    for i in 0..lines.len() {
        if lines[i].violation(*result) > 0.0 {
            let previous = *result;
            if !linear_program1(lines, i, radius, opt, direction_opt, result) {
                *result = previous;
                return i;
            }
        }
    }
    lines.len()
}

/// Fallback when [`linear_program2`] fails at `begin_line`: minimizes the largest
/// violation of the agent lines while keeping the first `num_obst_lines`
/// obstacle lines hard.
pub(crate) fn linear_program3(
    lines: &[Line],
    num_obst_lines: usize,
    projected: &mut Vec<Line>,
    begin_line: usize,
    radius: f32,
    result: &mut Vec2,
) {
    let mut distance = 0.0;
    for i in begin_line..lines.len() {
        if lines[i].violation(*result) <= distance {
            continue;
        }
        projected.clear();
        projected.extend_from_slice(&lines[..num_obst_lines]);

        for j in num_obst_lines..i {
            let determinant = cross(lines[i].direction, lines[j].direction);
            let point = if determinant.abs() <= RVO_EPSILON {
                if lines[i].direction.dot(lines[j].direction) > 0.0 {
                    // same direction
                    continue;
                }
                0.5 * (lines[i].point + lines[j].point)
            } else {
                lines[i].point
                    + (cross(lines[j].direction, lines[i].point - lines[j].point) / determinant) * lines[i].direction
            };
            let direction = (lines[j].direction - lines[i].direction).normalize_or_zero();
            projected.push(Line::new(point, direction));
        }

        let previous = *result;
        let perpendicular = Vec2::new(-lines[i].direction.y, lines[i].direction.x);
        if linear_program2(projected, radius, perpendicular, true, result) < projected.len() {
            // Only reachable through floating point error; keep the last result.
            *result = previous;
        }
        distance = lines[i].violation(*result);
    }
}
