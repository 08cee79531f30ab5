//! Per-tick steering of one agent against its neighbors and the SDF.
//!
//! Straight-line movement uses [`NavContext::adjust_move_by_neighbor`] then
//! [`NavContext::adjust_move_by_obstacle`]. Path movement smooths the path with
//! [`NavContext::optimize_path`] and turns with
//! [`NavContext::adjust_move_by_path_move`]. Either way the final distance is
//! capped by [`NavContext::collider_move_by_obstacle`] and
//! [`NavContext::collider_move_by_neighbor`] before it is committed.

use bevy::math::Vec2;

use super::agent::{MoveAgentInfo, NavPathMoveInfo, NeighborAgentInfo};
use crate::nav::context::NavContext;
use crate::nav::math::{rotate_deg, signed_angle_deg, sqr};

/// Turns that end up this close to a full reversal are treated as fully blocked.
const BLOCKED_TURN_DEG: f32 = 179.0;

impl NavContext {
    /// Rotates the heading out of every neighbor it would run into this tick.
    ///
    /// Returns `true` when the heading changed.
    pub fn adjust_move_by_neighbor(&mut self, agent: &mut MoveAgentInfo) -> bool {
        let eps = self.tolerances.epsilon;
        self.move_block.clear();
        for neighbor in &self.neighbors {
            if neighbor.distance <= eps {
                continue;
            }
            if neighbor.distance > agent.radius + agent.move_distance + neighbor.radius {
                continue;
            }
            // one disk inside the other: let it walk out
            if (agent.radius - neighbor.radius).abs() > neighbor.distance {
                continue;
            }
            let angle = signed_angle_deg(agent.direction, neighbor.direction);
            let combined = agent.radius + neighbor.radius;
            if neighbor.distance <= combined {
                self.move_block.add_angle(angle, self.tolerances.contact_block_deg);
                continue;
            }
            let half_width = (combined / neighbor.distance).asin().to_degrees();
            self.move_block.add_angle(angle, half_width);
        }

        let adjust = self.move_block.min_offset_angle();
        if adjust.abs() <= eps || adjust.abs() > self.tolerances.max_neighbor_turn_deg {
            return false;
        }
        agent.direction = rotate_deg(agent.direction, adjust);
        true
    }

    /// Slides along a wall when the projected position would penetrate it.
    ///
    /// The projected point is pushed out along the gradient by the penetration
    /// depth plus `slide_margin`, and the heading and distance are taken from the
    /// resulting displacement. Corrections that turn 90° or more away from the
    /// intended heading, or collapse to no movement, are rejected.
    pub fn adjust_move_by_obstacle(&self, agent: &mut MoveAgentInfo) -> bool {
        let eps = self.tolerances.epsilon;
        let mut projected = agent.projected();
        let sd = self.map.sample(projected);
        if sd >= agent.radius + eps {
            return false;
        }
        let gradient = self.map.gradient(projected).normalize_or_zero();
        projected += (agent.radius - sd + self.tolerances.slide_margin) * gradient;
        let diff = projected - agent.position;
        if diff.dot(agent.direction) <= eps {
            return false;
        }
        let magnitude = diff.length();
        if magnitude <= eps {
            return false;
        }
        agent.direction = diff / magnitude;
        agent.move_distance = agent.move_distance.min(magnitude);
        true
    }

    /// Travel distance along the heading before the disk touches solid.
    pub fn collider_move_by_obstacle(&self, agent: &MoveAgentInfo) -> f32 {
        if self.map.sample(agent.position) < agent.radius + agent.move_distance {
            return self
                .map
                .try_move_to(agent.position, agent.direction, agent.radius, agent.move_distance);
        }
        agent.move_distance
    }

    /// Travel distance along the heading before the disk touches a neighbor.
    ///
    /// Neighbors behind the agent are ignored; an already overlapping neighbor
    /// ahead stops the agent.
    pub fn collider_move_by_neighbor(&self, agent: &MoveAgentInfo) -> f32 {
        let mut distance = agent.move_distance;
        for neighbor in &self.neighbors {
            if let Some(contact) = self.contact_distance(agent.direction, agent.radius, neighbor) {
                distance = distance.min(contact);
            }
        }
        distance.max(0.0)
    }

    /// Whether a disk of `radius` can travel `max_distance` along `direction`
    /// without touching a neighbor or solid.
    pub fn move_test(&self, position: Vec2, direction: Vec2, radius: f32, max_distance: f32) -> bool {
        for neighbor in &self.neighbors {
            if let Some(contact) = self.contact_distance(direction, radius, neighbor) {
                if contact < max_distance {
                    return false;
                }
            }
        }
        self.map.try_move_to(position, direction, radius, max_distance) >= max_distance
    }

    /// Distance along `direction` at which the two disks first touch, if they do.
    fn contact_distance(&self, direction: Vec2, radius: f32, neighbor: &NeighborAgentInfo) -> Option<f32> {
        let dot = neighbor.direction.dot(direction).clamp(-1.0, 1.0);
        if dot <= self.tolerances.epsilon {
            return None;
        }
        let combined = radius + neighbor.radius;
        if neighbor.distance < combined {
            return Some(0.0);
        }
        // A: agent, B: neighbor, C: B projected onto the travel line
        let ac = dot * neighbor.distance;
        let bc_sq = (sqr(neighbor.distance) - sqr(ac)).max(0.0);
        let combined_sq = sqr(combined);
        if bc_sq >= combined_sq {
            return None;
        }
        Some(ac - (combined_sq - bc_sq).sqrt())
    }

    /// Drops waypoints that are reached this tick or already in line of sight.
    ///
    /// Running every tick progressively straightens the grid path and copes with
    /// agents pushed off their path by collisions.
    pub fn optimize_path(&self, agent: &MoveAgentInfo, path: &mut NavPathMoveInfo) {
        let Some(target) = path.target() else {
            return;
        };
        // reaching it would overshoot
        if target.distance(agent.position) < agent.move_distance {
            path.remove_last_point();
        }
        if path.path.len() > 1 {
            let after_next = path.path[path.path.len() - 2];
            if self.map.check_straight_move(agent.position, after_next, agent.radius) {
                path.remove_last_point();
            }
        }
    }

    /// Stops short of the final waypoint when it is in reach or taken by a neighbor.
    pub fn nav_destination_check(&self, agent: &MoveAgentInfo, path: &mut NavPathMoveInfo) {
        if path.path.len() != 1 {
            return;
        }
        let destination = path.path[0];
        if destination.distance(agent.position) < agent.move_distance {
            path.remove_last_point();
            return;
        }
        if let Some(idx) = self.overlap_point_neighbor(agent, destination) {
            let neighbor = &self.neighbors[idx];
            let space = neighbor.distance - neighbor.radius - agent.radius;
            if space <= self.tolerances.space_to_neighbor {
                path.remove_last_point();
            }
        }
    }

    /// Index of the first neighbor whose disk contains `point`.
    pub fn overlap_point_neighbor(&self, agent: &MoveAgentInfo, point: Vec2) -> Option<usize> {
        self.neighbors.iter().position(|neighbor| {
            let center = neighbor.position_from(agent.position);
            center.distance_squared(point) < sqr(neighbor.radius)
        })
    }

    /// Points the agent at its next waypoint, turning away from neighbors and walls.
    ///
    /// Once a correction has been applied, the blocked range is built against the
    /// previous tick's heading as well, and the side closer to the previous
    /// correction wins, so the agent does not flip between sides. Returns `true`
    /// when the heading was rotated; `false` leaves the agent facing the waypoint.
    pub fn adjust_move_by_path_move(&mut self, agent: &mut MoveAgentInfo, path: &mut NavPathMoveInfo) -> bool {
        let eps = self.tolerances.epsilon;
        let direction = loop {
            let Some(target) = path.target() else {
                path.clear();
                return false;
            };
            let offset = target - agent.position;
            let distance = offset.length();
            if distance > eps {
                break offset / distance;
            }
            path.remove_last_point();
            path.reset_adjustment();
        };

        agent.direction = direction;
        self.move_block.clear();
        let last_direction = if path.last_adjust_angle != 0.0 {
            path.last_move_direction
        } else {
            direction
        };
        self.build_move_direction_range(agent, last_direction);

        let left = self.move_block.left_min_angle();
        let right = self.move_block.right_min_angle();
        let mut adjust = right;
        let use_right = right < BLOCKED_TURN_DEG
            && (path.last_adjust_angle + left).abs() >= (path.last_adjust_angle - right).abs();
        if !use_right {
            adjust = -left;
        }

        let magnitude = adjust.abs();
        if magnitude <= eps {
            path.last_adjust_angle = 0.0;
            path.has_adjust_direction = false;
            return false;
        }
        if magnitude > BLOCKED_TURN_DEG {
            return false;
        }
        path.last_adjust_angle = adjust;
        path.has_adjust_direction = true;
        agent.direction = rotate_deg(agent.direction, adjust);
        path.last_move_direction = agent.direction;
        true
    }

    fn build_move_direction_range(&mut self, agent: &MoveAgentInfo, last_direction: Vec2) {
        let tol = self.tolerances;
        let sd = self.map.sample(agent.position);
        if sd < agent.radius + agent.move_distance {
            let toward_wall = -self.map.gradient(agent.position).normalize_or_zero();
            if toward_wall != Vec2::ZERO {
                let angle = signed_angle_deg(agent.direction, toward_wall);
                self.move_block.add_angle(angle, tol.contact_block_deg);
            }
        }

        for neighbor in &self.neighbors {
            if neighbor.distance <= tol.epsilon {
                continue;
            }
            if (agent.radius - neighbor.radius).abs() > neighbor.distance {
                continue;
            }
            let in_front = agent.direction.dot(neighbor.direction) > tol.epsilon
                || last_direction.dot(neighbor.direction) > tol.epsilon;
            let reach = tol.space_to_neighbor
                + neighbor.move_distance
                + agent.move_distance
                + neighbor.radius
                + agent.radius;
            if !in_front && reach < neighbor.distance {
                continue;
            }
            let angle = signed_angle_deg(agent.direction, neighbor.direction);
            if neighbor.distance <= reach {
                self.move_block.add_angle(angle, tol.close_neighbor_block_deg);
            } else {
                let half_width = (reach / neighbor.distance).asin().to_degrees();
                self.move_block.add_angle(angle, half_width);
            }
        }
    }
}
