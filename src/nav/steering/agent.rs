use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// The moving agent for one steering call.
///
/// `direction` is the unit heading for this tick and `move_distance` the travel
/// budget along it. Steering operations rewrite both in place.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveAgentInfo {
    pub position: Vec2,
    pub radius: f32,
    pub direction: Vec2,
    pub move_distance: f32,
}

impl MoveAgentInfo {
    pub fn new(position: Vec2, radius: f32, direction: Vec2, move_distance: f32) -> Self {
        Self {
            position,
            radius,
            direction,
            move_distance,
        }
    }

    /// Where the agent ends up if it travels its whole budget.
    #[inline]
    pub fn projected(&self) -> Vec2 {
        self.position + self.direction * self.move_distance
    }
}

/// Snapshot of a nearby agent relative to the one being steered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborAgentInfo {
    pub id: u64,
    /// Unit vector from the steered agent toward this neighbor.
    pub direction: Vec2,
    pub radius: f32,
    /// Center distance.
    pub distance: f32,
    /// Unit heading the neighbor intends to move along this tick.
    pub move_direction: Vec2,
    pub move_distance: f32,
}

impl NeighborAgentInfo {
    /// Builds the snapshot from absolute positions. Coincident centers get a zero direction.
    pub fn from_positions(
        id: u64,
        agent_position: Vec2,
        position: Vec2,
        radius: f32,
        move_direction: Vec2,
        move_distance: f32,
    ) -> Self {
        let offset = position - agent_position;
        Self {
            id,
            direction: offset.normalize_or_zero(),
            radius,
            distance: offset.length(),
            move_direction,
            move_distance,
        }
    }

    /// Neighbor center in world space, given the steered agent's position.
    #[inline]
    pub fn position_from(&self, agent_position: Vec2) -> Vec2 {
        agent_position + self.direction * self.distance
    }

    #[inline]
    pub fn velocity(&self, dt: f32) -> Vec2 {
        if dt <= 0.0 {
            return Vec2::ZERO;
        }
        self.move_direction * (self.move_distance / dt)
    }
}

/// Path following state carried across ticks.
///
/// `path` is reversed: the destination is at index 0 and the next waypoint to
/// reach is the last element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavPathMoveInfo {
    pub path: Vec<Vec2>,
    /// Heading committed on the previous tick once a correction was applied.
    pub last_move_direction: Vec2,
    pub has_adjust_direction: bool,
    /// Signed correction applied last tick, in degrees. Zero when none.
    pub last_adjust_angle: f32,
}

impl NavPathMoveInfo {
    #[inline]
    pub fn has_finished(&self) -> bool {
        self.path.is_empty()
    }

    /// Next waypoint to walk toward.
    #[inline]
    pub fn target(&self) -> Option<Vec2> {
        self.path.last().copied()
    }

    /// Final waypoint of the path.
    #[inline]
    pub fn destination(&self) -> Option<Vec2> {
        self.path.first().copied()
    }

    /// Drops the waypoint currently walked toward. Steering hysteresis is kept.
    pub fn remove_last_point(&mut self) {
        self.path.pop();
    }

    pub fn reset_adjustment(&mut self) {
        self.last_move_direction = Vec2::ZERO;
        self.has_adjust_direction = false;
        self.last_adjust_angle = 0.0;
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.reset_adjustment();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_snapshot_from_positions() {
        let n = NeighborAgentInfo::from_positions(7, Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0), 0.5, Vec2::X, 0.1);
        assert_eq!(n.distance, 5.0);
        assert!((n.direction - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert!((n.position_from(Vec2::new(1.0, 1.0)) - Vec2::new(4.0, 5.0)).length() < 1e-5);
        assert_eq!(n.velocity(0.1), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn removing_waypoints_until_finished() {
        let mut info = NavPathMoveInfo {
            path: vec![Vec2::new(5.0, 5.0), Vec2::new(1.0, 0.0)],
            last_move_direction: Vec2::Y,
            has_adjust_direction: true,
            last_adjust_angle: 12.0,
        };
        assert_eq!(info.target(), Some(Vec2::new(1.0, 0.0)));
        info.remove_last_point();
        assert_eq!(info.target(), Some(Vec2::new(5.0, 5.0)));
        assert_eq!(info.destination(), Some(Vec2::new(5.0, 5.0)));
        assert!(info.has_adjust_direction, "hysteresis survives waypoint changes");
        info.remove_last_point();
        assert!(info.has_finished());
        info.clear();
        assert_eq!(info.last_adjust_angle, 0.0);
        assert_eq!(info.last_move_direction, Vec2::ZERO);
    }
}
