use bevy::math::Vec2;

/// Directed line bounding a half-plane of velocities. The feasible side is on
/// the left of `direction`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Line {
    pub point: Vec2,
    /// Unit length.
    pub direction: Vec2,
}

impl Line {
    pub fn new(point: Vec2, direction: Vec2) -> Self {
        Self { point, direction }
    }

    /// Signed distance of `velocity` into the infeasible side; positive means violated.
    #[inline]
    pub fn violation(&self, velocity: Vec2) -> f32 {
        crate::nav::math::cross(self.direction, self.point - velocity)
    }
}

/// Another agent as seen by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrcaAgent {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}
