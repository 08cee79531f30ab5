use bevy::prelude::*;

use crate::nav::context::NeighborList;
use crate::nav::steering::NavPathMoveInfo;

// ============================================================================
// Agent Components
// ============================================================================

/// A disk-shaped agent steered by the navigation systems.
///
/// Spawning `NavAgent` alone is enough; the remaining navigation components
/// are inserted with their defaults.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(NavPosition, NavPath, NavHeading, NavNeighbors)]
pub struct NavAgent {
    pub radius: f32,
    /// World units per second.
    pub speed: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            radius: 0.5,
            speed: 4.0,
        }
    }
}

/// Agent center in world space.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Deref, DerefMut)]
pub struct NavPosition(pub Vec2);

/// Reversed waypoint list and steering hysteresis.
#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
pub struct NavPath(pub NavPathMoveInfo);

/// Last committed heading and the distance travelled along it.
///
/// Neighbors read this to predict where the agent is going next tick.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct NavHeading {
    pub direction: Vec2,
    pub last_move: f32,
}

impl Default for NavHeading {
    fn default() -> Self {
        Self {
            direction: Vec2::X,
            last_move: 0.0,
        }
    }
}

/// Nearby agents gathered this tick, sorted by ascending distance.
#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
pub struct NavNeighbors(pub NeighborList);
