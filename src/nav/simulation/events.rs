/// Messages exchanged with the navigation systems.
///
/// Requests come in from gameplay code; failures and arrivals go back out.

use bevy::prelude::*;

// ============================================================================
// Requests
// ============================================================================

/// Plan a new path for `entity` toward `goal`.
///
/// Several requests for the same entity within one tick collapse to the last one.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq)]
pub struct PathRequest {
    pub entity: Entity,
    pub goal: Vec2,
}

// ============================================================================
// Notifications
// ============================================================================

/// No path exists from the agent's position to `goal`.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq)]
pub struct PathFailed {
    pub entity: Entity,
    pub goal: Vec2,
}

/// The agent consumed its final waypoint.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq)]
pub struct AgentArrived {
    pub entity: Entity,
    pub position: Vec2,
}
