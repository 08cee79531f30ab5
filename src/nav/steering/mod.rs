mod agent;
mod direction_range;
mod local;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use agent::{MoveAgentInfo, NavPathMoveInfo, NeighborAgentInfo};
pub use direction_range::{AngleRange, DirectionRange};
