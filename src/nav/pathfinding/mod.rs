mod astar;
mod finder;
mod heap;
mod jps;
mod types;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use astar::GridAStar;
pub use finder::{PathFinder, SearchSpace, SearchStrategy};
pub use jps::JumpPointSearch;
pub use types::{
    Direction, DirectionMask, Heuristic, PathNode, ALL_DIRECTIONS, DIAGONAL_COST, NO_DIRECTIONS,
    ORTHOGONAL_COST,
};
