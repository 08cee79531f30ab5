use serde::{Deserialize, Serialize};

use crate::nav::sdf::GridLocation;

/// Cost of one orthogonal grid step.
pub const ORTHOGONAL_COST: i32 = 10;
/// Cost of one diagonal grid step (integer approximation of 10 * sqrt(2)).
pub const DIAGONAL_COST: i32 = 14;

/// Bit set of [`Direction`]s.
pub type DirectionMask = u8;
pub const NO_DIRECTIONS: DirectionMask = 0;
pub const ALL_DIRECTIONS: DirectionMask = 0xff;

pub(crate) const NO_PARENT: u32 = u32::MAX;

/// The eight compass directions on the grid. North is +y.
///
/// The repr(u8) doubles as the bit position inside a [`DirectionMask`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthEast = 6,
    SouthWest = 7,
}

impl Direction {
    #[inline]
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// All eight directions (cardinal first, then diagonal).
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    #[inline]
    pub fn mask(self) -> DirectionMask {
        1 << (self as u8)
    }

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (-1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        self as u8 >= Direction::NorthEast as u8
    }

    #[inline]
    pub fn step_cost(self) -> i32 {
        if self.is_diagonal() {
            DIAGONAL_COST
        } else {
            ORTHOGONAL_COST
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx.signum(), dy.signum()) {
            (0, 1) => Some(Direction::North),
            (0, -1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, 1) => Some(Direction::NorthEast),
            (-1, 1) => Some(Direction::NorthWest),
            (1, -1) => Some(Direction::SouthEast),
            (-1, -1) => Some(Direction::SouthWest),
            _ => None,
        }
    }
}

/// Distance estimate used to order the open set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// Exact cost on an empty grid under the 10/14 cost model.
    #[default]
    Octile,
    /// `(|dx| + |dy|) * 10`. Overestimates diagonal travel, so paths may not be optimal.
    Manhattan,
}

impl Heuristic {
    pub fn estimate(self, from: GridLocation, to: GridLocation) -> i32 {
        let dx = (from.x - to.x).abs();
        let dy = (from.y - to.y).abs();
        match self {
            Heuristic::Octile => {
                ORTHOGONAL_COST * dx.max(dy) + (DIAGONAL_COST - ORTHOGONAL_COST) * dx.min(dy)
            }
            Heuristic::Manhattan => ORTHOGONAL_COST * (dx + dy),
        }
    }
}

/// Search record for one grid cell. Lives in the per-cell arena of a
/// [`SearchSpace`](super::SearchSpace) and is only meaningful while its
/// generation matches the current search.
#[derive(Clone, Copy, Debug)]
pub struct PathNode {
    pub g: i32,
    pub h: i32,
    pub f: i32,
    pub location: GridLocation,
    pub(crate) parent: u32,
    /// Directions to scan when this node is expanded (jump point search only).
    pub dirs: DirectionMask,
    pub(crate) heap_pos: u32,
    pub(crate) generation: u32,
}

impl Default for PathNode {
    fn default() -> Self {
        Self {
            g: 0,
            h: 0,
            f: 0,
            location: GridLocation::INVALID,
            parent: NO_PARENT,
            dirs: NO_DIRECTIONS,
            heap_pos: u32::MAX,
            generation: 0,
        }
    }
}

impl PathNode {
    #[inline]
    pub fn parent(&self) -> Option<u32> {
        (self.parent != NO_PARENT).then_some(self.parent)
    }
}
