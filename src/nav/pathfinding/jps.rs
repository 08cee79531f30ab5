//! Jump point search.
//!
//! Diagonal steps only need the destination cell to be walkable, matching
//! [`GridAStar`](super::GridAStar). Each expanded node scans straight lines in
//! the directions of its mask and only registers the first jump point found
//! on each line.

use super::finder::{SearchSpace, SearchStrategy};
use super::types::{Direction, DirectionMask, NO_DIRECTIONS};
use crate::nav::sdf::{GridLocation, SdfMap};

#[derive(Clone, Copy, Debug, Default)]
pub struct JumpPointSearch;

impl SearchStrategy for JumpPointSearch {
    fn search(&mut self, space: &mut SearchSpace, map: &SdfMap) -> bool {
        while let Some(idx) = space.pop() {
            let node = *space.node(idx);
            if space.is_goal(node.location) {
                return true;
            }
            for dir in Direction::ALL {
                if node.dirs & dir.mask() != 0 {
                    scan(space, map, idx, dir);
                }
            }
        }
        false
    }
}

/// Walks from the node at `from` along `dir` until a wall, a closed cell that
/// already scanned this direction, or a jump point.
fn scan(space: &mut SearchSpace, map: &SdfMap, from: u32, dir: Direction) {
    let origin = *space.node(from);
    let (dx, dy) = dir.delta();
    let step_cost = dir.step_cost();
    let mut loc = origin.location;
    let mut steps = 0;

    loop {
        loc = map.offset(loc, dx, dy);
        steps += 1;
        if !space.is_walkable(map, loc) {
            return;
        }
        let closed = space.is_closed(loc);
        if closed && space.node(loc.index as u32).dirs & dir.mask() != 0 {
            return;
        }
        if let Some(dirs) = jump_directions(space, map, loc, dx, dy) {
            if !closed {
                space.visit(loc, from, origin.g + steps * step_cost, dirs);
            }
            return;
        }
    }
}

/// Directions to expand if `loc`, entered along `(dx, dy)`, is a jump point.
fn jump_directions(space: &SearchSpace, map: &SdfMap, loc: GridLocation, dx: i32, dy: i32) -> Option<DirectionMask> {
    let Some(dir) = Direction::from_delta(dx, dy) else {
        return None;
    };
    if space.is_goal(loc) {
        return Some(dir.mask());
    }
    if !dir.is_diagonal() {
        let forced = forced_directions(space, map, loc, dx, dy);
        return (forced != NO_DIRECTIONS).then_some(dir.mask() | forced);
    }

    let natural = dir.mask() | direction_bit(dx, 0) | direction_bit(0, dy);
    // The two cardinal rules together cover the diagonal forced neighbors.
    let forced = forced_directions(space, map, loc, dx, 0) | forced_directions(space, map, loc, 0, dy);
    if forced != NO_DIRECTIONS {
        return Some(natural | forced);
    }
    if line_has_jump_point(space, map, loc, dx, 0) || line_has_jump_point(space, map, loc, 0, dy) {
        return Some(natural);
    }
    None
}

/// Forced diagonal neighbors of `loc` when entered along the cardinal `(dx, dy)`:
/// a blocked side cell whose forward diagonal is open.
fn forced_directions(space: &SearchSpace, map: &SdfMap, loc: GridLocation, dx: i32, dy: i32) -> DirectionMask {
    let mut forced = NO_DIRECTIONS;
    for side in [1, -1] {
        let (sx, sy) = if dx != 0 { (0, side) } else { (side, 0) };
        let blocked = !space.is_walkable(map, map.offset(loc, sx, sy));
        if blocked && space.is_walkable(map, map.offset(loc, dx + sx, dy + sy)) {
            forced |= direction_bit(dx + sx, dy + sy);
        }
    }
    forced
}

/// Whether a cardinal scan from `loc` (exclusive) reaches the goal or a forced cell.
fn line_has_jump_point(space: &SearchSpace, map: &SdfMap, loc: GridLocation, dx: i32, dy: i32) -> bool {
    let mut cell = loc;
    loop {
        cell = map.offset(cell, dx, dy);
        if !space.is_walkable(map, cell) {
            return false;
        }
        if space.is_goal(cell) || forced_directions(space, map, cell, dx, dy) != NO_DIRECTIONS {
            return true;
        }
    }
}

#[inline]
fn direction_bit(dx: i32, dy: i32) -> DirectionMask {
    Direction::from_delta(dx, dy).map_or(NO_DIRECTIONS, Direction::mask)
}
