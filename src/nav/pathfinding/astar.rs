use super::finder::{SearchSpace, SearchStrategy};
use super::types::{Direction, NO_DIRECTIONS};
use crate::nav::sdf::SdfMap;

/// Plain 8-neighbor A* over the same walkability and cost model as jump point search.
///
/// Expands every cell it reaches, so it is mostly useful as a reference and on
/// small or cluttered grids where jumping buys little.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridAStar;

impl SearchStrategy for GridAStar {
    fn search(&mut self, space: &mut SearchSpace, map: &SdfMap) -> bool {
        while let Some(idx) = space.pop() {
            let current = *space.node(idx);
            if space.is_goal(current.location) {
                return true;
            }
            for dir in Direction::ALL {
                let (dx, dy) = dir.delta();
                let next = map.offset(current.location, dx, dy);
                if !space.is_walkable(map, next) || space.is_closed(next) {
                    continue;
                }
                space.visit(next, idx, current.g + dir.step_cost(), NO_DIRECTIONS);
            }
        }
        false
    }
}
