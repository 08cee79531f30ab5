use std::sync::Arc;

use bevy::math::Vec2;
use fixedbitset::FixedBitSet;

use super::heap::OpenHeap;
use super::jps::JumpPointSearch;
use super::types::{DirectionMask, Heuristic, PathNode, ALL_DIRECTIONS, NO_PARENT};
use crate::nav::config::NavTolerances;
use crate::nav::sdf::{GridLocation, SdfMap};

/// Per-search state shared by every [`SearchStrategy`].
///
/// Open and closed membership are two bit sets; a cell is never in both.
/// Nodes live in an arena indexed by cell and are invalidated wholesale by
/// bumping `generation`, so no per-search allocation or clearing of the arena
/// is needed.
pub struct SearchSpace {
    width: i32,
    height: i32,
    nodes: Vec<PathNode>,
    generation: u32,
    open: FixedBitSet,
    closed: FixedBitSet,
    heap: OpenHeap,
    end: GridLocation,
    walk_radius: f32,
    heuristic: Heuristic,
}

impl SearchSpace {
    pub fn new(width: i32, height: i32, heuristic: Heuristic) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            nodes: vec![PathNode::default(); cells],
            generation: 0,
            open: FixedBitSet::with_capacity(cells),
            closed: FixedBitSet::with_capacity(cells),
            heap: OpenHeap::default(),
            end: GridLocation::INVALID,
            walk_radius: 0.0,
            heuristic,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn reset(&mut self, end: GridLocation, walk_radius: f32) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            for node in &mut self.nodes {
                node.generation = 0;
            }
            self.generation = 1;
        }
        self.open.clear();
        self.closed.clear();
        self.heap.clear();
        self.end = end;
        self.walk_radius = walk_radius;
    }

    #[inline]
    pub fn end(&self) -> GridLocation {
        self.end
    }

    #[inline]
    pub fn walk_radius(&self) -> f32 {
        self.walk_radius
    }

    #[inline]
    pub fn is_goal(&self, loc: GridLocation) -> bool {
        loc.index == self.end.index
    }

    #[inline]
    pub fn is_walkable(&self, map: &SdfMap, loc: GridLocation) -> bool {
        map.is_walkable(loc, self.walk_radius)
    }

    #[inline]
    pub fn is_open(&self, loc: GridLocation) -> bool {
        loc.is_valid() && self.open.contains(loc.index as usize)
    }

    #[inline]
    pub fn is_closed(&self, loc: GridLocation) -> bool {
        loc.is_valid() && self.closed.contains(loc.index as usize)
    }

    pub fn set_closed(&mut self, loc: GridLocation) {
        if loc.is_valid() {
            self.open.set(loc.index as usize, false);
            self.closed.insert(loc.index as usize);
        }
    }

    /// Node for a cell touched in the current search.
    #[inline]
    pub fn node(&self, idx: u32) -> &PathNode {
        &self.nodes[idx as usize]
    }

    #[inline]
    pub fn is_current(&self, idx: u32) -> bool {
        self.nodes[idx as usize].generation == self.generation
    }

    /// Records a path of cost `g` into `loc` coming from `parent`.
    ///
    /// Untested cells are initialized and pushed; open cells are relaxed when the
    /// new path is cheaper, merging `dirs` into the existing mask; closed cells
    /// are left alone. Returns whether the node changed.
    pub fn visit(&mut self, loc: GridLocation, parent: u32, g: i32, dirs: DirectionMask) -> bool {
        if !loc.is_valid() || self.is_closed(loc) {
            return false;
        }
        let idx = loc.index as u32;
        if self.is_open(loc) {
            let node = &mut self.nodes[idx as usize];
            if g >= node.g {
                return false;
            }
            node.g = g;
            node.f = g + node.h;
            node.parent = parent;
            node.dirs |= dirs;
            self.heap.decrease_key(&mut self.nodes, idx);
            return true;
        }

        let h = self.heuristic.estimate(loc, self.end);
        self.nodes[idx as usize] = PathNode {
            g,
            h,
            f: g + h,
            location: loc,
            parent,
            dirs,
            heap_pos: u32::MAX,
            generation: self.generation,
        };
        self.open.insert(idx as usize);
        self.heap.push(&mut self.nodes, idx);
        true
    }

    /// Removes the cheapest open node and closes it.
    pub fn pop(&mut self) -> Option<u32> {
        let idx = self.heap.pop(&mut self.nodes)?;
        let loc = self.nodes[idx as usize].location;
        self.set_closed(loc);
        Some(idx)
    }

    pub fn open_count(&self) -> usize {
        self.heap.len()
    }
}

/// A grid search over a prepared [`SearchSpace`].
///
/// The start node has already been opened with every direction set. The
/// strategy returns `true` once the goal node is expanded.
pub trait SearchStrategy {
    fn search(&mut self, space: &mut SearchSpace, map: &SdfMap) -> bool;
}

/// Grid path finder over an [`SdfMap`], parameterized by its search strategy.
///
/// Not reentrant: one search at a time per instance.
pub struct PathFinder<S: SearchStrategy = JumpPointSearch> {
    map: Arc<SdfMap>,
    space: SearchSpace,
    strategy: S,
    walk_radius_shrink: f32,
    epsilon: f32,
    last_cost: Option<i32>,
}

impl<S: SearchStrategy + Default> PathFinder<S> {
    pub fn new(map: Arc<SdfMap>, tolerances: &NavTolerances) -> Self {
        Self::with_strategy(map, tolerances, S::default())
    }
}

impl<S: SearchStrategy> PathFinder<S> {
    pub fn with_strategy(map: Arc<SdfMap>, tolerances: &NavTolerances, strategy: S) -> Self {
        let space = SearchSpace::new(map.width(), map.height(), tolerances.heuristic);
        Self {
            map,
            space,
            strategy,
            walk_radius_shrink: tolerances.walk_radius_shrink,
            epsilon: tolerances.epsilon,
            last_cost: None,
        }
    }

    pub fn map(&self) -> &Arc<SdfMap> {
        &self.map
    }

    /// Grid cost (10 per orthogonal step, 14 per diagonal) of the last searched path.
    ///
    /// `None` when the last call failed or took a straight-line shortcut.
    pub fn last_path_cost(&self) -> Option<i32> {
        self.last_cost
    }

    /// Finds a path from `start` to `end` for a disk of `radius`.
    ///
    /// On success `out` holds the path reversed: `end` first, `start` last, with
    /// grid points of the intermediate turns in between.
    pub fn find(&mut self, start: Vec2, end: Vec2, radius: f32, out: &mut Vec<Vec2>) -> bool {
        out.clear();
        self.last_cost = None;
        let map = Arc::clone(&self.map);

        if self.straight_line_reachable(start, end, radius) {
            out.push(end);
            out.push(start);
            return true;
        }

        let walk_radius = radius - self.walk_radius_shrink;
        let Some(start_loc) = snap_to_walkable(&map, map.locate(start), walk_radius) else {
            return false;
        };
        let Some(end_loc) = snap_to_walkable(&map, map.locate(end), walk_radius) else {
            return false;
        };
        if start_loc.index == end_loc.index {
            out.push(end);
            out.push(start);
            self.last_cost = Some(0);
            return true;
        }

        if self.search_cells(start_loc, end_loc, walk_radius).is_none() {
            return false;
        }

        let goal = self.space.node(end_loc.index as u32);
        out.push(end);
        let mut cursor = goal.parent();
        while let Some(idx) = cursor {
            let node = self.space.node(idx);
            let Some(parent) = node.parent() else {
                break;
            };
            out.push(map.grid_to_world(node.location.x, node.location.y));
            cursor = Some(parent);
        }
        out.push(start);
        true
    }

    /// Runs the grid search between two cells without any straight-line shortcut.
    ///
    /// Returns the path cost, also kept for [`PathFinder::last_path_cost`].
    pub fn search_cells(&mut self, start: GridLocation, end: GridLocation, walk_radius: f32) -> Option<i32> {
        self.last_cost = None;
        let map = &*self.map;
        if !map.is_walkable(start, walk_radius) || !map.is_walkable(end, walk_radius) {
            return None;
        }
        self.space.reset(end, walk_radius);
        self.space.visit(start, NO_PARENT, 0, ALL_DIRECTIONS);
        if !self.strategy.search(&mut self.space, map) {
            return None;
        }
        let cost = self.space.node(end.index as u32).g;
        self.last_cost = Some(cost);
        Some(cost)
    }

    fn straight_line_reachable(&self, start: Vec2, end: Vec2, radius: f32) -> bool {
        let map = &*self.map;
        let distance = start.distance(end);
        if distance <= self.epsilon {
            return true;
        }
        let start_room = map.sample(start) - radius;
        let end_room = map.sample(end) - radius;
        if (start_room > 0.0 && distance < start_room) || (end_room > 0.0 && distance < end_room) {
            return true;
        }
        map.check_straight_move(start, end, radius)
    }
}

/// Returns `loc` when walkable, else its walkable 8-neighbor with the most clearance.
fn snap_to_walkable(map: &SdfMap, loc: GridLocation, walk_radius: f32) -> Option<GridLocation> {
    if map.is_walkable(loc, walk_radius) {
        return Some(loc);
    }
    let mut best: Option<(GridLocation, f32)> = None;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let n = map.location(loc.x + dx, loc.y + dy);
            if !map.is_walkable(n, walk_radius) {
                continue;
            }
            let clearance = map.clearance(n.x, n.y);
            if best.map_or(true, |(_, c)| clearance > c) {
                best = Some((n, clearance));
            }
        }
    }
    best.map(|(n, _)| n)
}
