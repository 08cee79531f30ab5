use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use smallvec::SmallVec;

use crate::nav::config::{AvoidanceMode, NavTolerances};
use crate::nav::math::try_normalize;
use crate::nav::orca::{compute_agent, compute_new_velocity, compute_obstacle, Line, ObstacleSet, OrcaAgent};
use crate::nav::pathfinding::{JumpPointSearch, PathFinder};
use crate::nav::sdf::{SdfMap, SdfQueryParams};
use crate::nav::steering::{DirectionRange, MoveAgentInfo, NavPathMoveInfo, NeighborAgentInfo};

/// Neighbor scratch list. Crowds rarely exceed the inline capacity.
pub type NeighborList = SmallVec<[NeighborAgentInfo; 16]>;

/// Last phase an agent reached during [`NavContext::step_agent`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovePhase {
    /// No waypoint to walk toward.
    #[default]
    Idle,
    /// Steering left no travel budget.
    SteeringComputed,
    /// Collision capping stopped the agent in place.
    MoveCapped,
    /// The agent moved.
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub phase: MovePhase,
    pub position: Vec2,
    pub direction: Vec2,
    /// Distance actually travelled.
    pub distance: f32,
    /// The final waypoint was consumed this tick.
    pub arrived: bool,
}

impl StepReport {
    fn at(agent: &MoveAgentInfo, phase: MovePhase) -> Self {
        Self {
            phase,
            position: agent.position,
            direction: agent.direction,
            distance: 0.0,
            arrived: false,
        }
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Navigation state for one simulation: the map, its path finder and the
/// per-agent scratch reused for every steering call.
///
/// Steering is done one agent at a time: fill the neighbor list with
/// [`NavContext::set_neighbors`], then call the steering operations or
/// [`NavContext::step_agent`].
#[derive(Resource)]
pub struct NavContext {
    pub(crate) map: Arc<SdfMap>,
    pub(crate) move_block: DirectionRange,
    pub(crate) neighbors: NeighborList,
    pub(crate) path_finder: PathFinder<JumpPointSearch>,
    pub(crate) obstacles: ObstacleSet,
    pub(crate) obstacle_neighbors: Vec<usize>,
    pub(crate) orca_agents: Vec<OrcaAgent>,
    pub(crate) orca_lines: Vec<Line>,
    pub(crate) orca_projected: Vec<Line>,
    pub(crate) tolerances: NavTolerances,
    generation: u64,
}

impl NavContext {
    /// Takes ownership of `map`, applying the query tolerances to it.
    pub fn new(map: SdfMap, tolerances: NavTolerances) -> Self {
        let map = map.with_params(SdfQueryParams::from(&tolerances));
        Self::from_shared(Arc::new(map), tolerances)
    }

    /// Shares an existing map. Its own query parameters are kept.
    pub fn from_shared(map: Arc<SdfMap>, tolerances: NavTolerances) -> Self {
        let path_finder = PathFinder::new(Arc::clone(&map), &tolerances);
        Self {
            map,
            move_block: DirectionRange::default(),
            neighbors: NeighborList::new(),
            path_finder,
            obstacles: ObstacleSet::new(),
            obstacle_neighbors: Vec::new(),
            orca_agents: Vec::new(),
            orca_lines: Vec::new(),
            orca_projected: Vec::new(),
            tolerances,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn map(&self) -> &SdfMap {
        &self.map
    }

    pub fn shared_map(&self) -> &Arc<SdfMap> {
        &self.map
    }

    /// Unique per constructed context, so a replaced context is always told
    /// apart from the previous one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tolerances(&self) -> &NavTolerances {
        &self.tolerances
    }

    pub fn set_avoidance(&mut self, mode: AvoidanceMode) {
        self.tolerances.avoidance = mode;
    }

    pub fn move_block(&self) -> &DirectionRange {
        &self.move_block
    }

    pub fn neighbors(&self) -> &[NeighborAgentInfo] {
        &self.neighbors
    }

    /// Replaces the neighbor list, sorted by ascending distance.
    pub fn set_neighbors<I>(&mut self, neighbors: I)
    where
        I: IntoIterator<Item = NeighborAgentInfo>,
    {
        self.neighbors.clear();
        self.neighbors.extend(neighbors);
        self.neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    pub fn clear(&mut self) {
        self.move_block.clear();
        self.neighbors.clear();
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Static polygons seen by the ORCA avoidance mode.
    pub fn obstacles_mut(&mut self) -> &mut ObstacleSet {
        &mut self.obstacles
    }

    pub fn find_nearest_valid_point(&self, point: Vec2, radius: f32) -> Vec2 {
        self.map.find_nearest_valid_point(point, radius)
    }

    /// Moves a requested goal out of solid so a disk of `radius` can stand on it.
    pub fn resolve_destination(&self, destination: Vec2, radius: f32) -> Vec2 {
        if self.map.sample(destination) >= radius {
            return destination;
        }
        self.map.find_nearest_valid_point(destination, radius)
    }

    /// Plans a path and resets the path following state.
    ///
    /// Returns `false` with an empty path when the goal cannot be reached.
    pub fn find_path(&mut self, start: Vec2, end: Vec2, radius: f32, path: &mut NavPathMoveInfo) -> bool {
        path.clear();
        let end = self.resolve_destination(end, radius);
        self.path_finder.find(start, end, radius, &mut path.path)
    }

    /// Grid cost of the last path that needed a grid search.
    pub fn last_path_cost(&self) -> Option<i32> {
        self.path_finder.last_path_cost()
    }

    /// Advances one agent along its path for one tick.
    ///
    /// `agent.move_distance` is the travel budget for the tick. On return
    /// `agent` holds the committed position, heading and travelled distance.
    pub fn step_agent(&mut self, agent: &mut MoveAgentInfo, path: &mut NavPathMoveInfo, dt: f32) -> StepReport {
        let eps = self.tolerances.epsilon;
        let Some(destination) = path.destination() else {
            return StepReport::at(agent, MovePhase::Idle);
        };
        if agent.move_distance <= eps {
            return StepReport::at(agent, MovePhase::Idle);
        }

        let in_reach = destination.distance(agent.position) < agent.move_distance;
        self.optimize_path(agent, path);
        self.nav_destination_check(agent, path);

        if path.has_finished() {
            // occupied goal: stop where we are
            if !in_reach {
                let mut report = StepReport::at(agent, MovePhase::SteeringComputed);
                report.arrived = true;
                return report;
            }
            let offset = destination - agent.position;
            let Some(direction) = try_normalize(offset) else {
                let mut report = StepReport::at(agent, MovePhase::SteeringComputed);
                report.arrived = true;
                return report;
            };
            agent.direction = direction;
            agent.move_distance = agent.move_distance.min(offset.length());
        } else {
            match self.tolerances.avoidance {
                AvoidanceMode::DirectionBlocking => {
                    self.adjust_move_by_path_move(agent, path);
                }
                AvoidanceMode::Orca => {
                    if let Some(direction) = path.target().and_then(|t| try_normalize(t - agent.position)) {
                        agent.direction = direction;
                    }
                    self.avoid_with_orca(agent, dt);
                }
            }
            self.adjust_move_by_obstacle(agent);
        }
        let arrived = path.has_finished();

        if agent.move_distance <= eps {
            let mut report = StepReport::at(agent, MovePhase::SteeringComputed);
            report.arrived = arrived;
            return report;
        }

        let distance = self
            .collider_move_by_obstacle(agent)
            .min(self.collider_move_by_neighbor(agent))
            .max(0.0);
        agent.move_distance = distance;
        if distance <= eps {
            let mut report = StepReport::at(agent, MovePhase::MoveCapped);
            report.arrived = arrived;
            return report;
        }

        agent.position += agent.direction * distance;
        StepReport {
            phase: MovePhase::Committed,
            position: agent.position,
            direction: agent.direction,
            distance,
            arrived,
        }
    }

    /// Replaces the agent's heading and budget with the ORCA velocity for this tick.
    ///
    /// The preferred velocity is the current heading at full budget. Neighbors
    /// come from the neighbor list, obstacles from [`NavContext::obstacles_mut`].
    /// Returns `true` when the heading or distance changed.
    pub fn avoid_with_orca(&mut self, agent: &mut MoveAgentInfo, dt: f32) -> bool {
        let eps = self.tolerances.epsilon;
        if dt <= 0.0 || agent.move_distance <= eps {
            return false;
        }
        let max_speed = agent.move_distance / dt;
        let preferred = agent.direction * max_speed;

        self.orca_lines.clear();
        let range = self.tolerances.orca_obstacle_time_horizon * max_speed + agent.radius;
        self.obstacles
            .query_neighbors(agent.position, range, &mut self.obstacle_neighbors);
        compute_obstacle(
            agent.position,
            agent.radius,
            self.tolerances.orca_obstacle_time_horizon,
            preferred,
            &self.obstacles,
            &self.obstacle_neighbors,
            &mut self.orca_lines,
        );
        let num_obst_lines = self.orca_lines.len();

        let position = agent.position;
        self.orca_agents.clear();
        self.orca_agents.extend(self.neighbors.iter().map(|n| OrcaAgent {
            position: n.position_from(position),
            velocity: n.velocity(dt),
            radius: n.radius,
        }));
        compute_agent(
            agent.position,
            agent.radius,
            self.tolerances.orca_time_horizon,
            dt,
            preferred,
            &self.orca_agents,
            &mut self.orca_lines,
        );

        let velocity = compute_new_velocity(
            &self.orca_lines,
            num_obst_lines,
            &mut self.orca_projected,
            max_speed,
            preferred,
        );
        let before = *agent;
        let speed = velocity.length();
        if speed <= eps {
            agent.move_distance = 0.0;
        } else {
            agent.direction = velocity / speed;
            agent.move_distance = speed * dt;
        }
        (agent.direction - before.direction).length() > eps || (agent.move_distance - before.move_distance).abs() > eps
    }
}
