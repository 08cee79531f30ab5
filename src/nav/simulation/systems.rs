use bevy::prelude::*;
use rustc_hash::FxHashMap;
use sdfnav_macros::profile;

use crate::nav::config::NavConfig;
use crate::nav::context::{MovePhase, NavContext};
use crate::nav::spatial_hash::SpatialHash;
use crate::nav::steering::{MoveAgentInfo, NeighborAgentInfo};

use super::components::*;
use super::events::*;
use super::resources::*;

// ============================================================================
// Tick Bookkeeping
// ============================================================================

pub fn begin_tick(mut stats: ResMut<NavStats>) {
    *stats = NavStats::default();
}

pub fn advance_tick(mut tick: ResMut<NavTick>, stats: Res<NavStats>) {
    if tick.0 % 100 == 0 {
        debug!(
            "[NAV STATUS] Tick: {} | Requests: {} | Failed: {} | Moved: {} | Capped: {} | Arrived: {} | Neighbor pairs: {}",
            tick.0,
            stats.path_requests,
            stats.path_failures,
            stats.moved,
            stats.capped,
            stats.arrived,
            stats.neighbor_pairs
        );
    }
    tick.increment();
}

/// Re-anchors the spatial hash whenever a different context is installed.
pub fn sync_spatial_hash(
    ctx: Res<NavContext>,
    config: Res<NavConfig>,
    mut hash: ResMut<SpatialHash>,
    mut current: Local<Option<u64>>,
) {
    if *current == Some(ctx.generation()) {
        return;
    }
    *current = Some(ctx.generation());

    let map = ctx.map();
    let width = map.width() as f32 * map.grain();
    let height = map.height() as f32 * map.grain();
    *hash = SpatialHash::new(map.origin(), width, height, config.spatial_cell_size);
    info!(
        "[NAV] Spatial hash rebuilt: {}x{} cells of {} for a {}x{} map",
        hash.cols(),
        hash.rows(),
        hash.cell_size(),
        map.width(),
        map.height()
    );
}

// ============================================================================
// Path Requests
// ============================================================================

/// Plans paths for this tick's requests. The last request per entity wins.
#[profile(4)]
pub fn process_path_requests(
    mut ctx: ResMut<NavContext>,
    mut requests: MessageReader<PathRequest>,
    mut failures: MessageWriter<PathFailed>,
    mut agents: Query<(&NavAgent, &NavPosition, &mut NavPath)>,
    mut stats: ResMut<NavStats>,
) {
    let mut latest: FxHashMap<Entity, Vec2> = FxHashMap::default();
    for request in requests.read() {
        latest.insert(request.entity, request.goal);
    }
    if latest.is_empty() {
        return;
    }

    // Hash order is not stable across runs
    let mut pending: Vec<(Entity, Vec2)> = latest.into_iter().collect();
    pending.sort_by_key(|(entity, _)| *entity);

    for (entity, goal) in pending {
        let Ok((agent, position, mut path)) = agents.get_mut(entity) else {
            warn!("[PATHFINDING] Path request for {:?} which is not a nav agent", entity);
            continue;
        };
        stats.path_requests += 1;
        if !ctx.find_path(position.0, goal, agent.radius, &mut path.0) {
            warn!(
                "[PATHFINDING] No path for {:?} from {:?} to {:?}",
                entity, position.0, goal
            );
            stats.path_failures += 1;
            failures.write(PathFailed { entity, goal });
        }
    }
}

// ============================================================================
// Neighbor Gathering
// ============================================================================

/// Rebuilds the spatial hash and every agent's sorted neighbor list.
///
/// The query radius covers the agent's avoidance range plus this tick's
/// travel, so anything the agent could touch before the next rebuild is seen.
#[profile(4)]
pub fn build_neighbor_lists(
    config: Res<NavConfig>,
    mut hash: ResMut<SpatialHash>,
    others: Query<(Entity, &NavAgent, &NavPosition, &NavHeading)>,
    mut agents: Query<(Entity, &NavAgent, &NavPosition, &mut NavNeighbors)>,
    mut found: Local<Vec<(Entity, Vec2)>>,
    mut stats: ResMut<NavStats>,
) {
    hash.clear();
    for (entity, _, position, _) in others.iter() {
        hash.insert(entity, position.0);
    }

    let dt = config.tick_seconds();
    for (entity, agent, position, mut neighbors) in agents.iter_mut() {
        let range = agent.radius * config.neighbor_radius_multiplier + agent.speed * dt;
        hash.query_radius(entity, position.0, range, &mut found);

        neighbors.0.clear();
        for &(other, other_position) in found.iter() {
            let Ok((_, other_agent, _, heading)) = others.get(other) else {
                continue;
            };
            neighbors.0.push(NeighborAgentInfo::from_positions(
                other.to_bits(),
                position.0,
                other_position,
                other_agent.radius,
                heading.direction,
                heading.last_move,
            ));
        }
        neighbors
            .0
            .sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        neighbors.0.truncate(config.max_neighbors);
        stats.neighbor_pairs += neighbors.0.len();
    }
}

// ============================================================================
// Steering
// ============================================================================

/// Steps every agent with a path one tick along it.
///
/// Agents move one after another. Neighbors that already moved this tick are
/// seen at their new position, so the swept capping never lets two disks
/// overlap.
#[profile(8)]
pub fn steer_agents(
    mut ctx: ResMut<NavContext>,
    config: Res<NavConfig>,
    mut agents: Query<(Entity, &NavAgent, &mut NavPosition, &mut NavPath, &mut NavHeading, &NavNeighbors)>,
    mut arrivals: MessageWriter<AgentArrived>,
    mut stats: ResMut<NavStats>,
    mut moved: Local<FxHashMap<u64, Vec2>>,
    #[cfg_attr(not(feature = "perf_stats"), allow(unused_variables))] tick: Res<NavTick>,
) {
    use crate::profile_log;

    moved.clear();
    let dt = config.tick_seconds();
    for (entity, agent, mut position, mut path, mut heading, neighbors) in agents.iter_mut() {
        if path.0.has_finished() {
            heading.last_move = 0.0;
            continue;
        }

        let here = position.0;
        ctx.set_neighbors(neighbors.0.iter().map(|n| match moved.get(&n.id) {
            Some(&now) => NeighborAgentInfo::from_positions(n.id, here, now, n.radius, n.move_direction, n.move_distance),
            None => *n,
        }));
        let mut info = MoveAgentInfo::new(position.0, agent.radius, heading.direction, agent.speed * dt);
        let report = ctx.step_agent(&mut info, &mut path.0, dt);

        match report.phase {
            MovePhase::Committed => {
                position.0 = report.position;
                heading.direction = report.direction;
                heading.last_move = report.distance;
                moved.insert(entity.to_bits(), report.position);
                stats.moved += 1;
            }
            MovePhase::MoveCapped => {
                heading.last_move = 0.0;
                stats.capped += 1;
            }
            MovePhase::SteeringComputed | MovePhase::Idle => {
                heading.last_move = 0.0;
            }
        }

        if report.arrived {
            path.0.clear();
            stats.arrived += 1;
            arrivals.write(AgentArrived {
                entity,
                position: position.0,
            });
        }
    }
    ctx.clear();

    profile_log!(tick, "[NAV] Steered {} agents, {} capped", stats.moved, stats.capped);
}
