/// ECS layer driving the navigation core at a fixed tick rate.
///
/// This module is organized into:
/// - **components**: Agent components (position, path, heading, neighbor cache)
/// - **resources**: Tick counter and per-tick counters
/// - **events**: Path requests in, failures and arrivals out
/// - **systems**: Request processing, neighbor gathering and steering
///
/// Nothing runs until a [`NavContext`] resource is inserted; swapping it for
/// a new map re-anchors the spatial hash on the next tick.

use bevy::prelude::*;

use crate::nav::config::{load_nav_config, NavConfig, DEFAULT_CONFIG_PATH};
use crate::nav::context::NavContext;
use crate::nav::spatial_hash::SpatialHash;

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;


pub use components::*;
pub use events::*;
pub use resources::*;

/// Execution order within one navigation tick.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum NavSet {
    Setup,     // Map changes, counter reset
    Requests,  // Path planning for new goals
    Neighbors, // Spatial hash rebuild and neighbor lists
    Steering,  // Per-agent tick state machine
    Finish,    // Tick counter
}

/// Registers the navigation resources, messages and `FixedUpdate` systems.
///
/// With `config: None` the configuration is read from
/// [`DEFAULT_CONFIG_PATH`], falling back to defaults.
#[derive(Default)]
pub struct NavigationPlugin {
    pub config: Option<NavConfig>,
}

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => load_nav_config(DEFAULT_CONFIG_PATH),
        };

        app.insert_resource(Time::<Fixed>::from_hz(config.tick_rate));
        app.insert_resource(SpatialHash::new(Vec2::ZERO, 0.0, 0.0, config.spatial_cell_size));
        app.insert_resource(config);
        app.init_resource::<NavTick>();
        app.init_resource::<NavStats>();

        app.add_message::<PathRequest>();
        app.add_message::<PathFailed>();
        app.add_message::<AgentArrived>();

        app.configure_sets(
            FixedUpdate,
            (
                NavSet::Setup,
                NavSet::Requests,
                NavSet::Neighbors,
                NavSet::Steering,
                NavSet::Finish,
            )
                .chain()
                .run_if(resource_exists::<NavContext>),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::sync_spatial_hash.in_set(NavSet::Setup),
                systems::begin_tick.in_set(NavSet::Setup),
                systems::process_path_requests.in_set(NavSet::Requests),
                systems::build_neighbor_lists.in_set(NavSet::Neighbors),
                systems::steer_agents.in_set(NavSet::Steering),
                systems::advance_tick.in_set(NavSet::Finish),
            ),
        );
    }
}
