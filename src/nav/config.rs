use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::nav::pathfinding::Heuristic;

pub const DEFAULT_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Which local avoidance strategy turns a desired heading into a collision-free move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvoidanceMode {
    /// Angular interval blocking against neighbors and the SDF gradient.
    #[default]
    DirectionBlocking,
    /// Reciprocal velocity obstacles solved with a 2D linear program.
    Orca,
}

/// Navigation configuration loaded once at startup.
///
/// Every hand-tuned tolerance used by the SDF queries, the path finder and the
/// steering layer lives here so it can be adjusted from `nav_config.ron`
/// instead of being buried as a literal.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    pub tick_rate: f64,

    // SDF queries
    pub epsilon: f32,
    pub min_step: f32,
    pub straight_move_tolerance: f32,
    /// Central difference offset for gradients. Zero means one grain.
    pub gradient_offset: f32,
    pub rescue_iterations: usize,
    pub disk_cast_max_steps: usize,

    // Path finding
    pub walk_radius_shrink: f32,
    pub heuristic: Heuristic,

    // Local steering
    pub avoidance: AvoidanceMode,
    pub slide_margin: f32,
    pub space_to_neighbor: f32,
    pub close_neighbor_block_deg: f32,
    pub contact_block_deg: f32,
    pub max_neighbor_turn_deg: f32,

    // ORCA
    pub orca_time_horizon: f32,
    pub orca_obstacle_time_horizon: f32,

    // Neighbor gathering
    pub neighbor_radius_multiplier: f32,
    pub max_neighbors: usize,
    pub spatial_cell_size: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            epsilon: 1e-5,
            min_step: 0.01,
            straight_move_tolerance: 0.0,
            gradient_offset: 0.0,
            rescue_iterations: 16,
            disk_cast_max_steps: 256,
            walk_radius_shrink: 0.01,
            heuristic: Heuristic::Octile,
            avoidance: AvoidanceMode::DirectionBlocking,
            slide_margin: 0.001,
            space_to_neighbor: 0.0,
            close_neighbor_block_deg: 95.0,
            contact_block_deg: 90.0,
            max_neighbor_turn_deg: 90.0,
            orca_time_horizon: 2.0,
            orca_obstacle_time_horizon: 1.0,
            neighbor_radius_multiplier: 4.0,
            max_neighbors: 16,
            spatial_cell_size: 4.0,
        }
    }
}

impl NavConfig {
    pub fn tolerances(&self) -> NavTolerances {
        NavTolerances {
            epsilon: self.epsilon,
            min_step: self.min_step,
            straight_move_tolerance: self.straight_move_tolerance,
            gradient_offset: self.gradient_offset,
            rescue_iterations: self.rescue_iterations,
            disk_cast_max_steps: self.disk_cast_max_steps,
            walk_radius_shrink: self.walk_radius_shrink,
            heuristic: self.heuristic,
            avoidance: self.avoidance,
            slide_margin: self.slide_margin,
            space_to_neighbor: self.space_to_neighbor,
            close_neighbor_block_deg: self.close_neighbor_block_deg,
            contact_block_deg: self.contact_block_deg,
            max_neighbor_turn_deg: self.max_neighbor_turn_deg,
            orca_time_horizon: self.orca_time_horizon,
            orca_obstacle_time_horizon: self.orca_obstacle_time_horizon,
        }
    }

    pub fn tick_seconds(&self) -> f32 {
        (1.0 / self.tick_rate) as f32
    }
}

/// Plain-data subset of [`NavConfig`] handed to the navigation core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavTolerances {
    pub epsilon: f32,
    pub min_step: f32,
    pub straight_move_tolerance: f32,
    pub gradient_offset: f32,
    pub rescue_iterations: usize,
    pub disk_cast_max_steps: usize,
    pub walk_radius_shrink: f32,
    pub heuristic: Heuristic,
    pub avoidance: AvoidanceMode,
    pub slide_margin: f32,
    pub space_to_neighbor: f32,
    pub close_neighbor_block_deg: f32,
    pub contact_block_deg: f32,
    pub max_neighbor_turn_deg: f32,
    pub orca_time_horizon: f32,
    pub orca_obstacle_time_horizon: f32,
}

impl Default for NavTolerances {
    fn default() -> Self {
        NavConfig::default().tolerances()
    }
}

/// Reads a [`NavConfig`] from a RON file, falling back to defaults on any failure.
pub fn load_nav_config(path: &str) -> NavConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match ron::from_str::<NavConfig>(&contents) {
            Ok(config) => {
                info!("[CONFIG] Loaded navigation config from {}", path);
                config
            }
            Err(e) => {
                error!("[CONFIG] Failed to parse {}: {}", path, e);
                error!("[CONFIG] Using default NavConfig");
                NavConfig::default()
            }
        },
        Err(e) => {
            error!("[CONFIG] Failed to read {}: {}", path, e);
            error!("[CONFIG] Using default NavConfig");
            NavConfig::default()
        }
    }
}
