//! Optimal reciprocal collision avoidance.
//!
//! Each agent turns its neighbors and nearby obstacle edges into half-plane
//! constraints on its velocity ([`Line`]), then picks the velocity closest to
//! its preferred one that satisfies them all with [`compute_new_velocity`].
//!
//! # Usage
//!
//! ```rust
//! use bevy::math::Vec2;
//! use sdfnav::nav::orca::{compute_agent, compute_new_velocity, OrcaAgent};
//!
//! let mut lines = Vec::new();
//! let mut scratch = Vec::new();
//! let other = OrcaAgent { position: Vec2::new(3.0, 0.0), velocity: Vec2::new(-1.0, 0.0), radius: 0.5 };
//! compute_agent(Vec2::ZERO, 0.5, 2.0, 0.1, Vec2::X, &[other], &mut lines);
//! let velocity = compute_new_velocity(&lines, 0, &mut scratch, 1.0, Vec2::X);
//! assert!(velocity.length() <= 1.0 + 1e-5);
//! ```

mod line;
mod linear_program;
mod obstacle;
mod solver;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use line::{Line, OrcaAgent};
pub use obstacle::{dist_sq_point_segment, left_of, ObstacleSet, ObstacleVertex};
pub use solver::{compute_agent, compute_new_velocity, compute_obstacle};
