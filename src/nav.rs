//! Navigation over a quantized signed distance field.
//!
//! The core (`sdf`, `pathfinding`, `steering`, `orca`, `context`) is plain
//! Rust with no scheduling of its own. `simulation` drives it from Bevy's
//! `FixedUpdate` through [`NavigationPlugin`].

pub mod config;
pub mod context;
pub mod math;
pub mod orca;
pub mod pathfinding;
pub mod sdf;
pub mod simulation;
pub mod spatial_hash;
pub mod steering;

pub use config::{AvoidanceMode, NavConfig, NavTolerances};
pub use context::{MovePhase, NavContext, StepReport};
pub use simulation::{NavSet, NavigationPlugin};
