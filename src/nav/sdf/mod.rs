mod error;
mod io;
mod map;
mod queries;
mod scene;
pub mod shapes;
#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use error::{SdfError, SdfResult};
pub use io::{load_scene, read_compressed, save_scene, write_compressed};
pub use map::{GridLocation, SdfMap, SdfQueryParams, QUANT_MAX};
pub use scene::{DynamicObstacle, SdfScene};
