use bevy::math::Vec2;

use super::error::{SdfError, SdfResult};
use crate::nav::config::NavTolerances;

/// Largest quantized magnitude. `scale` maps this to the largest distance in the grid.
pub const QUANT_MAX: f32 = i16::MAX as f32;

/// Tunables for the sphere-traced queries on [`SdfMap`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SdfQueryParams {
    pub epsilon: f32,
    pub min_step: f32,
    pub straight_move_tolerance: f32,
    /// Zero selects one grain.
    pub gradient_offset: f32,
    pub rescue_iterations: usize,
    pub max_steps: usize,
}

impl Default for SdfQueryParams {
    fn default() -> Self {
        Self::from(&NavTolerances::default())
    }
}

impl From<&NavTolerances> for SdfQueryParams {
    fn from(tol: &NavTolerances) -> Self {
        Self {
            epsilon: tol.epsilon,
            min_step: tol.min_step,
            straight_move_tolerance: tol.straight_move_tolerance,
            gradient_offset: tol.gradient_offset,
            rescue_iterations: tol.rescue_iterations,
            max_steps: tol.disk_cast_max_steps,
        }
    }
}

/// A cell of the SDF grid. `index` is `-1` when the cell lies outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridLocation {
    pub x: i32,
    pub y: i32,
    pub index: i32,
}

impl GridLocation {
    pub const INVALID: GridLocation = GridLocation { x: -1, y: -1, index: -1 };

    #[inline]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        let index = if x >= 0 && x < width && y >= 0 && y < height {
            x + y * width
        } else {
            -1
        };
        Self { x, y, index }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.index >= 0
    }
}

/// Quantized signed distance grid.
///
/// Grid point `(x, y)` sits at `origin + (x, y) * grain` and stores
/// `distance / scale` as an `i16`. Negative values are inside obstacles.
///
/// Two accessors exist with different out-of-range behavior:
/// - [`SdfMap::cell`] checks both axes and returns `i16::MIN` (solid) outside the grid.
/// - [`SdfMap::distance_at`] only checks the flat index, so `x == width` silently
///   wraps to the first cell of the next row. Only the flat range maps to solid.
///
/// The solid sentinel is `i16::MIN * scale`, which is only slightly beyond the
/// map's largest stored distance in magnitude. It is not an absolute
/// very-negative value, so compare against [`SdfMap::solid_distance`].
#[derive(Clone, Debug, PartialEq)]
pub struct SdfMap {
    width: i32,
    height: i32,
    grain: f32,
    scale: f32,
    origin: Vec2,
    data: Vec<i16>,
    pub(crate) params: SdfQueryParams,
}

impl SdfMap {
    pub fn new(
        width: i32,
        height: i32,
        grain: f32,
        scale: f32,
        origin: Vec2,
        data: Vec<i16>,
    ) -> SdfResult<Self> {
        validate_header(width, height, grain, scale)?;
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(SdfError::DataLength {
                expected,
                actual: data.len() as i64,
            });
        }
        Ok(Self {
            width,
            height,
            grain,
            scale,
            origin,
            data,
            params: SdfQueryParams::default(),
        })
    }

    /// Quantizes real distances (row-major, `width * height` values).
    pub fn from_distances(
        width: i32,
        height: i32,
        grain: f32,
        origin: Vec2,
        distances: &[f32],
    ) -> SdfResult<Self> {
        let max_abs = distances.iter().fold(0.0f32, |m, d| m.max(d.abs()));
        let scale = if max_abs > 0.0 { max_abs / QUANT_MAX } else { 1.0 / QUANT_MAX };
        let data = distances
            .iter()
            .map(|d| (d / scale).round().clamp(-QUANT_MAX, QUANT_MAX) as i16)
            .collect();
        Self::new(width, height, grain, scale, origin, data)
    }

    /// Evaluates `distance` at every grid point and quantizes the result.
    pub fn from_fn(
        width: i32,
        height: i32,
        grain: f32,
        origin: Vec2,
        distance: impl Fn(Vec2) -> f32,
    ) -> SdfResult<Self> {
        validate_header(width, height, grain, 1.0)?;
        let mut distances = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                distances.push(distance(origin + Vec2::new(x as f32, y as f32) * grain));
            }
        }
        Self::from_distances(width, height, grain, origin, &distances)
    }

    pub fn with_params(mut self, params: SdfQueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &SdfQueryParams {
        &self.params
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn grain(&self) -> f32 {
        self.grain
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn data(&self) -> &[i16] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [i16] {
        &mut self.data
    }

    /// Quantized value at `(x, y)`, `i16::MIN` outside the grid.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> i16 {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return i16::MIN;
        }
        self.data[(x + y * self.width) as usize]
    }

    /// World distance at a flat index. Only the flat range is checked.
    #[inline]
    pub fn distance_at(&self, index: i32) -> f32 {
        if index < 0 || index as usize >= self.data.len() {
            return i16::MIN as f32 * self.scale;
        }
        self.data[index as usize] as f32 * self.scale
    }

    /// World distance at `(x, y)`, [`SdfMap::solid_distance`] outside the grid.
    #[inline]
    pub fn clearance(&self, x: i32, y: i32) -> f32 {
        self.cell(x, y) as f32 * self.scale
    }

    /// Distance reported for anything outside the grid footprint.
    #[inline]
    pub fn solid_distance(&self) -> f32 {
        i16::MIN as f32 * self.scale
    }

    /// Cell containing `point`, floored.
    pub fn locate(&self, point: Vec2) -> GridLocation {
        let g = (point - self.origin) / self.grain;
        if !g.is_finite() {
            return GridLocation::INVALID;
        }
        self.location(g.x.floor() as i32, g.y.floor() as i32)
    }

    #[inline]
    pub fn location(&self, x: i32, y: i32) -> GridLocation {
        GridLocation::new(x, y, self.width, self.height)
    }

    #[inline]
    pub fn offset(&self, loc: GridLocation, dx: i32, dy: i32) -> GridLocation {
        self.location(loc.x + dx, loc.y + dy)
    }

    #[inline]
    pub fn grid_to_world(&self, x: i32, y: i32) -> Vec2 {
        self.origin + Vec2::new(x as f32, y as f32) * self.grain
    }

    /// Whether `point` falls inside the sampled footprint.
    pub fn contains(&self, point: Vec2) -> bool {
        let g = (point - self.origin) / self.grain;
        g.x >= 0.0 && g.y >= 0.0 && g.x < self.width as f32 && g.y < self.height as f32
    }

    /// A cell is walkable for an agent when its stored clearance covers `walk_radius`.
    #[inline]
    pub fn is_walkable(&self, loc: GridLocation, walk_radius: f32) -> bool {
        loc.is_valid() && self.clearance(loc.x, loc.y) >= walk_radius
    }
}

pub(crate) fn validate_header(width: i32, height: i32, grain: f32, scale: f32) -> SdfResult<()> {
    if width <= 0 || height <= 0 || (width as i64) * (height as i64) > i32::MAX as i64 {
        return Err(SdfError::InvalidDimensions { width, height });
    }
    if !(grain > 0.0 && grain.is_finite()) {
        return Err(SdfError::InvalidGrain(grain));
    }
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(SdfError::InvalidScale(scale));
    }
    Ok(())
}
