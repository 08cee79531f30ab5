use super::error::{SdfError, SdfResult};
use super::map::SdfMap;

/// A rectangular patch of quantized distances stamped onto the base map.
///
/// The patch shares the base map's scale and is placed with its `(0, 0)` cell
/// at grid cell `(x, y)`. The patch size and its data are fixed at
/// construction so `data.len() == width * height` always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicObstacle {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub active: bool,
    width: i32,
    height: i32,
    data: Vec<i16>,
}

impl DynamicObstacle {
    pub fn new(name: String, width: i32, height: i32, x: i32, y: i32, data: Vec<i16>) -> SdfResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SdfError::InvalidDimensions { width, height });
        }
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(SdfError::DataLength {
                expected,
                actual: data.len() as i64,
            });
        }
        Ok(Self {
            name,
            x,
            y,
            active: true,
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn data(&self) -> &[i16] {
        &self.data
    }

    /// Value in patch-local coordinates. Outside the patch the obstacle imposes
    /// nothing, so this reads as infinite clearance (`i16::MAX`).
    pub fn cell(&self, x: i32, y: i32) -> i16 {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return i16::MAX;
        }
        self.data[(x + y * self.width) as usize]
    }

    /// Combines this obstacle with the base value `sd` at map cell `(x, y)`.
    pub fn merge(&self, x: i32, y: i32, sd: i16) -> i16 {
        self.cell(x - self.x, y - self.y).min(sd)
    }
}

/// Base map plus the dynamic obstacles that can be toggled on top of it.
#[derive(Clone, Debug, PartialEq)]
pub struct SdfScene {
    pub map: SdfMap,
    pub obstacles: Vec<DynamicObstacle>,
}

impl SdfScene {
    pub fn new(map: SdfMap) -> Self {
        Self {
            map,
            obstacles: Vec::new(),
        }
    }

    /// Enables or disables every obstacle called `name`. Returns whether any matched.
    pub fn set_active(&mut self, name: &str, active: bool) -> bool {
        let mut found = false;
        for obstacle in self.obstacles.iter_mut().filter(|o| o.name == name) {
            obstacle.active = active;
            found = true;
        }
        found
    }

    /// Base map with every active obstacle merged in by per-cell minimum.
    pub fn compose(&self) -> SdfMap {
        let mut composed = self.map.clone();
        let width = composed.width();
        let height = composed.height();
        let data = composed.data_mut();
        for obstacle in self.obstacles.iter().filter(|o| o.active) {
            let x0 = obstacle.x.max(0);
            let y0 = obstacle.y.max(0);
            let x1 = (obstacle.x + obstacle.width).min(width);
            let y1 = (obstacle.y + obstacle.height).min(height);
            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = (x + y * width) as usize;
                    data[idx] = obstacle.merge(x, y, data[idx]);
                }
            }
        }
        composed
    }
}
