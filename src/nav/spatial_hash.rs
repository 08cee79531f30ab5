use bevy::prelude::*;

/// Uniform grid over the navigation map for neighbor queries.
///
/// Agents are bucketed by the cell containing their center. A radius query
/// only visits the cells overlapping the query disk, so building every
/// agent's neighbor list stays close to linear in the agent count.
///
/// # Example
///
/// ```rust
/// use bevy::math::Vec2;
/// use bevy::prelude::Entity;
/// use sdfnav::nav::spatial_hash::SpatialHash;
///
/// let mut hash = SpatialHash::new(Vec2::ZERO, 100.0, 100.0, 4.0);
/// let entity = Entity::PLACEHOLDER;
/// hash.insert(entity, Vec2::new(10.0, 20.0));
///
/// // The querying entity is excluded from its own results
/// let mut nearby = Vec::new();
/// hash.query_radius(entity, Vec2::new(10.0, 20.0), 5.0, &mut nearby);
/// assert!(nearby.is_empty());
/// ```
///
/// # Performance
///
/// - **Insert:** O(1) amortized
/// - **Query:** O(k) where k = entries in the overlapped cells
/// - **Clear:** O(cells), keeps every cell's allocation
///
/// # Implementation Notes
///
/// - The grid is anchored at the map origin (bottom-left corner)
/// - Positions outside the grid are clamped into the border cells
/// - Cells use `Vec` rather than `HashSet` for cache locality
#[derive(Resource, Debug)]
pub struct SpatialHash {
    origin: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<(Entity, Vec2)>>,
}

impl SpatialHash {
    pub fn new(origin: Vec2, width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(f32::EPSILON);
        let cols = (width.max(0.0) / cell_size).ceil() as usize + 1;
        let rows = (height.max(0.0) / cell_size).ceil() as usize + 1;
        Self {
            origin,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    /// Rebuilds the grid for new map bounds. All entries are dropped.
    pub fn resize(&mut self, origin: Vec2, width: f32, height: f32) {
        *self = Self::new(origin, width, height, self.cell_size);
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn total_entries(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn non_empty_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let local = (pos - self.origin) / self.cell_size;
        let col = (local.x.floor().max(0.0) as usize).min(self.cols - 1);
        let row = (local.y.floor().max(0.0) as usize).min(self.rows - 1);
        (col, row)
    }

    pub fn insert(&mut self, entity: Entity, pos: Vec2) {
        let (col, row) = self.cell_coords(pos);
        self.cells[row * self.cols + col].push((entity, pos));
    }

    /// Collects every entry within `radius` of `pos` into `out`, skipping `exclude`.
    ///
    /// `out` is cleared first so callers can reuse one buffer for every query.
    pub fn query_radius(&self, exclude: Entity, pos: Vec2, radius: f32, out: &mut Vec<(Entity, Vec2)>) {
        out.clear();
        let (min_col, min_row) = self.cell_coords(pos - Vec2::splat(radius));
        let (max_col, max_row) = self.cell_coords(pos + Vec2::splat(radius));
        let radius_sq = radius * radius;

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                for &(entity, other) in &self.cells[row * self.cols + col] {
                    if entity != exclude && other.distance_squared(pos) <= radius_sq {
                        out.push((entity, other));
                    }
                }
            }
        }
    }
}
