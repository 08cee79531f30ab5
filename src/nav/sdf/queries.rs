use bevy::math::Vec2;

use super::map::SdfMap;
use crate::nav::math::try_normalize;

impl SdfMap {
    /// Bilinear interpolation of the four grid points around `point`.
    ///
    /// Inside the footprint the upper neighbors are clamped to the last row and
    /// column, so the final half cell reads as a constant extension. Outside the
    /// footprint this returns [`SdfMap::solid_distance`].
    pub fn sample(&self, point: Vec2) -> f32 {
        if !self.contains(point) {
            return self.solid_distance();
        }
        let g = (point - self.origin()) / self.grain();
        let x = g.x.floor() as i32;
        let y = g.y.floor() as i32;
        let rx = g.x - x as f32;
        let ry = g.y - y as f32;
        let x1 = (x + 1).min(self.width() - 1);
        let y1 = (y + 1).min(self.height() - 1);

        // 2 3
        // 0 1
        let v0 = self.clearance(x, y);
        let v1 = self.clearance(x1, y);
        let v2 = self.clearance(x, y1);
        let v3 = self.clearance(x1, y1);

        (v0 * (1.0 - rx) + v1 * rx) * (1.0 - ry) + (v2 * (1.0 - rx) + v3 * rx) * ry
    }

    /// Central difference gradient, pointing toward increasing clearance. Not normalized.
    pub fn gradient(&self, point: Vec2) -> Vec2 {
        let offset = if self.params.gradient_offset > 0.0 {
            self.params.gradient_offset
        } else {
            self.grain()
        };
        let dx = Vec2::new(offset, 0.0);
        let dy = Vec2::new(0.0, offset);
        Vec2::new(
            self.sample(point + dx) - self.sample(point - dx),
            self.sample(point + dy) - self.sample(point - dy),
        ) / (2.0 * offset)
    }

    #[inline]
    fn min_step(&self) -> f32 {
        self.params.min_step.max(1e-4)
    }

    /// Marches from `from` to `to` and reports whether a disk of `radius` stays clear.
    ///
    /// Steps are `|clearance - radius|`, at least `min_step` and at most one grain.
    pub fn check_straight_move(&self, from: Vec2, to: Vec2, radius: f32) -> bool {
        let diff = to - from;
        let distance = diff.length();
        if distance <= self.params.epsilon {
            return true;
        }
        let dir = diff / distance;
        let floor = radius - self.params.straight_move_tolerance;
        let min_step = self.min_step();
        let grain = self.grain();

        let mut t = grain.min(radius).max(0.0);
        while t < distance {
            let sd = self.sample(from + dir * t);
            if sd < floor {
                return false;
            }
            t += (sd - radius).abs().max(min_step).min(grain);
        }
        self.sample(to) >= floor
    }

    /// Sphere-traces a disk along `dir` and returns how far it travels before touching solid.
    ///
    /// Each step is the current clearance minus `radius`, capped at one grain.
    pub fn disk_cast(&self, origin: Vec2, dir: Vec2, radius: f32, max_distance: f32) -> f32 {
        let mut t = 0.0;
        for _ in 0..self.params.max_steps {
            let sd = self.sample(origin + dir * t);
            if sd <= radius + self.params.epsilon {
                return t;
            }
            t += (sd - radius).min(self.grain());
            if t >= max_distance {
                return max_distance;
            }
        }
        t.min(max_distance)
    }

    /// Distance a disk may move along `dir`.
    ///
    /// A disk already touching solid may leave along the gradient as long as the
    /// destination is no worse than where it started. Otherwise this is a [`SdfMap::disk_cast`].
    pub fn try_move_to(&self, from: Vec2, dir: Vec2, radius: f32, max_distance: f32) -> f32 {
        let sd = self.sample(from);
        if sd <= radius + self.params.epsilon {
            let escaping = self.gradient(from).dot(dir) > self.params.epsilon;
            if escaping && self.sample(from + dir * max_distance) >= sd {
                return max_distance;
            }
        }
        self.disk_cast(from, dir, radius, max_distance)
    }

    /// Pushes `point` out along the gradient until it has `radius` clearance.
    ///
    /// Each push is `max(radius - clearance, min_step)`, halved until clearance does
    /// not decrease. Stops after `rescue_iterations` even if still penetrating.
    pub fn find_nearest_valid_point(&self, point: Vec2, radius: f32) -> Vec2 {
        let min_step = self.min_step();
        let mut current = point;
        let mut sd = self.sample(current);

        for _ in 0..self.params.rescue_iterations {
            if sd >= radius {
                break;
            }
            let Some(dir) = try_normalize(self.gradient(current)) else {
                break;
            };
            let mut push = (radius - sd).max(min_step);
            let mut advanced = false;
            while push >= min_step * 0.5 {
                let candidate = current + dir * push;
                let candidate_sd = self.sample(candidate);
                if candidate_sd >= sd {
                    current = candidate;
                    sd = candidate_sd;
                    advanced = true;
                    break;
                }
                push *= 0.5;
            }
            if !advanced {
                break;
            }
        }
        current
    }
}
