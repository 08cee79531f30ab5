/// Blocked angular interval on one side of the heading, stored as magnitudes
/// in `[0, 180]` so both sides sweep outward from zero the same way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

/// Sorted, coalesced blocked intervals around a heading of 0°.
///
/// Angles follow [`signed_angle_deg`](crate::nav::math::signed_angle_deg):
/// positive (clockwise) angles land on the right side, negative ones on the
/// left. Both lists hold disjoint ranges sorted by `min`.
#[derive(Clone, Debug, Default)]
pub struct DirectionRange {
    left: Vec<AngleRange>,
    right: Vec<AngleRange>,
}

impl DirectionRange {
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn left_ranges(&self) -> &[AngleRange] {
        &self.left
    }

    pub fn right_ranges(&self) -> &[AngleRange] {
        &self.right
    }

    /// Blocks `angle ± half_width` degrees, splitting at 0° and wrapping at ±180°.
    pub fn add_angle(&mut self, angle: f32, half_width: f32) {
        let half_width = half_width.abs();
        let min = angle - half_width;
        let max = angle + half_width;

        // signed left piece [min, max] ∩ [-180, 0]
        let left_lo = min.max(-180.0);
        let left_hi = max.min(0.0);
        if left_lo < left_hi {
            insert(&mut self.left, -left_hi, -left_lo);
        }
        let right_lo = min.max(0.0);
        let right_hi = max.min(180.0);
        if right_lo < right_hi {
            insert(&mut self.right, right_lo, right_hi);
        }
        if min < -180.0 {
            insert(&mut self.right, (min + 360.0).max(0.0), 180.0);
        }
        if max > 180.0 {
            // left magnitude of [-180, max - 360]
            insert(&mut self.left, (360.0 - max).max(0.0), 180.0);
        }
    }

    /// Smallest clockwise turn that clears every blocked range on the right.
    pub fn right_min_angle(&self) -> f32 {
        sweep(&self.right)
    }

    /// Smallest counter-clockwise turn, as a positive magnitude, that clears the left.
    pub fn left_min_angle(&self) -> f32 {
        sweep(&self.left)
    }

    /// Signed rotation of smallest magnitude leaving every blocked range.
    ///
    /// Ties go to the left, so a single range centered on the heading yields a
    /// negative result. Zero when the heading itself is free.
    pub fn min_offset_angle(&self) -> f32 {
        let right = self.right_min_angle();
        let left = self.left_min_angle();
        if left > right {
            right
        } else {
            -left
        }
    }
}

fn sweep(ranges: &[AngleRange]) -> f32 {
    let mut angle = 0.0;
    for range in ranges {
        if range.min > angle {
            break;
        }
        angle = range.max;
    }
    angle
}

fn insert(ranges: &mut Vec<AngleRange>, min: f32, max: f32) {
    // first range that could touch [min, max]
    let start = ranges.partition_point(|r| r.max < min);
    let end = start + ranges[start..].partition_point(|r| r.min <= max);
    if start == end {
        ranges.insert(start, AngleRange { min, max });
        return;
    }
    let merged = AngleRange {
        min: min.min(ranges[start].min),
        max: max.max(ranges[end - 1].max),
    };
    ranges.splice(start..end, std::iter::once(merged));
}
