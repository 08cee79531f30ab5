use bevy::math::Vec2;

/// Threshold below which lengths, dot products and angles are treated as zero.
pub const EPSILON: f32 = 1e-5;

#[inline]
pub fn sqr(v: f32) -> f32 {
    v * v
}

/// 2D cross product (z component of the 3D cross).
#[inline]
pub fn cross(lhs: Vec2, rhs: Vec2) -> f32 {
    lhs.x * rhs.y - lhs.y * rhs.x
}

/// Rotates `v` by `degrees`, positive angles turning clockwise.
///
/// Pairs with [`signed_angle_deg`]: rotating `from` by `signed_angle_deg(from, to)`
/// points it along `to`.
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let rad = -degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Signed angle in degrees from `from` to `to` in `[-180, 180]`, clockwise positive.
pub fn signed_angle_deg(from: Vec2, to: Vec2) -> f32 {
    let dot = from.normalize_or_zero().dot(to.normalize_or_zero()).clamp(-1.0, 1.0);
    let angle = dot.acos().to_degrees();
    if cross(from, to) > 0.0 {
        -angle
    } else {
        angle
    }
}

/// Normalizes `v` or returns `None` when its length is at or below [`EPSILON`].
#[inline]
pub fn try_normalize(v: Vec2) -> Option<Vec2> {
    let len = v.length();
    if len <= EPSILON {
        None
    } else {
        Some(v / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_and_signed_angle_agree() {
        let from = Vec2::new(1.0, 0.0);
        for target in [Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0), Vec2::new(-1.0, 0.2)] {
            let angle = signed_angle_deg(from, target);
            let rotated = rotate_deg(from, angle);
            assert!(
                (rotated - target.normalize()).length() < 1e-4,
                "rotating by {} gave {:?}, expected {:?}",
                angle,
                rotated,
                target.normalize()
            );
        }
    }

    #[test]
    fn counter_clockwise_targets_are_negative() {
        // +y is counter-clockwise from +x
        assert!((signed_angle_deg(Vec2::X, Vec2::Y) + 90.0).abs() < 1e-4);
        assert!((signed_angle_deg(Vec2::X, -Vec2::Y) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn try_normalize_rejects_tiny_vectors() {
        assert!(try_normalize(Vec2::new(1e-7, 0.0)).is_none());
        assert_eq!(try_normalize(Vec2::new(0.0, 3.0)), Some(Vec2::Y));
    }
}
