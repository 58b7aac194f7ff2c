//! Small vector helpers shared by conditioning and steering

use glam::{Quat, Vec3};

/// Offset from `from` to `to` projected onto the XZ plane
#[inline]
#[must_use]
pub fn horizontal_offset(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z)
}

/// Distance between two points ignoring height
#[inline]
#[must_use]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal_offset(a, b).length()
}

/// Normalize `v` only if it is longer than `epsilon`
///
/// Returns `None` for degenerate vectors instead of NaN components.
#[inline]
#[must_use]
pub fn direction(v: Vec3, epsilon: f32) -> Option<Vec3> {
    let length = v.length();
    (length > epsilon && length.is_finite()).then(|| v / length)
}

/// Rotate `current` toward `target` by at most `max_angle` radians
#[must_use]
pub fn rotate_towards(current: Quat, target: Quat, max_angle: f32) -> Quat {
    let angle = current.angle_between(target);
    if angle <= max_angle || angle <= f32::EPSILON {
        return target;
    }
    if max_angle <= 0.0 {
        return current;
    }
    current.slerp(target, max_angle / angle).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -5.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_direction_degenerate() {
        assert!(direction(Vec3::ZERO, 1e-5).is_none());
        assert!(direction(Vec3::splat(1e-7), 1e-5).is_none());

        let d = direction(Vec3::new(0.0, 0.0, 2.0), 1e-5).unwrap();
        assert!((d - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_rotate_towards_is_bounded() {
        let current = Quat::IDENTITY;
        let target = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        let stepped = rotate_towards(current, target, 0.1);
        assert!((current.angle_between(stepped) - 0.1).abs() < 1e-3);

        let reached = rotate_towards(current, target, 10.0);
        assert!(reached.angle_between(target) < 1e-3);

        let frozen = rotate_towards(current, target, 0.0);
        assert!(frozen.angle_between(current) < 1e-6);
    }
}
