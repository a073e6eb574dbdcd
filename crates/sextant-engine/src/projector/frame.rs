use crate::coords::Vec3;

/// Orthonormal camera basis.
///
/// `forward` maps to the viewport center and `up` to screen up (-Y).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewFrame {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl ViewFrame {
    /// Builds a frame looking along `forward` with `up_hint` as the
    /// approximate up direction. A hint parallel to `forward` falls back to
    /// the nearest usable axis.
    pub fn looking_at(forward: Vec3, up_hint: Vec3) -> Self {
        let forward = forward.normalized();
        let mut right = up_hint.cross(forward);
        if right.norm_squared() < 1e-20 {
            let alt = if forward.z.abs() < 0.9 { Vec3::Z } else { Vec3::Y };
            right = alt.cross(forward);
        }
        let right = right.normalized();
        let up = forward.cross(right);
        Self { right, up, forward }
    }

    /// Direction in camera coordinates: `(right, up, forward)` components.
    #[inline]
    pub fn to_camera(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.right), v.dot(self.up), v.dot(self.forward))
    }

    #[inline]
    pub fn to_world(&self, c: Vec3) -> Vec3 {
        self.right * c.x + self.up * c.y + self.forward * c.z
    }
}

impl Default for ViewFrame {
    fn default() -> Self {
        Self::looking_at(Vec3::X, Vec3::Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal_and_right_handed() {
        let f = ViewFrame::looking_at(Vec3::new(1.0, 2.0, 0.5), Vec3::Z);
        assert!(f.right.is_unit() && f.up.is_unit() && f.forward.is_unit());
        assert!(f.right.dot(f.up).abs() < 1e-12);
        assert!((f.right.cross(f.up) - f.forward).norm() < 1e-12);
        assert!(f.up.z > 0.0);
    }

    #[test]
    fn degenerate_hint_still_builds_a_frame() {
        let f = ViewFrame::looking_at(Vec3::Z, Vec3::Z);
        assert!(f.right.is_unit());
        assert!(f.up.dot(f.forward).abs() < 1e-12);
    }

    #[test]
    fn camera_round_trip() {
        let f = ViewFrame::looking_at(Vec3::new(0.3, -0.2, 0.9), Vec3::Z);
        let v = Vec3::new(0.1, 0.7, -0.3).normalized();
        assert!((f.to_world(f.to_camera(v)) - v).norm() < 1e-12);
    }
}
