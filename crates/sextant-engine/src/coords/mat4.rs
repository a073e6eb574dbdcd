use super::Rect;

/// Column-major 4×4 matrix (WGSL `mat4x4<f32>` layout).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Maps window coordinates inside `viewport` (top-left origin, +Y down)
    /// to clip space.
    ///
    /// Window `z` is scaled by one half: depths in `[0, 1]` land in the front
    /// half of the clip volume while the negative visibility markers written
    /// by projectors fall outside it and get clipped by the rasterizer.
    pub fn window_to_clip(viewport: Rect) -> Mat4 {
        let w = viewport.size.x.max(1.0);
        let h = viewport.size.y.max(1.0);
        let x0 = viewport.origin.x;
        let y0 = viewport.origin.y;
        Mat4 {
            cols: [
                [2.0 / w, 0.0, 0.0, 0.0],
                [0.0, -2.0 / h, 0.0, 0.0],
                [0.0, 0.0, 0.5, 0.0],
                [-1.0 - 2.0 * x0 / w, 1.0 + 2.0 * y0 / h, 0.0, 1.0],
            ],
        }
    }

    /// `self * [x, y, z, 1]`.
    #[inline]
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 4] {
        let c = &self.cols;
        let mut out = [0.0f32; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = c[0][row] * p[0] + c[1][row] * p[1] + c[2][row] * p[2] + c[3][row];
        }
        out
    }

    #[inline]
    pub fn to_cols_array_2d(self) -> [[f32; 4]; 4] {
        self.cols
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_corners_map_to_ndc_corners() {
        let m = Mat4::window_to_clip(Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(m.transform_point([0.0, 0.0, 0.0]), [-1.0, 1.0, 0.0, 1.0]);
        assert_eq!(m.transform_point([800.0, 600.0, 0.0]), [1.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn offset_viewport_center_is_origin() {
        let m = Mat4::window_to_clip(Rect::new(100.0, 50.0, 200.0, 100.0));
        let c = m.transform_point([200.0, 100.0, 1.0]);
        assert!(c[0].abs() < 1e-6 && c[1].abs() < 1e-6);
        assert_eq!(c[2], 0.5);
    }

    #[test]
    fn hidden_marker_is_outside_clip_volume() {
        let m = Mat4::window_to_clip(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(m.transform_point([5.0, 5.0, -1.0])[2] < 0.0);
    }
}
