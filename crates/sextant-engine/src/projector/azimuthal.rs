use std::f64::consts::{FRAC_PI_2, PI};

use crate::coords::{Rect, Vec3};
use crate::geom::SphericalCap;

use super::{MaskType, Projected, Projector, ViewFrame};

/// Radial law of an azimuthal projection: distance from center as a
/// function of the angle `θ` from the view direction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AzimuthalKind {
    /// `r = 2 tan(θ/2)`. Conformal, defined everywhere but the antipode.
    Stereographic,
    /// `r = sin θ`. Only the front hemisphere is visible.
    Orthographic,
    /// `r = θ`. Fisheye.
    Equidistant,
}

impl AzimuthalKind {
    fn radius(self, theta: f64) -> f64 {
        match self {
            AzimuthalKind::Stereographic => 2.0 * (theta * 0.5).tan(),
            AzimuthalKind::Orthographic => theta.sin(),
            AzimuthalKind::Equidistant => theta,
        }
    }

    fn theta(self, r: f64) -> Option<f64> {
        match self {
            AzimuthalKind::Stereographic => Some(2.0 * (r * 0.5).atan()),
            AzimuthalKind::Orthographic => (r <= 1.0).then(|| r.asin()),
            AzimuthalKind::Equidistant => (r <= PI).then_some(r),
        }
    }

    /// Largest `θ` for which the projection is defined.
    fn max_theta(self) -> f64 {
        match self {
            AzimuthalKind::Orthographic => FRAC_PI_2,
            AzimuthalKind::Stereographic | AzimuthalKind::Equidistant => PI,
        }
    }
}

/// Azimuthal projection centered on a view direction.
///
/// The field of view (diameter, radians) spans the smaller viewport side.
#[derive(Debug, Clone)]
pub struct AzimuthalProjector {
    kind: AzimuthalKind,
    frame: ViewFrame,
    fov: f64,
    viewport: Rect,
    device_pixel_ratio: f32,
    gravity_labels: bool,
    disk_mask: bool,
    /// Pixels per unit of projected radius.
    scale: f64,
}

impl AzimuthalProjector {
    /// Panics when `fov` is not in `(0, 2·max_theta]`.
    pub fn new(kind: AzimuthalKind, frame: ViewFrame, fov: f64, viewport: Rect) -> Self {
        assert!(
            fov > 0.0 && fov <= 2.0 * kind.max_theta(),
            "field of view {fov} rad out of range for {kind:?}"
        );
        let half_diameter = (viewport.size.x.min(viewport.size.y) as f64) * 0.5;
        let scale = half_diameter / kind.radius(fov * 0.5);
        Self {
            kind,
            frame,
            fov,
            viewport,
            device_pixel_ratio: 1.0,
            gravity_labels: false,
            disk_mask: false,
            scale,
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio.max(0.01);
        self
    }

    pub fn with_gravity_labels(mut self, enabled: bool) -> Self {
        self.gravity_labels = enabled;
        self
    }

    pub fn with_disk_mask(mut self, enabled: bool) -> Self {
        self.disk_mask = enabled;
        self
    }

    pub fn kind(&self) -> AzimuthalKind {
        self.kind
    }

    pub fn frame(&self) -> &ViewFrame {
        &self.frame
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    fn center(&self) -> (f64, f64) {
        let c = self.viewport.center();
        (c.x as f64, c.y as f64)
    }
}

impl Projector for AzimuthalProjector {
    fn project(&self, v: Vec3) -> Projected {
        let c = self.frame.to_camera(v);
        let theta = c.z.clamp(-1.0, 1.0).acos();
        let rho = (c.x * c.x + c.y * c.y).sqrt();
        let (dx, dy) = if rho > 1e-15 { (c.x / rho, c.y / rho) } else { (0.0, 0.0) };

        let visible = match self.kind {
            AzimuthalKind::Orthographic => c.z >= 0.0,
            AzimuthalKind::Stereographic | AzimuthalKind::Equidistant => theta < PI - 1e-9,
        };

        let r = self.scale * self.kind.radius(theta.min(PI - 1e-9));
        let (cx, cy) = self.center();
        let (x, y) = (cx + r * dx, cy - r * dy);
        if visible {
            Projected::visible(Vec3::new(x, y, theta / PI))
        } else {
            Projected::hidden(x, y)
        }
    }

    fn unproject(&self, x: f64, y: f64) -> Option<Vec3> {
        let (cx, cy) = self.center();
        let px = (x - cx) / self.scale;
        let py = (cy - y) / self.scale;
        let r = (px * px + py * py).sqrt();
        let theta = self.kind.theta(r)?;
        let c = if r > 1e-15 {
            let s = theta.sin() / r;
            Vec3::new(px * s, py * s, theta.cos())
        } else {
            Vec3::Z
        };
        Some(self.frame.to_world(c))
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn mask_type(&self) -> MaskType {
        if self.disk_mask { MaskType::Disk } else { MaskType::None }
    }

    fn device_pixels_per_pixel(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn gravity_labels(&self) -> bool {
        self.gravity_labels
    }

    fn supports_hidden_point_culling(&self) -> bool {
        self.kind == AzimuthalKind::Orthographic
    }

    fn bounding_cap(&self) -> SphericalCap {
        let half_diag = (self.viewport.size.x.hypot(self.viewport.size.y) as f64) * 0.5;
        let theta = self
            .kind
            .theta(half_diag / self.scale)
            .unwrap_or_else(|| self.kind.max_theta())
            .min(self.kind.max_theta());
        if theta >= PI {
            SphericalCap::full_sphere()
        } else {
            SphericalCap::from_radius(self.frame.forward, theta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector(kind: AzimuthalKind) -> AzimuthalProjector {
        let frame = ViewFrame::looking_at(Vec3::new(1.0, 0.5, 0.2), Vec3::Z);
        AzimuthalProjector::new(kind, frame, 120f64.to_radians(), Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    fn assert_round_trip(p: &AzimuthalProjector, v: Vec3) {
        let proj = p.project(v);
        assert!(proj.visible, "{v:?} should be visible");
        let back = p.unproject(proj.win.x, proj.win.y).unwrap();
        assert!((back - v).norm() < 1e-9, "{:?}: {v:?} → {back:?}", p.kind());
    }

    // ── round trip ────────────────────────────────────────────────────────

    #[test]
    fn unproject_inverts_project() {
        let dirs = [
            Vec3::new(1.0, 0.5, 0.2),
            Vec3::new(0.8, -0.3, 0.6),
            Vec3::new(0.5, 0.9, -0.1),
            Vec3::new(0.9, 0.1, 0.05),
        ];
        for kind in [
            AzimuthalKind::Stereographic,
            AzimuthalKind::Orthographic,
            AzimuthalKind::Equidistant,
        ] {
            let p = projector(kind);
            for d in dirs {
                assert_round_trip(&p, d.normalized());
            }
        }
    }

    #[test]
    fn view_direction_maps_to_viewport_center() {
        let p = projector(AzimuthalKind::Stereographic);
        let win = p.project(p.frame().forward).win;
        assert!((win.x - 400.0).abs() < 1e-9 && (win.y - 300.0).abs() < 1e-9);
        assert!(win.z.abs() < 1e-6);
    }

    #[test]
    fn fov_edge_touches_short_viewport_side() {
        let frame = ViewFrame::looking_at(Vec3::X, Vec3::Z);
        let p = AzimuthalProjector::new(
            AzimuthalKind::Equidistant,
            frame,
            90f64.to_radians(),
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        // 45° straight up from the view direction lands on the top edge.
        let up = Vec3::from_spherical(0.0, 45f64.to_radians());
        let win = p.project(up).win;
        assert!((win.x - 400.0).abs() < 1e-9);
        assert!(win.y.abs() < 1e-9);
    }

    // ── visibility ────────────────────────────────────────────────────────

    #[test]
    fn orthographic_hides_back_hemisphere() {
        let p = projector(AzimuthalKind::Orthographic);
        let back = -p.frame().forward;
        let proj = p.project(Vec3::new(back.x, back.y + 0.1, back.z).normalized());
        assert!(!proj.visible);
        assert!(proj.win.z < 0.0);
        assert!(p.supports_hidden_point_culling());
    }

    #[test]
    fn stereographic_sees_behind_but_not_antipode() {
        let p = projector(AzimuthalKind::Stereographic);
        let back = -p.frame().forward;
        assert!(!p.project(back).visible);
        let near_back = (back + p.frame().up * 0.2).normalized();
        assert!(p.project(near_back).visible);
        assert!(!p.supports_hidden_point_culling());
    }

    #[test]
    fn bounding_cap_contains_viewport_corners() {
        let p = projector(AzimuthalKind::Stereographic);
        let cap = p.bounding_cap();
        for (x, y) in [(0.0, 0.0), (800.0, 0.0), (0.0, 600.0), (800.0, 600.0)] {
            let v = p.unproject(x, y).unwrap();
            assert!(cap.n.dot(v) >= cap.d - 1e-9);
        }
    }
}
