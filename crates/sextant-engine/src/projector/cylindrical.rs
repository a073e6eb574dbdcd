use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::coords::{Rect, Vec3};
use crate::geom::{arc_max_dot, SphericalCap};

use super::{Projected, Projector};

/// Equirectangular (plate carrée) projection centered on a longitude.
///
/// Longitude maps linearly to `x` and latitude to `y`. The antimeridian of
/// the center longitude is a seam: points just either side of it land at
/// opposite viewport edges.
#[derive(Debug, Clone)]
pub struct CylindricalProjector {
    center_lon: f64,
    viewport: Rect,
    /// Pixels per radian.
    scale: f64,
    device_pixel_ratio: f32,
}

impl CylindricalProjector {
    /// `horizontal_fov` (radians) spans the viewport width.
    pub fn new(center_lon: f64, horizontal_fov: f64, viewport: Rect) -> Self {
        assert!(horizontal_fov > 0.0, "horizontal field of view must be positive");
        Self {
            center_lon,
            viewport,
            scale: viewport.size.x as f64 / horizontal_fov,
            device_pixel_ratio: 1.0,
        }
    }

    /// Whole sky: 360° across the viewport width.
    pub fn whole_sky(center_lon: f64, viewport: Rect) -> Self {
        Self::new(center_lon, TAU, viewport)
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio.max(0.01);
        self
    }

    /// Rotates `v` so the center longitude lies on +X.
    fn to_local(&self, v: Vec3) -> Vec3 {
        let (s, c) = self.center_lon.sin_cos();
        Vec3::new(c * v.x + s * v.y, -s * v.x + c * v.y, v.z)
    }

    /// Seam direction on the equator, in world coordinates.
    fn seam_equator(&self) -> Vec3 {
        let (s, c) = self.center_lon.sin_cos();
        Vec3::new(-c, -s, 0.0)
    }

    fn center(&self) -> (f64, f64) {
        let c = self.viewport.center();
        (c.x as f64, c.y as f64)
    }
}

impl Projector for CylindricalProjector {
    fn project(&self, v: Vec3) -> Projected {
        let l = self.to_local(v);
        let lon = l.y.atan2(l.x);
        let lat = l.z.clamp(-1.0, 1.0).asin();
        let (cx, cy) = self.center();
        Projected::visible(Vec3::new(cx + self.scale * lon, cy - self.scale * lat, 0.0))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<Vec3> {
        let (cx, cy) = self.center();
        let lon = (x - cx) / self.scale;
        let lat = (cy - y) / self.scale;
        if lon.abs() > PI || lat.abs() > FRAC_PI_2 {
            return None;
        }
        Some(Vec3::from_spherical(lon + self.center_lon, lat))
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn intersects_discontinuity(&self, a: Vec3, b: Vec3) -> bool {
        let (a, b) = (self.to_local(a), self.to_local(b));
        // Sign bits, so a point sitting exactly on the seam (y = ±0) is
        // sided the same way atan2 places it.
        if a.y.is_sign_negative() == b.y.is_sign_negative() {
            return false;
        }
        let denom = a.y - b.y;
        if denom == 0.0 {
            return a.x < 0.0 || b.x < 0.0;
        }
        // The chord meets the seam half-plane where the arc does.
        let t = a.y / denom;
        a.x + (b.x - a.x) * t < 0.0
    }

    fn has_discontinuity(&self) -> bool {
        true
    }

    fn cap_intersects_discontinuity(&self, cap: &SphericalCap) -> bool {
        let w = self.seam_equator();
        arc_max_dot(cap.n, Vec3::Z, w) >= cap.d || arc_max_dot(cap.n, w, -Vec3::Z) >= cap.d
    }

    fn device_pixels_per_pixel(&self) -> f32 {
        self.device_pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> CylindricalProjector {
        CylindricalProjector::whole_sky(0.0, Rect::new(0.0, 0.0, 720.0, 360.0))
    }

    #[test]
    fn unproject_inverts_project() {
        let p = projector();
        for (lon, lat) in [(0.3, 0.2), (-2.5, -1.0), (3.0, 0.7), (-0.1, 1.4)] {
            let v = Vec3::from_spherical(lon, lat);
            let win = p.project(v).win;
            let back = p.unproject(win.x, win.y).unwrap();
            assert!((back - v).norm() < 1e-9, "{v:?} → {back:?}");
        }
    }

    #[test]
    fn degrees_map_to_pixels() {
        let win = projector().project(Vec3::from_spherical(90f64.to_radians(), 0.0)).win;
        assert!((win.x - 540.0).abs() < 1e-9);
        assert!((win.y - 180.0).abs() < 1e-9);
    }

    #[test]
    fn seam_crossing_detected_only_at_antimeridian() {
        let p = projector();
        let west = Vec3::from_spherical(179f64.to_radians(), 0.1);
        let east = Vec3::from_spherical(-179f64.to_radians(), -0.1);
        assert!(p.intersects_discontinuity(west, east));

        let a = Vec3::from_spherical(1f64.to_radians(), 0.0);
        let b = Vec3::from_spherical(-1f64.to_radians(), 0.0);
        assert!(!p.intersects_discontinuity(a, b));
        assert!(p.has_discontinuity());
    }

    #[test]
    fn seam_follows_center_longitude() {
        let p = CylindricalProjector::whole_sky(PI, Rect::new(0.0, 0.0, 720.0, 360.0));
        let a = Vec3::from_spherical(1f64.to_radians(), 0.0);
        let b = Vec3::from_spherical(-1f64.to_radians(), 0.0);
        assert!(p.intersects_discontinuity(a, b));
    }

    #[test]
    fn cap_on_seam_is_flagged() {
        let p = projector();
        let on_seam = SphericalCap::from_radius(Vec3::from_spherical(PI, 0.3), 0.05);
        let far = SphericalCap::from_radius(Vec3::X, 0.5);
        assert!(p.cap_intersects_discontinuity(&on_seam));
        assert!(!p.cap_intersects_discontinuity(&far));
    }
}
