//! Sky-to-screen projections.
//!
//! A [`Projector`] maps unit direction vectors to window coordinates and
//! reports where its map has seams. Painters hold projectors as
//! `Arc<dyn Projector>`; the caller owns and swaps them per frame.
//!
//! Projected points carry a depth in `z` when visible and the marker
//! [`HIDDEN_Z`] otherwise, so hidden vertices keep their slot in strips and
//! fans and fall outside the clip volume when uploaded.

mod azimuthal;
mod cylindrical;
mod frame;
mod screen;

pub use azimuthal::{AzimuthalKind, AzimuthalProjector};
pub use cylindrical::CylindricalProjector;
pub use frame::ViewFrame;
pub use screen::ScreenProjector;

use crate::coords::{Mat4, Rect, Vec2, Vec3};
use crate::geom::SphericalCap;

/// `z` written for points behind the viewer or outside the projection domain.
pub const HIDDEN_Z: f64 = -1.0;

/// Result of projecting one direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projected {
    /// Window coordinates; `z` is depth in `[0, 1]` or [`HIDDEN_Z`].
    pub win: Vec3,
    /// False when the point is behind the viewer or undefined. Not an error.
    pub visible: bool,
}

impl Projected {
    #[inline]
    pub const fn visible(win: Vec3) -> Self {
        Self { win, visible: true }
    }

    #[inline]
    pub const fn hidden(x: f64, y: f64) -> Self {
        Self { win: Vec3::new(x, y, HIDDEN_Z), visible: false }
    }
}

/// Shape of the region the projection covers inside its viewport.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MaskType {
    /// Full viewport rectangle.
    None,
    /// Disk of diameter [`Projector::viewport_fov_diameter`] around the center.
    Disk,
}

/// Map projection consumed by the painter.
///
/// Inputs to [`project`](Self::project) are unit vectors; callers normalize
/// before projecting.
pub trait Projector: Send + Sync {
    fn project(&self, v: Vec3) -> Projected;

    /// Inverse mapping from window coordinates, where defined.
    fn unproject(&self, x: f64, y: f64) -> Option<Vec3>;

    fn viewport(&self) -> Rect;

    /// Overwrites `v` with its window coordinates and returns visibility.
    fn project_in_place(&self, v: &mut Vec3) -> bool {
        let p = self.project(*v);
        *v = p.win;
        p.visible
    }

    /// Projects a batch of directions into `out` (cleared first).
    fn project_batch(&self, input: &[Vec3], out: &mut Vec<Vec3>) {
        out.clear();
        out.extend(input.iter().map(|v| self.project(*v).win));
    }

    /// Whether the minor arc `a → b` crosses a seam of the 2D map.
    fn intersects_discontinuity(&self, _a: Vec3, _b: Vec3) -> bool {
        false
    }

    fn has_discontinuity(&self) -> bool {
        false
    }

    /// Whether any point of the cap lies on a seam.
    fn cap_intersects_discontinuity(&self, _cap: &SphericalCap) -> bool {
        false
    }

    fn mask_type(&self) -> MaskType {
        MaskType::None
    }

    fn viewport_center(&self) -> Vec2 {
        self.viewport().center()
    }

    /// Diameter in pixels of the field-of-view disk.
    fn viewport_fov_diameter(&self) -> f32 {
        let size = self.viewport().size;
        size.x.min(size.y)
    }

    /// Window coordinates to clip space.
    fn projection_matrix(&self) -> Mat4 {
        Mat4::window_to_clip(self.viewport())
    }

    fn device_pixels_per_pixel(&self) -> f32 {
        1.0
    }

    /// Labels should curve around the viewport center.
    fn gravity_labels(&self) -> bool {
        false
    }

    /// Extra rotation in degrees applied to flat text drawn with gravity allowed.
    fn default_angle_for_gravity_text(&self) -> f32 {
        0.0
    }

    /// Hidden points are reliably flagged and may be skipped by path drawing.
    fn supports_hidden_point_culling(&self) -> bool {
        false
    }

    /// Inputs are already window coordinates; projection is the identity.
    fn is_screen_space(&self) -> bool {
        false
    }

    /// Winding of front faces after projection (mirrored views flip it).
    fn front_face_cw(&self) -> bool {
        false
    }

    /// Cap enclosing every direction visible in the viewport.
    fn bounding_cap(&self) -> SphericalCap {
        SphericalCap::full_sphere()
    }

    /// Whether window coordinates fall inside the viewport (edges included).
    fn check_in_viewport(&self, win: Vec3) -> bool {
        self.viewport()
            .contains_inclusive(Vec2::new(win.x as f32, win.y as f32))
    }

    /// Point where the screen segment `p1 → p2` crosses the viewport boundary.
    ///
    /// Falls back to `p2` when the segment does not touch the boundary.
    fn viewport_intersect(&self, p1: Vec3, p2: Vec3) -> Vec3 {
        let from = Vec2::new(p1.x as f32, p1.y as f32);
        let to = Vec2::new(p2.x as f32, p2.y as f32);
        match self.viewport().boundary_crossing(from, to) {
            Some(p) => Vec3::new(p.x as f64, p.y as f64, p1.z),
            None => p2,
        }
    }
}
