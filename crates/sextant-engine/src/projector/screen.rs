use crate::coords::{Rect, Vec3};

use super::{Projected, Projector};

/// Identity projector for 2D drawing in window coordinates.
#[derive(Debug, Copy, Clone)]
pub struct ScreenProjector {
    viewport: Rect,
    device_pixel_ratio: f32,
}

impl ScreenProjector {
    pub fn new(viewport: Rect) -> Self {
        Self { viewport, device_pixel_ratio: 1.0 }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio.max(0.01);
        self
    }
}

impl Projector for ScreenProjector {
    fn project(&self, v: Vec3) -> Projected {
        Projected::visible(Vec3::new(v.x, v.y, 0.0))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<Vec3> {
        Some(Vec3::new(x, y, 0.0))
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn device_pixels_per_pixel(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn is_screen_space(&self) -> bool {
        true
    }
}
