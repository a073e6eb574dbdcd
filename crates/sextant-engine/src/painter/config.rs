use crate::geom::MAX_ARC_ITERATIONS;
use crate::text::DEFAULT_TEXT_CACHE_MAX_COST;

/// Painter tuning, fixed for the lifetime of a [`RenderContext`](super::RenderContext).
#[derive(Debug, Clone, PartialEq)]
pub struct PainterConfig {
    /// Cost ceiling of the text texture cache (bytes of RGB equivalent).
    pub text_cache_max_cost: usize,
    /// Recursion ceiling of spherical triangle subdivision.
    pub max_triangle_depth: u32,
    /// Bisection ceiling of arc tessellation.
    pub max_arc_iterations: u32,
    /// Squared screen distortion (px²) used when a call passes none.
    pub default_max_sq_distortion: f64,
    pub circle_segments: u32,
    /// Slices of the ring drawn around a disk-shaped viewport.
    pub viewport_disk_slices: u32,
    /// Build thick lines from triangles even when the backend rasterizes
    /// them natively.
    pub force_wide_line_emulation: bool,
    /// Label size in logical pixels until `set_font` is called.
    pub default_font_size: f32,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            text_cache_max_cost: DEFAULT_TEXT_CACHE_MAX_COST,
            max_triangle_depth: 5,
            max_arc_iterations: MAX_ARC_ITERATIONS,
            default_max_sq_distortion: 5.0,
            circle_segments: 180,
            viewport_disk_slices: 239,
            force_wide_line_emulation: false,
            default_font_size: 13.0,
        }
    }
}
