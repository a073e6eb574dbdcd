use bytemuck::{Pod, Zeroable};

/// Straight-alpha RGBA color.
///
/// Sky primitives blend with caller-chosen factors, so colors are kept
/// unpremultiplied and passed to shaders as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Builds a color from 3 (opaque) or 4 components.
    ///
    /// Panics on any other component count.
    #[inline]
    #[track_caller]
    pub fn from_components(c: &[f32]) -> Self {
        match *c {
            [r, g, b] => Self::rgb(r, g, b),
            [r, g, b, a] => Self::new(r, g, b, a),
            _ => panic!("color stream must have 3 or 4 components, got {}", c.len()),
        }
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Arithmetic mean of two colors, channel by channel.
    #[inline]
    pub fn mean(self, other: Color) -> Self {
        Self::new(
            (self.r + other.r) * 0.5,
            (self.g + other.g) * 0.5,
            (self.b + other.b) * 0.5,
            (self.a + other.a) * 0.5,
        )
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl From<[f32; 4]> for Color {
    #[inline]
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}
