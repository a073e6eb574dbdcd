use bytemuck::{Pod, Zeroable};

use crate::coords::{Mat4, Rect};
use crate::paint::Color;

use super::state::{DrawState, StateChange};

/// What a backend can do natively.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BackendCapabilities {
    /// Lines wider than one pixel rasterize natively.
    pub wide_lines: bool,
    /// Line antialiasing is available.
    pub line_smooth: bool,
}

/// Shader program of a draw, chosen from the enabled vertex streams.
///
/// Every kind reads a 4-component clip or window position first; the rest of
/// the interleaved layout follows [`PipelineKind::stride`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PipelineKind {
    /// Position only, uniform color.
    Plain,
    /// Position and per-vertex color.
    VertexColor,
    /// Position and texture coordinates, modulated by the uniform color.
    Textured,
    /// Position, texture coordinates and per-vertex color, with saturation.
    TexturedColor,
    /// Single-channel coverage texture tinted by the uniform color.
    Text,
}

impl PipelineKind {
    /// Picks the program for a stream combination.
    ///
    /// `None` for combinations no program handles: normals, or textures on
    /// emulated wide lines.
    pub fn select(textured: bool, colored: bool, normals: bool, wide_lines: bool) -> Option<PipelineKind> {
        match (textured, colored, normals, wide_lines) {
            (false, false, false, _) => Some(PipelineKind::Plain),
            (false, true, false, _) => Some(PipelineKind::VertexColor),
            (true, false, false, false) => Some(PipelineKind::Textured),
            (true, true, false, false) => Some(PipelineKind::TexturedColor),
            _ => None,
        }
    }

    /// Floats per interleaved vertex.
    pub const fn stride(self) -> usize {
        match self {
            PipelineKind::Plain => 4,
            PipelineKind::VertexColor => 8,
            PipelineKind::Textured | PipelineKind::Text => 6,
            PipelineKind::TexturedColor => 10,
        }
    }

    #[inline]
    pub const fn is_textured(self) -> bool {
        matches!(self, PipelineKind::Textured | PipelineKind::TexturedColor | PipelineKind::Text)
    }
}

/// Primitive assembly a backend can execute directly.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

/// Per-draw uniform block (96 bytes, std140 compatible).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub projection: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: saturation, yzw: unused.
    pub params: [f32; 4],
}

impl DrawUniforms {
    pub fn new(projection: Mat4, color: Color, saturation: f32) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            color: color.to_array(),
            params: [saturation, 0.0, 0.0, 0.0],
        }
    }
}

/// Single-channel coverage bitmap, row-major, one byte per texel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl AlphaImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![0; width as usize * height as usize] }
    }
}

/// One fully resolved draw: interleaved vertices, optional indices, uniforms
/// and an optional bound texture.
#[derive(Debug)]
pub struct DrawCall<'a, T> {
    pub pipeline: PipelineKind,
    pub primitive: PrimitiveKind,
    pub vertices: &'a [f32],
    pub vertex_count: u32,
    pub indices: Option<&'a [u16]>,
    pub uniforms: DrawUniforms,
    pub texture: Option<&'a T>,
}

/// Graphics API seam of the painter.
///
/// Implementations keep the last state they were given and bake it into
/// whatever they execute at [`draw`](Self::draw) time.
pub trait Backend {
    /// Texture handle; cheap to clone, freed when the last clone drops.
    type Texture: Clone;

    fn capabilities(&self) -> BackendCapabilities;

    fn apply(&mut self, change: StateChange);

    /// Pushes every toggle of `state`.
    fn apply_all(&mut self, state: &DrawState) {
        for change in state.changes() {
            self.apply(change);
        }
    }

    /// Viewport in window coordinates.
    fn set_viewport(&mut self, viewport: Rect);

    /// Uploads a coverage bitmap for text drawing.
    fn upload_alpha(&mut self, image: &AlphaImage) -> anyhow::Result<Self::Texture>;

    fn draw(&mut self, call: &DrawCall<'_, Self::Texture>);

    /// Takes the oldest pending backend error, if any.
    fn take_error(&mut self) -> Option<String> {
        None
    }
}
