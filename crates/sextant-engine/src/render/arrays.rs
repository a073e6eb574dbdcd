use crate::coords::{Vec2, Vec3};
use crate::paint::Color;

/// Primitive assembly for a draw.
///
/// `LineLoop` and `TriangleFan` have no wgpu equivalent; the dispatcher
/// rewrites them before upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    #[inline]
    pub fn is_line(self) -> bool {
        matches!(self, Topology::Lines | Topology::LineStrip | Topology::LineLoop)
    }

    #[inline]
    pub fn is_triangle(self) -> bool {
        matches!(self, Topology::Triangles | Topology::TriangleStrip | Topology::TriangleFan)
    }
}

/// Borrowed numeric data of one vertex stream.
#[derive(Debug, Copy, Clone)]
pub enum VertexData<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl VertexData<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            VertexData::F32(d) => d.len(),
            VertexData::F64(d) => d.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn get(&self, i: usize) -> f64 {
        match self {
            VertexData::F32(d) => d[i] as f64,
            VertexData::F64(d) => d[i],
        }
    }
}

/// One vertex stream: data, components per vertex and whether it is enabled.
///
/// Descriptors borrow; nothing is copied until the dispatcher gathers the
/// vertices a draw actually references.
#[derive(Debug, Copy, Clone)]
pub struct ArrayDesc<'a> {
    pub data: VertexData<'a>,
    pub components: usize,
    pub enabled: bool,
}

impl<'a> ArrayDesc<'a> {
    #[track_caller]
    pub fn new(data: VertexData<'a>, components: usize) -> Self {
        assert!((1..=4).contains(&components), "vertex streams have 1 to 4 components");
        assert!(
            data.len() % components == 0,
            "stream length {} is not a multiple of {components} components",
            data.len()
        );
        Self { data, components, enabled: true }
    }

    pub fn f32(data: &'a [f32], components: usize) -> Self {
        Self::new(VertexData::F32(data), components)
    }

    pub fn f64(data: &'a [f64], components: usize) -> Self {
        Self::new(VertexData::F64(data), components)
    }

    /// Sphere directions or window coordinates.
    pub fn vec3(data: &'a [Vec3]) -> Self {
        Self::f64(bytemuck::cast_slice(data), 3)
    }

    pub fn vec2(data: &'a [Vec2]) -> Self {
        Self::f32(bytemuck::cast_slice(data), 2)
    }

    pub fn colors(data: &'a [Color]) -> Self {
        Self::f32(bytemuck::cast_slice(data), 4)
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.components
    }

    /// Component `c` of vertex `i`.
    #[inline]
    pub fn component(&self, i: usize, c: usize) -> f64 {
        self.data.get(i * self.components + c)
    }

    /// Vertex `i` widened to three components; missing ones are zero.
    pub fn vec3_at(&self, i: usize) -> Vec3 {
        let n = self.components;
        let c = |k: usize| if k < n { self.component(i, k) } else { 0.0 };
        Vec3::new(c(0), c(1), c(2))
    }
}

/// The streams of one draw.
#[derive(Debug, Copy, Clone)]
pub struct VertexArrays<'a> {
    pub positions: ArrayDesc<'a>,
    pub tex_coords: Option<ArrayDesc<'a>>,
    pub colors: Option<ArrayDesc<'a>>,
    pub normals: Option<ArrayDesc<'a>>,
}

impl<'a> VertexArrays<'a> {
    pub fn new(positions: ArrayDesc<'a>) -> Self {
        Self { positions, tex_coords: None, colors: None, normals: None }
    }

    #[track_caller]
    pub fn with_tex_coords(mut self, tex_coords: ArrayDesc<'a>) -> Self {
        self.check_count("texture coordinate", &tex_coords);
        self.tex_coords = Some(tex_coords);
        self
    }

    #[track_caller]
    pub fn with_colors(mut self, colors: ArrayDesc<'a>) -> Self {
        self.check_count("color", &colors);
        self.colors = Some(colors);
        self
    }

    #[track_caller]
    pub fn with_normals(mut self, normals: ArrayDesc<'a>) -> Self {
        self.check_count("normal", &normals);
        self.normals = Some(normals);
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.vertex_count()
    }

    pub fn textured(&self) -> bool {
        self.tex_coords.is_some_and(|d| d.enabled)
    }

    pub fn colored(&self) -> bool {
        self.colors.is_some_and(|d| d.enabled)
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some_and(|d| d.enabled)
    }

    #[track_caller]
    fn check_count(&self, what: &str, desc: &ArrayDesc<'_>) {
        if !desc.enabled {
            return;
        }
        assert_eq!(
            desc.vertex_count(),
            self.vertex_count(),
            "{what} stream has a different vertex count than positions"
        );
    }
}
