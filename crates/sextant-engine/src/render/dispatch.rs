use crate::coords::{Mat4, Vec2, Vec3};
use crate::paint::Color;
use crate::projector::Projector;

use super::arrays::{ArrayDesc, Topology, VertexArrays};
use super::backend::{Backend, DrawCall, DrawUniforms, PipelineKind, PrimitiveKind};
use super::state::DrawState;
use super::wide_line::{expand_wide_lines, LineMode};

/// One `draw_from_array` request.
///
/// `first` and `count` select elements: indices when `indices` is set,
/// vertices otherwise.
#[derive(Debug)]
pub struct DrawRequest<'a, T> {
    pub topology: Topology,
    pub arrays: VertexArrays<'a>,
    pub first: usize,
    pub count: usize,
    /// Positions are sphere directions to project; otherwise window coordinates.
    pub project: bool,
    pub indices: Option<&'a [u16]>,
    pub texture: Option<&'a T>,
    /// The texture holds single-channel coverage tinted by the current color.
    pub coverage: bool,
}

impl<'a, T> DrawRequest<'a, T> {
    /// Draws every vertex of `arrays` in order.
    pub fn new(topology: Topology, arrays: VertexArrays<'a>) -> Self {
        let count = arrays.vertex_count();
        Self {
            topology,
            arrays,
            first: 0,
            count,
            project: true,
            indices: None,
            texture: None,
            coverage: false,
        }
    }

    /// Draws every index of `indices`.
    pub fn indexed(mut self, indices: &'a [u16]) -> Self {
        self.first = 0;
        self.count = indices.len();
        self.indices = Some(indices);
        self
    }

    pub fn range(mut self, first: usize, count: usize) -> Self {
        self.first = first;
        self.count = count;
        self
    }

    pub fn unprojected(mut self) -> Self {
        self.project = false;
        self
    }

    pub fn with_texture(mut self, texture: Option<&'a T>) -> Self {
        self.texture = texture;
        self
    }

    pub fn coverage(mut self) -> Self {
        self.coverage = true;
        self
    }
}

/// Turns vertex arrays into backend draw calls.
///
/// Owns reusable scratch buffers: directions, projected positions, the
/// interleaved upload and rewritten indices.
#[derive(Debug, Default)]
pub struct Dispatcher {
    directions: Vec<Vec3>,
    projected: Vec<Vec3>,
    staging: Vec<f32>,
    indices: Vec<u16>,
    force_wide_line_emulation: bool,
    warned_missing_texture: bool,
}

impl Dispatcher {
    pub fn new(force_wide_line_emulation: bool) -> Self {
        Self { force_wide_line_emulation, ..Self::default() }
    }

    /// Projects, selects a pipeline, packs and issues one draw.
    ///
    /// Panics on element ranges past the end of the arrays. Unsupported
    /// stream combinations panic in debug builds; release builds log them and
    /// skip the draw.
    #[track_caller]
    pub fn draw<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        prj: &dyn Projector,
        state: &DrawState,
        saturation: f32,
        req: &DrawRequest<'_, B::Texture>,
    ) {
        if req.count == 0 {
            return;
        }
        let arrays = &req.arrays;

        let elements = match req.indices {
            Some(idx) => {
                assert!(req.first + req.count <= idx.len(), "draw range exceeds the index array");
                Elements::Indexed(&idx[req.first..req.first + req.count])
            }
            None => Elements::Range(req.first, req.count),
        };
        let (lo, hi) = elements.span();
        assert!(hi <= arrays.vertex_count(), "draw range exceeds the vertex arrays");

        let wide = req.topology.is_line()
            && state.wants_wide_lines()
            && (self.force_wide_line_emulation || !backend.capabilities().wide_lines);
        let Some(pipeline) = PipelineKind::select(arrays.textured(), arrays.colored(), arrays.has_normals(), wide)
        else {
            let streams = format!(
                "textured={} colored={} normals={} wide_lines={wide}",
                arrays.textured(),
                arrays.colored(),
                arrays.has_normals()
            );
            if cfg!(debug_assertions) {
                panic!("unsupported vertex stream combination: {streams}");
            }
            log::error!("Dispatcher: unsupported vertex stream combination ({streams}); draw skipped");
            return;
        };
        let pipeline = match pipeline {
            PipelineKind::Textured if req.coverage => PipelineKind::Text,
            kind => kind,
        };

        if pipeline.is_textured() && req.texture.is_none() {
            if !self.warned_missing_texture {
                log::warn!("Dispatcher: textured draw without a bound texture; skipping");
                self.warned_missing_texture = true;
            }
            return;
        }

        self.project_span(prj, &arrays.positions, lo, hi, req.project);

        if wide {
            self.draw_wide(backend, prj, state, saturation, req.topology, arrays, &elements, lo);
            return;
        }

        self.staging.clear();
        for i in lo..hi {
            push_vertex(&mut self.staging, pipeline, self.projected[i - lo], arrays, i);
        }
        let mut vertex_count = hi - lo;

        self.indices.clear();
        let primitive = match req.topology {
            Topology::Points => PrimitiveKind::PointList,
            Topology::Lines => PrimitiveKind::LineList,
            Topology::LineStrip | Topology::LineLoop => PrimitiveKind::LineStrip,
            Topology::Triangles => PrimitiveKind::TriangleList,
            Topology::TriangleStrip => PrimitiveKind::TriangleStrip,
            Topology::TriangleFan => PrimitiveKind::TriangleList,
        };

        match (req.topology, &elements) {
            (Topology::TriangleFan, _) => {
                let n = elements.len();
                for k in 1..n.saturating_sub(1) {
                    for e in [0, k, k + 1] {
                        self.indices.push(rebased(elements.at(e), lo));
                    }
                }
            }
            (Topology::LineLoop, Elements::Indexed(idx)) => {
                self.indices.extend(idx.iter().map(|&i| rebased(i as usize, lo)));
                self.indices.push(rebased(idx[0] as usize, lo));
            }
            (Topology::LineLoop, Elements::Range(..)) => {
                let stride = pipeline.stride();
                self.staging.extend_from_within(0..stride);
                vertex_count += 1;
            }
            (_, Elements::Indexed(idx)) => {
                self.indices.extend(idx.iter().map(|&i| rebased(i as usize, lo)));
            }
            (_, Elements::Range(..)) => {}
        }

        let uniforms = DrawUniforms::new(prj.projection_matrix(), state.color, saturation);
        let indices = (!self.indices.is_empty()).then_some(self.indices.as_slice());
        if indices.is_none() && req.topology == Topology::TriangleFan {
            return;
        }

        backend.draw(&DrawCall {
            pipeline,
            primitive,
            vertices: &self.staging,
            vertex_count: vertex_count as u32,
            indices,
            uniforms,
            texture: if pipeline.is_textured() { req.texture } else { None },
        });
    }

    fn project_span(&mut self, prj: &dyn Projector, positions: &ArrayDesc<'_>, lo: usize, hi: usize, project: bool) {
        if !project || prj.is_screen_space() {
            self.projected.clear();
            self.projected.extend((lo..hi).map(|i| positions.vec3_at(i)));
            return;
        }
        // Mesh vertices carry radius; projectors take directions.
        self.directions.clear();
        self.directions.extend((lo..hi).map(|i| positions.vec3_at(i).normalized()));
        prj.project_batch(&self.directions, &mut self.projected);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_wide<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        prj: &dyn Projector,
        state: &DrawState,
        saturation: f32,
        topology: Topology,
        arrays: &VertexArrays<'_>,
        elements: &Elements<'_>,
        lo: usize,
    ) {
        let projection = prj.projection_matrix();
        let n = elements.len();
        let clip: Vec<[f32; 4]> = (0..n)
            .map(|e| projection.transform_point(self.projected[elements.at(e) - lo].to_f32_array()))
            .collect();
        let colors: Option<Vec<[f32; 4]>> = arrays
            .colors
            .filter(|c| c.enabled)
            .map(|c| (0..n).map(|e| color_at(&c, elements.at(e)).to_array()).collect());

        let mode = match topology {
            Topology::Lines => LineMode::Lines,
            Topology::LineStrip => LineMode::Strip,
            _ => LineMode::Loop,
        };
        let viewport = prj.viewport().size;
        let out = expand_wide_lines(&clip, colors.as_deref(), mode, state.line_width, Vec2::new(viewport.x, viewport.y));
        if out.is_empty() {
            return;
        }

        let pipeline = if colors.is_some() { PipelineKind::VertexColor } else { PipelineKind::Plain };
        self.staging.clear();
        for v in &out {
            self.staging.extend_from_slice(&v.clip);
            if colors.is_some() {
                self.staging.extend_from_slice(&v.color);
            }
        }

        backend.draw(&DrawCall {
            pipeline,
            primitive: PrimitiveKind::TriangleList,
            vertices: &self.staging,
            vertex_count: out.len() as u32,
            indices: None,
            uniforms: DrawUniforms::new(Mat4::IDENTITY, state.color, saturation),
            texture: None,
        });
    }
}

/// Elements a draw walks.
enum Elements<'a> {
    Indexed(&'a [u16]),
    Range(usize, usize),
}

impl Elements<'_> {
    fn len(&self) -> usize {
        match self {
            Elements::Indexed(idx) => idx.len(),
            Elements::Range(_, count) => *count,
        }
    }

    /// Vertex index of element `e`.
    fn at(&self, e: usize) -> usize {
        match self {
            Elements::Indexed(idx) => idx[e] as usize,
            Elements::Range(first, _) => first + e,
        }
    }

    /// Half-open range of referenced vertices.
    fn span(&self) -> (usize, usize) {
        match self {
            Elements::Indexed(idx) => {
                let lo = idx.iter().copied().min().unwrap_or(0) as usize;
                let hi = idx.iter().copied().max().map_or(0, |m| m as usize + 1);
                (lo, hi)
            }
            Elements::Range(first, count) => (*first, first + count),
        }
    }
}

#[track_caller]
fn rebased(i: usize, lo: usize) -> u16 {
    let r = i - lo;
    assert!(r <= u16::MAX as usize, "draw references more vertices than 16-bit indices address");
    r as u16
}

fn color_at(desc: &ArrayDesc<'_>, i: usize) -> Color {
    let mut c = [0.0f32; 4];
    let n = desc.components.min(4);
    for (k, slot) in c.iter_mut().enumerate().take(n) {
        *slot = desc.component(i, k) as f32;
    }
    Color::from_components(&c[..n.max(3)])
}

fn push_vertex(out: &mut Vec<f32>, pipeline: PipelineKind, pos: Vec3, arrays: &VertexArrays<'_>, i: usize) {
    out.extend_from_slice(&[pos.x as f32, pos.y as f32, pos.z as f32, 1.0]);
    if pipeline.is_textured() {
        match arrays.tex_coords {
            Some(t) => {
                let v = if t.components > 1 { t.component(i, 1) } else { 0.0 };
                out.extend_from_slice(&[t.component(i, 0) as f32, v as f32]);
            }
            None => out.extend_from_slice(&[0.0, 0.0]),
        }
    }
    if matches!(pipeline, PipelineKind::VertexColor | PipelineKind::TexturedColor) {
        if let Some(c) = arrays.colors {
            out.extend_from_slice(&color_at(&c, i).to_array());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::projector::{Projected, ScreenProjector};
    use crate::render::BackendCapabilities;
    use crate::testing::{MockProjector, RecordingBackend};

    fn screen() -> ScreenProjector {
        ScreenProjector::new(Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    fn run(backend: &mut RecordingBackend, state: &DrawState, req: &DrawRequest<'_, u32>) {
        Dispatcher::new(false).draw(backend, &screen(), state, 1.0, req);
    }

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        ]
    }

    // ── basics ────────────────────────────────────────────────────────────

    #[test]
    fn zero_count_draws_nothing() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        let req = DrawRequest::new(Topology::Triangles, VertexArrays::new(ArrayDesc::vec3(&pos))).range(0, 0);
        run(&mut backend, &DrawState::default(), &req);
        assert!(backend.draws.is_empty());
    }

    #[test]
    fn plain_draw_packs_window_positions() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        let req = DrawRequest::new(Topology::LineStrip, VertexArrays::new(ArrayDesc::vec3(&pos))).unprojected();
        run(&mut backend, &DrawState::default(), &req);
        let d = &backend.draws[0];
        assert_eq!(d.pipeline, PipelineKind::Plain);
        assert_eq!(d.primitive, PrimitiveKind::LineStrip);
        assert_eq!(d.vertex_count, 4);
        assert_eq!(&d.vertices[4..8], &[10.0, 0.0, 0.0, 1.0]);
        assert!(d.indices.is_none());
    }

    #[test]
    fn directions_are_normalized_before_projection() {
        let prj = MockProjector::new();
        let pos = [Vec3::new(2.0, 0.0, 0.0)];
        let mut backend = RecordingBackend::new();
        let req = DrawRequest::new(Topology::Points, VertexArrays::new(ArrayDesc::vec3(&pos)));
        Dispatcher::new(false).draw(&mut backend, &prj, &DrawState::default(), 1.0, &req);
        let expected = prj.project(Vec3::X).win;
        assert_eq!(backend.draws[0].vertices[0], expected.x as f32);
    }

    /// Mock projection with a batch path that shifts everything right.
    struct BatchShifted(MockProjector);

    impl Projector for BatchShifted {
        fn project(&self, v: Vec3) -> Projected {
            self.0.project(v)
        }

        fn unproject(&self, x: f64, y: f64) -> Option<Vec3> {
            self.0.unproject(x, y)
        }

        fn viewport(&self) -> Rect {
            self.0.viewport()
        }

        fn project_batch(&self, input: &[Vec3], out: &mut Vec<Vec3>) {
            out.clear();
            out.extend(input.iter().map(|v| self.0.project(*v).win + Vec3::new(1000.0, 0.0, 0.0)));
        }
    }

    #[test]
    fn projection_goes_through_the_batch_path() {
        let prj = BatchShifted(MockProjector::new());
        let pos = [Vec3::Z, Vec3::new(0.0, 0.0, 3.0)];
        let mut backend = RecordingBackend::new();
        let req = DrawRequest::new(Topology::Points, VertexArrays::new(ArrayDesc::vec3(&pos)));
        Dispatcher::new(false).draw(&mut backend, &prj, &DrawState::default(), 1.0, &req);
        let xs: Vec<f32> = backend.draws[0].positions().iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![1400.0, 1400.0]);
    }

    #[test]
    fn colors_with_three_components_are_opaque() {
        let pos = square();
        let rgb = [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mut backend = RecordingBackend::new();
        let arrays = VertexArrays::new(ArrayDesc::vec3(&pos)).with_colors(ArrayDesc::f32(&rgb, 3));
        run(&mut backend, &DrawState::default(), &DrawRequest::new(Topology::Points, arrays).unprojected());
        let d = &backend.draws[0];
        assert_eq!(d.pipeline, PipelineKind::VertexColor);
        assert_eq!(&d.vertices[4..8], &[1.0, 0.0, 0.0, 1.0]);
    }

    // ── topology rewrites ─────────────────────────────────────────────────

    #[test]
    fn line_loop_repeats_first_vertex() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        run(
            &mut backend,
            &DrawState::default(),
            &DrawRequest::new(Topology::LineLoop, VertexArrays::new(ArrayDesc::vec3(&pos))).unprojected(),
        );
        let d = &backend.draws[0];
        assert_eq!(d.primitive, PrimitiveKind::LineStrip);
        assert_eq!(d.vertex_count, 5);
        assert_eq!(&d.vertices[16..20], &d.vertices[0..4]);
    }

    #[test]
    fn fan_becomes_triangle_list() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        run(
            &mut backend,
            &DrawState::default(),
            &DrawRequest::new(Topology::TriangleFan, VertexArrays::new(ArrayDesc::vec3(&pos))).unprojected(),
        );
        let d = &backend.draws[0];
        assert_eq!(d.primitive, PrimitiveKind::TriangleList);
        assert_eq!(d.indices.as_deref(), Some(&[0u16, 1, 2, 0, 2, 3][..]));
    }

    #[test]
    fn indexed_draw_uploads_referenced_span_only() {
        let pos: Vec<Vec3> = (0..8).map(|i| Vec3::new(i as f64, 0.0, 0.0)).collect();
        let idx = [5u16, 7, 6];
        let mut backend = RecordingBackend::new();
        let req = DrawRequest::new(Topology::Triangles, VertexArrays::new(ArrayDesc::vec3(&pos)))
            .indexed(&idx)
            .unprojected();
        run(&mut backend, &DrawState::default(), &req);
        let d = &backend.draws[0];
        assert_eq!(d.vertex_count, 3);
        assert_eq!(d.vertices[0], 5.0);
        assert_eq!(d.indices.as_deref(), Some(&[0u16, 2, 1][..]));
    }

    // ── wide lines ────────────────────────────────────────────────────────

    #[test]
    fn wide_lines_are_emulated_without_native_support() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        let state = DrawState { line_width: 3.0, ..DrawState::default() };
        run(
            &mut backend,
            &state,
            &DrawRequest::new(Topology::LineStrip, VertexArrays::new(ArrayDesc::vec3(&pos))).unprojected(),
        );
        let d = &backend.draws[0];
        assert_eq!(d.primitive, PrimitiveKind::TriangleList);
        assert_eq!(d.vertex_count, 18);
        assert_eq!(d.uniforms.projection, Mat4::IDENTITY.cols);
    }

    #[test]
    fn native_wide_lines_are_used_when_available() {
        let pos = square();
        let mut backend = RecordingBackend::new()
            .with_capabilities(BackendCapabilities { wide_lines: true, line_smooth: true });
        let state = DrawState { line_width: 3.0, ..DrawState::default() };
        run(
            &mut backend,
            &state,
            &DrawRequest::new(Topology::LineStrip, VertexArrays::new(ArrayDesc::vec3(&pos))).unprojected(),
        );
        assert_eq!(backend.draws[0].primitive, PrimitiveKind::LineStrip);
    }

    #[test]
    fn colored_indexed_wide_lines_are_deindexed() {
        let pos = square();
        let colors = [Color::WHITE; 4];
        let idx = [0u16, 1, 2, 3];
        let mut backend = RecordingBackend::new();
        let state = DrawState { line_width: 2.0, ..DrawState::default() };
        let arrays = VertexArrays::new(ArrayDesc::vec3(&pos)).with_colors(ArrayDesc::colors(&colors));
        run(&mut backend, &state, &DrawRequest::new(Topology::Lines, arrays).indexed(&idx).unprojected());
        let d = &backend.draws[0];
        assert_eq!(d.pipeline, PipelineKind::VertexColor);
        assert_eq!(d.vertex_count, 12);
        assert!(d.indices.is_none());
    }

    // ── preconditions ─────────────────────────────────────────────────────

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "unsupported vertex stream combination")]
    fn normals_are_fatal_in_debug_builds() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        let arrays = VertexArrays::new(ArrayDesc::vec3(&pos)).with_normals(ArrayDesc::vec3(&pos));
        run(&mut backend, &DrawState::default(), &DrawRequest::new(Topology::Triangles, arrays));
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn normals_skip_the_draw_in_release_builds() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        let arrays = VertexArrays::new(ArrayDesc::vec3(&pos)).with_normals(ArrayDesc::vec3(&pos));
        run(&mut backend, &DrawState::default(), &DrawRequest::new(Topology::Triangles, arrays));
        assert!(backend.draws.is_empty());
    }

    #[test]
    #[should_panic(expected = "exceeds the vertex arrays")]
    fn range_past_end_is_fatal() {
        let pos = square();
        let mut backend = RecordingBackend::new();
        let req = DrawRequest::new(Topology::Points, VertexArrays::new(ArrayDesc::vec3(&pos))).range(2, 5);
        run(&mut backend, &DrawState::default(), &req);
    }

    #[test]
    fn coverage_textures_use_the_text_program() {
        let pos = square();
        let tex = [Vec2::zero(); 4];
        let mut backend = RecordingBackend::new();
        let arrays = VertexArrays::new(ArrayDesc::vec3(&pos)).with_tex_coords(ArrayDesc::vec2(&tex));
        let req = DrawRequest::new(Topology::TriangleStrip, arrays).with_texture(Some(&3)).coverage().unprojected();
        run(&mut backend, &DrawState::default(), &req);
        let d = &backend.draws[0];
        assert_eq!(d.pipeline, PipelineKind::Text);
        assert_eq!(d.texture, Some(3));
        assert_eq!(d.vertices.len(), 4 * PipelineKind::Text.stride());
    }

    #[test]
    fn textured_draw_without_texture_is_skipped() {
        let pos = square();
        let tex = [Vec2::zero(); 4];
        let mut backend = RecordingBackend::new();
        let arrays = VertexArrays::new(ArrayDesc::vec3(&pos)).with_tex_coords(ArrayDesc::vec2(&tex));
        run(&mut backend, &DrawState::default(), &DrawRequest::new(Topology::Triangles, arrays));
        assert!(backend.draws.is_empty());
    }
}
