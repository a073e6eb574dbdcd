use std::f32::consts::TAU;
use std::sync::Arc;

use crate::coords::{Vec2, Vec3};
use crate::paint::{BlendFunc, Color};
use crate::projector::{MaskType, Projector};
use crate::render::{
    ArrayDesc, Backend, Dispatcher, DrawRequest, DrawState, StateChange, Topology, VertexArrays,
};
use crate::text::{FontId, FontSystem, TextTextureCache};

use super::guard::PainterGuard;
use super::PainterConfig;

const SPRITE_TEX_COORDS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// Immediate-mode drawing through one projector.
///
/// A painter owns the fixed-function [`DrawState`] and forwards only real
/// changes to the backend. Creating one pushes the default state; dropping it
/// pushes the defaults again and surfaces pending backend errors.
///
/// 2D primitives take window coordinates (top-left origin, +Y down). Sky
/// primitives take unit vectors and go through the projector.
pub struct Painter<'a, B: Backend> {
    pub(super) backend: &'a mut B,
    pub(super) fonts: &'a FontSystem,
    pub(super) text_cache: &'a mut TextTextureCache<B::Texture>,
    pub(super) dispatcher: &'a mut Dispatcher,
    pub(super) config: &'a PainterConfig,
    pub(super) prj: Arc<dyn Projector>,
    pub(super) state: DrawState,
    pub(super) saturation: f32,
    pub(super) font: Option<FontId>,
    pub(super) font_size: f32,
    pub(super) texture: Option<B::Texture>,
    pub(super) sky_rtl: bool,
    pub(super) warned_no_font: bool,
    _guard: PainterGuard,
}

impl<'a, B: Backend> Painter<'a, B> {
    #[track_caller]
    pub(super) fn new(
        backend: &'a mut B,
        fonts: &'a FontSystem,
        text_cache: &'a mut TextTextureCache<B::Texture>,
        dispatcher: &'a mut Dispatcher,
        config: &'a PainterConfig,
        prj: Arc<dyn Projector>,
    ) -> Self {
        let guard = PainterGuard::acquire();

        let state = DrawState { front_face_cw: prj.front_face_cw(), ..DrawState::default() };
        backend.apply_all(&state);
        backend.set_viewport(prj.viewport());
        if let Some(err) = backend.take_error() {
            panic!("graphics backend error before painting: {err}");
        }

        Self {
            backend,
            fonts,
            text_cache,
            dispatcher,
            config,
            prj,
            state,
            saturation: 1.0,
            font: None,
            font_size: config.default_font_size,
            texture: None,
            sky_rtl: false,
            warned_no_font: false,
            _guard: guard,
        }
    }

    // ── projector ─────────────────────────────────────────────────────────

    pub fn projector(&self) -> &Arc<dyn Projector> {
        &self.prj
    }

    /// Switches projectors; updates the backend viewport and face winding.
    pub fn set_projector(&mut self, prj: Arc<dyn Projector>) {
        self.backend.set_viewport(prj.viewport());
        let cw = prj.front_face_cw();
        self.prj = prj;
        self.set_front_face_cw(cw);
    }

    // ── state ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Records `change` and forwards it when it alters the state.
    fn update(&mut self, change: StateChange) {
        let mut next = self.state;
        next.apply(change);
        if next != self.state {
            self.state = next;
            self.backend.apply(change);
        }
    }

    /// Enables or disables blending; `func` applies only when enabling.
    pub fn set_blending(&mut self, enabled: bool, func: BlendFunc) {
        self.update(StateChange::Blend(enabled));
        if enabled {
            self.update(StateChange::BlendFunc(func));
        }
    }

    pub fn blending(&self) -> (bool, BlendFunc) {
        (self.state.blend, self.state.blend_func)
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.update(StateChange::DepthTest(enabled));
    }

    pub fn set_depth_mask(&mut self, enabled: bool) {
        self.update(StateChange::DepthMask(enabled));
    }

    pub fn set_cull_face(&mut self, enabled: bool) {
        self.update(StateChange::CullFace(enabled));
    }

    /// Culls front faces instead of back faces while enabled.
    pub fn set_cull_front(&mut self, enabled: bool) {
        self.update(StateChange::CullFront(enabled));
    }

    pub fn set_front_face_cw(&mut self, cw: bool) {
        self.update(StateChange::FrontFaceCw(cw));
    }

    /// No-op on backends without line antialiasing.
    pub fn set_line_smooth(&mut self, enabled: bool) {
        if self.backend.capabilities().line_smooth {
            self.update(StateChange::LineSmooth(enabled));
        }
    }

    /// Widths above one are emulated with triangles when the backend cannot
    /// rasterize them; the backend then never sees them.
    pub fn set_line_width(&mut self, width: f32) {
        if (self.state.line_width - width).abs() < 1e-10 {
            return;
        }
        self.state.line_width = width;
        let emulated = self.config.force_wide_line_emulation || !self.backend.capabilities().wide_lines;
        if width > 1.0 && emulated {
            return;
        }
        self.backend.apply(StateChange::LineWidth(width));
    }

    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    /// Color of draws without a color stream.
    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    pub fn color(&self) -> Color {
        self.state.color
    }

    /// Saturation applied by textured draws with per-vertex colors.
    pub fn set_saturation(&mut self, saturation: f32) {
        self.saturation = saturation;
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Lays gravity labels out right to left.
    pub fn set_sky_rtl(&mut self, rtl: bool) {
        self.sky_rtl = rtl;
    }

    /// Label font and size in logical pixels.
    pub fn set_font(&mut self, font: FontId, pixel_size: f32) {
        self.font = Some(font);
        self.font_size = pixel_size;
    }

    pub fn font(&self) -> Option<(FontId, f32)> {
        self.font.map(|f| (f, self.font_size))
    }

    /// Texture used by textured draws that do not name one.
    pub fn bind_texture(&mut self, texture: Option<B::Texture>) {
        self.texture = texture;
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    /// Issues one draw with the current state, using the bound texture when
    /// the request carries none.
    #[track_caller]
    pub fn draw_from_array(&mut self, req: DrawRequest<'_, B::Texture>) {
        let req = if req.texture.is_none() { req.with_texture(self.texture.as_ref()) } else { req };
        self.dispatcher.draw(&mut *self.backend, &*self.prj, &self.state, self.saturation, &req);
    }

    /// Draws arrays that already hold window coordinates.
    pub(super) fn draw_window(&mut self, topology: Topology, arrays: VertexArrays<'_>) {
        self.draw_from_array(DrawRequest::new(topology, arrays).unprojected());
    }

    // ── 2D primitives ─────────────────────────────────────────────────────

    /// Paints black around the field-of-view disk of disk-masked projectors.
    pub fn draw_viewport_shape(&mut self) {
        if self.prj.mask_type() != MaskType::Disk {
            return;
        }
        let (old_blend, old_func) = self.blending();
        let old_color = self.state.color;
        self.set_blending(false, old_func);
        self.state.color = Color::BLACK;

        let center = self.prj.viewport_center();
        let inner = 0.5 * self.prj.viewport_fov_diameter();
        let size = self.prj.viewport().size;
        let outer = size.x + size.y;
        let slices = self.config.viewport_disk_slices.max(3);

        let mut vertices = Vec::with_capacity((slices as usize + 1) * 2);
        for i in 0..=slices {
            let (s, c) = (TAU * i as f32 / slices as f32).sin_cos();
            for r in [outer, inner] {
                vertices.push(window(center.x + r * s, center.y + r * c));
            }
        }
        self.draw_window(Topology::TriangleStrip, VertexArrays::new(ArrayDesc::vec3(&vertices)));

        self.set_blending(old_blend, old_func);
        self.state.color = old_color;
    }

    /// Circle outline of radius `r` pixels.
    ///
    /// Skipped when `r <= 1` or when the circle cannot touch the viewport.
    pub fn draw_circle(&mut self, x: f32, y: f32, r: f32) {
        if r <= 1.0 {
            return;
        }
        let viewport = self.prj.viewport();
        let half = viewport.size * 0.5;
        let big_r = half.length();
        let d = (viewport.center() - Vec2::new(x, y)).length();
        if d > r + big_r || d < r - big_r {
            return;
        }

        let segments = self.config.circle_segments.max(3);
        let (sp, cp) = (TAU / segments as f32).sin_cos();
        let (mut dx, mut dy) = (r, 0.0f32);
        let mut vertices = Vec::with_capacity(segments as usize);
        for _ in 0..segments {
            vertices.push(window(x + dx, y + dy));
            let rx = dx * cp - dy * sp;
            dy = dx * sp + dy * cp;
            dx = rx;
        }
        self.draw_window(Topology::LineLoop, VertexArrays::new(ArrayDesc::vec3(&vertices)));
    }

    /// Ellipse outline with radii `rx`, `ry`, rotated counter-clockwise by
    /// `angle` radians. Turns on line smoothing and widens the line with the
    /// radius; both stay set afterwards.
    pub fn draw_ellipse(&mut self, x: f64, y: f64, rx: f64, ry: f64, angle: f64) {
        if rx <= 1.0 || ry <= 1.0 {
            return;
        }
        let max_r = rx.max(ry);
        let points = (max_r / 3.0).clamp(32.0, 1024.0).round() as usize;
        let (sin_a, cos_a) = angle.sin_cos();
        let vertices: Vec<Vec3> = (0..points)
            .map(|n| {
                let (sin_b, cos_b) = (std::f64::consts::TAU * n as f64 / points as f64).sin_cos();
                let (px, py) = (rx * sin_b, ry * cos_b);
                // Counter-clockwise on screen, where y grows downwards.
                Vec3::new(x + px * cos_a - py * sin_a, y - (py * cos_a + px * sin_a), 0.0)
            })
            .collect();

        self.set_line_smooth(true);
        self.set_line_width((max_r / 40.0).clamp(1.0, 2.0) as f32);
        self.draw_window(Topology::LineLoop, VertexArrays::new(ArrayDesc::vec3(&vertices)));
    }

    /// Textured square of half-size `radius` logical pixels.
    pub fn draw_sprite_2d(&mut self, x: f32, y: f32, radius: f32) {
        let r = radius * self.prj.device_pixels_per_pixel();
        let vertices = [window(x - r, y - r), window(x + r, y - r), window(x - r, y + r), window(x + r, y + r)];
        self.draw_textured_quad(&vertices);
    }

    /// Like [`draw_sprite_2d`](Self::draw_sprite_2d) with `radius` in device pixels.
    pub fn draw_sprite_2d_no_device_scale(&mut self, x: f32, y: f32, radius: f32) {
        let ppx = self.prj.device_pixels_per_pixel();
        self.draw_sprite_2d(x, y, radius / ppx);
    }

    /// Sprite rotated counter-clockwise by `rotation_deg`.
    pub fn draw_sprite_2d_rotated(&mut self, x: f32, y: f32, radius: f32, rotation_deg: f32) {
        let r = radius * self.prj.device_pixels_per_pixel();
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let vertices = [(-1.0f32, -1.0f32), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)]
            .map(|(u, v)| window(x + r * (u * cos + v * sin), y + r * (v * cos - u * sin)));
        self.draw_textured_quad(&vertices);
    }

    /// Projects `v` and draws a sprite there. Returns whether it was visible.
    pub fn draw_sprite_3d(&mut self, v: Vec3, radius: f32) -> bool {
        let mut win = v;
        let visible = self.prj.project_in_place(&mut win);
        if visible {
            self.draw_sprite_2d(win.x as f32, win.y as f32, radius);
        }
        visible
    }

    fn draw_textured_quad(&mut self, vertices: &[Vec3; 4]) {
        let arrays = VertexArrays::new(ArrayDesc::vec3(vertices)).with_tex_coords(ArrayDesc::vec2(&SPRITE_TEX_COORDS));
        self.draw_window(Topology::TriangleStrip, arrays);
    }

    /// Axis-aligned rectangle from its top-left corner.
    pub fn draw_rect_2d(&mut self, x: f32, y: f32, width: f32, height: f32, textured: bool) {
        let vertices = [
            window(x, y),
            window(x + width, y),
            window(x, y + height),
            window(x + width, y + height),
        ];
        if textured {
            self.draw_textured_quad(&vertices);
        } else {
            self.draw_window(Topology::TriangleStrip, VertexArrays::new(ArrayDesc::vec3(&vertices)));
        }
    }

    pub fn draw_point_2d(&mut self, x: f32, y: f32) {
        let vertices = [window(x, y)];
        self.draw_window(Topology::Points, VertexArrays::new(ArrayDesc::vec3(&vertices)));
    }

    pub fn draw_line_2d(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let vertices = [window(x1, y1), window(x2, y2)];
        self.draw_window(Topology::Lines, VertexArrays::new(ArrayDesc::vec3(&vertices)));
    }
}

impl<B: Backend> Drop for Painter<'_, B> {
    fn drop(&mut self) {
        self.state = DrawState::default();
        self.backend.apply_all(&self.state);

        if let Some(err) = self.backend.take_error() {
            if std::thread::panicking() {
                log::error!("Painter: graphics backend error while painting: {err}");
            } else {
                panic!("graphics backend error while painting: {err}");
            }
        }
    }
}

#[inline]
pub(super) fn window(x: f32, y: f32) -> Vec3 {
    Vec3::new(x as f64, y as f64, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::painter::RenderContext;
    use crate::render::{BackendCapabilities, PipelineKind, PrimitiveKind};
    use crate::testing::{painter_lock, MockProjector, RecordingBackend};

    fn context() -> RenderContext<RecordingBackend> {
        let mut ctx = RenderContext::new(PainterConfig::default());
        ctx.initialize(RecordingBackend::new());
        ctx
    }

    fn mock() -> Arc<dyn Projector> {
        Arc::new(MockProjector::new())
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn construction_applies_defaults() {
        let _lock = painter_lock();
        let mut ctx = context();
        let p = ctx.painter(mock());
        assert_eq!(p.backend.changes, DrawState::default().changes().to_vec());
        assert_eq!(p.backend.viewports, vec![Rect::new(0.0, 0.0, 800.0, 600.0)]);
    }

    #[test]
    fn drop_resets_state() {
        let _lock = painter_lock();
        let mut ctx = context();
        {
            let mut p = ctx.painter(mock());
            p.set_depth_test(true);
            p.set_cull_face(true);
            p.backend.clear();
        }
        let backend = ctx.backend().unwrap();
        assert_eq!(backend.changes, DrawState::default().changes().to_vec());
    }

    #[test]
    #[should_panic(expected = "backend error while painting")]
    fn backend_error_at_drop_is_fatal() {
        let _lock = painter_lock();
        let mut ctx = context();
        let p = ctx.painter(mock());
        p.backend.pending_error = Some("invalid operation".into());
        drop(p);
    }

    #[test]
    #[should_panic(expected = "backend error before painting")]
    fn backend_error_at_construction_is_fatal() {
        let _lock = painter_lock();
        let mut ctx = context();
        ctx.backend_mut().unwrap().pending_error = Some("stale error".into());
        let _p = ctx.painter(mock());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn painters_can_be_created_one_after_another() {
        let _lock = painter_lock();
        let mut ctx = context();
        drop(ctx.painter(mock()));
        drop(ctx.painter(mock()));
    }

    // ── setters ───────────────────────────────────────────────────────────

    #[test]
    fn same_blend_twice_toggles_backend_once() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.backend.clear();
        p.set_blending(true, BlendFunc::ALPHA);
        p.set_blending(true, BlendFunc::ALPHA);
        assert_eq!(p.backend.changes, vec![StateChange::Blend(true)]);

        p.set_blending(true, BlendFunc::ADDITIVE);
        assert_eq!(p.backend.changes.last(), Some(&StateChange::BlendFunc(BlendFunc::ADDITIVE)));
        assert_eq!(p.blending(), (true, BlendFunc::ADDITIVE));
    }

    #[test]
    fn disabling_blend_keeps_function() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.set_blending(true, BlendFunc::ADDITIVE);
        p.set_blending(false, BlendFunc::ALPHA);
        assert_eq!(p.blending(), (false, BlendFunc::ADDITIVE));
    }

    #[test]
    fn toggles_are_idempotent() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.backend.clear();
        for _ in 0..3 {
            p.set_depth_test(true);
            p.set_depth_mask(true);
            p.set_cull_face(false);
        }
        assert_eq!(p.backend.changes, vec![StateChange::DepthTest(true), StateChange::DepthMask(true)]);
    }

    #[test]
    fn emulated_line_widths_stay_off_the_backend() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.backend.clear();
        p.set_line_width(3.0);
        assert_eq!(p.line_width(), 3.0);
        assert!(p.backend.changes.is_empty());
        p.set_line_width(1.0);
        assert_eq!(p.backend.changes, vec![StateChange::LineWidth(1.0)]);
    }

    #[test]
    fn native_line_width_and_smoothing_are_forwarded() {
        let _lock = painter_lock();
        let mut ctx = RenderContext::new(PainterConfig::default());
        ctx.initialize(
            RecordingBackend::new().with_capabilities(BackendCapabilities { wide_lines: true, line_smooth: true }),
        );
        let mut p = ctx.painter(mock());
        p.backend.clear();
        p.set_line_width(2.5);
        p.set_line_smooth(true);
        assert_eq!(p.backend.changes, vec![StateChange::LineWidth(2.5), StateChange::LineSmooth(true)]);
    }

    #[test]
    fn line_smooth_is_a_no_op_without_support() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.backend.clear();
        p.set_line_smooth(true);
        assert!(!p.state().line_smooth);
        assert!(p.backend.changes.is_empty());
    }

    #[test]
    fn set_projector_updates_viewport() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        let small = Rect::new(0.0, 0.0, 100.0, 100.0);
        p.set_projector(Arc::new(MockProjector::new().with_viewport(small)));
        assert_eq!(p.backend.viewports.last(), Some(&small));
        assert_eq!(p.projector().viewport(), small);
    }

    // ── 2D primitives ─────────────────────────────────────────────────────

    #[test]
    fn viewport_shape_needs_a_disk_mask() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.draw_viewport_shape();
        assert!(p.backend.draws.is_empty());
    }

    #[test]
    fn viewport_shape_rings_the_disk_in_black() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(Arc::new(MockProjector::new().with_disk_mask()));
        p.set_blending(true, BlendFunc::ALPHA);
        p.set_color(Color::WHITE);
        p.backend.clear();
        p.draw_viewport_shape();

        let d = &p.backend.draws[0];
        assert_eq!(d.primitive, PrimitiveKind::TriangleStrip);
        assert_eq!(d.vertex_count, 240 * 2);
        assert_eq!(d.uniforms.color, Color::BLACK.to_array());
        // Inner ring at half the fov diameter (600 / 2) from the center.
        let inner = d.positions()[1];
        assert!((inner[0] - 400.0).abs() < 1e-3 && (inner[1] - 600.0).abs() < 1e-3);
        assert_eq!(p.backend.changes, vec![StateChange::Blend(false), StateChange::Blend(true)]);
        assert!(p.blending().0);
        assert_eq!(p.color(), Color::WHITE);
    }

    #[test]
    fn circle_closes_its_loop() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.draw_circle(400.0, 300.0, 50.0);
        let d = &p.backend.draws[0];
        assert_eq!(d.primitive, PrimitiveKind::LineStrip);
        assert_eq!(d.vertex_count, 181);
        assert_eq!(d.positions()[0], [450.0, 300.0, 0.0, 1.0]);
    }

    #[test]
    fn degenerate_or_distant_circles_are_skipped() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.draw_circle(400.0, 300.0, 1.0);
        p.draw_circle(5000.0, 300.0, 10.0);
        // Encloses the whole viewport without touching it.
        p.draw_circle(400.0, 300.0, 2000.0);
        assert!(p.backend.draws.is_empty());
    }

    #[test]
    fn ellipse_point_count_is_clamped() {
        let _lock = painter_lock();
        let mut ctx = RenderContext::new(PainterConfig::default());
        ctx.initialize(RecordingBackend::new().with_capabilities(BackendCapabilities { wide_lines: true, line_smooth: false }));
        let mut p = ctx.painter(mock());
        p.draw_ellipse(400.0, 300.0, 30.0, 20.0, 0.0);
        p.draw_ellipse(400.0, 300.0, 300.0, 200.0, 0.5);
        p.draw_ellipse(400.0, 300.0, 1.0, 20.0, 0.0);
        let counts: Vec<u32> = p.backend.draws.iter().map(|d| d.vertex_count).collect();
        // Loops repeat their first point.
        assert_eq!(counts, vec![33, 101]);
        assert!((p.line_width() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ellipse_rotation_is_counter_clockwise_on_screen() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.draw_ellipse(400.0, 300.0, 40.0, 20.0, std::f64::consts::FRAC_PI_2);
        // The first point sits `ry` above the center; a quarter turn
        // counter-clockwise moves it to the left.
        let first = p.backend.draws[0].positions()[0];
        assert!((first[0] - 380.0).abs() < 1e-3, "{first:?}");
        assert!((first[1] - 300.0).abs() < 1e-3);
    }

    #[test]
    fn sprites_use_the_bound_texture() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(Arc::new(MockProjector::new().with_device_pixel_ratio(2.0)));
        p.draw_sprite_2d(100.0, 100.0, 5.0);
        assert!(p.backend.draws.is_empty());

        p.bind_texture(Some(9));
        p.draw_sprite_2d(100.0, 100.0, 5.0);
        let d = &p.backend.draws[0];
        assert_eq!(d.pipeline, PipelineKind::Textured);
        assert_eq!(d.texture, Some(9));
        assert_eq!(d.positions()[0], [90.0, 90.0, 0.0, 1.0]);

        p.draw_sprite_2d_no_device_scale(100.0, 100.0, 5.0);
        assert_eq!(p.backend.draws[1].positions()[3], [105.0, 105.0, 0.0, 1.0]);
    }

    #[test]
    fn rotated_sprite_turns_counter_clockwise() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.bind_texture(Some(1));
        p.draw_sprite_2d_rotated(0.0, 0.0, 10.0, 90.0);
        let pos = p.backend.draws[0].positions();
        // Top-left corner (-10, -10) turns to bottom-left (-10, 10).
        assert!((pos[0][0] + 10.0).abs() < 1e-4 && (pos[0][1] - 10.0).abs() < 1e-4, "{:?}", pos[0]);
    }

    #[test]
    fn sprite_3d_reports_visibility() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(Arc::new(MockProjector::new().with_hidden(|v| v.z < 0.0)));
        p.bind_texture(Some(1));
        assert!(p.draw_sprite_3d(Vec3::Z, 4.0));
        assert!(!p.draw_sprite_3d(-Vec3::Z, 4.0));
        assert_eq!(p.backend.draws.len(), 1);
    }

    #[test]
    fn flat_primitives() {
        let _lock = painter_lock();
        let mut ctx = context();
        let mut p = ctx.painter(mock());
        p.draw_rect_2d(10.0, 20.0, 30.0, 40.0, false);
        p.draw_point_2d(1.0, 2.0);
        p.draw_line_2d(0.0, 0.0, 5.0, 5.0);
        let kinds: Vec<(PipelineKind, PrimitiveKind, u32)> =
            p.backend.draws.iter().map(|d| (d.pipeline, d.primitive, d.vertex_count)).collect();
        assert_eq!(
            kinds,
            vec![
                (PipelineKind::Plain, PrimitiveKind::TriangleStrip, 4),
                (PipelineKind::Plain, PrimitiveKind::PointList, 1),
                (PipelineKind::Plain, PrimitiveKind::LineList, 2),
            ]
        );
        assert_eq!(p.backend.draws[0].positions()[3], [40.0, 60.0, 0.0, 1.0]);
    }
}
