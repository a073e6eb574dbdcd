//! Test doubles shared by the unit tests: a configurable projector, a backend
//! that records everything it is asked to do, and the lock serializing tests
//! that build painters.

use std::sync::{Mutex, MutexGuard};

use crate::coords::{Rect, Vec3};
use crate::geom::SphericalCap;
use crate::projector::{MaskType, Projected, Projector};
use crate::render::{
    AlphaImage, Backend, BackendCapabilities, DrawCall, DrawUniforms, PipelineKind, PrimitiveKind,
    StateChange,
};

type SeamFn = Box<dyn Fn(Vec3, Vec3) -> bool + Send + Sync>;
type HiddenFn = Box<dyn Fn(Vec3) -> bool + Send + Sync>;

/// Orthographic view down the `-z` axis: `x` to the right, `y` up, scaled by
/// `scale` pixels around the viewport center. Visible points get depth 0.5.
pub(crate) struct MockProjector {
    viewport: Rect,
    scale: f64,
    seam: Option<SeamFn>,
    hidden: Option<HiddenFn>,
    disk_mask: bool,
    gravity: bool,
    hidden_culling: bool,
    device_pixel_ratio: f32,
    bounding_cap: SphericalCap,
}

impl MockProjector {
    pub(crate) fn new() -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
            scale: 100.0,
            seam: None,
            hidden: None,
            disk_mask: false,
            gravity: false,
            hidden_culling: false,
            device_pixel_ratio: 1.0,
            bounding_cap: SphericalCap::full_sphere(),
        }
    }

    /// Reports a seam on every pair for which `f` is true.
    pub(crate) fn with_seam(mut self, f: impl Fn(Vec3, Vec3) -> bool + Send + Sync + 'static) -> Self {
        self.seam = Some(Box::new(f));
        self
    }

    /// Flags every direction for which `f` is true as hidden.
    pub(crate) fn with_hidden(mut self, f: impl Fn(Vec3) -> bool + Send + Sync + 'static) -> Self {
        self.hidden = Some(Box::new(f));
        self
    }

    pub(crate) fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    pub(crate) fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub(crate) fn with_disk_mask(mut self) -> Self {
        self.disk_mask = true;
        self
    }

    pub(crate) fn with_gravity_labels(mut self) -> Self {
        self.gravity = true;
        self
    }

    pub(crate) fn with_hidden_point_culling(mut self) -> Self {
        self.hidden_culling = true;
        self
    }

    pub(crate) fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub(crate) fn with_bounding_cap(mut self, cap: SphericalCap) -> Self {
        self.bounding_cap = cap;
        self
    }

    fn center(&self) -> (f64, f64) {
        let c = self.viewport.center();
        (c.x as f64, c.y as f64)
    }
}

impl Projector for MockProjector {
    fn project(&self, v: Vec3) -> Projected {
        let (cx, cy) = self.center();
        let (x, y) = (cx + self.scale * v.x, cy - self.scale * v.y);
        if self.hidden.as_ref().is_some_and(|h| h(v)) {
            Projected::hidden(x, y)
        } else {
            Projected::visible(Vec3::new(x, y, 0.5))
        }
    }

    fn unproject(&self, x: f64, y: f64) -> Option<Vec3> {
        let (cx, cy) = self.center();
        let (px, py) = ((x - cx) / self.scale, (cy - y) / self.scale);
        let r2 = px * px + py * py;
        (r2 <= 1.0).then(|| Vec3::new(px, py, (1.0 - r2).sqrt()))
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn intersects_discontinuity(&self, a: Vec3, b: Vec3) -> bool {
        self.seam.as_ref().is_some_and(|s| s(a, b))
    }

    fn has_discontinuity(&self) -> bool {
        self.seam.is_some()
    }

    fn cap_intersects_discontinuity(&self, _cap: &SphericalCap) -> bool {
        self.seam.is_some()
    }

    fn mask_type(&self) -> MaskType {
        if self.disk_mask { MaskType::Disk } else { MaskType::None }
    }

    fn device_pixels_per_pixel(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn gravity_labels(&self) -> bool {
        self.gravity
    }

    fn supports_hidden_point_culling(&self) -> bool {
        self.hidden_culling
    }

    fn bounding_cap(&self) -> SphericalCap {
        self.bounding_cap
    }
}

/// One recorded [`Backend::draw`].
#[derive(Debug, Clone)]
pub(crate) struct DrawRecord {
    pub pipeline: PipelineKind,
    pub primitive: PrimitiveKind,
    pub vertices: Vec<f32>,
    pub vertex_count: u32,
    pub indices: Option<Vec<u16>>,
    pub uniforms: DrawUniforms,
    pub texture: Option<u32>,
}

impl DrawRecord {
    /// The 4-component position of every uploaded vertex.
    pub(crate) fn positions(&self) -> Vec<[f32; 4]> {
        self.vertices
            .chunks_exact(self.pipeline.stride())
            .map(|v| [v[0], v[1], v[2], v[3]])
            .collect()
    }
}

/// Backend that executes nothing and records every call.
///
/// Textures are numbered from 1 in upload order.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub caps: BackendCapabilities,
    pub changes: Vec<StateChange>,
    pub viewports: Vec<Rect>,
    pub uploads: Vec<(u32, u32)>,
    pub draws: Vec<DrawRecord>,
    pub pending_error: Option<String>,
    pub fail_uploads: bool,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capabilities(mut self, caps: BackendCapabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Forgets recorded calls, keeping configuration.
    pub(crate) fn clear(&mut self) {
        self.changes.clear();
        self.viewports.clear();
        self.uploads.clear();
        self.draws.clear();
    }
}

impl Backend for RecordingBackend {
    type Texture = u32;

    fn capabilities(&self) -> BackendCapabilities {
        self.caps
    }

    fn apply(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.viewports.push(viewport);
    }

    fn upload_alpha(&mut self, image: &AlphaImage) -> anyhow::Result<u32> {
        anyhow::ensure!(!self.fail_uploads, "upload rejected");
        self.uploads.push((image.width, image.height));
        Ok(self.uploads.len() as u32)
    }

    fn draw(&mut self, call: &DrawCall<'_, u32>) {
        self.draws.push(DrawRecord {
            pipeline: call.pipeline,
            primitive: call.primitive,
            vertices: call.vertices.to_vec(),
            vertex_count: call.vertex_count,
            indices: call.indices.map(<[u16]>::to_vec),
            uniforms: call.uniforms,
            texture: call.texture.copied(),
        });
    }

    fn take_error(&mut self) -> Option<String> {
        self.pending_error.take()
    }
}

static PAINTER_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that construct painters; the single-painter guard is
/// process-wide. Survives poisoning by `should_panic` tests.
pub(crate) fn painter_lock() -> MutexGuard<'static, ()> {
    PAINTER_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
