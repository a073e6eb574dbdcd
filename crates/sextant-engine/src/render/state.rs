use crate::paint::{BlendFunc, Color};

/// Fixed-function state owned by a painter.
///
/// The backend sees this only through [`StateChange`]s, so toggles that
/// keep their value never reach it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    pub blend: bool,
    pub blend_func: BlendFunc,
    pub depth_test: bool,
    pub depth_mask: bool,
    pub cull_face: bool,
    /// Cull front faces instead of back faces (meshes seen from inside).
    pub cull_front: bool,
    pub line_smooth: bool,
    pub line_width: f32,
    pub front_face_cw: bool,
    /// Color used by draws without a color stream. Never sent as a change.
    pub color: Color,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            blend: false,
            blend_func: BlendFunc::ALPHA,
            depth_test: false,
            depth_mask: false,
            cull_face: false,
            cull_front: false,
            line_smooth: false,
            line_width: 1.0,
            front_face_cw: false,
            color: Color::WHITE,
        }
    }
}

/// One backend-visible toggle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StateChange {
    Blend(bool),
    BlendFunc(BlendFunc),
    DepthTest(bool),
    DepthMask(bool),
    CullFace(bool),
    CullFront(bool),
    LineSmooth(bool),
    LineWidth(f32),
    FrontFaceCw(bool),
}

impl DrawState {
    /// The whole state as changes, for pushing it to a fresh backend.
    pub fn changes(&self) -> [StateChange; 9] {
        [
            StateChange::Blend(self.blend),
            StateChange::BlendFunc(self.blend_func),
            StateChange::DepthTest(self.depth_test),
            StateChange::DepthMask(self.depth_mask),
            StateChange::CullFace(self.cull_face),
            StateChange::CullFront(self.cull_front),
            StateChange::LineSmooth(self.line_smooth),
            StateChange::LineWidth(self.line_width),
            StateChange::FrontFaceCw(self.front_face_cw),
        ]
    }

    /// Records `change`.
    pub fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::Blend(v) => self.blend = v,
            StateChange::BlendFunc(f) => self.blend_func = f,
            StateChange::DepthTest(v) => self.depth_test = v,
            StateChange::DepthMask(v) => self.depth_mask = v,
            StateChange::CullFace(v) => self.cull_face = v,
            StateChange::CullFront(v) => self.cull_front = v,
            StateChange::LineSmooth(v) => self.line_smooth = v,
            StateChange::LineWidth(w) => self.line_width = w,
            StateChange::FrontFaceCw(v) => self.front_face_cw = v,
        }
    }

    /// Wide lines are drawn as triangles instead of native lines.
    #[inline]
    pub fn wants_wide_lines(&self) -> bool {
        self.line_width > 1.0
    }
}
