//! Thick lines built from triangles, for backends without native wide lines.
//!
//! Every segment becomes a quad offset along its screen-space perpendicular.
//! In strips and loops the outer corner of each joint is mitered by
//! intersecting the offset lines of the two segments meeting there.

use crate::coords::Vec2;

/// How consecutive input points pair into segments.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LineMode {
    /// Independent pairs.
    Lines,
    Strip,
    /// Strip closed back to the first point.
    Loop,
}

impl LineMode {
    #[inline]
    fn connected(self) -> bool {
        self != LineMode::Lines
    }
}

/// Output vertex in clip space, with its segment end's color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WideLineVertex {
    pub clip: [f32; 4],
    pub color: [f32; 4],
}

/// One end of a segment, expanded.
#[derive(Copy, Clone)]
struct End {
    ndc: Vec2,
    z: f32,
    w: f32,
}

impl End {
    fn from_clip(c: [f32; 4]) -> Self {
        let w = if c[3] != 0.0 { c[3] } else { 1.0 };
        Self { ndc: Vec2::new(c[0] / w, c[1] / w), z: c[2], w }
    }

    fn vertex(&self, ndc: Vec2, color: [f32; 4]) -> WideLineVertex {
        WideLineVertex { clip: [ndc.x * self.w, ndc.y * self.w, self.z, self.w], color }
    }
}

/// Intersects the offset line through `prev_end` (direction `prev_dir`) with
/// the one through `curr_start` (direction `curr_dir`).
///
/// Returns the mitered start of the current segment when the lines meet
/// beyond the previous segment's end and before the current one's start,
/// which only happens on the outer side of a joint.
fn miter(prev_end: Vec2, prev_dir: Vec2, curr_start: Vec2, curr_dir: Vec2) -> Option<Vec2> {
    let (d, p) = (curr_dir, prev_dir);
    let denom = d.x * p.y - d.y * p.x;
    let dx = prev_end.x - curr_start.x;
    let dy = curr_start.y - prev_end.y;
    let prev_t = (d.y * dx + d.x * dy) / denom;
    let curr_t = (p.y * dx + p.x * dy) / denom;
    if prev_t > 0.0 && curr_t < 0.0 {
        Some(curr_start + d * curr_t)
    } else {
        None
    }
}

/// Expands clip-space line vertices into a triangle list.
///
/// `colors`, when given, holds one color per input vertex; otherwise every
/// output vertex gets `[1; 4]` and the caller tints with a uniform.
/// `width` is in pixels and `viewport` is the viewport size in pixels.
/// Output vertices are clip coordinates, drawn with an identity projection.
pub fn expand_wide_lines(
    clip: &[[f32; 4]],
    colors: Option<&[[f32; 4]]>,
    mode: LineMode,
    width: f32,
    viewport: Vec2,
) -> Vec<WideLineVertex> {
    if clip.len() < 2 {
        return Vec::new();
    }
    if let Some(c) = colors {
        assert_eq!(c.len(), clip.len(), "one color per line vertex");
    }

    let color_at = |i: usize| colors.map_or([1.0; 4], |c| c[i]);
    let step = if mode == LineMode::Lines { 2 } else { 1 };
    let vp = Vec2::new(viewport.x.max(1.0), viewport.y.max(1.0));
    let half = Vec2::new(width / vp.x, width / vp.y);

    let mut out: Vec<WideLineVertex> = Vec::with_capacity(6 * clip.len());
    let mut prev_dir = Vec2::zero();

    let mut n = 0;
    while n + 1 < clip.len() {
        let e0 = End::from_clip(clip[n]);
        let e1 = End::from_clip(clip[n + 1]);
        let (c0, c1) = (color_at(n), color_at(n + 1));

        let dir = (e1.ndc - e0.ndc).normalized();
        let dir_px = Vec2::new(dir.x * vp.x, dir.y * vp.y).normalized();
        let perp = dir_px.perp();
        let offset = Vec2::new(half.x * perp.x, half.y * perp.y);

        let mut v0a = e0.ndc + offset;
        let mut v0b = e0.ndc - offset;
        let v1a = e1.ndc + offset;
        let v1b = e1.ndc - offset;

        if mode.connected() && n > 0 {
            let base = out.len() - 6;
            let prev_w = e0.w;
            let prev_a = Vec2::new(out[base + 2].clip[0] / prev_w, out[base + 2].clip[1] / prev_w);
            if let Some(m) = miter(prev_a, prev_dir, v0a, dir) {
                v0a = m;
                for k in [base + 2, base + 3] {
                    out[k].clip[0] = m.x * prev_w;
                    out[k].clip[1] = m.y * prev_w;
                }
            }
            let prev_b = Vec2::new(out[base + 5].clip[0] / prev_w, out[base + 5].clip[1] / prev_w);
            if let Some(m) = miter(prev_b, prev_dir, v0b, dir) {
                v0b = m;
                out[base + 5].clip[0] = m.x * prev_w;
                out[base + 5].clip[1] = m.y * prev_w;
            }
        }

        out.extend([
            e0.vertex(v0a, c0),
            e0.vertex(v0b, c0),
            e1.vertex(v1a, c1),
            e1.vertex(v1a, c1),
            e0.vertex(v0b, c0),
            e1.vertex(v1b, c1),
        ]);

        prev_dir = dir;
        n += step;
    }

    if mode == LineMode::Loop && out.len() >= 6 {
        let last = out.len() - 1;
        let closing = [out[last - 2], out[last], out[0], out[0], out[last], out[1]];
        out.extend(closing);
    }

    out
}
